//! Loan manager routing, pricing, and deposit sizing

mod common;

use common::{amount, flat_venues, loan_token, par_bond, FlatVenue};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tranche_amm::{AmmVenue, ConstantProductVenue};
use tranche_loan::{LoanError, LoanManager};
use tranche_types::U256;

fn par_manager() -> LoanManager {
    let bond = par_bond();
    let loan = loan_token();
    let venues = flat_venues(&bond, &loan, 1, 1);
    LoanManager::new(bond, venues).unwrap()
}

fn discounted_manager(num: u64, den: u64) -> LoanManager {
    let bond = par_bond();
    let loan = loan_token();
    let venues = flat_venues(&bond, &loan, num, den);
    LoanManager::new(bond, venues).unwrap()
}

#[test]
fn test_construction_requires_one_venue_per_non_residual_tranche() {
    let bond = par_bond();
    let loan = loan_token();
    let mut venues = flat_venues(&bond, &loan, 1, 1);
    venues.pop();
    assert!(matches!(
        LoanManager::new(bond, venues),
        Err(LoanError::InvalidVenueCount { expected: 2, got: 1 })
    ));
}

#[test]
fn test_construction_rejects_unmatched_venue() {
    let bond = par_bond();
    let loan = loan_token();
    let mut venues = flat_venues(&bond, &loan, 1, 1);
    // venue 1 pairs the residual tranche instead of tranche 1
    venues[1] = Arc::new(FlatVenue::par(
        bond.residual_tranche().token().clone(),
        loan.clone(),
    ));
    assert!(matches!(
        LoanManager::new(bond, venues),
        Err(LoanError::UnmatchedVenue { index: 1, .. })
    ));
}

#[test]
fn test_construction_rejects_mixed_loan_currencies() {
    let bond = par_bond();
    let loan = loan_token();
    let other_loan = tranche_types::Token::new("0xfeed", 6, Some("OTHER".into()), None);
    let mut venues = flat_venues(&bond, &loan, 1, 1);
    venues[1] = Arc::new(FlatVenue::par(
        bond.tranches()[1].token().clone(),
        other_loan,
    ));
    assert!(matches!(
        LoanManager::new(bond, venues),
        Err(LoanError::MixedLoanCurrency { .. })
    ));
}

#[test]
fn test_loan_currency_is_derived() {
    let manager = par_manager();
    assert_eq!(manager.loan_currency(), &loan_token());
}

#[test]
fn test_tranche_price() {
    let manager = discounted_manager(95, 100);
    assert_eq!(manager.tranche_price(0).unwrap(), dec!(0.95));
    assert!(matches!(
        manager.tranche_price(5),
        Err(LoanError::TrancheIndexOutOfRange { index: 5, len: 2 })
    ));
}

#[tokio::test]
async fn test_sales_partial_fill_on_senior_venue() {
    let manager = par_manager();
    let loan = loan_token();
    // deposit 100M mints 20M/30M/50M; senior venue alone covers 10M
    let sales = manager
        .sales(
            &amount(&loan, 10_000_000),
            &amount(manager.bond().collateral(), 100_000_000),
            false,
        )
        .await
        .unwrap();

    assert_eq!(sales.len(), 2);
    assert_eq!(sales[0].raw(), U256::from(10_000_000u64));
    assert!(sales[1].is_zero());
}

#[tokio::test]
async fn test_sales_spill_into_mezzanine() {
    let manager = par_manager();
    let loan = loan_token();
    // 35M needs all 20M senior plus 15M of the mezzanine allocation
    let sales = manager
        .sales(
            &amount(&loan, 35_000_000),
            &amount(manager.bond().collateral(), 100_000_000),
            false,
        )
        .await
        .unwrap();

    assert_eq!(sales[0].raw(), U256::from(20_000_000u64));
    assert_eq!(sales[1].raw(), U256::from(15_000_000u64));
}

#[tokio::test]
async fn test_sales_contract_input_uses_sentinel_and_pads() {
    let manager = par_manager();
    let loan = loan_token();
    let sales = manager
        .sales(
            &amount(&loan, 35_000_000),
            &amount(manager.bond().collateral(), 100_000_000),
            true,
        )
        .await
        .unwrap();

    // fixed arity: one entry per tranche, residual included
    assert_eq!(sales.len(), 3);
    assert_eq!(sales[0].raw(), LoanManager::SELL_ALL);
    assert_eq!(sales[1].raw(), U256::from(15_000_000u64));
    assert!(sales[2].is_zero());
    assert_eq!(
        sales[2].currency(),
        manager.bond().residual_tranche().token()
    );
}

#[tokio::test]
async fn test_sales_zero_target_sells_nothing() {
    let manager = par_manager();
    let loan = loan_token();
    let sales = manager
        .sales(
            &amount(&loan, 0),
            &amount(manager.bond().collateral(), 100_000_000),
            false,
        )
        .await
        .unwrap();
    assert!(sales.iter().all(|s| s.is_zero()));
}

#[tokio::test]
async fn test_sales_insufficient_deposit() {
    let manager = par_manager();
    let loan = loan_token();
    // non-residual allocations realize at most 50M
    let err = manager
        .sales(
            &amount(&loan, 60_000_000),
            &amount(manager.bond().collateral(), 100_000_000),
            false,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LoanError::InsufficientDeposit { .. }));
}

#[tokio::test]
async fn test_sales_validates_currencies() {
    let manager = par_manager();
    let loan = loan_token();
    let collateral = manager.bond().collateral().clone();

    let err = manager
        .sales(&amount(&collateral, 1), &amount(&collateral, 1), false)
        .await
        .unwrap_err();
    assert!(matches!(err, LoanError::InvalidLoanCurrency { .. }));

    let err = manager
        .sales(&amount(&loan, 1), &amount(&loan, 1), false)
        .await
        .unwrap_err();
    assert!(matches!(err, LoanError::InvalidDepositCurrency { .. }));
}

#[tokio::test]
async fn test_borrow_max_retains_residual() {
    let manager = par_manager();
    let out = manager
        .borrow_max(&amount(manager.bond().collateral(), 100_000_000))
        .await
        .unwrap();

    assert_eq!(out.currency_output.raw(), U256::from(50_000_000u64));
    assert_eq!(out.tranche_tokens.len(), 3);
    assert!(out.tranche_tokens[0].is_zero());
    assert!(out.tranche_tokens[1].is_zero());
    assert_eq!(out.tranche_tokens[2].raw(), U256::from(50_000_000u64));
    assert_eq!(
        out.tranche_tokens[2].currency(),
        manager.bond().residual_tranche().token()
    );
}

#[tokio::test]
async fn test_borrow_with_partial_sales() {
    let manager = par_manager();
    let bond = manager.bond().clone();
    let sales = vec![
        amount(bond.tranches()[0].token(), 10_000_000),
        amount(bond.tranches()[1].token(), 0),
    ];
    let out = manager
        .borrow(&amount(bond.collateral(), 100_000_000), &sales)
        .await
        .unwrap();

    assert_eq!(out.currency_output.raw(), U256::from(10_000_000u64));
    // unsold remainders per tranche, residual untouched
    assert_eq!(out.tranche_tokens[0].raw(), U256::from(10_000_000u64));
    assert_eq!(out.tranche_tokens[1].raw(), U256::from(30_000_000u64));
    assert_eq!(out.tranche_tokens[2].raw(), U256::from(50_000_000u64));
}

#[tokio::test]
async fn test_borrow_rejects_oversized_sale() {
    let manager = par_manager();
    let bond = manager.bond().clone();
    let sales = vec![
        amount(bond.tranches()[0].token(), 25_000_000), // minted only 20M
        amount(bond.tranches()[1].token(), 0),
    ];
    let err = manager
        .borrow(&amount(bond.collateral(), 100_000_000), &sales)
        .await
        .unwrap_err();
    assert!(matches!(err, LoanError::InvalidSale { index: 0 }));
}

#[tokio::test]
async fn test_borrow_rejects_wrong_sales_arity() {
    let manager = par_manager();
    let bond = manager.bond().clone();
    let sales = vec![amount(bond.tranches()[0].token(), 0)];
    let err = manager
        .borrow(&amount(bond.collateral(), 100_000_000), &sales)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LoanError::InvalidSalesCount { expected: 2, got: 1 }
    ));
}

#[tokio::test]
async fn test_discount_positive_below_face_value() {
    // every tranche sells at 0.95: in 50M, out 47.5M
    let manager = discounted_manager(95, 100);
    let bond = manager.bond().clone();
    let sales = vec![
        amount(bond.tranches()[0].token(), 20_000_000),
        amount(bond.tranches()[1].token(), 30_000_000),
    ];
    let discount = manager.discount(&sales).await.unwrap();
    // (50M − 47.5M) / 47.5M at 10^-9 resolution
    assert_eq!(discount, dec!(0.052631578));
}

#[tokio::test]
async fn test_discount_negative_is_premium() {
    let manager = discounted_manager(105, 100);
    let bond = manager.bond().clone();
    let sales = vec![
        amount(bond.tranches()[0].token(), 20_000_000),
        amount(bond.tranches()[1].token(), 30_000_000),
    ];
    let discount = manager.discount(&sales).await.unwrap();
    assert!(discount < dec!(0));
    assert_eq!(discount, dec!(-0.047619047));
}

#[tokio::test]
async fn test_discount_normalizes_decimal_mismatch() {
    // 9-decimal loan currency against 6-decimal tranche tokens at par
    let bond = par_bond();
    let loan9 = tranche_types::Token::new("0x10a9", 9, Some("USDB9".into()), None);
    let venues = flat_venues(&bond, &loan9, 1, 1);
    let manager = LoanManager::new(bond.clone(), venues).unwrap();

    let sales = vec![
        amount(bond.tranches()[0].token(), 20_000_000),
        amount(bond.tranches()[1].token(), 30_000_000),
    ];
    assert_eq!(manager.discount(&sales).await.unwrap(), dec!(0));
}

#[tokio::test]
async fn test_discount_rejects_zero_proceeds() {
    let manager = par_manager();
    let bond = manager.bond().clone();
    let sales = vec![
        amount(bond.tranches()[0].token(), 0),
        amount(bond.tranches()[1].token(), 0),
    ];
    assert!(matches!(
        manager.discount(&sales).await,
        Err(LoanError::ZeroSaleOutput)
    ));
}

#[tokio::test]
async fn test_lender_interest() {
    // buying at 0.95 yields a positive return against face value
    let manager = discounted_manager(95, 100);
    let loan = loan_token();
    let interest = manager
        .lender_interest(&amount(&loan, 9_500_000), 0)
        .await
        .unwrap();
    // 9.5M buys 10M tranche: (10M − 9.5M) / 9.5M
    assert_eq!(interest, dec!(0.052631578));
}

#[tokio::test]
async fn test_lender_interest_requires_loan_currency() {
    let manager = par_manager();
    let collateral = manager.bond().collateral().clone();
    assert!(matches!(
        manager.lender_interest(&amount(&collateral, 1), 0).await,
        Err(LoanError::InvalidLoanCurrency { .. })
    ));
}

#[tokio::test]
async fn test_maximum_required_deposit_uses_senior_only() {
    let manager = par_manager();
    let loan = loan_token();
    // senior fill of 10M needs 10M tranche A; ratio 200 at par → 50M deposit
    let deposit = manager
        .maximum_required_deposit(&amount(&loan, 10_000_000))
        .await
        .unwrap();
    assert_eq!(deposit.raw(), U256::from(50_000_000u64));
}

#[tokio::test]
async fn test_minimum_required_deposit_binary_search() {
    let manager = par_manager();
    let loan = loan_token();
    let desired = amount(&loan, 10_000_000);

    let minimum = manager.minimum_required_deposit(&desired).await.unwrap();
    let maximum = manager.maximum_required_deposit(&desired).await.unwrap();

    // flat 1:1 venues: borrow_max(d) realizes d/2, the true minimum is 20M;
    // the bounded search brackets it from above within one whole unit
    assert_eq!(minimum.raw(), U256::from(20_312_500u64));
    assert!(minimum.le(&maximum).unwrap());

    let realized = manager.borrow_max(&minimum).await.unwrap().currency_output;
    assert!(realized.ge(&desired).unwrap());
}

#[tokio::test]
async fn test_constant_product_venues_end_to_end() {
    let bond = par_bond();
    let loan = loan_token();
    let venues: Vec<Arc<dyn AmmVenue>> = bond.tranches()[..2]
        .iter()
        .map(|t| {
            Arc::new(
                ConstantProductVenue::with_default_fee(
                    amount(t.token(), 1_000_000_000_000),
                    amount(&loan, 1_000_000_000_000),
                )
                .unwrap(),
            ) as Arc<dyn AmmVenue>
        })
        .collect();
    let manager = LoanManager::new(bond.clone(), venues).unwrap();

    let desired = amount(&loan, 1_000_000);
    let minimum = manager.minimum_required_deposit(&desired).await.unwrap();
    let maximum = manager.maximum_required_deposit(&desired).await.unwrap();
    assert!(minimum.le(&maximum).unwrap());
    assert!(manager
        .borrow_max(&minimum)
        .await
        .unwrap()
        .currency_output
        .ge(&desired)
        .unwrap());

    // a sale plan realizes at least the target and never oversells
    let deposit = maximum;
    let sales = manager.sales(&desired, &deposit, false).await.unwrap();
    let minted = bond.deposit(&deposit).unwrap();
    for (sale, allocation) in sales.iter().zip(&minted) {
        assert!(sale.le(allocation).unwrap());
    }
    let executed = manager.borrow(&deposit, &sales).await.unwrap();
    assert!(executed.currency_output.ge(&desired).unwrap());
}

#[tokio::test]
async fn test_sales_never_oversell_on_skewed_cp_venues() {
    // shallow, lopsided pools maximize rounding pressure on the
    // inverse quote that sizes the final partial fill
    let bond = par_bond();
    let loan = loan_token();
    let reserves = [(1_000_000_000u64, 50_000_000u64), (7_000_000, 900_000_000)];
    let venues: Vec<Arc<dyn AmmVenue>> = bond.tranches()[..2]
        .iter()
        .zip(reserves)
        .map(|(t, (tranche_side, loan_side))| {
            Arc::new(
                ConstantProductVenue::with_default_fee(
                    amount(t.token(), tranche_side),
                    amount(&loan, loan_side),
                )
                .unwrap(),
            ) as Arc<dyn AmmVenue>
        })
        .collect();
    let manager = LoanManager::new(bond.clone(), venues).unwrap();

    let deposit = amount(bond.collateral(), 40_000_000);
    let minted = bond.deposit(&deposit).unwrap();
    for desired_raw in [1u64, 1_000, 250_000, 2_000_000] {
        let desired = amount(&loan, desired_raw);
        let sales = manager.sales(&desired, &deposit, false).await.unwrap();
        for (sale, allocation) in sales.iter().zip(&minted) {
            assert!(sale.le(allocation).unwrap());
        }
        let executed = manager.borrow(&deposit, &sales).await.unwrap();
        assert!(executed.currency_output.ge(&desired).unwrap());
    }
}
