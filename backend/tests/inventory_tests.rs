//! Inventory accounting tests
//!
//! Tests for the weighted-average ledger including:
//! - Weighted-average cost over any sequence of receipts
//! - Sales leave the averages of the remaining units untouched
//! - Depleted positions carry no averages
//! - Undo restores the position it reverses
//! - Insufficient stock leaves the position unchanged

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    discounted_price, sale_price_from_margin, AccountingError, ProfitReport, ProfitReportLine,
    ProfitTotals, ReversalOutcome, StockPosition,
};
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn close_enough(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= dec("0.000001")
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Receipt, sale, second receipt, then undo of the second receipt
    #[test]
    fn test_ledger_scenario() {
        let mut position = StockPosition::default();

        position.receive(100, dec("10"), dec("25")).unwrap();
        assert_eq!(position.stock, 100);
        assert_eq!(position.average_cost, dec("10"));

        let recorded_cost = position.issue(30).unwrap();
        assert_eq!(recorded_cost, dec("10"));
        assert_eq!(position.stock, 70);
        assert_eq!(position.average_cost, dec("10"));
        assert_eq!(discounted_price(dec("25"), Decimal::ZERO), dec("25"));

        position.receive(50, dec("20"), dec("30")).unwrap();
        assert_eq!(position.stock, 120);
        assert_eq!(position.average_cost, dec("14.1666666667"));

        position.reverse_receipt(50, dec("20"), dec("30")).unwrap();
        assert_eq!(position.stock, 70);
        assert!(close_enough(position.average_cost, dec("10")));
        assert!(close_enough(position.average_sale_price, dec("25")));
    }

    /// Selling 30 units listed at 25 with a recorded cost of 10
    #[test]
    fn test_profit_of_single_sale() {
        let mut totals = ProfitTotals::default();
        totals.record_sale(30, dec("25"), dec("10"));

        assert_eq!(totals.revenue, dec("750"));
        assert_eq!(totals.cost, dec("300"));
        assert_eq!(totals.profit, dec("450"));
    }

    #[test]
    fn test_report_totals_match_per_product_sums() {
        let mut green = ProfitTotals::default();
        green.record_sale(30, dec("25"), dec("10"));
        green.record_sale(2, dec("22.5"), dec("10"));
        let mut black = ProfitTotals::default();
        black.record_sale(4, dec("12"), dec("14.1666666667"));

        let line = |name: &str, t: &ProfitTotals| ProfitReportLine {
            product_id: Uuid::new_v4(),
            product_name: name.to_string(),
            product_sale_price: dec("25"),
            total_sold_quantity: t.sold_quantity,
            total_sales_revenue: t.revenue,
            total_cost: t.cost,
            total_profit: t.profit,
        };
        let report = ProfitReport {
            start_date: None,
            end_date: None,
            report: vec![line("Green Tea", &green), line("Black Tea", &black)],
            total_records: 2,
        };

        let totals = report.grand_totals();
        assert_eq!(totals.sold_quantity, 36);
        assert_eq!(totals.revenue, green.revenue + black.revenue);
        assert_eq!(totals.profit, totals.revenue - totals.cost);
    }

    #[test]
    fn test_default_margin_doubles_purchase_price() {
        assert_eq!(sale_price_from_margin(dec("12.40"), dec("100")), Ok(dec("24.80")));
    }

    #[test]
    fn test_sale_to_zero_then_undo_restores_cost() {
        let mut position = StockPosition::default();
        position.receive(10, dec("8"), dec("12")).unwrap();

        let recorded_cost = position.issue(10).unwrap();
        assert!(position.is_depleted());
        assert_eq!(position.average_cost, Decimal::ZERO);

        position.reverse_issue(10, recorded_cost, dec("12")).unwrap();
        assert_eq!(position.stock, 10);
        assert_eq!(position.average_cost, dec("8"));
        assert_eq!(position.average_sale_price, dec("12"));
    }

    #[test]
    fn test_undo_receipt_after_sales_needs_stock() {
        let mut position = StockPosition::default();
        position.receive(10, dec("5"), dec("10")).unwrap();
        position.issue(8).unwrap();

        let before = position;
        let result = position.reverse_receipt(10, dec("5"), dec("10"));
        assert_eq!(
            result,
            Err(AccountingError::InsufficientStock {
                available: 2,
                requested: 10
            })
        );
        assert_eq!(position, before);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = i32> {
        1i32..1_000
    }

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    fn receipt_strategy() -> impl Strategy<Value = (i32, Decimal, Decimal)> {
        (quantity_strategy(), price_strategy(), price_strategy())
    }

    fn position_from(receipts: &[(i32, Decimal, Decimal)]) -> StockPosition {
        let mut position = StockPosition::default();
        for (quantity, purchase, sale) in receipts {
            position.receive(*quantity, *purchase, *sale).unwrap();
        }
        position
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The running average equals total purchase value over units held
        #[test]
        fn prop_weighted_average_cost(
            receipts in prop::collection::vec(receipt_strategy(), 1..20)
        ) {
            let position = position_from(&receipts);

            let units: i64 = receipts.iter().map(|(q, _, _)| i64::from(*q)).sum();
            let value: Decimal = receipts.iter().map(|(q, p, _)| Decimal::from(*q) * *p).sum();
            let sale_value: Decimal = receipts.iter().map(|(q, _, s)| Decimal::from(*q) * *s).sum();

            prop_assert_eq!(i64::from(position.stock), units);
            prop_assert!(close_enough(position.average_cost, value / Decimal::from(units)));
            prop_assert!(close_enough(position.average_sale_price, sale_value / Decimal::from(units)));
        }

        /// A sale that leaves stock keeps both averages as they were
        #[test]
        fn prop_sale_keeps_averages(
            receipts in prop::collection::vec(receipt_strategy(), 1..10),
            fraction in 0.0f64..1.0
        ) {
            let mut position = position_from(&receipts);
            let before = position;
            let quantity = ((f64::from(before.stock) * fraction) as i32).clamp(1, before.stock);

            let recorded_cost = position.issue(quantity).unwrap();

            prop_assert_eq!(recorded_cost, before.average_cost);
            prop_assert_eq!(position.stock, before.stock - quantity);
            if position.stock > 0 {
                prop_assert_eq!(position.average_cost, before.average_cost);
                prop_assert_eq!(position.average_sale_price, before.average_sale_price);
            }
        }

        /// Selling everything leaves no averages behind
        #[test]
        fn prop_depletion_resets_averages(
            receipts in prop::collection::vec(receipt_strategy(), 1..10)
        ) {
            let mut position = position_from(&receipts);
            let stock = position.stock;

            position.issue(stock).unwrap();

            prop_assert!(position.is_depleted());
            prop_assert_eq!(position.average_cost, Decimal::ZERO);
            prop_assert_eq!(position.average_sale_price, Decimal::ZERO);
        }

        /// Undoing a receipt restores the prior position up to rounding
        #[test]
        fn prop_undo_receipt_is_left_inverse(
            receipts in prop::collection::vec(receipt_strategy(), 0..10),
            (quantity, purchase, sale) in receipt_strategy()
        ) {
            let mut position = position_from(&receipts);
            let before = position;

            position.receive(quantity, purchase, sale).unwrap();
            let outcome = position.reverse_receipt(quantity, purchase, sale).unwrap();

            prop_assert_eq!(outcome, ReversalOutcome::Exact);
            prop_assert_eq!(position.stock, before.stock);
            prop_assert!(close_enough(position.average_cost, before.average_cost));
            prop_assert!(close_enough(position.average_sale_price, before.average_sale_price));
        }

        /// Undoing a sale restores stock and averages
        #[test]
        fn prop_undo_sale_is_left_inverse(
            receipts in prop::collection::vec(receipt_strategy(), 1..10),
            fraction in 0.0f64..1.0,
            sell_all in any::<bool>(),
            list_price in price_strategy()
        ) {
            let mut position = position_from(&receipts);
            let before = position;
            let quantity = if sell_all {
                before.stock
            } else {
                ((f64::from(before.stock) * fraction) as i32).clamp(1, before.stock)
            };

            let recorded_cost = position.issue(quantity).unwrap();
            position.reverse_issue(quantity, recorded_cost, list_price).unwrap();

            prop_assert_eq!(position.stock, before.stock);
            prop_assert_eq!(position.average_cost, before.average_cost);
            if quantity < before.stock {
                prop_assert_eq!(position.average_sale_price, before.average_sale_price);
            } else {
                prop_assert_eq!(position.average_sale_price, list_price);
            }
        }

        /// Asking for more than is held fails and changes nothing
        #[test]
        fn prop_insufficient_stock_rejected(
            receipts in prop::collection::vec(receipt_strategy(), 0..5),
            extra in 1i32..1_000
        ) {
            let mut position = position_from(&receipts);
            let before = position;
            let requested = before.stock + extra;

            let result = position.issue(requested);

            prop_assert_eq!(
                result,
                Err(AccountingError::InsufficientStock { available: before.stock, requested })
            );
            prop_assert_eq!(position, before);
        }

        /// Averages never go negative, whatever order receipts are undone in
        #[test]
        fn prop_averages_never_negative(
            receipts in prop::collection::vec(receipt_strategy(), 2..8),
            sold in 0i32..500,
            undo_index in 0usize..8
        ) {
            let mut position = position_from(&receipts);
            let sold = sold.min(position.stock - 1).max(0);
            if sold > 0 {
                position.issue(sold).unwrap();
            }

            let (quantity, purchase, sale) = receipts[undo_index % receipts.len()];
            if position.reverse_receipt(quantity, purchase, sale).is_ok() {
                prop_assert!(position.average_cost >= Decimal::ZERO);
                prop_assert!(position.average_sale_price >= Decimal::ZERO);
                if position.stock == 0 {
                    prop_assert_eq!(position.average_cost, Decimal::ZERO);
                }
            }
        }

        /// Profit is revenue minus cost for any set of sales
        #[test]
        fn prop_profit_is_revenue_minus_cost(
            sales in prop::collection::vec((quantity_strategy(), price_strategy(), price_strategy()), 0..20)
        ) {
            let mut totals = ProfitTotals::default();
            for (quantity, sale_price, cost) in &sales {
                totals.record_sale(*quantity, *sale_price, *cost);
            }

            prop_assert_eq!(totals.profit, totals.revenue - totals.cost);
            prop_assert_eq!(
                totals.sold_quantity,
                sales.iter().map(|(q, _, _)| i64::from(*q)).sum::<i64>()
            );
        }

        /// Discounts never raise the price and a full discount is free
        #[test]
        fn prop_discount_bounds(
            list_price in price_strategy(),
            discount in 0i64..=100
        ) {
            let charged = discounted_price(list_price, Decimal::from(discount));
            prop_assert!(charged <= list_price);
            prop_assert!(charged >= Decimal::ZERO);
            if discount == 100 {
                prop_assert_eq!(charged, Decimal::ZERO);
            }
        }
    }
}
