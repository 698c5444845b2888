//! Weighted-average inventory accounting
//!
//! Pure position math used by the inventory engine. Nothing here touches
//! storage: callers load a [`StockPosition`], apply exactly one movement to it
//! and persist the result inside their own transaction.
//!
//! - IN movements blend the incoming unit cost and list price into the running
//!   averages.
//! - OUT movements only reduce stock and report the average cost at the moment
//!   of sale (the realized cost recorded on the movement).
//! - Reversals subtract the movement's contribution back out.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal places kept on running averages
pub const AVERAGE_SCALE: u32 = 10;

/// Decimal places kept on charged amounts (list prices, discounted prices)
pub const MONEY_SCALE: u32 = 2;

/// Errors raised by position math
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountingError {
    #[error("Quantity must be positive")]
    NonPositiveQuantity,

    #[error("Not enough stock: {available} available, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("Stock level overflow")]
    StockOverflow,

    #[error("Amount exceeds the supported range")]
    AmountOverflow,
}

/// Stock on hand for one product together with its running averages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPosition {
    pub stock: i32,
    /// Weighted-average purchase cost of the units in stock
    pub average_cost: Decimal,
    /// Weighted-average list price of the units in stock
    pub average_sale_price: Decimal,
}

/// How a receipt reversal settled the averages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReversalOutcome {
    Exact,
    /// Subtraction went below zero and the averages were floored at zero
    Clamped,
}

impl StockPosition {
    pub fn new(stock: i32, average_cost: Decimal, average_sale_price: Decimal) -> Self {
        Self {
            stock,
            average_cost,
            average_sale_price,
        }
    }

    /// Apply an IN movement.
    pub fn receive(
        &mut self,
        quantity: i32,
        purchase_price: Decimal,
        sale_price: Decimal,
    ) -> Result<(), AccountingError> {
        ensure_positive(quantity)?;
        let new_stock = self
            .stock
            .checked_add(quantity)
            .ok_or(AccountingError::StockOverflow)?;

        if new_stock > 0 {
            let held = Decimal::from(self.stock);
            let incoming = Decimal::from(quantity);
            let divisor = Decimal::from(new_stock);

            let cost_value = weighted_sum(held, self.average_cost, incoming, purchase_price)?;
            let sale_value = weighted_sum(held, self.average_sale_price, incoming, sale_price)?;
            self.average_cost = round_average(cost_value / divisor);
            self.average_sale_price = round_average(sale_value / divisor);
        } else {
            self.clear_averages();
        }

        self.stock = new_stock;
        Ok(())
    }

    /// Apply an OUT movement and return the realized unit cost.
    ///
    /// The averages of the remaining units are untouched, except that a
    /// depleted position is reset to zero.
    pub fn issue(&mut self, quantity: i32) -> Result<Decimal, AccountingError> {
        ensure_positive(quantity)?;
        if self.stock < quantity {
            return Err(AccountingError::InsufficientStock {
                available: self.stock,
                requested: quantity,
            });
        }

        let recorded_cost = self.average_cost;
        self.stock -= quantity;
        if self.stock == 0 {
            self.clear_averages();
        }

        Ok(recorded_cost)
    }

    /// Take back an IN movement of `quantity` units bought at `purchase_price`
    /// and listed at `sale_price`.
    pub fn reverse_receipt(
        &mut self,
        quantity: i32,
        purchase_price: Decimal,
        sale_price: Decimal,
    ) -> Result<ReversalOutcome, AccountingError> {
        ensure_positive(quantity)?;
        if self.stock < quantity {
            return Err(AccountingError::InsufficientStock {
                available: self.stock,
                requested: quantity,
            });
        }

        let held = Decimal::from(self.stock);
        let removed = Decimal::from(quantity);
        let remaining_cost = weighted_sum(held, self.average_cost, -removed, purchase_price)?;
        let remaining_sale_value =
            weighted_sum(held, self.average_sale_price, -removed, sale_price)?;
        let new_stock = self.stock - quantity;
        self.stock = new_stock;

        if new_stock == 0 {
            self.clear_averages();
            return Ok(ReversalOutcome::Exact);
        }

        let divisor = Decimal::from(new_stock);
        let average_cost = round_average(remaining_cost / divisor);
        let average_sale_price = round_average(remaining_sale_value / divisor);
        let clamped = average_cost < Decimal::ZERO || average_sale_price < Decimal::ZERO;

        self.average_cost = average_cost.max(Decimal::ZERO);
        self.average_sale_price = average_sale_price.max(Decimal::ZERO);

        Ok(if clamped {
            ReversalOutcome::Clamped
        } else {
            ReversalOutcome::Exact
        })
    }

    /// Take back an OUT movement.
    ///
    /// Averages stay as they are. A depleted position has no averages left, so
    /// it is re-seeded from the cost recorded on the movement and the given
    /// list price.
    pub fn reverse_issue(
        &mut self,
        quantity: i32,
        recorded_cost: Decimal,
        list_price: Decimal,
    ) -> Result<(), AccountingError> {
        ensure_positive(quantity)?;
        let restored = self
            .stock
            .checked_add(quantity)
            .ok_or(AccountingError::StockOverflow)?;

        if self.stock == 0 {
            self.average_cost = recorded_cost.max(Decimal::ZERO);
            self.average_sale_price = list_price.max(Decimal::ZERO);
        }

        self.stock = restored;
        Ok(())
    }

    pub fn is_depleted(&self) -> bool {
        self.stock <= 0
    }

    fn clear_averages(&mut self) {
        self.average_cost = Decimal::ZERO;
        self.average_sale_price = Decimal::ZERO;
    }
}

/// `a_units * a_price + b_units * b_price`, failing instead of overflowing
fn weighted_sum(
    a_units: Decimal,
    a_price: Decimal,
    b_units: Decimal,
    b_price: Decimal,
) -> Result<Decimal, AccountingError> {
    a_units
        .checked_mul(a_price)
        .zip(b_units.checked_mul(b_price))
        .and_then(|(a, b)| a.checked_add(b))
        .ok_or(AccountingError::AmountOverflow)
}

/// List price derived from a purchase price and a markup percentage:
/// `purchase_price * (1 + margin / 100)`.
pub fn sale_price_from_margin(
    purchase_price: Decimal,
    margin_percent: Decimal,
) -> Result<Decimal, AccountingError> {
    let multiplier = Decimal::ONE + margin_percent / Decimal::ONE_HUNDRED;
    purchase_price
        .checked_mul(multiplier)
        .map(round_money)
        .ok_or(AccountingError::AmountOverflow)
}

/// Transaction price after a percentage discount off the list price.
pub fn discounted_price(list_price: Decimal, discount_percent: Decimal) -> Decimal {
    let multiplier = Decimal::ONE - discount_percent / Decimal::ONE_HUNDRED;
    round_money(list_price * multiplier)
}

pub fn round_average(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AVERAGE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn ensure_positive(quantity: i32) -> Result<(), AccountingError> {
    if quantity <= 0 {
        return Err(AccountingError::NonPositiveQuantity);
    }
    Ok(())
}

/// Revenue, cost and profit accumulated over a set of OUT movements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitTotals {
    pub sold_quantity: i64,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
}

impl ProfitTotals {
    /// Account for one sale of `quantity` units charged at `sale_price` with
    /// `recorded_cost` as realized unit cost.
    pub fn record_sale(&mut self, quantity: i32, sale_price: Decimal, recorded_cost: Decimal) {
        let units = Decimal::from(quantity);
        self.sold_quantity += i64::from(quantity);
        self.revenue += sale_price * units;
        self.cost += recorded_cost * units;
        self.profit += (sale_price - recorded_cost) * units;
    }

    pub fn merge(&mut self, other: &ProfitTotals) {
        self.sold_quantity += other.sold_quantity;
        self.revenue += other.revenue;
        self.cost += other.cost;
        self.profit += other.profit;
    }
}
