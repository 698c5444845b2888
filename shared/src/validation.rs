//! Validation rules for inventory and catalog input
//!
//! Each rule returns a static message so callers can attach the offending
//! field name when building their own error type.

use rust_decimal::Decimal;

use crate::accounting::MONEY_SCALE;

/// Lowest accepted markup when a profit margin is supplied
pub const MIN_PROFIT_MARGIN_PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// Highest accepted markup when a profit margin is supplied
pub const MAX_PROFIT_MARGIN_PERCENT: Decimal = Decimal::from_parts(300, 0, 0, false, 0);

/// Exclusive ceiling on any price: 10^10, the integer range of the price
/// and average columns
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

/// Default page size for ledger listings
pub const DEFAULT_LIST_LIMIT: i64 = 10;

/// Largest page size for ledger listings
pub const MAX_LIST_LIMIT: i64 = 100;

/// Minimum length for product and category names
pub const MIN_NAME_LENGTH: usize = 3;

// ============================================================================
// Movement Validations
// ============================================================================

/// Validate a movement quantity (whole units, strictly positive)
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be a positive whole number");
    }
    Ok(())
}

/// Validate a price that must be strictly positive
pub fn validate_positive_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price must be greater than zero");
    }
    validate_price_ceiling(price)
}

/// Validate a price that may be zero
pub fn validate_non_negative_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    validate_price_ceiling(price)
}

/// Validate that a price fits the stored range
pub fn validate_price_ceiling(price: Decimal) -> Result<(), &'static str> {
    if price >= MAX_PRICE {
        return Err("Price must be less than 10000000000");
    }
    Ok(())
}

/// Validate that a list price is expressed in whole cents
pub fn validate_money_scale(price: Decimal) -> Result<(), &'static str> {
    if price.normalize().scale() > MONEY_SCALE {
        return Err("Price cannot have more than 2 decimal places");
    }
    Ok(())
}

/// Validate a profit margin. The accepted range is a markup policy of
/// 100% to 300% over the purchase price.
pub fn validate_profit_margin(margin_percent: Decimal) -> Result<(), &'static str> {
    if margin_percent < MIN_PROFIT_MARGIN_PERCENT || margin_percent > MAX_PROFIT_MARGIN_PERCENT {
        return Err("Profit margin must be between 100 and 300 percent");
    }
    Ok(())
}

/// Validate a discount percentage (0 to 100 inclusive)
pub fn validate_discount(discount_percent: Decimal) -> Result<(), &'static str> {
    if discount_percent < Decimal::ZERO || discount_percent > Decimal::ONE_HUNDRED {
        return Err("Discount must be between 0 and 100 percent");
    }
    Ok(())
}

// ============================================================================
// Listing Validations
// ============================================================================

/// Resolve a requested page size against the default and the ceiling
pub fn resolve_list_limit(limit: Option<i64>, default: i64, max: i64) -> Result<i64, &'static str> {
    match limit {
        None => Ok(default),
        Some(l) if l < 1 => Err("Limit must be at least 1"),
        Some(l) if l > max => Err("Limit exceeds the maximum page size"),
        Some(l) => Ok(l),
    }
}

/// Resolve a requested offset
pub fn resolve_offset(offset: Option<i64>) -> Result<i64, &'static str> {
    match offset {
        Some(o) if o < 0 => Err("Offset cannot be negative"),
        Some(o) => Ok(o),
        None => Ok(0),
    }
}

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate a product or category name
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().chars().count() < MIN_NAME_LENGTH {
        return Err("Name must be at least 3 characters");
    }
    Ok(())
}

/// Validate a supplier name
pub fn validate_supplier_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Supplier name is required");
    }
    Ok(())
}

/// Validate the minimum stock level configured on a product
pub fn validate_min_stock(min_stock: i32) -> Result<(), &'static str> {
    if min_stock <= 0 {
        return Err("Minimum stock must be positive");
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}
