//! Pricing engine.
//!
//! Rental prices are per day: every line is `unit_price * quantity * day_count`.
//! All arithmetic is exact `Decimal`; rounding happens only in `format`.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::config::BusinessConfig;

use super::model::{DocumentData, LineItem};

/// Highest accepted daily price for one unit.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);
/// Highest accepted quantity per line.
pub const MAX_QUANTITY: i64 = 9_999;
/// Highest accepted rental length in days.
pub const MAX_DAY_COUNT: i64 = 3_650;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("day count must be at least 1, got {0}")]
    InvalidDayCount(i64),
    #[error("day count exceeds the maximum of {max}, got {0}", max = MAX_DAY_COUNT)]
    DayCountTooLarge(i64),
    #[error("line item '{name}' has a negative unit price ({price})")]
    NegativeUnitPrice { index: usize, name: String, price: Decimal },
    #[error("line item '{name}' exceeds the maximum unit price of {max}, got {price}", max = MAX_UNIT_PRICE)]
    UnitPriceTooLarge { index: usize, name: String, price: Decimal },
    #[error("line item '{name}' must have a quantity of at least 1, got {quantity}")]
    InvalidQuantity { index: usize, name: String, quantity: i64 },
    #[error("line item '{name}' exceeds the maximum quantity of {max}, got {quantity}", max = MAX_QUANTITY)]
    QuantityTooLarge { index: usize, name: String, quantity: i64 },
    #[error("amounts are too large to compute")]
    Overflow,
    #[error("discount must not be negative, got {0}")]
    NegativeDiscount(Decimal),
    #[error("discount ({discount}) exceeds the products subtotal ({subtotal})")]
    DiscountExceedsSubtotal { discount: Decimal, subtotal: Decimal },
}

impl CalculationError {
    /// Input field the error refers to, in request notation.
    pub fn field(&self) -> String {
        match self {
            Self::InvalidDayCount(_) | Self::DayCountTooLarge(_) => "project.dayCount".to_string(),
            Self::NegativeUnitPrice { index, .. } | Self::UnitPriceTooLarge { index, .. } => {
                format!("lineItems[{index}].unitPrice")
            }
            Self::InvalidQuantity { index, .. } | Self::QuantityTooLarge { index, .. } => {
                format!("lineItems[{index}].quantity")
            }
            Self::Overflow => "lineItems".to_string(),
            Self::NegativeDiscount(_) | Self::DiscountExceedsSubtotal { .. } => {
                "coupon.discountAmount".to_string()
            }
        }
    }
}

/// Pricing breakdown. Only constructible through `PricingEngine`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    subtotal: Decimal,
    discount: Decimal,
    discounted_subtotal: Decimal,
    tax: Decimal,
    total: Decimal,
    deposit: Decimal,
    balance: Decimal,
}

impl Totals {
    /// Products subtotal before any discount.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn discounted_subtotal(&self) -> Decimal {
        self.discounted_subtotal
    }

    pub fn tax(&self) -> Decimal {
        self.tax
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Share due at booking confirmation.
    pub fn deposit(&self) -> Decimal {
        self.deposit
    }

    /// Remainder due at handover.
    pub fn balance(&self) -> Decimal {
        self.balance
    }
}

/// Per-row amounts shown in the line item table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowBreakdown {
    pub net: Decimal,
    pub tax: Decimal,
    pub gross: Decimal,
}

/// Stateless calculator parameterised by the business rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingEngine {
    tax_rate: Decimal,
    deposit_rate: Decimal,
}

impl PricingEngine {
    pub fn new(tax_rate: Decimal, deposit_rate: Decimal) -> Self {
        Self {
            tax_rate,
            deposit_rate,
        }
    }

    pub fn from_config(config: &BusinessConfig) -> Self {
        Self::new(config.tax_rate, config.deposit_rate)
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    pub fn deposit_rate(&self) -> Decimal {
        self.deposit_rate
    }

    /// Full breakdown with a flat discount subtracted before tax.
    pub fn compute_totals(
        &self,
        line_items: &[LineItem],
        day_count: i64,
        discount: Decimal,
    ) -> Result<Totals, CalculationError> {
        if discount < Decimal::ZERO {
            return Err(CalculationError::NegativeDiscount(discount));
        }
        let subtotal = products_subtotal(line_items, day_count)?;
        if discount > subtotal {
            return Err(CalculationError::DiscountExceedsSubtotal { discount, subtotal });
        }
        self.finish(subtotal, discount)
    }

    /// Breakdown without the discount step, for pre-discount figures.
    pub fn compute_totals_products_only(
        &self,
        line_items: &[LineItem],
        day_count: i64,
    ) -> Result<Totals, CalculationError> {
        let subtotal = products_subtotal(line_items, day_count)?;
        self.finish(subtotal, Decimal::ZERO)
    }

    /// Net, tax and gross for a single table row.
    pub fn row_breakdown(&self, item: &LineItem, day_count: i64) -> Result<RowBreakdown, CalculationError> {
        let net = line_net(item, day_count)?;
        let tax = net.checked_mul(self.tax_rate).ok_or(CalculationError::Overflow)?;
        let gross = net.checked_add(tax).ok_or(CalculationError::Overflow)?;
        Ok(RowBreakdown { net, tax, gross })
    }

    fn finish(&self, subtotal: Decimal, discount: Decimal) -> Result<Totals, CalculationError> {
        let discounted_subtotal = subtotal - discount;
        let tax = discounted_subtotal
            .checked_mul(self.tax_rate)
            .ok_or(CalculationError::Overflow)?;
        let total = discounted_subtotal.checked_add(tax).ok_or(CalculationError::Overflow)?;
        let deposit = total.checked_mul(self.deposit_rate).ok_or(CalculationError::Overflow)?;
        Ok(Totals {
            subtotal,
            discount,
            discounted_subtotal,
            tax,
            total,
            deposit,
            balance: total - deposit,
        })
    }
}

fn products_subtotal(line_items: &[LineItem], day_count: i64) -> Result<Decimal, CalculationError> {
    check_day_count(day_count)?;

    let mut subtotal = Decimal::ZERO;
    for (index, item) in line_items.iter().enumerate() {
        check_item(index, item)?;
        subtotal = subtotal
            .checked_add(line_net(item, day_count)?)
            .ok_or(CalculationError::Overflow)?;
    }
    Ok(subtotal)
}

fn check_day_count(day_count: i64) -> Result<(), CalculationError> {
    if day_count < 1 {
        return Err(CalculationError::InvalidDayCount(day_count));
    }
    if day_count > MAX_DAY_COUNT {
        return Err(CalculationError::DayCountTooLarge(day_count));
    }
    Ok(())
}

fn check_item(index: usize, item: &LineItem) -> Result<(), CalculationError> {
    if item.unit_price < Decimal::ZERO {
        return Err(CalculationError::NegativeUnitPrice {
            index,
            name: item.name.clone(),
            price: item.unit_price,
        });
    }
    if item.unit_price > MAX_UNIT_PRICE {
        return Err(CalculationError::UnitPriceTooLarge {
            index,
            name: item.name.clone(),
            price: item.unit_price,
        });
    }
    if item.quantity < 1 {
        return Err(CalculationError::InvalidQuantity {
            index,
            name: item.name.clone(),
            quantity: item.quantity,
        });
    }
    if item.quantity > MAX_QUANTITY {
        return Err(CalculationError::QuantityTooLarge {
            index,
            name: item.name.clone(),
            quantity: item.quantity,
        });
    }
    Ok(())
}

/// `unit_price * quantity * day_count` without panicking on overflow.
pub fn line_net(item: &LineItem, day_count: i64) -> Result<Decimal, CalculationError> {
    item.unit_price
        .checked_mul(Decimal::from(item.quantity))
        .and_then(|amount| amount.checked_mul(Decimal::from(day_count)))
        .ok_or(CalculationError::Overflow)
}

/// Document data paired with the totals derived from it.
///
/// This is the only value the layout stage accepts, which keeps the printed
/// breakdown tied to the line items it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedDocument {
    data: DocumentData,
    totals: Totals,
    products_only: Totals,
    rows: Vec<RowBreakdown>,
    engine: PricingEngine,
}

impl PricedDocument {
    pub fn new(data: DocumentData, engine: &PricingEngine) -> Result<Self, CalculationError> {
        let day_count = data.project.day_count;
        let totals = engine.compute_totals(&data.line_items, day_count, data.discount())?;
        let products_only = engine.compute_totals_products_only(&data.line_items, day_count)?;
        let rows = data
            .line_items
            .iter()
            .map(|item| engine.row_breakdown(item, day_count))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            data,
            totals,
            products_only,
            rows,
            engine: *engine,
        })
    }

    pub fn data(&self) -> &DocumentData {
        &self.data
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Pre-discount figures derived from the same line items.
    pub fn products_only(&self) -> &Totals {
        &self.products_only
    }

    /// Table amounts, one per line item, in line item order.
    pub fn rows(&self) -> &[RowBreakdown] {
        &self.rows
    }

    /// Engine the totals were computed with; table rows must use the same rates.
    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    /// A discount row is shown only for a coupon with a positive amount.
    pub fn has_discount(&self) -> bool {
        self.data.coupon.is_some() && self.totals.discount > Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> PricingEngine {
        PricingEngine::from_config(&BusinessConfig::default())
    }

    fn item(price: i64, quantity: i64) -> LineItem {
        LineItem {
            name: "Kit de luces".to_string(),
            sku: None,
            unit_price: Decimal::from(price),
            quantity,
        }
    }

    #[test]
    fn test_scenario_without_discount() {
        let totals = engine().compute_totals(&[item(10000, 2)], 3, Decimal::ZERO).unwrap();
        assert_eq!(totals.subtotal(), Decimal::from(60000));
        assert_eq!(totals.tax(), Decimal::from(11400));
        assert_eq!(totals.total(), Decimal::from(71400));
        assert_eq!(totals.deposit(), Decimal::from(17850));
        assert_eq!(totals.balance(), Decimal::from(53550));
    }

    #[test]
    fn test_scenario_with_flat_discount() {
        let totals = engine()
            .compute_totals(&[item(10000, 2)], 3, Decimal::from(10000))
            .unwrap();
        assert_eq!(totals.discounted_subtotal(), Decimal::from(50000));
        assert_eq!(totals.tax(), Decimal::from(9500));
        assert_eq!(totals.total(), Decimal::from(59500));
        assert_eq!(totals.deposit(), Decimal::from(14875));
        assert_eq!(totals.balance(), Decimal::from(44625));
    }

    #[test]
    fn test_deposit_and_balance_add_up() {
        let items = [item(12990, 3), item(4550, 1), item(333, 7)];
        for days in 1..=10 {
            let totals = engine().compute_totals(&items, days, Decimal::from(1234)).unwrap();
            assert_eq!(totals.deposit() + totals.balance(), totals.total());
            assert_eq!(
                totals.total(),
                (totals.subtotal() - totals.discount()) * Decimal::new(119, 2)
            );
        }
    }

    #[test]
    fn test_products_only_matches_zero_discount_subtotal() {
        let items = [item(12990, 3), item(4550, 1)];
        let products_only = engine().compute_totals_products_only(&items, 4).unwrap();
        let zero_discount = engine().compute_totals(&items, 4, Decimal::ZERO).unwrap();
        assert_eq!(products_only.subtotal(), zero_discount.subtotal());
        assert_eq!(products_only, zero_discount);
    }

    #[test]
    fn test_rows_sum_to_products_totals() {
        let items = [item(12990, 3), item(4550, 1), item(333, 7)];
        let engine = engine();
        let totals = engine.compute_totals_products_only(&items, 5).unwrap();
        let rows: Vec<_> = items.iter().map(|i| engine.row_breakdown(i, 5).unwrap()).collect();
        let net: Decimal = rows.iter().map(|r| r.net).sum();
        let tax: Decimal = rows.iter().map(|r| r.tax).sum();
        assert_eq!(net, totals.subtotal());
        assert_eq!(tax, totals.tax());
    }

    #[test]
    fn test_rejects_bad_input() {
        let engine = engine();
        assert_eq!(
            engine.compute_totals(&[item(100, 1)], 0, Decimal::ZERO),
            Err(CalculationError::InvalidDayCount(0))
        );
        assert!(matches!(
            engine.compute_totals(&[item(-1, 1)], 1, Decimal::ZERO),
            Err(CalculationError::NegativeUnitPrice { index: 0, .. })
        ));
        assert!(matches!(
            engine.compute_totals(&[item(100, 1), item(100, 0)], 1, Decimal::ZERO),
            Err(CalculationError::InvalidQuantity { index: 1, .. })
        ));
        assert_eq!(
            engine.compute_totals(&[item(100, 1)], 1, Decimal::from(-5)),
            Err(CalculationError::NegativeDiscount(Decimal::from(-5)))
        );
        assert!(matches!(
            engine.compute_totals(&[item(100, 1)], 1, Decimal::from(101)),
            Err(CalculationError::DiscountExceedsSubtotal { .. })
        ));
    }

    #[test]
    fn test_oversized_inputs_are_rejected_not_panicking() {
        let engine = engine();
        let huge = LineItem {
            name: "Grúa".to_string(),
            sku: None,
            unit_price: Decimal::from(100_000_000_000_000_000i64),
            quantity: 1_000_000_000,
        };
        assert!(matches!(
            engine.compute_totals(&[huge.clone()], 1_000_000, Decimal::ZERO),
            Err(CalculationError::DayCountTooLarge(1_000_000))
        ));
        assert!(matches!(
            engine.compute_totals(&[huge.clone()], 3, Decimal::ZERO),
            Err(CalculationError::UnitPriceTooLarge { index: 0, .. })
        ));
        assert!(matches!(
            engine.compute_totals(&[item(100, MAX_QUANTITY + 1)], 3, Decimal::ZERO),
            Err(CalculationError::QuantityTooLarge { index: 0, .. })
        ));
        assert_eq!(
            engine.row_breakdown(&huge, 1_000_000),
            Err(CalculationError::Overflow)
        );
    }

    #[test]
    fn test_largest_accepted_line_is_computed() {
        let item = LineItem {
            name: "Set completo".to_string(),
            sku: None,
            unit_price: MAX_UNIT_PRICE,
            quantity: MAX_QUANTITY,
        };
        let totals = engine()
            .compute_totals(&[item.clone(), item], MAX_DAY_COUNT, Decimal::ZERO)
            .unwrap();
        assert_eq!(
            totals.subtotal(),
            MAX_UNIT_PRICE * Decimal::from(MAX_QUANTITY) * Decimal::from(MAX_DAY_COUNT) * Decimal::from(2)
        );
    }

    #[test]
    fn test_empty_items_yield_zero() {
        let totals = engine().compute_totals(&[], 2, Decimal::ZERO).unwrap();
        assert_eq!(totals.total(), Decimal::ZERO);
    }
}
