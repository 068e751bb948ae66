use chrono::NaiveDate;
use getset::{CopyGetters, Getters};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::PurchaseError;

/// A single grocery purchase. Records are immutable once created; the total is
/// always derived from quantity and unit price.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct PurchaseRecord {
    #[getset(get_copy = "pub")]
    date: NaiveDate,
    #[getset(get = "pub")]
    article: String,
    #[getset(get = "pub")]
    category: String,
    #[getset(get = "pub")]
    subcategory: String,
    #[getset(get_copy = "pub")]
    quantity: Decimal,
    #[getset(get_copy = "pub")]
    unit_price: Decimal,
    #[getset(get_copy = "pub")]
    total: Decimal,
}

impl PurchaseRecord {
    pub fn new(
        date: NaiveDate,
        article: &str,
        category: &str,
        subcategory: &str,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<PurchaseRecord, PurchaseError> {
        let article = article.trim();
        if article.is_empty() {
            return Err(PurchaseError::EmptyArticle);
        }

        if quantity < dec!(0) {
            return Err(PurchaseError::NegativeQuantity);
        }

        if unit_price < dec!(0) {
            return Err(PurchaseError::NegativeUnitPrice);
        }

        Ok(PurchaseRecord {
            date,
            article: article.to_string(),
            category: category.trim().to_string(),
            subcategory: subcategory.trim().to_string(),
            quantity,
            unit_price,
            total: quantity * unit_price,
        })
    }
}
