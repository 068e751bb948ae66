use anyhow::Result;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::catalog::{Catalog, UNCATEGORIZED};
use super::purchase::PurchaseRecord;
use super::PurchaseError;

fn may_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn catalog() -> Catalog {
    let rows: Vec<Vec<String>> = [
        ["Produit", "Catégorie", "Sous-catégorie", "Prix"],
        ["Lait", "Frais", "Laitier", "7.5"],
        ["Sel", "", "", ""],
    ]
    .iter()
    .map(|row| row.iter().map(|cell| cell.to_string()).collect())
    .collect();

    Catalog::from_rows(&rows)
}

#[test]
fn test_total_is_quantity_times_unit_price() -> Result<()> {
    let record = PurchaseRecord::new(may_first(), "Lait", "Frais", "Laitier", dec!(3), dec!(2.5))?;

    assert_eq!(record.total(), dec!(7.5));
    assert_eq!(record.quantity(), dec!(3));
    assert_eq!(record.unit_price(), dec!(2.5));

    Ok(())
}

#[test]
fn test_zero_amounts_are_allowed() -> Result<()> {
    let record = PurchaseRecord::new(may_first(), "Sac", "", "", dec!(0), dec!(0))?;

    assert_eq!(record.total(), dec!(0));

    Ok(())
}

#[test]
fn test_invalid_purchases() {
    let cases = [
        ("  ", dec!(1), dec!(1), PurchaseError::EmptyArticle),
        ("Lait", dec!(-1), dec!(1), PurchaseError::NegativeQuantity),
        ("Lait", dec!(1), dec!(-0.5), PurchaseError::NegativeUnitPrice),
    ];

    for (article, quantity, unit_price, expected) in cases {
        let result = PurchaseRecord::new(may_first(), article, "", "", quantity, unit_price);
        assert_eq!(result, Err(expected));
    }
}

#[test]
fn test_record_fields_are_trimmed() -> Result<()> {
    let record = PurchaseRecord::new(may_first(), " Lait ", " Frais", "Laitier ", dec!(1), dec!(1))?;

    assert_eq!(record.article(), "Lait");
    assert_eq!(record.category(), "Frais");
    assert_eq!(record.subcategory(), "Laitier");

    Ok(())
}

#[test]
fn test_catalog_purchase_takes_entry_classification() -> Result<()> {
    let record = catalog().purchase(may_first(), " Lait ", dec!(2), None)?;

    assert_eq!(record.article(), "Lait");
    assert_eq!(record.category(), "Frais");
    assert_eq!(record.subcategory(), "Laitier");
    assert_eq!(record.unit_price(), dec!(7.5));
    assert_eq!(record.total(), dec!(15));

    Ok(())
}

#[test]
fn test_catalog_purchase_explicit_price_wins() -> Result<()> {
    let record = catalog().purchase(may_first(), "Lait", dec!(3), Some(dec!(2.5)))?;

    assert_eq!(record.unit_price(), dec!(2.5));
    assert_eq!(record.total(), dec!(7.5));

    Ok(())
}

#[test]
fn test_catalog_purchase_without_price_defaults_to_zero() -> Result<()> {
    let record = catalog().purchase(may_first(), "Sel", dec!(1), None)?;

    assert_eq!(record.category(), UNCATEGORIZED);
    assert_eq!(record.subcategory(), "");
    assert_eq!(record.unit_price(), Decimal::ZERO);

    Ok(())
}

#[test]
fn test_catalog_purchase_rejects_unknown_article() {
    let result = catalog().purchase(may_first(), "Caviar", dec!(1), Some(dec!(100)));

    assert_eq!(result, Err(PurchaseError::UnknownArticle("Caviar".to_string())));
}

#[test]
fn test_catalog_purchase_rejects_negative_quantity() {
    let result = catalog().purchase(may_first(), "Lait", dec!(-2), None);

    assert_eq!(result, Err(PurchaseError::NegativeQuantity));
}
