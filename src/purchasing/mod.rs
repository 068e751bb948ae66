use thiserror::Error;

pub mod catalog;
pub mod ledger;
pub mod purchase;

#[cfg(test)]
mod purchase_tests;

#[derive(Debug, PartialEq, Error)]
pub enum PurchaseError {
    #[error("article is empty")]
    EmptyArticle,
    #[error("unknown article {0:?}")]
    UnknownArticle(String),
    #[error("quantity must not be negative")]
    NegativeQuantity,
    #[error("unit price must not be negative")]
    NegativeUnitPrice,
}

#[cfg(test)]
fn unique_test_dir(prefix: &str) -> anyhow::Result<std::path::PathBuf> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    let dir = std::env::temp_dir().join(format!("expenses-{prefix}-{nanos}"));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
