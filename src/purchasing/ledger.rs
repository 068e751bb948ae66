use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use csv::ByteRecord;
use log::{debug, warn};
use rust_decimal::Decimal;

use super::purchase::PurchaseRecord;
use crate::data;

/// Purchase history backed by a single CSV file.
///
/// Lines already in the file are written back exactly as read, including the
/// ones that did not parse. Only new purchases are added.
pub struct PurchaseLedger {
    path: PathBuf,
    rows: Vec<ByteRecord>,
    records: Vec<PurchaseRecord>,
    read_error: Option<String>,
}

impl PurchaseLedger {
    pub fn new(path: &Path) -> PurchaseLedger {
        PurchaseLedger {
            path: path.to_path_buf(),
            rows: Vec::new(),
            records: Vec::new(),
            read_error: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[PurchaseRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lines of the file that are kept but not shown as purchases.
    pub fn unparsed(&self) -> usize {
        self.rows.len() - self.records.len()
    }

    /// False when the file exists but could not be read; such a ledger is never saved.
    pub fn is_writable(&self) -> bool {
        self.read_error.is_none()
    }

    pub fn total_spent(&self) -> Decimal {
        self.records.iter().map(|record| record.total()).sum()
    }

    /// Appends the record and rewrites the ledger file in full. The record is
    /// kept in memory even if the write fails.
    pub fn append_and_save(&mut self, record: PurchaseRecord) -> Result<()> {
        if let Some(err) = &self.read_error {
            bail!(
                "refusing to overwrite {}, it could not be read: {}",
                self.path.display(),
                err
            );
        }

        self.rows.push(data::purchase_row(&record));
        self.records.push(record);
        data::write_ledger_csv(&self.path, &self.rows)?;

        debug!("saved purchase, ledger_size={}", self.rows.len());

        Ok(())
    }
}

/// Loads the ledger at `path`. A missing file yields an empty ledger; an
/// unreadable one yields an empty ledger that refuses to save.
pub fn read_ledger(path: &Path) -> PurchaseLedger {
    let mut ledger = PurchaseLedger::new(path);
    if !path.exists() {
        debug!("no ledger at {}, starting empty", path.display());
        return ledger;
    }

    match data::read_ledger_csv(path) {
        Ok(contents) => {
            ledger.rows = contents.rows;
            ledger.records = contents.records;
        },
        Err(err) => {
            warn!("failed to read ledger, path={}, err={:#}", path.display(), err);
            ledger.read_error = Some(format!("{err:#}"));
        },
    }

    ledger
}
