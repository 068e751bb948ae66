use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use csv::ByteRecord;
use enum_dispatch::enum_dispatch;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{de::Error, Deserialize, Deserializer};

use crate::purchasing::purchase::PurchaseRecord;
use crate::purchasing::PurchaseError;

pub const LEDGER_COLUMNS: [&str; 7] = [
    "Date",
    "Article",
    "Category",
    "Subcategory",
    "Quantity",
    "UnitPrice",
    "Total",
];

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[enum_dispatch]
pub trait SheetSource {
    /// Every row of the sheet, header row included, as trimmed text cells.
    fn read_rows(&self) -> Result<Vec<Vec<String>>>;
}

#[enum_dispatch(SheetSource)]
pub enum Sheet {
    WorkbookSheet,
    CsvSheet,
}

impl Sheet {
    /// `.csv` files go through the csv reader, anything else is treated as a workbook.
    pub fn for_path(path: &Path) -> Sheet {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv {
            Sheet::CsvSheet(CsvSheet::new(path))
        } else {
            Sheet::WorkbookSheet(WorkbookSheet::new(path))
        }
    }
}

/// First worksheet of an xlsx/xlsm/xlsb/xls/ods workbook.
pub struct WorkbookSheet {
    path: PathBuf,
}

impl WorkbookSheet {
    pub fn new(path: &Path) -> WorkbookSheet {
        WorkbookSheet { path: path.to_path_buf() }
    }
}

impl SheetSource for WorkbookSheet {
    fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        let mut workbook = open_workbook_auto(&self.path)
            .with_context(|| format!("failed to open workbook: {}", self.path.display()))?;
        let range = workbook
            .worksheet_range_at(0)
            .with_context(|| format!("workbook has no sheet: {}", self.path.display()))?
            .with_context(|| format!("failed to read first sheet: {}", self.path.display()))?;

        Ok(range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }
}

pub struct CsvSheet {
    path: PathBuf,
}

impl CsvSheet {
    pub fn new(path: &Path) -> CsvSheet {
        CsvSheet { path: path.to_path_buf() }
    }
}

impl SheetSource for CsvSheet {
    fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .with_context(|| format!("failed to open csv: {}", self.path.display()))?;

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.with_context(|| format!("failed to read csv: {}", self.path.display()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(rows)
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.trim().to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(v) => format!("{v:?}"),
        Data::Empty => String::new(),
    }
}

/// One line of the purchase ledger file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LedgerRow {
    #[serde(deserialize_with = "date_from_string")]
    pub date: NaiveDate,
    pub article: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub total: Option<Decimal>,
}

pub fn date_from_string<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let s = s.trim();

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT).map(|dt| dt.date()))
        .map_err(|err| D::Error::custom(format!("invalid date {s:?}: {err}")))
}

/// The in-memory total is derived again from quantity and unit price; the
/// stored text is left untouched in the file.
impl TryFrom<LedgerRow> for PurchaseRecord {
    type Error = PurchaseError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        PurchaseRecord::new(
            row.date,
            &row.article,
            &row.category,
            &row.subcategory,
            row.quantity,
            row.unit_price,
        )
    }
}

/// Ledger file contents. `rows` holds every data line exactly as read, in file
/// order, whether or not it parsed; `records` holds the lines that did.
#[derive(Debug, Default)]
pub struct LedgerContents {
    pub rows: Vec<ByteRecord>,
    pub records: Vec<PurchaseRecord>,
}

impl LedgerContents {
    pub fn skipped(&self) -> usize {
        self.rows.len() - self.records.len()
    }
}

fn parse_ledger_row(raw: &ByteRecord, header: &ByteRecord) -> Result<PurchaseRecord> {
    let mut trimmed = raw.clone();
    trimmed.trim();
    let row: LedgerRow = trimmed.deserialize(Some(header))?;

    Ok(row.try_into()?)
}

/// Reads the ledger at `file_path`. Fails when the file cannot be read or its
/// header is not the ledger's, since rewriting such a file would lose data.
pub fn read_ledger_csv(file_path: &Path) -> Result<LedgerContents> {
    let file = File::open(file_path).with_context(|| format!("failed to open ledger: {}", file_path.display()))?;
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let mut header = csv_reader
        .byte_headers()
        .with_context(|| format!("failed to read ledger header: {}", file_path.display()))?
        .clone();
    header.trim();

    let mut contents = LedgerContents::default();
    if header.is_empty() {
        return Ok(contents);
    }

    if !header.iter().eq(LEDGER_COLUMNS.iter().map(|column| column.as_bytes())) {
        bail!(
            "unexpected ledger columns {:?}, expected {:?}",
            header.iter().map(String::from_utf8_lossy).collect::<Vec<_>>(),
            LEDGER_COLUMNS
        );
    }

    for raw in csv_reader.byte_records() {
        let raw = raw.with_context(|| format!("failed to read ledger: {}", file_path.display()))?;
        match parse_ledger_row(&raw, &header) {
            Ok(record) => contents.records.push(record),
            Err(err) => {
                let line = raw.position().map(|pos| pos.line()).unwrap_or_default();
                warn!("keeping unparsable purchase as is, line={}, err={:#}", line, err);
            },
        }
        contents.rows.push(raw);
    }

    debug!(
        "read {} purchases from {}, unparsed={}",
        contents.records.len(),
        file_path.display(),
        contents.skipped()
    );

    Ok(contents)
}

/// The ledger line for a new purchase, in `LEDGER_COLUMNS` order.
pub fn purchase_row(record: &PurchaseRecord) -> ByteRecord {
    ByteRecord::from(vec![
        record.date().format(DATE_FORMAT).to_string(),
        record.article().clone(),
        record.category().clone(),
        record.subcategory().clone(),
        record.quantity().to_string(),
        record.unit_price().to_string(),
        record.total().to_string(),
    ])
}

/// Rewrites the whole ledger file. The header row is always written so an
/// empty ledger keeps its shape.
pub fn write_ledger_csv(file_path: &Path, rows: &[ByteRecord]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(file_path)
        .with_context(|| format!("failed to create ledger: {}", file_path.display()))?;

    csv_writer.write_record(LEDGER_COLUMNS)?;
    for row in rows {
        csv_writer.write_byte_record(row)?;
    }

    csv_writer.flush()?;

    debug!("wrote {} ledger rows to {}", rows.len(), file_path.display());

    Ok(())
}
