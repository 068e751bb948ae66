use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;

use super::purchase::PurchaseRecord;
use super::PurchaseError;
use crate::data::{Sheet, SheetSource};

pub const UNCATEGORIZED: &str = "Uncategorized";

const ARTICLE_ALIASES: [&str; 7] = ["article", "product", "produit", "item", "designation", "désignation", "name"];
const CATEGORY_ALIASES: [&str; 7] = ["category", "categorie", "catégorie", "family", "famille", "group", "groupe"];
const PRICE_ALIASES: [&str; 10] = [
    "price",
    "unit_price",
    "unit-price",
    "unitprice",
    "prix",
    "prix_unitaire",
    "pu",
    "cost",
    "tarif",
    "tariff",
];

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub article: String,
    pub category: String,
    pub subcategory: String,
    pub unit_price: Option<Decimal>,
}

/// Reference list of purchasable articles, unique by article.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Catalog {
        Catalog { entries: Vec::new() }
    }

    /// Builds the canonical catalog from raw sheet rows, the first row being the header.
    pub fn from_rows(rows: &[Vec<String>]) -> Catalog {
        let Some((header, body)) = rows.split_first() else {
            return Catalog::new();
        };

        let columns = ColumnMap::resolve(header);
        debug!("resolved catalog columns {:?}", columns);

        let Some(article_col) = columns.article else {
            return Catalog::new();
        };

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for row in body {
            let article = cell(row, Some(article_col));
            if article.is_empty() || !seen.insert(article.to_string()) {
                continue;
            }

            let category = match cell(row, columns.category) {
                "" => UNCATEGORIZED,
                category => category,
            };

            entries.push(CatalogEntry {
                article: article.to_string(),
                category: category.to_string(),
                subcategory: cell(row, columns.subcategory).to_string(),
                unit_price: parse_price(cell(row, columns.price)),
            });
        }

        Catalog { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, article: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.article == article)
    }

    /// Price to prefill for an article, zero when the catalog has none.
    pub fn suggested_price(&self, article: &str) -> Decimal {
        self.find(article)
            .and_then(|entry| entry.unit_price)
            .unwrap_or(Decimal::ZERO)
    }

    /// Builds a purchase of a catalog article. Category and subcategory come
    /// from the catalog entry; without an explicit unit price the suggested
    /// price is used.
    pub fn purchase(
        &self,
        date: NaiveDate,
        article: &str,
        quantity: Decimal,
        unit_price: Option<Decimal>,
    ) -> Result<PurchaseRecord, PurchaseError> {
        let article = article.trim();
        let Some(entry) = self.find(article) else {
            return Err(PurchaseError::UnknownArticle(article.to_string()));
        };

        PurchaseRecord::new(
            date,
            &entry.article,
            &entry.category,
            &entry.subcategory,
            quantity,
            unit_price.unwrap_or_else(|| self.suggested_price(article)),
        )
    }

    pub fn categories(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn subcategories(&self, category: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.category == category && !entry.subcategory.is_empty())
            .map(|entry| entry.subcategory.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Column index of each logical field in a catalog sheet.
#[derive(Debug, Default, PartialEq)]
struct ColumnMap {
    article: Option<usize>,
    category: Option<usize>,
    subcategory: Option<usize>,
    price: Option<usize>,
}

impl ColumnMap {
    fn resolve(header: &[String]) -> ColumnMap {
        let names: Vec<String> = header.iter().map(|name| name.trim().to_lowercase()).collect();
        let position = |aliases: &[&str]| names.iter().position(|name| aliases.contains(&name.as_str()));

        // Falls back to the first column when nothing looks like an article.
        let article = position(&ARTICLE_ALIASES[..]).or(if names.is_empty() { None } else { Some(0) });

        ColumnMap {
            article,
            category: position(&CATEGORY_ALIASES[..]),
            subcategory: names
                .iter()
                .position(|name| name.contains("cat") && (name.contains("sub") || name.contains("sous"))),
            price: position(&PRICE_ALIASES[..]),
        }
    }
}

fn cell(row: &[String], column: Option<usize>) -> &str {
    column
        .and_then(|index| row.get(index))
        .map(|value| value.trim())
        .unwrap_or("")
}

fn parse_price(value: &str) -> Option<Decimal> {
    if value.is_empty() {
        return None;
    }

    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// Reads and normalizes the catalog at `path`. Any read failure yields an empty catalog.
pub fn load_catalog(path: &Path) -> Catalog {
    match Sheet::for_path(path).read_rows() {
        Ok(rows) => {
            let catalog = Catalog::from_rows(&rows);
            debug!("loaded {} catalog entries from {}", catalog.len(), path.display());
            catalog
        },
        Err(err) => {
            warn!("failed to load catalog, path={}, err={:#}", path.display(), err);
            Catalog::new()
        },
    }
}

/// Catalogs loaded so far, keyed by path, kept for the life of the process.
#[derive(Default)]
pub struct CatalogCache {
    catalogs: HashMap<PathBuf, Catalog>,
}

impl CatalogCache {
    pub fn new() -> CatalogCache {
        CatalogCache {
            catalogs: HashMap::new(),
        }
    }

    pub fn load(&mut self, path: &Path) -> &Catalog {
        self.catalogs.entry(path.to_path_buf()).or_insert_with(|| load_catalog(path))
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}
