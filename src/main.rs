use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use log::info;
use rust_decimal::Decimal;

use expenses::config::Settings;
use expenses::purchasing::catalog::{Catalog, CatalogCache};
use expenses::purchasing::ledger::{read_ledger, PurchaseLedger};
use expenses::purchasing::purchase::PurchaseRecord;

const USAGE: &str = "Usage: expenses catalog\n       expenses add <article> <quantity> [unit_price] [YYYY-MM-DD]\n       expenses history";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let settings = Settings::from_env();
    let mut catalogs = CatalogCache::new();

    match args.get(1).map(String::as_str) {
        Some("catalog") if args.len() == 2 => print_catalog(catalogs.load(&settings.catalog_path)),
        Some("add") if (4..=6).contains(&args.len()) => {
            let catalog = catalogs.load(&settings.catalog_path);
            let record = purchase_from_args(catalog, &args[2..])?;
            let mut ledger = read_ledger(&settings.ledger_path);
            let total = record.total();
            ledger.append_and_save(record)?;
            info!("purchase saved to {}", ledger.path().display());
            println!("Total: {:.2} {}", total, settings.currency);
        },
        Some("history") if args.len() == 2 => print_history(&read_ledger(&settings.ledger_path), &settings.currency),
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        },
    }

    Ok(())
}

fn purchase_from_args(catalog: &Catalog, args: &[String]) -> Result<PurchaseRecord> {
    let quantity = Decimal::from_str(&args[1]).with_context(|| format!("invalid quantity {:?}", args[1]))?;
    let unit_price = match args.get(2) {
        Some(price) => Some(Decimal::from_str(price).with_context(|| format!("invalid unit price {:?}", price))?),
        None => None,
    };
    let date = match args.get(3) {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d").with_context(|| format!("invalid date {:?}", date))?,
        None => Local::now().date_naive(),
    };

    catalog
        .purchase(date, &args[0], quantity, unit_price)
        .context("see `expenses catalog` for known articles")
}

fn print_catalog(catalog: &Catalog) {
    if catalog.is_empty() {
        println!("Catalog is empty.");
        return;
    }

    for category in catalog.categories() {
        println!("{category}");
        for entry in catalog.entries().iter().filter(|entry| entry.category == category) {
            let price = entry.unit_price.map(|p| format!("{p:.2}")).unwrap_or_default();
            if entry.subcategory.is_empty() {
                println!("  {:<30} {:>10}", entry.article, price);
            } else {
                println!("  {:<30} {:>10}  ({})", entry.article, price, entry.subcategory);
            }
        }
    }
}

fn print_history(ledger: &PurchaseLedger, currency: &str) {
    if ledger.is_empty() {
        println!("No purchases yet.");
        return;
    }

    println!(
        "{:<10}  {:<24} {:<16} {:<16} {:>8} {:>10} {:>10}",
        "Date", "Article", "Category", "Subcategory", "Quantity", "UnitPrice", "Total"
    );
    for record in ledger.records() {
        println!(
            "{:<10}  {:<24} {:<16} {:<16} {:>8} {:>10.2} {:>10.2}",
            record.date().to_string(),
            record.article(),
            record.category(),
            record.subcategory(),
            record.quantity().to_string(),
            record.unit_price(),
            record.total()
        );
    }
    println!("Total spent: {:.2} {}", ledger.total_spent(), currency);
    if ledger.unparsed() > 0 {
        println!("({} unreadable lines kept in {})", ledger.unparsed(), ledger.path().display());
    }
}
