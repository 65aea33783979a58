//! Extraction of daily rates from the "taux de change journalier" page.
//!
//! The page renders one `<table>` per day under `#organizTable`. The date sits
//! in the header cell and the first two body rows hold USD then EUR. Depending
//! on the day the value is in the second column or, when that one is blank,
//! in the first.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use log::debug;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::exchange_rate::Currency;

pub const DATE_FORMAT: &str = "%d-%m-%Y";

const TABLE_SELECTOR: &str = "#organizTable > table";
const HEADER_SELECTOR: &str = "thead th";
const ROW_SELECTOR: &str = "tbody > tr";

/// USD and EUR rates scraped for one business day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRates {
    pub date: String,
    pub usd: Decimal,
    pub eur: Decimal,
}

impl DailyRates {
    pub fn rate(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Usd => self.usd,
            Currency::Eur => self.eur,
        }
    }
}

pub fn parse_rates(html: &str) -> Result<Vec<DailyRates>> {
    let table_selector = selector(TABLE_SELECTOR)?;
    let header_selector = selector(HEADER_SELECTOR)?;
    let row_selector = selector(ROW_SELECTOR)?;

    let document = Html::parse_document(html);
    let mut rates = Vec::new();

    for (index, table) in document.select(&table_selector).enumerate() {
        let date: String = table
            .select(&header_selector)
            .flat_map(|th| th.text())
            .collect();
        let date = date.trim();
        debug!("Table #{}: date {:?}", index + 1, date);

        match NaiveDate::parse_from_str(date, DATE_FORMAT) {
            Ok(day) if is_weekend(day) => {
                debug!("Skipping {} (weekend)", date);
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                debug!("Skipping table #{}: bad date {:?}: {}", index + 1, date, e);
                continue;
            }
        }

        let rows: Vec<ElementRef> = table.select(&row_selector).take(2).collect();
        let usd = rows.first().and_then(|row| cell_value(*row));
        let eur = rows.get(1).and_then(|row| cell_value(*row));
        debug!("Rates for {}: USD {:?}, EUR {:?}", date, usd, eur);

        let (Some(usd), Some(eur)) = (usd, eur) else {
            debug!("Missing USD or EUR rate for {}, skipping", date);
            continue;
        };

        match (parse_rate(&usd), parse_rate(&eur)) {
            (Some(usd), Some(eur)) => rates.push(DailyRates {
                date: date.to_string(),
                usd,
                eur,
            }),
            _ => debug!("Unreadable rate for {}: USD {:?}, EUR {:?}", date, usd, eur),
        }
    }

    Ok(rates)
}

pub fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Text of the second cell, or of the first one when the second is blank.
///
/// Cells are counted by element position in the row, so a leading `th`
/// occupies the first slot and is never read as a rate.
fn cell_value(row: ElementRef) -> Option<String> {
    let cells: Vec<ElementRef> = row.children().filter_map(ElementRef::wrap).take(2).collect();
    let td_text = |position: usize| {
        cells
            .get(position)
            .filter(|cell| cell.value().name() == "td")
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .filter(|value| !value.is_empty())
    };

    td_text(1).or_else(|| td_text(0))
}

fn parse_rate(raw: &str) -> Option<Decimal> {
    let normalized = normalize_decimal_string(raw);
    Decimal::from_str(&normalized)
        .ok()
        .filter(|rate| rate.is_sign_positive() && !rate.is_zero())
}

fn normalize_decimal_string(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .replace(',', ".")
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| AppError::Parse(format!("selector {css:?}: {e}")))
}
