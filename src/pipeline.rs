use std::sync::Arc;

use log::{error, info, warn};

use crate::error::Result;
use crate::exchange_rate::{Currency, ExchangeRate};
use crate::fetcher::RateSource;
use crate::parser::{DailyRates, parse_rates};
use crate::store::RateStore;

/// Outcome of one scrape-and-persist pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Fetch, parse, dedupe and persist, run once per API call.
#[derive(Clone)]
pub struct RatePipeline {
    source: Arc<dyn RateSource>,
    store: RateStore,
}

impl RatePipeline {
    pub fn new(source: Arc<dyn RateSource>, store: RateStore) -> Self {
        Self { source, store }
    }

    pub fn store(&self) -> &RateStore {
        &self.store
    }

    /// Scraped business days, or nothing when the page can't be fetched or read.
    pub async fn fetch_entries(&self) -> Vec<DailyRates> {
        let html = match self.source.fetch_page().await {
            Ok(html) => html,
            Err(e) => {
                error!("Error fetching exchange rates: {}", e);
                return Vec::new();
            }
        };

        match parse_rates(&html) {
            Ok(entries) => {
                info!("Parsed rates for {} day(s)", entries.len());
                entries
            }
            Err(e) => {
                error!("Error parsing exchange rates: {}", e);
                Vec::new()
            }
        }
    }

    /// A failed lookup counts as missing, so the rate gets written again.
    pub async fn rate_exists(&self, date: &str, currency: Currency) -> bool {
        match self.store.record_exists(date, currency).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!("Error checking {} rate for {}: {}", currency, date, e);
                false
            }
        }
    }

    /// Saves every scraped rate not stored yet. The first failed insert stops
    /// the pass.
    pub async fn sync(&self) -> Result<SyncReport> {
        let entries = self.fetch_entries().await;
        if entries.is_empty() {
            info!("No rates found");
        }

        let mut report = SyncReport::default();
        for entry in &entries {
            for currency in Currency::ALL {
                if self.rate_exists(&entry.date, currency).await {
                    report.skipped += 1;
                    continue;
                }
                self.store
                    .save(currency, entry.rate(currency), &entry.date)
                    .await?;
                report.inserted += 1;
            }
        }

        info!(
            "Sync done: {} inserted, {} already stored",
            report.inserted, report.skipped
        );
        Ok(report)
    }

    pub async fn refresh_and_list(&self) -> Result<Vec<ExchangeRate>> {
        self.sync().await?;
        self.store.list_all().await
    }
}
