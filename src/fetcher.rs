use async_trait::async_trait;
use log::info;
use reqwest::Client;

use crate::error::{AppError, Result};

pub const BANK_OF_ALGERIA_URL: &str = "https://www.bank-of-algeria.dz/taux-de-change-journalier/";

/// Where the daily rates page comes from.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Raw HTML of the rates page.
    async fn fetch_page(&self) -> Result<String>;
}

pub struct HttpRateSource {
    client: Client,
    url: String,
}

impl HttpRateSource {
    /// The bank's certificate chain doesn't validate, so certificate checks are
    /// disabled for this client. It must only be pointed at that host.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch_page(&self) -> Result<String> {
        info!("Fetching exchange rates from {}", self.url);
        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(AppError::Status(resp.status()));
        }

        let text = resp.text().await?;
        info!("Fetched {} bytes", text.len());

        Ok(text)
    }
}
