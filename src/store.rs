use std::str::FromStr;

use log::info;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::{AppError, Result};
use crate::exchange_rate::{Currency, ExchangeRate};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS exchange_rate (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    currency TEXT NOT NULL,
    rate REAL NOT NULL,
    date TEXT NOT NULL
)";

/// Append-only history of scraped rates.
#[derive(Debug, Clone)]
pub struct RateStore {
    pool: SqlitePool,
}

impl RateStore {
    /// Opens (creating if needed) the database at `database_url` and makes sure
    /// the table exists.
    pub async fn open(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        info!("Opened rate store at {}", database_url);
        Ok(store)
    }

    /// Every connection to `:memory:` is its own database, so the pool is kept
    /// at a single connection that never expires.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn record_exists(&self, date: &str, currency: Currency) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM exchange_rate WHERE date = ? AND currency = ? LIMIT 1")
            .bind(date)
            .bind(currency.code())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Inserts a rate and returns its id.
    pub async fn save(&self, currency: Currency, rate: Decimal, date: &str) -> Result<i64> {
        let value = rate.to_f64().ok_or(AppError::Rate(rate))?;
        let id = sqlx::query("INSERT INTO exchange_rate (currency, rate, date) VALUES (?, ?, ?)")
            .bind(currency.code())
            .bind(value)
            .bind(date)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        info!("Saved {} rate {} for {}", currency, rate, date);
        Ok(id)
    }

    /// All records, newest date text first.
    ///
    /// Dates are `DD-MM-YYYY` strings, so the order is by day of month rather
    /// than by calendar.
    pub async fn list_all(&self) -> Result<Vec<ExchangeRate>> {
        let rates = sqlx::query_as::<_, ExchangeRate>(
            "SELECT id, currency, rate, date FROM exchange_rate ORDER BY date DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rates)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
