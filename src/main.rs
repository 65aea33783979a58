use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use anyhow::Result;
use env_logger::Env;
use log::info;

use config::Config;
use fetcher::HttpRateSource;
use pipeline::RatePipeline;
use store::RateStore;

mod api;
mod config;
mod error;
mod exchange_rate;
mod fetcher;
mod parser;
mod pipeline;
mod store;

#[actix_web::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Ok(path) = dotenv {
        info!("Loaded {}", path.display());
    }

    let config = Config::from_env()?;
    let source = HttpRateSource::new(&config.rates_url)?;
    info!("Scraping rates from {}", source.url());
    let pipeline = RatePipeline::new(
        Arc::new(source),
        RateStore::open(&config.database_url).await?,
    );
    let store = pipeline.store().clone();

    let static_dir = config.static_dir.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(pipeline.clone()))
            .configure(|cfg| api::configure(cfg, &static_dir))
    })
    .bind((config.host.as_str(), config.port))?;

    info!("Backend running at http://localhost:{}", config.port);
    server.run().await?;

    store.close().await;
    info!("Rate store closed");
    Ok(())
}
