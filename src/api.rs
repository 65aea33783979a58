use actix_files::Files;
use actix_web::{HttpResponse, Responder, guard, web};
use log::{error, info};

use crate::error::AppError;
use crate::pipeline::RatePipeline;

/// Routes of the service: the rates API, static files from `static_dir` and a
/// plain-text 404 for everything else, whatever the method.
pub fn configure(cfg: &mut web::ServiceConfig, static_dir: &str) {
    cfg.service(
        web::resource("/api/rates")
            .route(web::get().to(get_rates))
            .default_service(web::to(not_found)),
    )
    .service(
        Files::new("/", static_dir)
            .index_file("index.html")
            .guard(guard::Any(guard::Get()).or(guard::Head()))
            .default_handler(web::to(not_found)),
    )
    .default_service(web::to(not_found));
}

/// Scrapes the latest rates, stores new ones and answers with the whole history.
async fn get_rates(pipeline: web::Data<RatePipeline>) -> Result<impl Responder, AppError> {
    info!("Refreshing exchange rates");
    let rates = pipeline.refresh_and_list().await.map_err(|e| {
        error!("Error processing exchange rates: {}", e);
        e
    })?;

    info!("Returning {} stored rate(s)", rates.len());
    Ok(web::Json(rates))
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/plain; charset=utf-8")
        .body("Page not found")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    use super::*;
    use crate::error::ErrorBody;
    use crate::exchange_rate::ExchangeRate;
    use crate::pipeline::tests::{FailingSource, StaticSource, two_day_page};
    use crate::store::RateStore;

    async fn pipeline(source: Arc<dyn crate::fetcher::RateSource>) -> RatePipeline {
        RatePipeline::new(source, RateStore::in_memory().await.unwrap())
    }

    const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/public");

    macro_rules! app {
        ($pipeline:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($pipeline))
                    .configure(|cfg| configure(cfg, STATIC_DIR)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_get_rates_returns_history() {
        let app = app!(pipeline(Arc::new(StaticSource(two_day_page()))).await);

        let req = test::TestRequest::get().uri("/api/rates").to_request();
        let rates: Vec<ExchangeRate> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rates.len(), 4);
        assert_eq!(rates[0].date, "20-12-2023");
        assert_eq!(rates[0].currency, "USD");
        assert!((rates[0].rate - 134.5).abs() < 1e-9);

        // second call adds nothing
        let req = test::TestRequest::get().uri("/api/rates").to_request();
        let again: Vec<ExchangeRate> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(again, rates);
    }

    #[actix_web::test]
    async fn test_fetch_failure_still_succeeds() {
        let pipeline = pipeline(Arc::new(FailingSource)).await;
        pipeline
            .store()
            .save(
                crate::exchange_rate::Currency::Usd,
                rust_decimal::Decimal::new(1341, 1),
                "05-01-2024",
            )
            .await
            .unwrap();
        let app = app!(pipeline);

        let req = test::TestRequest::get().uri("/api/rates").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let rates: Vec<ExchangeRate> = test::read_body_json(resp).await;
        assert_eq!(rates.len(), 1);
    }

    #[actix_web::test]
    async fn test_storage_failure_is_500_with_message() {
        let pipeline = pipeline(Arc::new(StaticSource(two_day_page()))).await;
        pipeline.store().close().await;
        let app = app!(pipeline);

        let req = test::TestRequest::get().uri("/api/rates").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = test::read_body_json(resp).await;
        assert!(body.error.starts_with("Database error"));
    }

    #[actix_web::test]
    async fn test_unknown_path_is_plain_404() {
        let app = app!(pipeline(Arc::new(FailingSource)).await);

        let req = test::TestRequest::get().uri("/api/unknown").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(test::read_body(resp).await, "Page not found");
    }

    #[actix_web::test]
    async fn test_root_serves_landing_page() {
        let app = app!(pipeline(Arc::new(FailingSource)).await);

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.contains("/api/rates"));
    }

    #[actix_web::test]
    async fn test_other_methods_are_plain_404() {
        let app = app!(pipeline(Arc::new(FailingSource)).await);

        let requests = [
            test::TestRequest::post().uri("/nope"),
            test::TestRequest::post().uri("/api/rates"),
            test::TestRequest::delete().uri("/api/rates"),
            test::TestRequest::put().uri("/"),
            test::TestRequest::get().uri("/nope"),
            test::TestRequest::get().uri("/missing.css"),
        ];
        for req in requests {
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            assert_eq!(test::read_body(resp).await, "Page not found");
        }
    }
}
