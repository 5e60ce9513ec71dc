use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spotlight_core::config::Settings;
use spotlight_core::domain::contract::{validate_and_into_items, FeedRequest, FeedResponse};
use spotlight_core::ranking::{rank, ListingSchedule};
use spotlight_core::time::rotation::RotationClock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    tracing::info!(
        feed_size = settings.feed_size,
        feed_max_size = settings.feed_max_size,
        "loaded settings"
    );

    let state = AppState {
        settings: Arc::new(settings),
    };

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/feed", post(post_feed))
        .route("/rotation", get(get_rotation))
        .route("/listings/:id/schedule", get(get_listing_schedule))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    settings: Arc<Settings>,
}

async fn post_feed(
    State(state): State<AppState>,
    Json(request): Json<FeedRequest>,
) -> Result<Json<FeedResponse>, StatusCode> {
    let k = state
        .settings
        .resolve_feed_size(request.k)
        .map_err(|e| {
            tracing::warn!(error = %e, "rejected feed request");
            StatusCode::BAD_REQUEST
        })?;

    let items = validate_and_into_items(request.items).map_err(|e| {
        tracing::warn!(error = %e, "rejected feed request");
        StatusCode::BAD_REQUEST
    })?;

    // The engine never reads the clock; default `now` is taken here.
    let now = request.now.unwrap_or_else(Utc::now);
    let ranked = rank(items, now, k);

    let response = FeedResponse::new(now, ranked);
    if request.explain {
        return Ok(Json(response.with_breakdowns()));
    }
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct RotationQuery {
    now: Option<DateTime<Utc>>,
}

async fn get_rotation(Query(query): Query<RotationQuery>) -> Json<RotationClock> {
    let now = query.now.unwrap_or_else(Utc::now);
    Json(RotationClock::at(now))
}

#[derive(Debug, Deserialize)]
struct ScheduleQuery {
    date: Option<NaiveDate>,
}

async fn get_listing_schedule(
    Path(id): Path<String>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ListingSchedule>, StatusCode> {
    let id = id.trim();
    if id.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    Ok(Json(ListingSchedule::for_date(id, date)))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(feed_max_size: usize) -> AppState {
        AppState {
            settings: Arc::new(Settings {
                feed_max_size,
                ..Settings::default()
            }),
        }
    }

    fn request(body: serde_json::Value) -> Json<FeedRequest> {
        Json(serde_json::from_value(body).unwrap())
    }

    #[tokio::test]
    async fn ranks_premium_first_and_reports_clock() {
        let body = serde_json::json!({
            "now": "2026-03-14T09:30:00Z",
            "items": [
                { "id": "free-1", "tier": "free", "rating": 5.0, "review_count": 40, "created_at": "2026-03-14T00:00:00Z" },
                { "id": "prem-1", "tier": "premium", "rating": 1.0, "review_count": 0, "created_at": "2025-01-01T00:00:00Z" },
                { "id": "odd-1", "tier": "gold", "rating": 12.0, "review_count": -3, "created_at": "2025-01-01T00:00:00Z" }
            ]
        });

        let Json(response) = post_feed(State(state(200)), request(body)).await.unwrap();
        assert_eq!(response.slot_index, 4);
        assert_eq!(response.items.len(), 3);
        assert_eq!(response.items[0].item.id, "prem-1");
        assert_eq!(response.items[0].score, 1010.0);
        assert_eq!(response.items[1].item.id, "free-1");
        assert_eq!(response.items[1].score, 130.0);
        assert_eq!(response.items[2].score, 50.0);
    }

    #[tokio::test]
    async fn rejects_oversized_feed_and_duplicate_ids() {
        let oversized = serde_json::json!({ "items": [], "k": 11 });
        let err = post_feed(State(state(10)), request(oversized)).await.unwrap_err();
        assert_eq!(err, StatusCode::BAD_REQUEST);

        let duplicate = serde_json::json!({
            "items": [
                { "id": "lst-1", "created_at": "2026-03-14T00:00:00Z" },
                { "id": "lst-1", "created_at": "2026-03-13T00:00:00Z" }
            ]
        });
        let err = post_feed(State(state(200)), request(duplicate)).await.unwrap_err();
        assert_eq!(err, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn explain_attaches_score_breakdowns() {
        let body = serde_json::json!({
            "now": "2026-03-14T09:30:00Z",
            "explain": true,
            "items": [
                { "id": "prem-1", "tier": "premium", "rating": 4.0, "review_count": 10, "created_at": "2026-03-13T09:30:00Z" }
            ]
        });

        let Json(response) = post_feed(State(state(200)), request(body)).await.unwrap();
        let breakdown = response.items[0].breakdown.unwrap();
        assert_eq!(breakdown.tier, 1000.0);
        assert_eq!(breakdown.quality, 40.0);
        assert_eq!(breakdown.reviews, 20.0);
        assert_eq!(breakdown.freshness, 30.0);
        assert_eq!(response.items[0].score, 1090.0);
    }

    #[tokio::test]
    async fn empty_catalog_yields_empty_feed() {
        let body = serde_json::json!({ "items": [], "now": "2026-03-14T09:30:00Z" });
        let Json(response) = post_feed(State(state(200)), request(body)).await.unwrap();
        assert!(response.items.is_empty());
    }
}
