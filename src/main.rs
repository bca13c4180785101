use axum::{
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

mod config;
mod formatter;
mod leaflet;
mod map_view;
mod models;
mod repository;
mod selection;
mod template_engine;
mod utils;

#[cfg(test)]
mod test_support;

use config::Config;
use leaflet::LeafletPage;
use map_view::{MapView, TileSource};
use repository::HttpCountrySource;
use template_engine::TemplateEngine;

const DEFAULT_USER_AGENT: &str = concat!("country-map/", env!("CARGO_PKG_VERSION"));

struct AppState {
    view: Arc<MapView<LeafletPage>>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let config = Config::load()?;

    info!("starting country map, data from {}", config.countries_url);

    // one event loop; the country fetch is the only suspension point
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn log_request_response(
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().to_string();
    info!("incoming request: {} {}", method, path);
    let response = next.run(req).await;
    info!("request result: {} for {} {}", response.status(), method, path);
    response
}

async fn async_main(config: Config) -> anyhow::Result<()> {
    let http_client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
        .build()?;

    let widget = LeafletPage::new(TemplateEngine::new()?, &config.map);
    let view = Arc::new(MapView::new(TileSource::from(&config.map), widget));
    // load runs detached; the server answers markerless until it completes
    let _load = view.mount(HttpCountrySource::new(http_client, config.countries_url.clone()));

    let app = router(Arc::new(AppState { view }));

    info!("listening on {}", config.bind_addr);
    let listener = TcpListener::bind(config.bind_addr.as_str()).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/markers", get(list_markers))
        .route("/api/selection", get(current_selection).delete(dismiss_selection))
        .route("/api/selection/{code}", post(select_country))
        .layer(middleware::from_fn(log_request_response))
        .with_state(state)
}

// --- Handlers ---

async fn index(State(state): State<Arc<AppState>>) -> Response {
    match state.view.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("map page error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "error rendering map").into_response()
        },
    }
}

async fn list_markers(State(state): State<Arc<AppState>>) -> Response {
    Json(json!({
        "status": state.view.repository().status(),
        "markers": state.view.markers(),
    }))
    .into_response()
}

async fn select_country(State(state): State<Arc<AppState>>, Path(code): Path<String>) -> Response {
    match state.view.select_marker(&code) {
        Some(overlay) => overlay_response(&state, &overlay),
        None => (StatusCode::NOT_FOUND, "country not found").into_response(),
    }
}

async fn current_selection(State(state): State<Arc<AppState>>) -> Response {
    match state.view.overlay() {
        Some(overlay) => overlay_response(&state, &overlay),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn dismiss_selection(State(state): State<Arc<AppState>>) -> Response {
    state.view.dismiss();
    StatusCode::NO_CONTENT.into_response()
}

fn overlay_response(state: &AppState, overlay: &map_view::Overlay) -> Response {
    match state.view.widget().overlay_payload(overlay) {
        Ok(payload) => Json(payload).into_response(),
        Err(e) => {
            error!("popup error ({}): {}", overlay.code, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "error rendering popup").into_response()
        },
    }
}
