// ShufuMate - Web Server
// JSON API over the same panel dispatcher the TUI uses

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shufumate::config::{self, AppConfig};
use shufumate::education::{self, EducationTrack, Level, Tier};
use shufumate::logging::{init_logging, LogTarget};
use shufumate::panel::current_year;
use shufumate::{render, AppMode, CsvSource, DealsSource, PanelInputs, PanelView};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

/// Shared application state
#[derive(Clone)]
struct AppState {
    config: Arc<AppConfig>,
    source: Arc<dyn DealsSource>,
}

/// API Response wrapper
#[derive(Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// POST /api/render body. `inputs` is overlaid on the default widget values,
/// so a client only sends the fields it changed.
#[derive(Deserialize)]
struct RenderRequest {
    mode: AppMode,
    #[serde(default)]
    inputs: Value,
}

#[derive(Serialize, Deserialize)]
struct ModeInfo {
    key: String,
    label: String,
    title: String,
}

#[derive(Serialize, Deserialize)]
struct CostEntry {
    tier: Tier,
    level: Level,
    cost: u32,
}

#[derive(Serialize, Deserialize)]
struct TrackEntry {
    track: EducationTrack,
    label: String,
    tiers: [Tier; 4],
}

#[derive(Serialize, Deserialize)]
struct EducationTable {
    costs: Vec<CostEntry>,
    tracks: Vec<TrackEntry>,
}

// ============================================================================
// Input merging
// ============================================================================

/// Recursively overlay `overlay` onto `base`; objects merge key by key,
/// anything else replaces.
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                merge_json(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn build_inputs(config: &AppConfig, overlay: Value) -> Result<PanelInputs, serde_json::Error> {
    let defaults = PanelInputs::for_date(chrono::Local::now().date_naive(), &config.deals_sheet_url);
    let mut merged = serde_json::to_value(defaults)?;
    if !overlay.is_null() {
        merge_json(&mut merged, overlay);
    }
    let inputs: PanelInputs = serde_json::from_value(merged)?;
    Ok(inputs.clamped())
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/modes - The side menu
async fn list_modes() -> impl IntoResponse {
    let modes: Vec<ModeInfo> = AppMode::ALL
        .iter()
        .map(|mode| ModeInfo {
            key: mode.key().to_string(),
            label: mode.label().to_string(),
            title: mode.title().to_string(),
        })
        .collect();

    Json(ApiResponse::ok(modes))
}

/// GET /api/education/costs - Static cost table and track mappings
async fn education_costs() -> impl IntoResponse {
    let costs = [Tier::Public, Tier::Private]
        .into_iter()
        .flat_map(|tier| {
            Level::ALL.into_iter().map(move |level| CostEntry {
                tier,
                level,
                cost: education::cost(tier, level),
            })
        })
        .collect();

    let tracks = EducationTrack::ALL
        .iter()
        .map(|track| TrackEntry {
            track: *track,
            label: track.label().to_string(),
            tiers: track.tiers(),
        })
        .collect();

    Json(ApiResponse::ok(EducationTable { costs, tracks }))
}

/// POST /api/render - Run one panel
async fn render_panel(State(state): State<AppState>, Json(request): Json<RenderRequest>) -> impl IntoResponse {
    let inputs = match build_inputs(&state.config, request.inputs) {
        Ok(inputs) => inputs,
        Err(e) => {
            warn!(error = %e, "rejected render inputs");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<PanelView>::err(format!("invalid inputs: {}", e))),
            )
                .into_response();
        }
    };

    let mode = request.mode;
    let source = state.source.clone();

    // The deals fetch is blocking HTTP
    let result = tokio::task::spawn_blocking(move || render(mode, &inputs, source.as_ref(), current_year())).await;

    match result {
        Ok(view) => {
            info!(mode = mode.key(), lines = view.lines.len(), "rendered panel");
            (StatusCode::OK, Json(ApiResponse::ok(view))).into_response()
        }
        Err(e) => {
            error!(error = %e, "render task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<PanelView>::err("render failed")),
            )
                .into_response()
        }
    }
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/modes", get(list_modes))
        .route("/education/costs", get(education_costs))
        .route("/render", post(render_panel))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

async fn serve(state: AppState) -> Result<()> {
    let addr = state.config.server_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/render", addr);
    println!("\n   Press Ctrl+C to stop\n");
    info!(%addr, "listening");

    axum::serve(listener, router(state)).await.context("Server error")?;

    Ok(())
}

fn main() -> Result<()> {
    init_logging(LogTarget::Stderr)?;

    println!("🌐 ShufuMate - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let loaded = config::load_config();
    loaded.log_load_error();
    let config = loaded.effective();
    println!("✓ Deals sheet: {}", config.deals_sheet_url);

    // The blocking HTTP client has to be built outside the async runtime
    let state = AppState {
        config: Arc::new(config),
        source: Arc::new(CsvSource::new()),
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(serve(state))
}
