//! HTTP routes for the server.

use crate::auth::{self, current_session, require_session};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use snipshelf_auth::User;
use snipshelf_core::{
    defaults::default_content,
    highlight::{highlight, Highlighted},
    ConfigDraft, ConfigForm, ConfigLanguage, Overrides, Record, Snippet, SnippetDraft,
    SnippetForm, ThemeMode, ToolConfig, ToolKind,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Span};

/// Create the router with all routes, the session gate and request tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let signin_path = state.gate.signin_path().to_string();

    Router::new()
        // ===================
        // Public
        // ===================
        .route("/health", get(health))
        .route("/", get(landing))
        // ===================
        // Sign-in
        // ===================
        .route(&signin_path, get(auth::signin_page))
        .route(&format!("{signin_path}/{{provider}}"), get(auth::signin_start))
        .route("/auth/callback/{provider}", get(auth::signin_callback))
        .route("/auth/signout", post(auth::signout))
        .route("/auth/session", get(auth::session))
        // ===================
        // Dashboard
        // ===================
        .route("/dashboard", get(dashboard))
        .route("/dashboard/snippets", get(snippet_list).post(snippet_create))
        .route(
            "/dashboard/snippets/{id}",
            get(snippet_get).put(snippet_update).delete(snippet_delete),
        )
        .route("/dashboard/snippets/{id}/preview", get(snippet_preview))
        .route("/dashboard/configs", get(config_list).post(config_create))
        .route("/dashboard/configs/defaults", get(config_defaults))
        .route(
            "/dashboard/configs/{id}",
            get(config_get).put(config_update).delete(config_delete),
        )
        .route("/dashboard/configs/{id}/preview", get(config_preview))
        // ===================
        // Preview & theme
        // ===================
        .route("/preview", post(preview))
        .route("/theme", get(theme_get).put(theme_set))
        .layer(middleware::from_fn_with_state(state.clone(), require_session))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &Span| {
                    info!(
                        method = %request.method(),
                        path = %request.uri().path(),
                        "request"
                    );
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, _span: &Span| {
                        info!(
                            status = %response.status(),
                            latency = ?latency,
                            "response"
                        );
                    },
                ),
        )
}

// =============================================================================
// Public endpoints
// =============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "healthy": true,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn landing(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "snipshelf",
        "tagline": "Store and browse code snippets and tool configs.",
        "signinPath": state.gate.signin_path(),
    }))
}

// =============================================================================
// Dashboard overview
// =============================================================================

#[derive(Debug, Serialize)]
struct QuickAction {
    label: &'static str,
    href: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Overview {
    user: Option<User>,
    snippet_count: usize,
    config_count: usize,
    recent_snippets: Vec<Snippet>,
    recent_configs: Vec<ToolConfig>,
    actions: Vec<QuickAction>,
}

const RECENT_LIMIT: usize = 5;

async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Overview>> {
    let user = current_session(&state, &headers).await.and_then(|s| s.user);
    let snippets = state.snippets.list().await?;
    let configs = state.configs.list().await?;

    Ok(Json(Overview {
        user,
        snippet_count: snippets.len(),
        config_count: configs.len(),
        recent_snippets: snippets.into_iter().take(RECENT_LIMIT).collect(),
        recent_configs: configs.into_iter().take(RECENT_LIMIT).collect(),
        actions: vec![
            QuickAction {
                label: "New snippet",
                href: "/dashboard/snippets",
            },
            QuickAction {
                label: "New config",
                href: "/dashboard/configs",
            },
        ],
    }))
}

// =============================================================================
// Snippets
// =============================================================================

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn snippet_list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Snippet>>> {
    Ok(Json(state.snippets.search(&query.q).await?))
}

async fn snippet_create(
    State(state): State<AppState>,
    payload: Result<Json<SnippetDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(draft) = payload?;
    let snippet = SnippetForm::from_draft(draft).payload(Snippet::new_id())?;
    let created = state.snippets.create(snippet).await?;
    info!(id = %created.id, "Snippet created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn snippet_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Snippet>> {
    Ok(Json(state.snippets.get(&id).await?))
}

async fn snippet_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SnippetDraft>, JsonRejection>,
) -> ApiResult<Json<Snippet>> {
    let Json(draft) = payload?;
    let current = state.snippets.get(&id).await?;

    let mut form = SnippetForm::from_record(&current);
    form.apply(draft);
    let updated = state.snippets.update(form.payload(id)?).await?;
    Ok(Json(updated))
}

async fn snippet_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.snippets.delete(&id).await?;
    info!(%id, "Snippet deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    #[serde(default)]
    theme: Option<ThemeMode>,
}

/// Highlighted code plus the raw text, so clients can offer copy.
#[derive(Debug, Serialize)]
struct PreviewResponse {
    id: String,
    code: String,
    #[serde(flatten)]
    highlighted: Highlighted,
}

async fn snippet_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> ApiResult<Json<PreviewResponse>> {
    let snippet = state.snippets.get(&id).await?;
    let theme = query.theme.unwrap_or_else(|| state.theme.current());

    Ok(Json(PreviewResponse {
        highlighted: highlight(&snippet.code, &snippet.language, theme),
        id: snippet.id,
        code: snippet.code,
    }))
}

// =============================================================================
// Configs
// =============================================================================

async fn config_list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<ToolConfig>>> {
    Ok(Json(state.configs.search(&query.q).await?))
}

async fn config_create(
    State(state): State<AppState>,
    payload: Result<Json<ConfigDraft>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(draft) = payload?;
    let config = ConfigForm::from_draft(draft).payload(ToolConfig::new_id())?;
    let created = state.configs.create(config).await?;
    info!(id = %created.id, tool = %created.tool, "Config created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn config_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ToolConfig>> {
    Ok(Json(state.configs.get(&id).await?))
}

async fn config_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ConfigDraft>, JsonRejection>,
) -> ApiResult<Json<ToolConfig>> {
    let Json(draft) = payload?;
    let current = state.configs.get(&id).await?;

    let mut form = ConfigForm::from_record(&current);
    form.apply(draft);
    let updated = state.configs.update(form.payload(id)?).await?;
    Ok(Json(updated))
}

async fn config_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.configs.delete(&id).await?;
    info!(%id, "Config deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn config_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> ApiResult<Json<PreviewResponse>> {
    let config = state.configs.get(&id).await?;
    let theme = query.theme.unwrap_or_else(|| state.theme.current());

    Ok(Json(PreviewResponse {
        highlighted: highlight(&config.content, config.language.as_str(), theme),
        id: config.id,
        code: config.content,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DefaultsQuery {
    tool: String,
    #[serde(default)]
    file_path: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DefaultsResponse {
    tool: ToolKind,
    file_path: String,
    language: ConfigLanguage,
    content: &'static str,
}

async fn config_defaults(
    query: Result<Query<DefaultsQuery>, QueryRejection>,
) -> ApiResult<Json<DefaultsResponse>> {
    let Query(query) = query?;
    let tool = query
        .tool
        .parse::<ToolKind>()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let language = query
        .language
        .filter(|l| !l.is_empty())
        .map(|l| l.parse::<ConfigLanguage>())
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let derived = snipshelf_core::derive_defaults(
        tool,
        &Overrides {
            file_path: query.file_path,
            language,
        },
    );

    Ok(Json(DefaultsResponse {
        tool,
        file_path: derived.file_path,
        language: derived.language,
        content: default_content(tool),
    }))
}

// =============================================================================
// Preview & theme
// =============================================================================

#[derive(Debug, Deserialize)]
struct PreviewRequest {
    code: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    theme: Option<ThemeMode>,
}

async fn preview(
    State(state): State<AppState>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> ApiResult<Json<Highlighted>> {
    let Json(req) = payload?;
    let theme = req.theme.unwrap_or_else(|| state.theme.current());
    Ok(Json(highlight(&req.code, &req.language, theme)))
}

#[derive(Debug, Serialize, Deserialize)]
struct ThemeBody {
    theme: ThemeMode,
}

async fn theme_get(State(state): State<AppState>) -> Json<ThemeBody> {
    Json(ThemeBody {
        theme: state.theme.current(),
    })
}

async fn theme_set(
    State(state): State<AppState>,
    payload: Result<Json<ThemeBody>, JsonRejection>,
) -> ApiResult<Json<ThemeBody>> {
    let Json(body) = payload?;
    state.theme.set(body.theme);
    Ok(Json(body))
}
