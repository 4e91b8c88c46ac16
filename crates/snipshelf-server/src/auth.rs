//! Sign-in routes and the session gate middleware.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use snipshelf_auth::{AuthError, GateDecision, Provider, Session, SESSION_COOKIE};
use tracing::{debug, info};

/// A 302 to `location`.
pub(crate) fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => ApiError::internal("invalid redirect location").into_response(),
    }
}

/// Read one cookie out of the `Cookie` headers.
fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn session_cookie(id: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// The live session for this request, if any.
pub(crate) async fn current_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    let id = cookie(headers, SESSION_COOKIE)?;
    state.sessions.get(id).await
}

/// Only same-site relative paths are accepted as post sign-in targets.
/// Browsers read `\` as `/` and drop tabs and newlines, so `/\host` or
/// `/\t/host` would leave the site.
fn safe_callback(requested: Option<String>, fallback: &str) -> String {
    match requested {
        Some(url)
            if url.starts_with('/')
                && !url.starts_with("//")
                && !url.contains('\\')
                && !url.chars().any(char::is_control) =>
        {
            url
        }
        _ => fallback.to_string(),
    }
}

fn parse_provider(id: &str) -> ApiResult<Provider> {
    id.parse()
        .map_err(|_| AuthError::UnknownProvider(id.to_string()).into())
}

/// Middleware: requests without a session go to the sign-in page.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let has_session = current_session(&state, request.headers()).await.is_some();

    match state.gate.check(&path, has_session) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Redirect(location) => {
            debug!(%path, "No session, redirecting to sign-in");
            found(&location)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInQuery {
    #[serde(default)]
    callback_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderLink {
    id: &'static str,
    name: &'static str,
    signin_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInPage {
    providers: Vec<ProviderLink>,
    callback_url: String,
}

/// The sign-in page: one link per available provider.
pub async fn signin_page(
    State(state): State<AppState>,
    Query(query): Query<SignInQuery>,
) -> impl IntoResponse {
    let callback_url = safe_callback(query.callback_url, &state.callback_url);
    let signin_path = state.gate.signin_path();
    let providers = state
        .identity
        .providers()
        .into_iter()
        .map(|p| ProviderLink {
            id: p.id(),
            name: p.label(),
            signin_url: format!("{signin_path}/{}", p.id()),
        })
        .collect();

    Json(SignInPage {
        providers,
        callback_url,
    })
}

/// Start a sign-in: remember where to go afterwards and hand the browser
/// to the provider.
pub async fn signin_start(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<SignInQuery>,
) -> ApiResult<Response> {
    let provider = parse_provider(&provider)?;
    let callback_url = safe_callback(query.callback_url, &state.callback_url);

    let oauth_state = state.sessions.begin_sign_in(provider, callback_url).await;
    let url = state.identity.authorize_url(
        provider,
        &state.redirect_uri(provider.id()),
        &oauth_state,
    )?;

    debug!(%provider, "Redirecting to provider");
    Ok(found(&url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Provider callback: exchange the code, create the session, set the cookie.
pub async fn signin_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Response> {
    let provider = parse_provider(&provider)?;

    if let Some(error) = query.error {
        return Err(ApiError::bad_request(format!("sign-in was not completed: {error}")));
    }
    let (Some(code), Some(oauth_state)) = (query.code, query.state) else {
        return Err(ApiError::bad_request("missing code or state"));
    };

    let pending = state.sessions.complete_sign_in(&oauth_state, provider).await?;
    let user = state
        .identity
        .exchange(provider, &code, &state.redirect_uri(provider.id()))
        .await?;
    let session = state.sessions.create(provider, user).await;
    info!(%provider, session_id = %session.id, "Session started");

    let mut response = found(&pending.callback_url);
    let cookie = session_cookie(&session.id, session.max_age_secs());
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(response)
}

/// Drop the session and clear the cookie.
pub async fn signout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = cookie(&headers, SESSION_COOKIE) {
        if state.sessions.remove(id).await {
            info!(session_id = %id, "Signed out");
        }
    }

    let mut response = Json(serde_json::json!({ "success": true })).into_response();
    if let Ok(value) = HeaderValue::from_str(&session_cookie("", 0)) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

/// The current session, or `null`.
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> Json<Option<Session>> {
    Json(current_session(&state, &headers).await)
}
