use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{services::session as session_service, state::AppState};

/// The cookie holding the opaque session token.
pub const SESSION_COOKIE: &str = "session_id";

/// Extracts the session token from the request cookies.
pub fn extract_session_token(cookies: &Cookies) -> Option<Uuid> {
    cookies
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// A middleware that requires an authenticated session.
///
/// Anonymous requests (no cookie, unknown token, or idle-expired session)
/// are redirected to the login form. On success the `Session` is inserted
/// as a request extension and the idle window is refreshed.
pub async fn require_auth(
    State(mut state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(session_id) = extract_session_token(&cookies) else {
        tracing::debug!("No session cookie found, treating as anonymous");
        return Redirect::to("/account/login").into_response();
    };

    let idle_secs = state.config.session_idle_secs();
    match session_service::load(&mut state.redis, &session_id, idle_secs).await {
        Ok(Some(session)) => {
            tracing::debug!("✅ User authenticated: {}", session.user_id);
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Ok(None) => {
            tracing::debug!("Session {} missing or expired", session_id);
            Redirect::to("/account/login").into_response()
        }
        Err(e) => e.into_response(),
    }
}
