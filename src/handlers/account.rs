use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde::Serialize;
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, Result},
    middleware_layer::session::SESSION_COOKIE,
    models::session::Session,
    repositories::user as user_repo,
    services::{account as account_service, session as session_service},
    state::AppState,
    validation::account::{validate_login, validate_register, LoginInput, RegisterInput},
};

/// Profile payload returned by the authenticated landing route.
#[derive(Serialize)]
pub struct HomeResponse {
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub workplace: Option<String>,
    pub about_section: Option<String>,
    pub member_since: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
    pub interests: Vec<String>,
}

/// Creates the session cookie for the given token.
///
/// HttpOnly and essential: the application is non-functional without it.
/// No Max-Age is set; the store-side idle TTL is the single expiry
/// authority, so a stale cookie is just an unknown token.
fn create_session_cookie(session_id: Uuid) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id.to_string());

    let is_production = std::env::var("APP_ENV")
        .unwrap_or_else(|_| "development".to_string()) == "production";

    cookie.set_http_only(true);
    if is_production {
        cookie.set_secure(true);
    }

    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_path("/");

    cookie
}

/// Renders the login form.
pub async fn login_page() -> Html<&'static str> {
    Html(include_str!("../../pages/login.html"))
}

/// Renders the registration form.
pub async fn register_page() -> Html<&'static str> {
    Html(include_str!("../../pages/register.html"))
}

/// Handles registration: validate, create user + interests atomically,
/// auto-login, redirect to the landing route.
#[axum::debug_handler]
pub async fn register(
    State(mut state): State<AppState>,
    cookies: Cookies,
    Form(input): Form<RegisterInput>,
) -> Result<Response> {
    let input = input.normalized();
    validate_register(&input)?;

    let user = account_service::register(&state, &input).await?;

    let session_id =
        session_service::establish(&mut state.redis, state.config.session_idle_secs(), &user)
            .await?;
    cookies.add(create_session_cookie(session_id));
    tracing::info!("✅ Session cookie added for user {}", user.id);

    Ok(Redirect::to("/").into_response())
}

/// Handles login: validate, authenticate, establish a session, redirect.
#[axum::debug_handler]
pub async fn login(
    State(mut state): State<AppState>,
    cookies: Cookies,
    Form(input): Form<LoginInput>,
) -> Result<Response> {
    validate_login(&input)?;

    let user = account_service::authenticate(&state, &input).await?;

    let session_id =
        session_service::establish(&mut state.redis, state.config.session_idle_secs(), &user)
            .await?;
    cookies.add(create_session_cookie(session_id));
    tracing::info!("✅ Session cookie added for user {}", user.id);

    Ok(Redirect::to("/").into_response())
}

/// Handles logout. Idempotent and infallible from the client's view: the
/// session is cleared if one exists and the response is always a redirect
/// to the anonymous landing state.
#[axum::debug_handler]
pub async fn logout(State(mut state): State<AppState>, cookies: Cookies) -> Redirect {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        if let Ok(session_id) = Uuid::parse_str(cookie.value()) {
            if let Err(e) = session_service::clear(&mut state.redis, &session_id).await {
                tracing::error!("Failed to clear session {}: {}", session_id, e);
            }
        }

        let mut removal = Cookie::new(SESSION_COOKIE, "");
        removal.set_max_age(Duration::seconds(0));
        removal.set_path("/");
        cookies.remove(removal);
    }

    Redirect::to("/account/login")
}

/// The authenticated landing route. Runs behind `require_auth`; the
/// identity comes from the session claims, the profile from the store.
#[axum::debug_handler]
pub async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<HomeResponse>> {
    let user = user_repo::find_by_id(&state.db, session.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!("Session user {} has no user row", session.user_id))
        })?;
    let interests = user_repo::list_interests(&state.db, user.id).await?;

    Ok(Json(HomeResponse {
        user_id: user.id,
        name: session.name,
        email: session.email,
        workplace: user.workplace,
        about_section: user.about_section,
        member_since: user.created_at,
        last_login_at: user.last_login_at,
        interests,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_script_inaccessible() {
        let cookie = create_session_cookie(Uuid::new_v4());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.same_site(),
            Some(tower_cookies::cookie::SameSite::Lax)
        );
        assert!(cookie.max_age().is_none());
    }
}
