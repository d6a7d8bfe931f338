use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::session::Session,
    models::user::User,
};

fn session_key(session_id: &Uuid) -> String {
    format!("session:{}", session_id)
}

/// Establishes a session for the user and returns its opaque id.
///
/// The key carries the idle TTL; `load` refreshes it on every hit, so the
/// TTL is the sliding idle window. Re-establishing simply writes a fresh
/// key; the client's old token (if any) just ages out.
pub async fn establish(
    redis: &mut ConnectionManager,
    idle_secs: u64,
    user: &User,
) -> Result<Uuid> {
    let session_id = Uuid::new_v4();
    let session = Session {
        user_id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        created_at: Utc::now(),
    };

    let session_json = sonic_rs::to_string(&session)
        .map_err(|e| AppError::Internal(format!("Session serialization failed: {}", e)))?;

    let _: () = redis
        .set_ex(session_key(&session_id), &session_json, idle_secs)
        .await?;

    tracing::debug!("🔑 Session established for user {}", user.id);
    Ok(session_id)
}

/// Loads the session for the given token, refreshing its idle TTL.
///
/// Returns `None` when the key is missing or expired. An unparseable
/// payload is deleted and also treated as anonymous.
pub async fn load(
    redis: &mut ConnectionManager,
    session_id: &Uuid,
    idle_secs: u64,
) -> Result<Option<Session>> {
    let key = session_key(session_id);

    let session_json: Option<String> = redis.get(&key).await?;
    let Some(session_json) = session_json else {
        return Ok(None);
    };

    let session: Session = match sonic_rs::from_str(&session_json) {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("Dropping unparseable session payload: {}", e);
            let _: () = redis.del(&key).await.unwrap_or(());
            return Ok(None);
        }
    };

    let _: () = redis.expire(&key, idle_secs as i64).await?;

    Ok(Some(session))
}

/// Clears the session for the given token. Idempotent; a token that is
/// already gone is not an error.
pub async fn clear(redis: &mut ConnectionManager, session_id: &Uuid) -> Result<()> {
    let _: () = redis.del(session_key(session_id)).await?;
    tracing::debug!("Session cleared: {}", session_id);
    Ok(())
}
