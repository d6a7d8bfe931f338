use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The identity claims stored server-side for one authenticated client.
///
/// The client only ever holds the opaque session id; this value lives in the
/// session store under `session:{id}` and disappears when the idle window
/// elapses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The ID of the user this session belongs to.
    pub user_id: i32,
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// The timestamp when the session was established.
    pub created_at: DateTime<Utc>,
}
