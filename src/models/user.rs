use chrono::{DateTime, Utc};

/// Represents a registered user.
#[derive(Clone, Debug)]
pub struct User {
    /// The unique identifier for the user, assigned by the store.
    pub id: i32,
    /// The user's email address. Unique across all users.
    pub email: String,
    /// The user's hashed password. Never the raw password.
    pub password_hash: String,
    /// The user's display name.
    pub name: String,
    /// The user's workplace, if provided.
    pub workplace: Option<String>,
    /// Free-text about section, if provided.
    pub about_section: Option<String>,
    /// The timestamp when the user registered.
    pub created_at: DateTime<Utc>,
    /// The timestamp of the user's last successful login.
    pub last_login_at: DateTime<Utc>,
}

/// The fields needed to insert a new user row.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub workplace: Option<String>,
    pub about_section: Option<String>,
    /// Creation instant; `last_login_at` starts at the same value.
    pub created_at: DateTime<Utc>,
}

