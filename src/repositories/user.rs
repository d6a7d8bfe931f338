use deadpool_postgres::{Pool, Transaction};
use tokio_postgres::{error::SqlState, Row};
use crate::{
    error::{AppError, Result},
    models::user::{NewUser, User},
};

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        email: row.try_get("email").map_err(|_| AppError::MissingData("email".to_string()))?,
        password_hash: row.try_get("password_hash").map_err(|_| AppError::MissingData("password_hash".to_string()))?,
        name: row.try_get("name").map_err(|_| AppError::MissingData("name".to_string()))?,
        workplace: row.try_get("workplace").map_err(|_| AppError::MissingData("workplace".to_string()))?,
        about_section: row.try_get("about_section").map_err(|_| AppError::MissingData("about_section".to_string()))?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
        last_login_at: row.try_get("last_login_at").map_err(|_| AppError::MissingData("last_login_at".to_string()))?,
    })
}

/// Finds a user by their email address. Exact match against the unique index.
pub async fn find_by_email(pool: &Pool, email: &str) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, email, password_hash, name, workplace, about_section,
                   created_at, last_login_at
            FROM users
            WHERE email = $1
            "#,
            &[&email],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// Finds a user by their ID.
pub async fn find_by_id(pool: &Pool, user_id: i32) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, email, password_hash, name, workplace, about_section,
                   created_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
            &[&user_id],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}

/// Inserts a new user row inside the caller's transaction.
///
/// The unique constraint on `email` is the authority on duplicates: a
/// violation maps to `AppError::DuplicateEmail`, so a race past the flow's
/// pre-check still ends in the duplicate outcome rather than a second row.
pub async fn create_user(tx: &Transaction<'_>, new_user: &NewUser) -> Result<User> {
    let row = tx
        .query_one(
            r#"
            INSERT INTO users (email, password_hash, name, workplace, about_section,
                               created_at, last_login_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, email, password_hash, name, workplace, about_section,
                      created_at, last_login_at
            "#,
            &[
                &new_user.email,
                &new_user.password_hash,
                &new_user.name,
                &new_user.workplace,
                &new_user.about_section,
                &new_user.created_at,
            ],
        )
        .await
        .map_err(|e| {
            if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                AppError::DuplicateEmail
            } else {
                AppError::from(e)
            }
        })?;
    row_to_user(&row)
}

/// Inserts one interest row per non-empty trimmed entry, inside the caller's
/// transaction. Empty entries are dropped silently; an empty list is a no-op.
pub async fn insert_interests(
    tx: &Transaction<'_>,
    user_id: i32,
    interests: &[String],
) -> Result<u64> {
    let mut inserted = 0;
    for interest in interests {
        let interest = interest.trim();
        if interest.is_empty() {
            continue;
        }
        tx.execute(
            r#"
            INSERT INTO user_interests (user_id, interest, created_at)
            VALUES ($1, $2, NOW())
            "#,
            &[&user_id, &interest],
        )
        .await?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Lists a user's interest texts in insertion order.
pub async fn list_interests(pool: &Pool, user_id: i32) -> Result<Vec<String>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT interest
            FROM user_interests
            WHERE user_id = $1
            ORDER BY id
            "#,
            &[&user_id],
        )
        .await?;
    rows.iter()
        .map(|row| {
            row.try_get(0)
                .map_err(|_| AppError::MissingData("interest".to_string()))
        })
        .collect()
}

/// Stamps the user's last successful login.
pub async fn touch_last_login(pool: &Pool, user_id: i32) -> Result<()> {
    let client = pool.get().await?;
    client
        .execute(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE id = $1
            "#,
            &[&user_id],
        )
        .await?;
    Ok(())
}

/// Total user count. Diagnostic use only (startup log).
pub async fn count_users(pool: &Pool) -> Result<i64> {
    let client = pool.get().await?;
    let row = client
        .query_one("SELECT COUNT(*) FROM users", &[])
        .await?;
    row.try_get(0).map_err(|_| AppError::MissingData("count".to_string()))
}
