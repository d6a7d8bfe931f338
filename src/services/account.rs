use chrono::Utc;

use crate::{
    error::{AppError, Result},
    models::user::{NewUser, User},
    repositories::user as user_repo,
    services::password,
    state::AppState,
    validation::account::{LoginInput, RegisterInput},
};

/// Splits a comma-separated interests string into trimmed, non-empty tokens.
pub fn parse_interests(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Registers a new account: duplicate pre-check, password hashing, then the
/// user row and its interest rows in one transaction.
///
/// The input is assumed validated. The transaction rolls back on drop, so
/// any failure after `create_user` leaves no orphaned user row.
pub async fn register(state: &AppState, input: &RegisterInput) -> Result<User> {
    tracing::debug!("📝 Registration attempt for {}", input.email);

    if user_repo::find_by_email(&state.db, &input.email).await?.is_some() {
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = password::hash_password(&input.password)?;
    let interests = parse_interests(input.interests.as_deref().unwrap_or(""));

    let new_user = NewUser {
        email: input.email.clone(),
        password_hash,
        name: input.name.clone(),
        workplace: input.workplace.clone(),
        about_section: input.about_section.clone(),
        created_at: Utc::now(),
    };

    let mut client = state.db.get().await?;
    let tx = client.transaction().await?;
    let user = user_repo::create_user(&tx, &new_user).await?;
    let inserted = user_repo::insert_interests(&tx, user.id, &interests).await?;
    tx.commit().await?;

    tracing::info!("✅ User registered: {} ({} interests)", user.id, inserted);
    Ok(user)
}

/// Authenticates a user by email and password.
///
/// An unknown email and a wrong password are the same outcome; nothing in
/// the error reveals whether the email is registered.
pub async fn authenticate(state: &AppState, input: &LoginInput) -> Result<User> {
    tracing::debug!("🔐 Login attempt for {}", input.email);

    let user = user_repo::find_by_email(&state.db, &input.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !password::verify_password(&input.password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    user_repo::touch_last_login(&state.db, user.id).await?;

    tracing::info!("✅ User authenticated: {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_trims_and_drops_empty_tokens() {
        assert_eq!(
            parse_interests("reading, , hiking,,music"),
            vec!["reading", "hiking", "music"]
        );
    }

    #[test]
    fn empty_and_whitespace_inputs_yield_nothing() {
        assert!(parse_interests("").is_empty());
        assert!(parse_interests("   ").is_empty());
        assert!(parse_interests(",,, ,").is_empty());
    }

    #[test]
    fn keeps_duplicates_and_inner_whitespace() {
        assert_eq!(
            parse_interests("rock climbing, rock climbing"),
            vec!["rock climbing", "rock climbing"]
        );
    }
}
