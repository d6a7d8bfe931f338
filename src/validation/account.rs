use garde::Validate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{AppError, Result};

/// Validation messages keyed by input field, in stable field order.
#[derive(Debug, Default, Clone, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to the given field.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    fn from_report(report: &garde::Report) -> Self {
        let mut errors = Self::new();
        for (path, error) in report.iter() {
            errors.push(&path.to_string(), error.to_string());
        }
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// The registration form, one field per input control.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[garde(email, length(max = 256))]
    pub email: String,
    #[garde(length(min = 6, max = 100))]
    pub password: String,
    /// Checked against `password` in `validate_register`; garde rules cannot
    /// see sibling fields.
    #[garde(skip)]
    pub confirm_password: String,
    #[garde(length(min = 1, max = 100))]
    pub name: String,
    #[garde(inner(length(max = 200)))]
    pub workplace: Option<String>,
    #[garde(inner(length(max = 1000)))]
    pub about_section: Option<String>,
    /// Comma-separated interest tags, split and trimmed by the flow.
    #[garde(skip)]
    pub interests: Option<String>,
}

impl RegisterInput {
    /// Collapses the empty strings browsers submit for untouched optional
    /// fields into `None`.
    pub fn normalized(mut self) -> Self {
        self.workplace = self.workplace.filter(|s| !s.trim().is_empty());
        self.about_section = self.about_section.filter(|s| !s.trim().is_empty());
        self.interests = self.interests.filter(|s| !s.trim().is_empty());
        self
    }
}

/// The login form.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[garde(email, length(max = 256))]
    pub email: String,
    #[garde(length(min = 1, max = 100))]
    pub password: String,
}

/// Validates a registration form. No store access happens here.
pub fn validate_register(input: &RegisterInput) -> Result<()> {
    let mut errors = match input.validate() {
        Ok(()) => FieldErrors::new(),
        Err(report) => FieldErrors::from_report(&report),
    };

    if input.confirm_password != input.password {
        errors.push("confirm_password", "Passwords do not match.");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Validates a login form.
pub fn validate_login(input: &LoginInput) -> Result<()> {
    match input.validate() {
        Ok(()) => Ok(()),
        Err(report) => Err(AppError::Validation(FieldErrors::from_report(&report))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_register_input() -> RegisterInput {
        RegisterInput {
            email: "ada@example.com".to_string(),
            password: "hunter22".to_string(),
            confirm_password: "hunter22".to_string(),
            name: "Ada Lovelace".to_string(),
            workplace: Some("Analytical Engines Ltd".to_string()),
            about_section: None,
            interests: Some("mathematics, looms".to_string()),
        }
    }

    fn field_errors(result: crate::error::Result<()>) -> FieldErrors {
        match result.unwrap_err() {
            AppError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_a_complete_valid_form() {
        assert!(validate_register(&valid_register_input()).is_ok());
    }

    #[test]
    fn rejects_malformed_email() {
        let mut input = valid_register_input();
        input.email = "not-an-email".to_string();
        let errors = field_errors(validate_register(&input));
        assert!(errors.as_map().contains_key("email"));
    }

    #[test]
    fn rejects_empty_email() {
        let mut input = valid_register_input();
        input.email = String::new();
        let errors = field_errors(validate_register(&input));
        assert!(errors.as_map().contains_key("email"));
    }

    #[test]
    fn rejects_short_and_long_passwords() {
        let mut input = valid_register_input();
        input.password = "12345".to_string();
        input.confirm_password = input.password.clone();
        let errors = field_errors(validate_register(&input));
        assert!(errors.as_map().contains_key("password"));

        let mut input = valid_register_input();
        input.password = "x".repeat(101);
        input.confirm_password = input.password.clone();
        let errors = field_errors(validate_register(&input));
        assert!(errors.as_map().contains_key("password"));
    }

    #[test]
    fn rejects_mismatched_confirmation() {
        let mut input = valid_register_input();
        input.confirm_password = "something-else".to_string();
        let errors = field_errors(validate_register(&input));
        assert!(errors.as_map().contains_key("confirm_password"));
    }

    #[test]
    fn rejects_missing_name_and_oversized_profile_fields() {
        let mut input = valid_register_input();
        input.name = String::new();
        input.workplace = Some("w".repeat(201));
        input.about_section = Some("a".repeat(1001));
        let errors = field_errors(validate_register(&input));
        assert!(errors.as_map().contains_key("name"));
        assert!(errors.as_map().contains_key("workplace"));
        assert!(errors.as_map().contains_key("about_section"));
    }

    #[test]
    fn collects_errors_for_every_bad_field_at_once() {
        let input = RegisterInput {
            email: "nope".to_string(),
            password: "123".to_string(),
            confirm_password: "456".to_string(),
            name: String::new(),
            workplace: None,
            about_section: None,
            interests: None,
        };
        let errors = field_errors(validate_register(&input));
        assert!(errors.as_map().len() >= 4);
    }

    #[test]
    fn normalized_drops_blank_optionals() {
        let mut input = valid_register_input();
        input.workplace = Some("   ".to_string());
        input.about_section = Some(String::new());
        input.interests = Some(" ".to_string());
        let input = input.normalized();
        assert!(input.workplace.is_none());
        assert!(input.about_section.is_none());
        assert!(input.interests.is_none());
    }

    #[test]
    fn login_requires_valid_email_and_nonempty_password() {
        let input = LoginInput {
            email: "broken".to_string(),
            password: String::new(),
        };
        let errors = field_errors(validate_login(&input));
        assert!(errors.as_map().contains_key("email"));
        assert!(errors.as_map().contains_key("password"));
    }
}
