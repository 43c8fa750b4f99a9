use super::fields::required_text;
use super::{ErrorCode, ValidationErrors};
use crate::patient::form::deserialize_opt_string_lax;
use serde::{Deserialize, Serialize};

const USERNAME_LEN: (usize, usize) = (3, 80);
const EMAIL_MAX_LEN: usize = 120;
const PASSWORD_LEN: (usize, usize) = (8, 128);
const COMMON_PASSWORDS: &[&str] = &["password", "12345678", "qwerty", "abc123"];

/// Raw registration form submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub confirm_password: Option<String>,
}

/// Raw login form submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub password: Option<String>,
}

/// Registration data that passed every stateless rule. Username and email
/// uniqueness still has to be checked against the account store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub username: String,
    /// Lowercased.
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidLogin {
    pub username: String,
    pub password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<ValidRegistration, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let username = check_username(self.username.as_deref(), &mut errors);
        let email = check_email(self.email.as_deref(), &mut errors);
        let password = check_password(self.password.as_deref(), &mut errors);

        match self.confirm_password.as_deref().filter(|p| !p.is_empty()) {
            None => errors.push(
                "confirm_password",
                ErrorCode::Required,
                "Please confirm your password",
            ),
            Some(confirm) if Some(confirm) != self.password.as_deref() => {
                errors.push("confirm_password", ErrorCode::Mismatch, "Passwords must match")
            }
            Some(_) => {}
        }

        match (username, email, password) {
            (Some(username), Some(email), Some(password)) if errors.is_empty() => {
                Ok(ValidRegistration {
                    username,
                    email,
                    password,
                })
            }
            _ => Err(errors),
        }
    }
}

impl LoginForm {
    pub fn validate(&self) -> Result<ValidLogin, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let username = required_text(self.username.as_deref(), "username", "Username", &mut errors)
            .filter(|u| {
                let ok = (USERNAME_LEN.0..=USERNAME_LEN.1).contains(&u.chars().count());
                if !ok {
                    errors.push("username", ErrorCode::Length, "Invalid username");
                }
                ok
            });

        let password = self.password.clone().filter(|p| !p.is_empty());
        if password.is_none() {
            errors.push("password", ErrorCode::Required, "Password is required");
        }

        match (username, password) {
            (Some(username), Some(password)) if errors.is_empty() => {
                Ok(ValidLogin { username, password })
            }
            _ => Err(errors),
        }
    }
}

/// Password policy: length, character classes and a short deny-list.
///
/// Returns the first failing rule's message.
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < PASSWORD_LEN.0 {
        return Err("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit");
    }
    if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
        return Err("Password is too common. Please choose a stronger password");
    }
    Ok(())
}

fn check_username(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    let username = required_text(raw, "username", "Username", errors)?;
    let len = username.chars().count();
    if !(USERNAME_LEN.0..=USERNAME_LEN.1).contains(&len) {
        errors.push(
            "username",
            ErrorCode::Length,
            "Username must be between 3 and 80 characters",
        );
        return None;
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        errors.push(
            "username",
            ErrorCode::InvalidFormat,
            "Username must contain only letters, numbers, and underscores",
        );
        return None;
    }
    Some(username)
}

fn check_email(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    let email = required_text(raw, "email", "Email", errors)?.to_lowercase();
    if !looks_like_email(&email) {
        errors.push("email", ErrorCode::InvalidFormat, "Invalid email address");
        return None;
    }
    if email.chars().count() > EMAIL_MAX_LEN {
        errors.push(
            "email",
            ErrorCode::Length,
            "Email must be less than 120 characters",
        );
        return None;
    }
    Some(email)
}

fn check_password(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    let Some(password) = raw.filter(|p| !p.is_empty()) else {
        errors.push("password", ErrorCode::Required, "Password is required");
        return None;
    };
    let len = password.chars().count();
    if !(PASSWORD_LEN.0..=PASSWORD_LEN.1).contains(&len) {
        errors.push(
            "password",
            ErrorCode::Length,
            "Password must be between 8 and 128 characters",
        );
        return None;
    }
    if let Err(message) = validate_password_strength(password) {
        errors.push("password", ErrorCode::WeakPassword, message);
        return None;
    }
    Some(password.to_string())
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}
