//! Login and Signup Flows

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::client::ApiClient;
use crate::error::{ApiError, FormError};
use crate::models::User;
use crate::transport::Transport;

pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
pub const SIGNUP_FAILED: &str = "Signup failed. Please try again.";

/// Token and identity handed to the session on success
#[derive(Debug, Clone, PartialEq)]
pub struct AuthGrant {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Validation problems are shown verbatim, backend failures generically
    pub fn message(&self, failed: &str) -> String {
        match self {
            AuthError::Form(e) => e.to_string(),
            AuthError::Api(_) => failed.to_string(),
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
}

/// `local@domain.tld` shape check
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub organization_name: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), FormError> {
        if !is_valid_email(&self.email) {
            return Err(FormError::InvalidEmail);
        }
        if self.password.is_empty() {
            return Err(FormError::Missing("password"));
        }
        if self.organization_name.trim().is_empty() {
            return Err(FormError::Missing("organization name"));
        }
        Ok(())
    }
}

/// Exchange credentials for a token, then ask who we are.
///
/// An unreachable `/auth/me` does not fail the login; the user then only
/// carries the email that was typed.
pub async fn login<T: Transport>(
    client: &mut ApiClient<T>,
    email: &str,
    password: &str,
) -> Result<AuthGrant, AuthError> {
    let token = client.login(email, password).await?.access_token;
    client.set_token(Some(token.clone()));
    let user = match client.me().await {
        Ok(user) => user,
        Err(e) => {
            log::warn!("[AUTH] identity lookup failed: {}", e);
            User::from_email(email)
        }
    };
    Ok(AuthGrant { token, user })
}

/// Register, then obtain a token.
///
/// The backend answers signup with the created user; when no token comes
/// back the same credentials are used to log in.
pub async fn signup<T: Transport>(
    client: &mut ApiClient<T>,
    form: &SignupForm,
) -> Result<AuthGrant, AuthError> {
    form.validate()?;
    let created = client
        .signup(&form.email, &form.password, form.organization_name.trim())
        .await?;

    let token = match created.access_token {
        Some(token) => token,
        None => client.login(&form.email, &form.password).await?.access_token,
    };
    let user = User {
        id: created.id.unwrap_or(0),
        email: created.email.unwrap_or_else(|| form.email.clone()),
        organization_id: created.organization_id,
    };
    client.set_token(Some(token.clone()));
    Ok(AuthGrant { token, user })
}
