use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidateEmail, ValidationError};

/// Body of `POST /auth/login`. The backend expects the identifier under `username`
/// even when it is an email address.
#[derive(Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = "validate_identifier"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /auth/register`
#[derive(Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(email(message = "Email must be valid"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("roles", &self.roles)
            .finish()
    }
}

/// Username (letters, digits, `_` or `-`, at least 3) or an email address
fn validate_identifier(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(identifier_error("Username or email is required"));
    }
    if ValidateEmail::validate_email(&value) || looks_like_username(value) {
        Ok(())
    } else {
        Err(identifier_error("Please enter a valid username or email"))
    }
}

fn identifier_error(message: &'static str) -> ValidationError {
    let mut error = ValidationError::new("identifier");
    error.message = Some(Cow::Borrowed(message));
    error
}

fn looks_like_username(value: &str) -> bool {
    value.chars().count() >= 3
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Authenticated user as shown by the UI
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, alias = "userUsername")]
    pub username: String,
    /// Display name, falls back to `username`
    #[serde(default, alias = "displayName")]
    pub name: String,
    #[serde(default, alias = "userEmail")]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl User {
    /// Fills the display name from the username (or email) when the server omitted it
    pub fn normalized(mut self) -> Self {
        if self.username.trim().is_empty() {
            if let Some(email) = &self.email {
                self.username = email.clone();
            }
        }
        if self.name.trim().is_empty() {
            self.name = self.username.clone();
        }
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Shallow merge of locally edited fields
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = Some(email);
        }
        if let Some(roles) = patch.roles {
            self.roles = roles;
        }
    }
}

/// Optimistic local edit of the current user (no round trip)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub roles: Option<Vec<String>>,
}

/// `data` of a successful login/refresh: the token plus the user, either flat
/// (`username`, `email`, `roles`) or nested under `user`
#[derive(Clone, PartialEq, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    #[serde(default, rename = "type")]
    pub token_type: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl std::fmt::Debug for AuthPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthPayload")
            .field("token", &"<redacted>")
            .field("username", &self.username)
            .field("roles", &self.roles)
            .finish()
    }
}

impl AuthPayload {
    pub fn into_parts(self) -> (String, User) {
        let user = match self.user {
            Some(user) => user,
            None => User {
                id: None,
                username: self.username,
                name: String::new(),
                email: self.email,
                roles: self.roles,
            },
        };
        (self.token, user.normalized())
    }
}

/// `data` of `POST /auth/register`: either an immediate session or a bare profile
/// (account created, verification pending)
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RegisterPayload {
    Session(AuthPayload),
    Profile(User),
}

/// What a successful registration led to; the caller decides where to route
#[derive(Clone, Debug, PartialEq)]
pub enum RegisterOutcome {
    Authenticated(User),
    VerificationRequired(String),
}
