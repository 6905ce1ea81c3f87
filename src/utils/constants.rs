/// localStorage key holding the bearer token
pub const TOKEN_STORAGE_KEY: &str = "token";

pub const DASHBOARD_LOAD_ERROR: &str = "Failed to load dashboard data";
pub const ADD_EXPENSE_ERROR: &str = "Failed to add transaction. Please check your input.";
pub const CATEGORIES_LOAD_ERROR: &str = "Failed to load categories";

/// Generic fallback when the server gives no usable reason
pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const REGISTRATION_PENDING: &str =
    "Registration successful. Please check your email to verify your account.";

#[cfg(feature = "dev-bypass")]
pub const DEV_BYPASS_TOKEN: &str = "dev-bypass-token";
#[cfg(feature = "dev-bypass")]
pub const DEV_BYPASS_EMAIL: &str = "dev@bypass.com";
#[cfg(feature = "dev-bypass")]
pub const DEV_BYPASS_NAME: &str = "Dev User";
