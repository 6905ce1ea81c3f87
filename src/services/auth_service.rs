// ============================================================================
// AUTH SERVICE - /auth endpoints
// ============================================================================

use crate::error::ClientError;
use crate::models::{ApiEnvelope, AuthPayload, LoginRequest, RegisterPayload, RegisterRequest, User};
use crate::services::api_client::ApiClient;
use crate::utils::constants::{LOGIN_FAILED, REGISTRATION_FAILED};

/// `POST /auth/login`. Rejected credentials (401/400, or `success: false`)
/// come back as `InvalidCredentials` with the server's message.
pub async fn login(api: &ApiClient, request: &LoginRequest) -> Result<AuthPayload, ClientError> {
    api.post("/auth/login", request)
        .await
        .map_err(|e| as_credentials_error(e, LOGIN_FAILED))
}

/// `POST /auth/register`. The whole envelope comes back: a deferred
/// verification may carry only a message, or a profile without a token.
pub async fn register(
    api: &ApiClient,
    request: &RegisterRequest,
) -> Result<ApiEnvelope<RegisterPayload>, ClientError> {
    api.post_envelope("/auth/register", request)
        .await
        .map_err(|e| as_credentials_error(e, REGISTRATION_FAILED))
}

/// `GET /auth/me`, validates the stored token
pub async fn me(api: &ApiClient) -> Result<User, ClientError> {
    api.get::<User>("/auth/me").await.map(User::normalized)
}

/// `POST /auth/refresh`, exchanges the current token for a new one
pub async fn refresh(api: &ApiClient) -> Result<AuthPayload, ClientError> {
    api.post_empty("/auth/refresh").await
}

/// `POST /auth/logout` with a token captured before the local clear
pub async fn logout(api: &ApiClient, token: &str) -> Result<(), ClientError> {
    api.post_ack_as("/auth/logout", token).await
}

pub async fn forgot_password(api: &ApiClient, username_or_email: &str) -> Result<(), ClientError> {
    let path = format!(
        "/auth/forgot-password?usernameOrEmail={}",
        urlencoding::encode(username_or_email.trim())
    );
    api.post_ack(&path).await
}

pub async fn reset_password(
    api: &ApiClient,
    token: &str,
    new_password: &str,
) -> Result<(), ClientError> {
    let path = format!(
        "/auth/reset-password?token={}&newPassword={}",
        urlencoding::encode(token),
        urlencoding::encode(new_password)
    );
    api.post_ack(&path).await
}

pub async fn verify_email(api: &ApiClient, token: &str) -> Result<(), ClientError> {
    let path = format!("/auth/verify-email?token={}", urlencoding::encode(token));
    api.post_ack(&path).await
}

pub async fn resend_verification(
    api: &ApiClient,
    username_or_email: &str,
) -> Result<(), ClientError> {
    let path = format!(
        "/auth/resend-verification?usernameOrEmail={}",
        urlencoding::encode(username_or_email.trim())
    );
    api.post_ack(&path).await
}

fn as_credentials_error(error: ClientError, fallback: &str) -> ClientError {
    let message_or = |message: String| {
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    };
    match error {
        ClientError::Unauthorized(message) => ClientError::InvalidCredentials(message_or(message)),
        ClientError::ServerError {
            status: Some(status),
            message,
        } if (200..300).contains(&status) || status == 400 || status == 403 || status == 409 => {
            ClientError::InvalidCredentials(message_or(message))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transport::Method;
    use crate::testing::{block_on, FakeTransport};
    use crate::utils::storage::MemoryTokenStore;
    use serde_json::json;
    use std::rc::Rc;

    fn api(transport: &Rc<FakeTransport>) -> ApiClient {
        ApiClient::new("http://api.test/api", transport.clone(), Rc::new(MemoryTokenStore::new()))
    }

    #[test]
    fn login_maps_401_to_invalid_credentials() {
        let transport = FakeTransport::new();
        transport.reply(
            Method::Post,
            "/auth/login",
            401,
            json!({"success": false, "error": "Invalid username or password"}),
        );
        let request = LoginRequest {
            username: "demo".into(),
            password: "wrong-pass".into(),
        };

        let err = block_on(login(&api(&transport), &request)).unwrap_err();
        assert_eq!(
            err,
            ClientError::InvalidCredentials("Invalid username or password".into())
        );
    }

    #[test]
    fn register_conflict_is_user_correctable() {
        let transport = FakeTransport::new();
        transport.reply(
            Method::Post,
            "/auth/register",
            400,
            json!({"success": false, "error": "Username is already taken"}),
        );
        let request = RegisterRequest {
            username: "jane".into(),
            password: "longenough".into(),
            email: None,
            roles: vec![],
        };

        let err = block_on(register(&api(&transport), &request)).unwrap_err();
        assert_eq!(err.user_message(), "Username is already taken");
    }

    #[test]
    fn server_failure_during_login_stays_a_server_error() {
        let transport = FakeTransport::new();
        transport.reply(Method::Post, "/auth/login", 500, json!({}));
        let request = LoginRequest {
            username: "demo".into(),
            password: "demo123".into(),
        };

        let err = block_on(login(&api(&transport), &request)).unwrap_err();
        assert!(matches!(err, ClientError::ServerError { status: Some(500), .. }));
    }

    #[test]
    fn query_parameters_are_percent_encoded() {
        let transport = FakeTransport::new();
        transport.reply(Method::Post, "/auth/forgot-password", 200, json!({"success": true}));

        block_on(forgot_password(&api(&transport), "jane+test@example.com")).unwrap();
        assert_eq!(
            transport.last_request().unwrap().url,
            "http://api.test/api/auth/forgot-password?usernameOrEmail=jane%2Btest%40example.com"
        );
    }

    #[test]
    fn reset_password_encodes_token_and_password() {
        let transport = FakeTransport::new();
        transport.reply(Method::Post, "/auth/reset-password", 200, json!({"success": true}));

        block_on(reset_password(&api(&transport), "a/b=c", "new pass&1")).unwrap();
        assert_eq!(
            transport.last_request().unwrap().url,
            "http://api.test/api/auth/reset-password?token=a%2Fb%3Dc&newPassword=new%20pass%261"
        );
    }

    #[test]
    fn reset_password_surfaces_expired_token() {
        let transport = FakeTransport::new();
        transport.reply(
            Method::Post,
            "/auth/reset-password",
            400,
            json!({"success": false, "error": "Reset token has expired"}),
        );

        let err = block_on(reset_password(&api(&transport), "old", "longenough")).unwrap_err();
        assert_eq!(err, ClientError::server(400, "Reset token has expired"));
    }

    #[test]
    fn verify_email_sends_token_in_query() {
        let transport = FakeTransport::new();
        transport.reply(Method::Post, "/auth/verify-email", 200, json!({"success": true, "message": "Email verified"}));

        block_on(verify_email(&api(&transport), "v+1")).unwrap();
        let sent = transport.last_request().unwrap();
        assert_eq!(sent.method, Method::Post);
        assert_eq!(sent.url, "http://api.test/api/auth/verify-email?token=v%2B1");
        assert_eq!(sent.body, None);
    }

    #[test]
    fn resend_verification_trims_and_encodes_identifier() {
        let transport = FakeTransport::new();
        transport.reply(Method::Post, "/auth/resend-verification", 200, json!({"success": true}));

        block_on(resend_verification(&api(&transport), " jane doe@example.com ")).unwrap();
        assert_eq!(
            transport.last_request().unwrap().url,
            "http://api.test/api/auth/resend-verification?usernameOrEmail=jane%20doe%40example.com"
        );
    }

    #[test]
    fn register_without_data_is_still_a_success() {
        let transport = FakeTransport::new();
        transport.reply(
            Method::Post,
            "/auth/register",
            201,
            json!({"success": true, "message": "Please check your email"}),
        );
        let request = RegisterRequest {
            username: "jane".into(),
            password: "longenough".into(),
            email: None,
            roles: vec![],
        };

        let envelope = block_on(register(&api(&transport), &request)).unwrap();
        assert_eq!(envelope.data, None);
        assert_eq!(envelope.message.as_deref(), Some("Please check your email"));
    }

    #[test]
    fn me_normalizes_display_name() {
        let transport = FakeTransport::new();
        transport.reply(
            Method::Get,
            "/auth/me",
            200,
            json!({"success": true, "data": {"id": 1, "username": "demo"}}),
        );

        let user = block_on(me(&api(&transport))).unwrap();
        assert_eq!(user.name, "demo");
    }
}
