// ============================================================================
// SESSION VIEWMODEL - Session lifecycle
// ============================================================================
// Single owner of SessionState. Every async operation captures the session
// epoch before its request and drops the response if the session was cleared
// meanwhile, so a late reply can never resurrect a signed-out session.
// ============================================================================

use std::future::Future;
use validator::Validate;

use crate::error::{ClientError, FormError};
use crate::models::{
    LoginRequest, RegisterOutcome, RegisterPayload, RegisterRequest, User, UserPatch,
};
use crate::services::api_client::ApiClient;
use crate::services::auth_service;
use crate::state::session_state::{Session, SessionState};
use crate::utils::constants::REGISTRATION_PENDING;

#[derive(Clone)]
pub struct SessionViewModel {
    api: ApiClient,
    state: SessionState,
}

impl SessionViewModel {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Session {
        self.state.get_session()
    }

    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.state.subscribe(callback);
    }

    /// Validates the persisted token with `GET /auth/me`. Any failure drops the
    /// token; `loading` is false when this returns, whatever happened.
    pub async fn initialize(&self) -> Option<User> {
        let token = match self.api.tokens().load() {
            Some(token) => token,
            None => {
                log::info!("🔐 [AUTH] No stored token");
                self.state.set_loading(false);
                return None;
            }
        };

        log::info!("🔐 [AUTH] Validating stored token...");
        self.state.begin_validation(token.clone());
        let epoch = self.state.epoch();

        let result = auth_service::me(&self.api).await;

        if self.state.epoch() != epoch {
            log::info!("🔐 [AUTH] Session changed during validation, result dropped");
            self.state.set_loading(false);
            return None;
        }

        match result {
            Ok(user) => {
                log::info!("✅ [AUTH] Session restored for {}", user.username);
                self.state.establish(token, user.clone());
                Some(user)
            }
            Err(e) => {
                log::warn!("⚠️ [AUTH] Stored token rejected: {}", e);
                self.forget_token(&token);
                self.state.clear();
                None
            }
        }
    }

    /// Client-side validation first; the server is only asked for well-formed input.
    /// Prior state is untouched on failure.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<User, ClientError> {
        let request = LoginRequest {
            username: identifier.trim().to_string(),
            password: secret.to_string(),
        };
        request.validate().map_err(FormError::from)?;

        log::info!("🔐 [AUTH] Signing in {}", request.username);
        let epoch = self.state.epoch();
        let payload = auth_service::login(&self.api, &request).await?;

        if self.state.epoch() != epoch {
            log::info!("🔐 [AUTH] Session changed during sign-in, result dropped");
            return Err(ClientError::Superseded);
        }

        let (token, user) = payload.into_parts();
        self.adopt(token, user.clone())?;
        log::info!("✅ [AUTH] Signed in as {}", user.username);
        Ok(user)
    }

    /// Clears the token and user right away (before the returned future is
    /// polled), then tells the server best-effort.
    pub fn logout(&self) -> impl Future<Output = ()> + 'static {
        let token = self.state.get_token().or_else(|| self.api.tokens().load());
        log::info!("👋 [AUTH] Signing out");
        self.expire();

        let api = self.api.clone();
        async move {
            if let Some(token) = token {
                if let Err(e) = auth_service::logout(&api, &token).await {
                    log::warn!("⚠️ [AUTH] Server logout failed (ignored): {}", e);
                }
            }
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<RegisterOutcome, ClientError> {
        let request = RegisterRequest {
            username: request.username.trim().to_string(),
            email: request
                .email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            ..request
        };
        request.validate().map_err(FormError::from)?;

        log::info!("📝 [AUTH] Registering {}", request.username);
        let epoch = self.state.epoch();
        let envelope = auth_service::register(&self.api, &request).await?;

        if self.state.epoch() != epoch {
            return Err(ClientError::Superseded);
        }

        let notice = envelope
            .reason()
            .unwrap_or(REGISTRATION_PENDING)
            .to_string();
        match envelope.data {
            Some(RegisterPayload::Session(auth)) => {
                let (token, user) = auth.into_parts();
                self.adopt(token, user.clone())?;
                log::info!("✅ [AUTH] Registered and signed in as {}", user.username);
                Ok(RegisterOutcome::Authenticated(user))
            }
            Some(RegisterPayload::Profile(user)) => {
                log::info!("📧 [AUTH] {} registered, verification pending", user.username);
                Ok(RegisterOutcome::VerificationRequired(notice))
            }
            None => {
                log::info!("📧 [AUTH] {} registered, verification pending", request.username);
                Ok(RegisterOutcome::VerificationRequired(notice))
            }
        }
    }

    /// Exchanges the current token for a fresh one. A rejected refresh ends
    /// the session like a rejected validation does.
    pub async fn refresh(&self) -> Result<User, ClientError> {
        let token = match self.state.get_token() {
            Some(token) => token,
            None => return Err(ClientError::ValidationFailed("No active session".to_string())),
        };

        let epoch = self.state.epoch();
        let result = auth_service::refresh(&self.api).await;

        if self.state.epoch() != epoch {
            return Err(ClientError::Superseded);
        }

        match result {
            Ok(payload) => {
                let (token, user) = payload.into_parts();
                self.adopt(token, user.clone())?;
                log::info!("🔄 [AUTH] Token refreshed");
                Ok(user)
            }
            Err(ClientError::Unauthorized(message)) => Err(ClientError::Unauthorized(message)),
            Err(e) => {
                log::warn!("⚠️ [AUTH] Token refresh failed: {}", e);
                self.forget_token(&token);
                self.state.clear();
                Err(ClientError::ValidationFailed(e.to_string()))
            }
        }
    }

    /// Local edit of the current user; no-op when signed out
    pub fn update_user(&self, patch: UserPatch) -> bool {
        self.state.patch_user(patch)
    }

    /// Local clear used on logout and on an unauthorized signal. Idempotent.
    pub fn expire(&self) -> bool {
        if let Err(e) = self.api.tokens().clear() {
            log::error!("❌ [AUTH] Could not clear stored token: {}", e);
        }
        self.state.clear()
    }

    /// Installs a dummy session without talking to the server
    #[cfg(feature = "dev-bypass")]
    pub fn dev_bypass(&self) -> User {
        use crate::utils::constants::{DEV_BYPASS_EMAIL, DEV_BYPASS_NAME, DEV_BYPASS_TOKEN};

        log::warn!("🚧 [AUTH] Dev bypass login");
        let user = User {
            id: None,
            username: DEV_BYPASS_EMAIL.to_string(),
            name: DEV_BYPASS_NAME.to_string(),
            email: Some(DEV_BYPASS_EMAIL.to_string()),
            roles: vec!["ROLE_USER".to_string()],
        };
        if let Err(e) = self.api.tokens().save(DEV_BYPASS_TOKEN) {
            log::warn!("⚠️ [AUTH] Dev token not persisted: {}", e);
        }
        self.state.establish(DEV_BYPASS_TOKEN.to_string(), user.clone());
        user
    }

    fn adopt(&self, token: String, user: User) -> Result<(), ClientError> {
        if token.trim().is_empty() {
            return Err(ClientError::ServerError {
                status: None,
                message: "Response contained no token".to_string(),
            });
        }
        if let Err(e) = self.api.tokens().save(&token) {
            log::warn!("⚠️ [AUTH] Token not persisted, kept for this page only: {}", e);
        }
        self.state.establish(token, user);
        Ok(())
    }

    fn forget_token(&self, token: &str) {
        let tokens = self.api.tokens();
        if tokens.load().as_deref() == Some(token) {
            if let Err(e) = tokens.clear() {
                log::error!("❌ [AUTH] Could not clear stored token: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transport::Method;
    use crate::testing::{block_on, FakeTransport, LocalRuntime};
    use crate::utils::storage::{MemoryTokenStore, MirroredTokenStore, StorageError, TokenStore};
    use serde_json::json;
    use std::rc::Rc;

    fn setup(token: Option<&str>) -> (SessionViewModel, Rc<FakeTransport>, Rc<MemoryTokenStore>) {
        let transport = FakeTransport::new();
        let tokens = Rc::new(match token {
            Some(token) => MemoryTokenStore::with_token(token),
            None => MemoryTokenStore::new(),
        });
        let api = ApiClient::new("http://api.test/api", transport.clone(), tokens.clone());
        (SessionViewModel::new(api), transport, tokens)
    }

    fn demo_login_reply(transport: &FakeTransport) {
        transport.reply(
            Method::Post,
            "/auth/login",
            200,
            json!({"success": true, "data": {"token": "tok-1", "username": "demo", "roles": ["ROLE_USER"]}}),
        );
    }

    #[test]
    fn login_populates_user_and_persists_token() {
        let (vm, transport, tokens) = setup(None);
        demo_login_reply(&transport);

        let user = block_on(vm.login("demo", "demo123")).unwrap();

        assert_eq!(user.name, "demo");
        assert_eq!(vm.session().user.map(|u| u.name).as_deref(), Some("demo"));
        assert_eq!(tokens.load().as_deref(), Some("tok-1"));
    }

    #[test]
    fn logout_clears_before_the_server_is_told() {
        let (vm, transport, tokens) = setup(None);
        demo_login_reply(&transport);
        transport.reply(Method::Post, "/auth/logout", 500, json!({}));
        block_on(vm.login("demo", "demo123")).unwrap();

        let notify = vm.logout();
        assert_eq!(vm.session().user, None);
        assert_eq!(tokens.load(), None);

        block_on(notify);
        assert_eq!(transport.calls(Method::Post, "/auth/logout"), 1);
        assert_eq!(
            transport.last_request().unwrap().header("Authorization"),
            Some("Bearer tok-1")
        );
        assert_eq!(vm.session().user, None);
    }

    #[test]
    fn invalid_form_never_reaches_the_network() {
        let (vm, transport, _) = setup(None);

        let err = block_on(vm.login("", "123")).unwrap_err();

        assert!(matches!(err, ClientError::FormValidation(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn rejected_login_keeps_prior_state() {
        let (vm, transport, tokens) = setup(None);
        transport.reply(
            Method::Post,
            "/auth/login",
            401,
            json!({"success": false, "error": "Invalid username or password"}),
        );
        vm.state().set_loading(false);
        let before = vm.session();

        let err = block_on(vm.login("demo", "wrong-pass")).unwrap_err();

        assert_eq!(err.user_message(), "Invalid username or password");
        assert_eq!(vm.session(), before);
        assert_eq!(tokens.load(), None);
    }

    #[test]
    fn initialize_without_token_just_stops_loading() {
        let (vm, transport, _) = setup(None);
        assert!(vm.session().loading);

        assert_eq!(block_on(vm.initialize()), None);

        assert!(!vm.session().loading);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn initialize_with_valid_token_restores_user() {
        let (vm, transport, tokens) = setup(Some("tok-1"));
        transport.reply(
            Method::Get,
            "/auth/me",
            200,
            json!({"success": true, "data": {"id": 1, "username": "demo", "email": "demo@example.com"}}),
        );

        let user = block_on(vm.initialize()).unwrap();

        let session = vm.session();
        assert!(!session.loading);
        assert_eq!(session.user, Some(user));
        assert_eq!(session.token.as_deref(), Some("tok-1"));
        assert_eq!(tokens.load().as_deref(), Some("tok-1"));
    }

    #[test]
    fn initialize_with_rejected_token_clears_it() {
        let (vm, transport, tokens) = setup(Some("stale"));
        transport.reply(Method::Get, "/auth/me", 401, json!({"success": false, "error": "User not authenticated"}));

        assert_eq!(block_on(vm.initialize()), None);

        let session = vm.session();
        assert!(!session.loading);
        assert_eq!(session.user, None);
        assert_eq!(session.token, None);
        assert_eq!(tokens.load(), None);
    }

    #[test]
    fn initialize_network_failure_also_clears_token() {
        let (vm, transport, tokens) = setup(Some("tok-1"));
        transport.fail(Method::Get, "/auth/me", "offline");

        assert_eq!(block_on(vm.initialize()), None);

        assert!(!vm.session().loading);
        assert_eq!(tokens.load(), None);
    }

    #[test]
    fn late_validation_cannot_resurrect_an_expired_session() {
        let (vm, transport, tokens) = setup(Some("tok-1"));
        let reply = transport.defer(Method::Get, "/auth/me");
        let mut runtime = LocalRuntime::new();
        let task_vm = vm.clone();
        let result = runtime.spawn_with_result(async move { task_vm.initialize().await });
        runtime.run_until_stalled();

        assert!(vm.expire());
        reply.respond(200, json!({"success": true, "data": {"username": "demo"}}));
        runtime.run_until_stalled();

        assert_eq!(*result.borrow(), Some(None));
        let session = vm.session();
        assert_eq!(session.user, None);
        assert!(!session.loading);
        assert_eq!(tokens.load(), None);
    }

    #[test]
    fn register_with_token_signs_in() {
        let (vm, transport, tokens) = setup(None);
        transport.reply(
            Method::Post,
            "/auth/register",
            201,
            json!({"success": true, "data": {"token": "tok-9", "username": "jane"}}),
        );
        let request = RegisterRequest {
            username: " jane ".into(),
            password: "longenough".into(),
            email: Some("jane@example.com".into()),
            roles: vec![],
        };

        let outcome = block_on(vm.register(request)).unwrap();

        assert!(matches!(outcome, RegisterOutcome::Authenticated(ref u) if u.username == "jane"));
        assert_eq!(tokens.load().as_deref(), Some("tok-9"));
        let body: serde_json::Value =
            serde_json::from_str(transport.last_request().unwrap().body.as_deref().unwrap()).unwrap();
        assert_eq!(body["username"], "jane");
    }

    #[test]
    fn register_without_token_requires_verification() {
        let (vm, transport, tokens) = setup(None);
        transport.reply(
            Method::Post,
            "/auth/register",
            201,
            json!({"success": true, "message": "User registered successfully", "data": {"id": 3, "username": "jane"}}),
        );
        let request = RegisterRequest {
            username: "jane".into(),
            password: "longenough".into(),
            email: None,
            roles: vec![],
        };

        let outcome = block_on(vm.register(request)).unwrap();

        assert_eq!(
            outcome,
            RegisterOutcome::VerificationRequired("User registered successfully".to_string())
        );
        assert_eq!(vm.session().user, None);
        assert_eq!(tokens.load(), None);
    }

    #[test]
    fn register_message_only_reply_requires_verification() {
        let (vm, transport, tokens) = setup(None);
        transport.reply(
            Method::Post,
            "/auth/register",
            201,
            json!({"success": true, "message": "Check your inbox to verify your email"}),
        );
        let request = RegisterRequest {
            username: "jane".into(),
            password: "longenough".into(),
            email: Some("jane@example.com".into()),
            roles: vec![],
        };

        let outcome = block_on(vm.register(request)).unwrap();

        assert_eq!(
            outcome,
            RegisterOutcome::VerificationRequired("Check your inbox to verify your email".to_string())
        );
        assert_eq!(vm.session().user, None);
        assert_eq!(tokens.load(), None);
    }

    #[test]
    fn register_without_server_message_uses_default_notice() {
        let (vm, transport, _) = setup(None);
        transport.reply(Method::Post, "/auth/register", 201, json!({"success": true, "data": {"id": 3, "username": "jane"}}));
        let request = RegisterRequest {
            username: "jane".into(),
            password: "longenough".into(),
            email: None,
            roles: vec![],
        };

        let outcome = block_on(vm.register(request)).unwrap();

        assert_eq!(
            outcome,
            RegisterOutcome::VerificationRequired(REGISTRATION_PENDING.to_string())
        );
    }

    /// Browser storage that refuses every write (quota exceeded, private mode)
    struct RefusingStore;

    impl TokenStore for RefusingStore {
        fn load(&self) -> Option<String> {
            None
        }

        fn save(&self, _token: &str) -> Result<(), StorageError> {
            Err(StorageError::Write("QuotaExceededError".into()))
        }

        fn clear(&self) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn unpersisted_token_still_authenticates_requests() {
        let transport = FakeTransport::new();
        let tokens = Rc::new(MirroredTokenStore::new(RefusingStore));
        let api = ApiClient::new("http://api.test/api", transport.clone(), tokens.clone());
        let vm = SessionViewModel::new(api.clone());
        demo_login_reply(&transport);
        transport.reply(Method::Get, "/budgets/dashboard", 200, json!({"success": true, "data": {}}));

        block_on(vm.login("demo", "demo123")).unwrap();
        assert_eq!(vm.session().token.as_deref(), Some("tok-1"));

        block_on(api.get::<serde_json::Value>("/budgets/dashboard")).unwrap();
        assert_eq!(
            transport.last_request().unwrap().header("Authorization"),
            Some("Bearer tok-1")
        );
        assert_eq!(api.unauthorized_signal().raised_count(), 0);

        let _notify = vm.logout();
        assert_eq!(tokens.load(), None);
    }

    #[test]
    fn refresh_replaces_the_token() {
        let (vm, transport, tokens) = setup(None);
        demo_login_reply(&transport);
        transport.reply(
            Method::Post,
            "/auth/refresh",
            200,
            json!({"success": true, "data": {"token": "tok-2", "username": "demo"}}),
        );
        block_on(vm.login("demo", "demo123")).unwrap();

        block_on(vm.refresh()).unwrap();

        assert_eq!(tokens.load().as_deref(), Some("tok-2"));
        assert_eq!(vm.session().token.as_deref(), Some("tok-2"));
        assert_eq!(
            transport.last_request().unwrap().header("Authorization"),
            Some("Bearer tok-1")
        );
    }

    #[test]
    fn failed_refresh_ends_the_session() {
        let (vm, transport, tokens) = setup(None);
        demo_login_reply(&transport);
        transport.reply(Method::Post, "/auth/refresh", 500, json!({}));
        block_on(vm.login("demo", "demo123")).unwrap();

        let err = block_on(vm.refresh()).unwrap_err();

        assert!(matches!(err, ClientError::ValidationFailed(_)));
        assert_eq!(vm.session().user, None);
        assert_eq!(tokens.load(), None);
    }

    #[test]
    fn update_user_merges_locally() {
        let (vm, transport, _) = setup(None);
        demo_login_reply(&transport);
        block_on(vm.login("demo", "demo123")).unwrap();
        let requests_before = transport.requests().len();

        assert!(vm.update_user(UserPatch {
            name: Some("Demo User".into()),
            ..UserPatch::default()
        }));

        assert_eq!(vm.session().user.unwrap().name, "Demo User");
        assert_eq!(transport.requests().len(), requests_before);
    }

    #[cfg(feature = "dev-bypass")]
    #[test]
    fn dev_bypass_installs_dummy_session() {
        let (vm, transport, tokens) = setup(None);

        let user = vm.dev_bypass();

        assert_eq!(user.name, "Dev User");
        assert_eq!(tokens.load().as_deref(), Some("dev-bypass-token"));
        assert!(transport.requests().is_empty());
    }
}
