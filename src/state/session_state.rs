// ============================================================================
// SESSION STATE - Token, user and loading flag
// ============================================================================
// Only SessionViewModel mutates this; everything else reads or subscribes.
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use crate::models::{User, UserPatch};
use crate::state::reactivity::ReactiveState;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
    /// True only while the stored token is being validated at startup
    pub loading: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn is_populated(&self) -> bool {
        self.token.is_some() || self.user.is_some()
    }
}

#[derive(Clone)]
pub struct SessionState {
    session: ReactiveState<Session>,
    epoch: Rc<Cell<u64>>,
}

impl SessionState {
    /// Starts empty and loading: the first render waits for `initialize`
    pub fn new() -> Self {
        Self {
            session: ReactiveState::new(Session {
                loading: true,
                ..Session::default()
            }),
            epoch: Rc::new(Cell::new(0)),
        }
    }

    pub fn get_session(&self) -> Session {
        self.session.get()
    }

    pub fn get_user(&self) -> Option<User> {
        self.session.with(|s| s.user.clone())
    }

    pub fn get_token(&self) -> Option<String> {
        self.session.with(|s| s.token.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.session.with(|s| s.loading)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.with(Session::is_authenticated)
    }

    /// Changes every time a populated session is cleared
    pub fn epoch(&self) -> u64 {
        self.epoch.get()
    }

    pub fn set_loading(&self, loading: bool) {
        self.session.update(|s| s.loading = loading);
    }

    /// Token known, user not validated yet
    pub fn begin_validation(&self, token: String) {
        self.session.update(|s| {
            s.token = Some(token);
            s.loading = true;
        });
    }

    pub fn establish(&self, token: String, user: User) {
        self.session.update(|s| {
            s.token = Some(token);
            s.user = Some(user);
            s.loading = false;
        });
    }

    /// Empties the session; returns whether anything was there
    pub fn clear(&self) -> bool {
        let populated = self.session.with(Session::is_populated);
        if populated {
            self.epoch.set(self.epoch.get() + 1);
        }
        self.session.update(|s| {
            s.token = None;
            s.user = None;
            s.loading = false;
        });
        populated
    }

    /// Returns false when there is no user to patch
    pub fn patch_user(&self, patch: UserPatch) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        self.session.update(|s| {
            if let Some(user) = s.user.as_mut() {
                user.apply(patch);
            }
        });
        true
    }

    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.session.subscribe(callback);
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
