//! Session mode resolution.
//!
//! Watches the auth provider's state stream and decides which persistence
//! backend is active. Guest is only entered from a signed-out state while no
//! login interaction is underway; an authenticated event always wins and
//! overrides any pending login UI. Mode changes are the sole trigger for a
//! backend switch.

use tokio::sync::watch;

use crate::backend::AuthState;

/// Which persistence backend the task store should be using.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionMode {
    Guest,
    Authenticated { uid: String },
}

/// Folds auth events into the current session mode.
pub struct SessionResolver {
    state_rx: watch::Receiver<AuthState>,
    mode: SessionMode,
    login_in_progress: bool,
}

impl SessionResolver {
    pub fn new(state_rx: watch::Receiver<AuthState>) -> Self {
        let mut resolver = Self {
            state_rx,
            mode: SessionMode::Guest,
            login_in_progress: false,
        };
        let initial = resolver.state_rx.borrow_and_update().clone();
        resolver.apply(&initial);
        resolver
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    /// Mark that the login form is open; suppresses the signed-out to guest
    /// transition until the attempt resolves or is cancelled.
    pub fn begin_login(&mut self) {
        self.login_in_progress = true;
    }

    pub fn cancel_login(&mut self) {
        self.login_in_progress = false;
    }

    /// Fold one auth event into the current mode. Returns the new mode only
    /// when it changed.
    pub fn apply(&mut self, state: &AuthState) -> Option<SessionMode> {
        let next = match state {
            AuthState::Authenticated(user) => {
                self.login_in_progress = false;
                SessionMode::Authenticated { uid: user.uid.clone() }
            }
            AuthState::SignedOut if !self.login_in_progress => SessionMode::Guest,
            AuthState::SignedOut => return None,
        };
        if next == self.mode {
            return None;
        }
        self.mode = next.clone();
        Some(next)
    }

    /// Wait for the next auth event and fold it in. Returns `None` when the
    /// event did not change the mode, and also when the stream has closed; a
    /// closed or errored stream leaves the previous mode in place.
    pub async fn next_mode_change(&mut self) -> Option<SessionMode> {
        if self.state_rx.changed().await.is_err() {
            return None;
        }
        let state = self.state_rx.borrow_and_update().clone();
        self.apply(&state)
    }
}
