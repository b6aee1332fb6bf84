use std::fmt;

use serde::{Deserialize, Serialize};

/// States of the session gate.
///
/// A run starts in `Checking`: CHECKING → AWAITING_HUMAN → CHECKING → ... → AUTHENTICATED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginState {
    /// Probing the entry page for the sign-in control.
    Checking,
    /// The sign-in control was found; the operator must log in out-of-band.
    AwaitingHuman,
    /// A probe found no sign-in control. Terminal.
    Authenticated,
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginState::Checking => write!(f, "CHECKING"),
            LoginState::AwaitingHuman => write!(f, "AWAITING_HUMAN"),
            LoginState::Authenticated => write!(f, "AUTHENTICATED"),
        }
    }
}

/// Inputs that drive the session gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginEvent {
    SignInControlFound,
    SignInControlAbsent,
    OperatorConfirmed,
}

/// Tracks the gate's current state and every state it has left.
#[derive(Debug, Clone)]
pub struct LoginMachine {
    state: LoginState,
    history: Vec<LoginState>,
    prompts: u32,
}

impl Default for LoginMachine {
    fn default() -> Self {
        Self {
            state: LoginState::Checking,
            history: Vec::new(),
            prompts: 0,
        }
    }
}

impl LoginMachine {
    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn history(&self) -> &[LoginState] {
        &self.history
    }

    /// How many times the operator has been asked to log in.
    pub fn prompts(&self) -> u32 {
        self.prompts
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == LoginState::Authenticated
    }

    /// Apply an event and return the resulting state.
    ///
    /// Events that make no sense in the current state (a probe result while
    /// waiting for the operator, anything after authentication) leave the
    /// state untouched.
    pub fn next(&mut self, event: LoginEvent) -> LoginState {
        let next = match (self.state, event) {
            (LoginState::Checking, LoginEvent::SignInControlFound) => LoginState::AwaitingHuman,
            (LoginState::Checking, LoginEvent::SignInControlAbsent) => LoginState::Authenticated,
            (LoginState::AwaitingHuman, LoginEvent::OperatorConfirmed) => LoginState::Checking,
            (state, event) => {
                tracing::debug!(%state, ?event, "ignoring login event");
                return state;
            }
        };

        if next == LoginState::AwaitingHuman {
            self.prompts += 1;
        }
        self.history.push(self.state);
        self.state = next;
        next
    }
}
