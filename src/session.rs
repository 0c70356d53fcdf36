//! Session lookup and the context the dispatcher branches on.

use serde::{Deserialize, Serialize};

use crate::gateway::RequestGateway;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeResponse {
    #[serde(default)]
    pub user: Option<User>,
}

/// Session context injected into the dispatcher. The authenticated branch of
/// dispatch is a function of this value, never of ambient global state.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub user: Option<User>,
}

impl SessionContext {
    pub fn signed_in(user: User) -> SessionContext {
        SessionContext { user: Some(user) }
    }

    pub fn authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Fetches the current session. Any failure means "not signed in"; the
/// error is logged and swallowed.
pub fn fetch_session(gateway: &RequestGateway) -> SessionContext {
    match gateway.session() {
        Ok(me) => SessionContext { user: me.user },
        Err(err) => {
            log::debug!("session lookup failed: {err}");
            SessionContext::default()
        }
    }
}
