//! Process-wide session and auth-provider wiring.
//!
//! Created once at startup. The session id tags every log line of the run.

use uuid::Uuid;

use crate::config::AuthConfig;

/// One run of the client.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    auth: AuthConfig,
}

impl Session {
    pub fn start(auth: &AuthConfig) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            auth: auth.clone(),
        };
        if session.auth.enabled {
            tracing::info!(
                session_id = %session.id,
                client_id = %session.auth.client_id,
                domain = %session.auth.domain,
                "Auth provider configured"
            );
        }
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    /// Span to run the whole session under.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("session", session_id = %self.id)
    }
}
