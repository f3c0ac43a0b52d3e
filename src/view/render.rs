//! Text view over client snapshots.

use std::fmt::Write as _;

use crate::client::{
    ChainClient, ClientSnapshot, ConnectionState, GuestbookError, SubmissionState, SubmitOutcome,
};
use crate::view::form::{Field, FormDraft};

pub const TITLE: &str = "Universal Declaration of Peace";
pub const LOADING: &str = "Loading contract...";
pub const NO_ENTRIES: &str = "No entries yet. Be the first to sign!";
pub const SUBMIT_LABEL: &str = "Sign guestbook";
pub const SIGNING_LABEL: &str = "Signing...";

/// Presentation state: the form draft plus the last action notice.
#[derive(Debug, Clone, Default)]
pub struct GuestbookView {
    draft: FormDraft,
    extended: bool,
    notice: Option<String>,
}

impl GuestbookView {
    /// `extended` selects the form variant with email, country and signature.
    pub fn new(extended: bool) -> Self {
        Self {
            extended,
            ..Self::default()
        }
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Edit a field. Ignored while inputs are disabled.
    pub fn set_field(&mut self, snapshot: &ClientSnapshot, field: Field, value: &str) -> bool {
        if inputs_disabled(snapshot) {
            return false;
        }
        self.draft.set(field, value);
        true
    }

    /// Reset the draft. Connection state is not touched.
    pub fn clear(&mut self) {
        self.draft.clear();
        self.notice = None;
    }

    /// Submit the draft through `client`.
    ///
    /// Does nothing while the submit control is disabled. On success the
    /// draft is cleared; on failure it is kept so the user can retry.
    pub async fn submit(&mut self, client: &ChainClient) -> Result<SubmitOutcome, GuestbookError> {
        let snapshot = client.snapshot();
        if snapshot.submission.is_in_flight() {
            return Ok(SubmitOutcome::Ignored);
        }
        if let Err(failure) = self.draft.validate(self.extended) {
            let err = GuestbookError::Validation(failure);
            self.notice = Some(err.to_string());
            return Err(err);
        }

        let result = client
            .sign_guestbook(&self.draft.name, &self.draft.message)
            .await;
        match result {
            Ok(SubmitOutcome::Confirmed { tx, block_number }) => {
                self.draft.clear();
                self.notice = Some(format!("Signed in block {} (tx {})", block_number, tx));
                Ok(SubmitOutcome::Confirmed { tx, block_number })
            }
            Ok(SubmitOutcome::Ignored) => Ok(SubmitOutcome::Ignored),
            Err(err) => {
                self.notice = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Render the whole screen.
    pub fn render(&self, snapshot: &ClientSnapshot) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", TITLE);
        let _ = writeln!(out, "{}", "=".repeat(TITLE.len()));

        match &snapshot.connection {
            ConnectionState::Disconnected | ConnectionState::Connecting => {
                let _ = writeln!(out, "{}", LOADING);
                return out;
            }
            ConnectionState::Ready(handle) => {
                let _ = writeln!(
                    out,
                    "Connected as {} on chain {}",
                    handle.account, handle.chain_id
                );
            }
            ConnectionState::WrongNetwork { .. } | ConnectionState::Failed(_) => {}
        }

        if let Some(error) = &snapshot.error {
            let _ = writeln!(out, "Error: {}", error);
        }
        if let Some(notice) = &self.notice {
            if snapshot.error.as_ref().map(|e| &e.message) != Some(notice) {
                let _ = writeln!(out, "{}", notice);
            }
        }

        let _ = writeln!(out);
        let lock = if inputs_disabled(snapshot) { " (locked)" } else { "" };
        for field in FormDraft::required_fields(self.extended) {
            let _ = writeln!(out, "{:>9}: {}{}", field.label(), self.draft.get(*field), lock);
        }
        let _ = writeln!(
            out,
            "[ {} ]{}",
            submit_label(snapshot),
            if submit_enabled(snapshot) { "" } else { " (disabled)" }
        );

        let _ = writeln!(out);
        if snapshot.entries.is_empty() {
            let _ = writeln!(out, "{}", NO_ENTRIES);
        } else {
            for entry in &snapshot.entries {
                let _ = writeln!(out, "- {}", entry);
            }
        }
        out
    }
}

/// Submit is allowed only when connected and nothing is in flight.
pub fn submit_enabled(snapshot: &ClientSnapshot) -> bool {
    snapshot.connection.is_ready() && snapshot.submission.is_idle()
}

/// Inputs are locked while a submission is pending or confirming.
pub fn inputs_disabled(snapshot: &ClientSnapshot) -> bool {
    snapshot.submission.is_in_flight()
}

pub fn submit_label(snapshot: &ClientSnapshot) -> &'static str {
    match snapshot.submission {
        SubmissionState::Pending(_) | SubmissionState::Confirming(_) => SIGNING_LABEL,
        _ => SUBMIT_LABEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ErrorKind, FailureReason};
    use crate::guestbook::Entry;

    #[test]
    fn test_loading_screen() {
        let view = GuestbookView::new(false);
        let screen = view.render(&ClientSnapshot::default());
        assert!(screen.contains(LOADING));
        assert!(!screen.contains(SUBMIT_LABEL));
    }

    #[test]
    fn test_error_banner_without_connection() {
        let view = GuestbookView::new(false);
        let reason = FailureReason {
            kind: ErrorKind::EnvironmentMissing,
            message: "No wallet found: install a wallet".to_string(),
        };
        let snapshot = ClientSnapshot {
            connection: ConnectionState::Failed(reason.clone()),
            error: Some(reason),
            ..ClientSnapshot::default()
        };
        let screen = view.render(&snapshot);
        assert!(screen.contains("Error: No wallet found"));
        assert!(screen.contains("(disabled)"));
    }

    #[test]
    fn test_pending_locks_inputs() {
        let mut view = GuestbookView::new(false);
        let snapshot = ClientSnapshot {
            submission: SubmissionState::Pending(Entry::new("Ana", "Paz")),
            ..ClientSnapshot::default()
        };
        assert!(inputs_disabled(&snapshot));
        assert!(!submit_enabled(&snapshot));
        assert_eq!(submit_label(&snapshot), SIGNING_LABEL);
        assert!(!view.set_field(&snapshot, Field::Name, "Bo"));
        assert_eq!(view.draft().name, "");
    }

    #[test]
    fn test_clear_resets_draft() {
        let mut view = GuestbookView::new(true);
        let snapshot = ClientSnapshot::default();
        assert!(view.set_field(&snapshot, Field::Country, "UY"));
        view.clear();
        assert_eq!(view.draft(), &FormDraft::default());
    }
}
