//! Terminal view: renders client snapshots and turns user input into client
//! operations.

pub mod form;
pub mod render;

pub use form::{Field, FormDraft};
pub use render::{inputs_disabled, submit_enabled, submit_label, GuestbookView};
