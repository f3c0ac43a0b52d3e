//! Guestbook contract specifics: entry type, method names, built-in ABI.

pub mod binding;
pub mod entry;

pub use binding::{binding_from_config, default_binding, GET_ENTRIES, SIGN_GUESTBOOK};
pub use entry::{decode_entries, encode_entries, Entry, EntryLayout};
