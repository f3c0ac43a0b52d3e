//! Guestbook client library.
//!
//! Connects a wallet to the on-chain guestbook contract, reads its entries
//! and signs new ones.

pub mod blockchain;
pub mod client;
pub mod config;
pub mod guestbook;
pub mod lifecycle;
pub mod observability;
pub mod session;
pub mod view;

pub use client::{ChainClient, ChainClientSettings, GuestbookError};
pub use config::GuestbookConfig;
pub use guestbook::Entry;
pub use view::GuestbookView;
