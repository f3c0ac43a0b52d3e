//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Apply overrides → Validate → Session → Wallet → Client
//!
//! Shutdown (shutdown.rs):
//!     ctrl-c → broadcast → interactive loop exits
//! ```

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build, resolve_config, App, Overrides, StartupError};
