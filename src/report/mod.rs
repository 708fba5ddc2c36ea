//! Reporting: formatted summaries and fit-session history.

pub mod format;
pub mod session;

pub use format::*;
pub use session::*;
