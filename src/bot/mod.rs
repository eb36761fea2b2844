//! Bot module - Core bot functionality.

pub mod dispatcher;
pub mod outbox;
mod runtime;
pub mod webhook;

pub use dispatcher::AppState;
pub use runtime::run;
