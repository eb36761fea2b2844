//! Database module exports.

mod recipients;

pub use recipients::{RecipientKind, RecipientStore};
