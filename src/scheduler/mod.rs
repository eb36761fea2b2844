//! Scheduled jobs.
//!
//! - `broadcast` - random message from the pool to every recipient, on an interval
//! - `adhkar` - fixed texts to configured targets, at fixed times of day

pub mod adhkar;
pub mod broadcast;
mod pool;

pub use adhkar::AdhkarJob;
pub use broadcast::BroadcastJob;
pub use pool::MessagePool;
