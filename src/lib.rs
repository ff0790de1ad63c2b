/// Friend Chat Server Library
/// Demo friend list and two-party chat backend over in-memory stores

pub mod chat_view;
pub mod config;
pub mod error;
pub mod handlers;
pub mod latency;
pub mod scheduler;
pub mod server;
pub mod session;
pub mod store;

pub use error::{Result, StoreError};
pub use store::ChatStore;
