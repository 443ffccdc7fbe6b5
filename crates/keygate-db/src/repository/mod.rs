//! SurrealDB repository implementations.

mod account;
mod session;

pub use account::SurrealAccountRepository;
pub use session::SurrealSessionRepository;
