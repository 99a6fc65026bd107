pub mod token;

pub use token::{InMemoryTokenRepository, LookupStrategy, TokenRepository};
