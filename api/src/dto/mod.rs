pub mod token;

pub use token::{IssueTokensQuery, RefreshTokenRequest, TokenPairResponse};
