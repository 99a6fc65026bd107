//! Domain entities representing refresh credentials and issued tokens.

pub mod token;

// Re-export commonly used types
pub use token::{
    AccessClaims, RefreshTokenRecord, RefreshTokenState, TokenPair,
    ACCESS_TOKEN_EXPIRY_MINUTES, REFRESH_TOKEN_EXPIRY_HOURS, JWT_ISSUER,
};

#[cfg(test)]
mod tests;
