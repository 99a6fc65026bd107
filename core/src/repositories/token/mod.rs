pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod lookup;
pub mod memory;

pub use lookup::{lookup_outcome, LookupStrategy};
pub use memory::InMemoryTokenRepository;
pub use r#trait::TokenRepository;

#[cfg(test)]
mod tests;
