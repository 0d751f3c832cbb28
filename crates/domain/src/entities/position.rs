use crate::token::Address;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle returned by the position manager for a minted position.
///
/// Zero means "no position".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TokenId(pub U256);

impl TokenId {
    pub fn new(id: impl Into<U256>) -> Self {
        Self(id.into())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The latest position opened on behalf of one owner.
///
/// Exactly one record exists per owner; a new deposit replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub token_id: TokenId,
    pub token_a: Address,
    pub token_b: Address,
}

impl PositionRecord {
    pub fn new(token_id: TokenId, token_a: Address, token_b: Address) -> Self {
        Self {
            token_id,
            token_a,
            token_b,
        }
    }

    /// Returns true if the record points at a minted position.
    pub fn is_open(&self) -> bool {
        !self.token_id.is_zero()
    }
}
