use serde::{Deserialize, Serialize};

/// ERC-20 token as referenced by pools and reward distributors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address: address.into().to_lowercase(),
            symbol: symbol.into(),
            decimals,
        }
    }
}
