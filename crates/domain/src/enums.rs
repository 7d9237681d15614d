use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Networks vaults are deployed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Polygon,
    Optimism,
    Arbitrum,
    Bsc,
    Base,
    Avalanche,
    Linea,
}

impl Chain {
    /// EVM chain id.
    #[must_use]
    pub fn id(&self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::Optimism => 10,
            Chain::Bsc => 56,
            Chain::Polygon => 137,
            Chain::Base => 8453,
            Chain::Arbitrum => 42161,
            Chain::Avalanche => 43114,
            Chain::Linea => 59144,
        }
    }

    /// Lowercase network name, as used in cache keys and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Polygon => "polygon",
            Chain::Optimism => "optimism",
            Chain::Arbitrum => "arbitrum",
            Chain::Bsc => "bsc",
            Chain::Base => "base",
            Chain::Avalanche => "avalanche",
            Chain::Linea => "linea",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Vault operation tag attached to a snapshot.
///
/// Only the first four are recognized position-changing events; anything else
/// the upstream indexer emits deserializes to [`OperationKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    Deposit,
    Withdraw,
    Rebalance,
    ZeroBurn,
    #[serde(other)]
    Other,
}

impl OperationKind {
    /// The recognized operation set.
    pub const RECOGNIZED: [OperationKind; 4] = [
        OperationKind::Deposit,
        OperationKind::Withdraw,
        OperationKind::Rebalance,
        OperationKind::ZeroBurn,
    ];

    #[must_use]
    pub fn is_recognized(&self) -> bool {
        !matches!(self, OperationKind::Other)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Deposit => "deposit",
            OperationKind::Withdraw => "withdraw",
            OperationKind::Rebalance => "rebalance",
            OperationKind::ZeroBurn => "zeroBurn",
            OperationKind::Other => "other",
        };
        f.write_str(name)
    }
}

impl FromStr for OperationKind {
    type Err = std::convert::Infallible;

    /// Parses an indexer tag; unknown tags map to [`OperationKind::Other`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "deposit" => OperationKind::Deposit,
            "withdraw" => OperationKind::Withdraw,
            "rebalance" => OperationKind::Rebalance,
            "zeroBurn" => OperationKind::ZeroBurn,
            _ => OperationKind::Other,
        })
    }
}
