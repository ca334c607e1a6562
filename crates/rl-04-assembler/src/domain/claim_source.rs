//! Claim source selection on Chain B, keyed by the Chain A chain id.

use serde::{Deserialize, Serialize};

/// Chain B claim selector for the chain a package came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimSourceChain {
    /// BNB Smart Chain (also the fallback for unknown ids).
    Bsc,
    /// opBNB.
    OpBnb,
    /// Polygon PoS.
    Polygon,
    /// Scroll.
    Scroll,
    /// Linea.
    Linea,
    /// Mantle.
    Mantle,
    /// Arbitrum One.
    Arbitrum,
    /// OP Mainnet.
    Optimism,
}

impl ClaimSourceChain {
    /// Maps a chain id, mainnet or testnet, onto its claim selector.
    pub fn from_chain_id(chain_id: u64) -> Self {
        match chain_id {
            204 | 5611 => ClaimSourceChain::OpBnb,
            137 | 80002 => ClaimSourceChain::Polygon,
            534352 | 534351 => ClaimSourceChain::Scroll,
            59144 | 59141 => ClaimSourceChain::Linea,
            5000 | 5003 => ClaimSourceChain::Mantle,
            42161 | 421614 => ClaimSourceChain::Arbitrum,
            10 | 11155420 => ClaimSourceChain::Optimism,
            _ => ClaimSourceChain::Bsc,
        }
    }

    /// Selector value carried in claim transactions.
    pub fn selector(self) -> u32 {
        match self {
            ClaimSourceChain::Bsc => 1,
            ClaimSourceChain::OpBnb => 2,
            ClaimSourceChain::Polygon => 3,
            ClaimSourceChain::Scroll => 4,
            ClaimSourceChain::Linea => 5,
            ClaimSourceChain::Mantle => 6,
            ClaimSourceChain::Arbitrum => 7,
            ClaimSourceChain::Optimism => 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_chain_ids() {
        assert_eq!(ClaimSourceChain::from_chain_id(204), ClaimSourceChain::OpBnb);
        assert_eq!(ClaimSourceChain::from_chain_id(137), ClaimSourceChain::Polygon);
        assert_eq!(ClaimSourceChain::from_chain_id(534352), ClaimSourceChain::Scroll);
        assert_eq!(ClaimSourceChain::from_chain_id(59144), ClaimSourceChain::Linea);
        assert_eq!(ClaimSourceChain::from_chain_id(5000), ClaimSourceChain::Mantle);
        assert_eq!(ClaimSourceChain::from_chain_id(42161), ClaimSourceChain::Arbitrum);
        assert_eq!(ClaimSourceChain::from_chain_id(10), ClaimSourceChain::Optimism);
    }

    #[test]
    fn test_unknown_ids_fall_back_to_bsc() {
        assert_eq!(ClaimSourceChain::from_chain_id(56), ClaimSourceChain::Bsc);
        assert_eq!(ClaimSourceChain::from_chain_id(97), ClaimSourceChain::Bsc);
        assert_eq!(ClaimSourceChain::from_chain_id(1), ClaimSourceChain::Bsc);
    }

    #[test]
    fn test_selectors_are_distinct() {
        let all = [
            ClaimSourceChain::Bsc,
            ClaimSourceChain::OpBnb,
            ClaimSourceChain::Polygon,
            ClaimSourceChain::Scroll,
            ClaimSourceChain::Linea,
            ClaimSourceChain::Mantle,
            ClaimSourceChain::Arbitrum,
            ClaimSourceChain::Optimism,
        ];
        let mut selectors: Vec<u32> = all.iter().map(|c| c.selector()).collect();
        selectors.sort_unstable();
        selectors.dedup();
        assert_eq!(selectors.len(), all.len());
    }
}
