use crate::data::types::ChainConfig;

pub const DEFAULT_CHAIN: &str = "polygon-amoy";

/// Get a chain configuration preset by name.
pub fn get_chain_config(name: &str) -> Option<ChainConfig> {
    match name.to_lowercase().as_str() {
        "polygon-amoy" | "amoy" => Some(ChainConfig {
            name: "Polygon Amoy".to_string(),
            chain_id: 80002,
            rpc_url: "https://rpc-amoy.polygon.technology".to_string(),
            symbol: "POL".to_string(),
            explorer_url: Some("https://amoy.polygonscan.com".to_string()),
        }),
        "sepolia" => Some(ChainConfig {
            name: "Sepolia".to_string(),
            chain_id: 11155111,
            rpc_url: "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
            symbol: "ETH".to_string(),
            explorer_url: Some("https://sepolia.etherscan.io".to_string()),
        }),
        "ethereum" | "eth" | "mainnet" => Some(ChainConfig {
            name: "Ethereum".to_string(),
            chain_id: 1,
            rpc_url: "https://eth.merkle.io".to_string(),
            symbol: "ETH".to_string(),
            explorer_url: Some("https://etherscan.io".to_string()),
        }),
        "polygon" | "matic" => Some(ChainConfig {
            name: "Polygon".to_string(),
            chain_id: 137,
            rpc_url: "https://polygon-rpc.com".to_string(),
            symbol: "POL".to_string(),
            explorer_url: Some("https://polygonscan.com".to_string()),
        }),
        "base" => Some(ChainConfig {
            name: "Base".to_string(),
            chain_id: 8453,
            rpc_url: "https://mainnet.base.org".to_string(),
            symbol: "ETH".to_string(),
            explorer_url: Some("https://basescan.org".to_string()),
        }),
        "anvil" | "local" => Some(ChainConfig {
            name: "Anvil".to_string(),
            chain_id: 31337,
            rpc_url: "http://localhost:8545".to_string(),
            symbol: "ETH".to_string(),
            explorer_url: None,
        }),
        _ => None,
    }
}

/// Return a list of all supported chain names.
pub fn supported_chains() -> Vec<&'static str> {
    vec!["polygon-amoy", "sepolia", "ethereum", "polygon", "base", "anvil"]
}

/// Explorer link for a transaction, if the chain has an explorer.
pub fn tx_url(chain: &ChainConfig, hash: &alloy::primitives::B256) -> Option<String> {
    chain
        .explorer_url
        .as_ref()
        .map(|base| format!("{base}/tx/{hash}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chain_is_amoy() {
        let config = get_chain_config(DEFAULT_CHAIN).unwrap();
        assert_eq!(config.chain_id, 80002);
        assert_eq!(config.symbol, "POL");
        assert_eq!(config.rpc_url, "https://rpc-amoy.polygon.technology");
    }

    #[test]
    fn test_aliases() {
        assert!(get_chain_config("amoy").is_some());
        assert!(get_chain_config("eth").is_some());
        assert!(get_chain_config("Mainnet").is_some());
        assert!(get_chain_config("matic").is_some());
        assert_eq!(get_chain_config("local").unwrap().chain_id, 31337);
    }

    #[test]
    fn test_sepolia_config() {
        let config = get_chain_config("sepolia").unwrap();
        assert_eq!(config.chain_id, 11155111);
    }

    #[test]
    fn test_unknown_chain() {
        assert!(get_chain_config("unknown").is_none());
    }

    #[test]
    fn test_supported_chains_resolve() {
        let chains = supported_chains();
        assert_eq!(chains.len(), 6);
        for name in chains {
            assert!(get_chain_config(name).is_some(), "{name}");
        }
    }

    #[test]
    fn test_tx_url() {
        let hash = alloy::primitives::B256::ZERO;
        let amoy = get_chain_config("amoy").unwrap();
        assert_eq!(
            tx_url(&amoy, &hash).unwrap(),
            format!("https://amoy.polygonscan.com/tx/{hash}")
        );
        assert!(tx_url(&get_chain_config("anvil").unwrap(), &hash).is_none());
    }
}
