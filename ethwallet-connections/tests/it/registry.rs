use crate::mock_connection;
use ethwallet_connections::{
    Connection, ConnectionRegistry, NetworkRef, WalletConfig, WalletError,
};
use ethwallet_core::types::U64;
use std::sync::Arc;

fn network(name: &str) -> NetworkRef {
    NetworkRef::Network(name.to_string())
}

fn chain_id_of(connection: &Connection) -> Option<U64> {
    connection.provider().cached_chain_id()
}

#[test]
fn resolves_names_case_insensitively() {
    let (_, connection) = mock_connection(Some(1), false);
    let registry = ConnectionRegistry::new([("MainNet", connection)], None).unwrap();

    let lower = registry.resolve(Some(&network("mainnet"))).unwrap();
    let upper = registry.resolve(Some(&network("Mainnet"))).unwrap();
    let default = registry.resolve(None).unwrap();
    assert!(Arc::ptr_eq(&lower, &upper));
    assert!(Arc::ptr_eq(&lower, &default));
    assert_eq!(registry.networks(), vec!["mainnet".to_string()]);
}

#[test]
fn always_has_mainnet() {
    let registry = ConnectionRegistry::new(Vec::<(String, Connection)>::new(), None).unwrap();
    assert_eq!(registry.default_network(), "mainnet");

    let mainnet = registry.resolve(None).unwrap();
    assert_eq!(chain_id_of(&mainnet), Some(U64::from(1)));
    assert!(mainnet.signer().is_none());
}

#[test]
fn missing_default_fails() {
    let (_, connection) = mock_connection(None, false);
    let err = ConnectionRegistry::new([("local", connection)], Some("goerli")).unwrap_err();
    assert!(matches!(err, WalletError::MissingDefaultConnection(name) if name == "goerli"));
}

#[test]
fn default_name_is_case_insensitive() {
    let (_, connection) = mock_connection(None, false);
    let registry = ConnectionRegistry::new([("Local", connection)], Some("LOCAL")).unwrap();
    assert_eq!(registry.default_network(), "local");
}

#[test]
fn resolves_chain_ids_from_the_catalog() {
    let registry = ConnectionRegistry::new(Vec::<(String, Connection)>::new(), None).unwrap();

    let bsc = registry.resolve(Some(&NetworkRef::from(56))).unwrap();
    assert_eq!(chain_id_of(&bsc), Some(U64::from(56)));
    // catalog connections are not registered
    assert_eq!(registry.networks(), vec!["mainnet".to_string()]);

    let err = registry.resolve(Some(&network("999999"))).unwrap_err();
    assert!(matches!(err, WalletError::UnknownNetwork(_)));
}

#[test]
fn resolves_well_known_names() {
    let registry = ConnectionRegistry::new(Vec::<(String, Connection)>::new(), None).unwrap();
    for name in ["binance", "Binance-Smart-Chain"] {
        let connection = registry.resolve(Some(&network(name))).unwrap();
        assert_eq!(chain_id_of(&connection), Some(U64::from(56)));
    }
    let sepolia = registry.resolve(Some(&network("SEPOLIA"))).unwrap();
    assert_eq!(chain_id_of(&sepolia), Some(U64::from(11155111)));
}

#[test]
fn registered_names_win_over_the_catalog() {
    let (_, goerli) = mock_connection(Some(1337), true);
    let (_, numbered) = mock_connection(Some(7), false);
    let registry = ConnectionRegistry::new([("goerli", goerli), ("56", numbered)], None).unwrap();

    let resolved = registry.resolve(Some(&network("Goerli"))).unwrap();
    assert!(Arc::ptr_eq(&resolved, &registry.get("goerli").unwrap()));
    assert_eq!(chain_id_of(&resolved), Some(U64::from(1337)));

    let resolved = registry.resolve(Some(&NetworkRef::from(56))).unwrap();
    assert_eq!(chain_id_of(&resolved), Some(U64::from(7)));
}

#[test]
fn falls_back_to_the_default() {
    let (_, local) = mock_connection(None, true);
    let registry = ConnectionRegistry::new([("local", local)], Some("local")).unwrap();

    let resolved = registry.resolve(Some(&network("no-such-network"))).unwrap();
    assert!(Arc::ptr_eq(&resolved, &registry.get("local").unwrap()));
}

#[test]
fn node_urls_are_ephemeral_and_read_only() {
    let (_, local) = mock_connection(None, true);
    let registry = ConnectionRegistry::new([("local", local)], Some("local")).unwrap();

    let node = registry.resolve(Some(&NetworkRef::Node("http://localhost:8545".into()))).unwrap();
    assert!(node.signer().is_none());
    assert_eq!(registry.networks(), vec!["local".to_string(), "mainnet".to_string()]);

    let err = registry.resolve(Some(&NetworkRef::Node("localhost".into()))).unwrap_err();
    assert!(matches!(err, WalletError::DecodingError(_)));
}

#[test]
fn set_replaces_one_entry() {
    let (_, local) = mock_connection(None, false);
    let (_, other) = mock_connection(None, false);
    let registry =
        ConnectionRegistry::new([("local", local), ("other", other)], Some("local")).unwrap();
    let other_before = registry.get("other").unwrap();

    let (_, replacement) = mock_connection(None, true);
    registry.set("LOCAL", replacement);

    assert!(registry.get("local").unwrap().signer().is_some());
    assert!(Arc::ptr_eq(&other_before, &registry.get("other").unwrap()));
    assert_eq!(registry.default_network(), "local");
}

#[test]
fn set_default() {
    let registry = ConnectionRegistry::new(Vec::<(String, Connection)>::new(), None).unwrap();

    let err = registry.set_default("local", None).unwrap_err();
    assert!(matches!(err, WalletError::UnknownNetwork(name) if name == "local"));
    assert_eq!(registry.default_network(), "mainnet");

    let (_, local) = mock_connection(None, true);
    registry.set_default("Local", Some(local)).unwrap();
    assert_eq!(registry.default_network(), "local");
    assert!(registry.resolve(None).unwrap().signer().is_some());

    registry.set_default("MAINNET", None).unwrap();
    assert_eq!(registry.default_network(), "mainnet");
    assert!(registry.resolve(None).unwrap().signer().is_none());
}

#[test]
fn concurrent_reads_and_writes() {
    let registry = ConnectionRegistry::new(Vec::<(String, Connection)>::new(), None).unwrap();
    std::thread::scope(|s| {
        for i in 0..4 {
            let registry = &registry;
            s.spawn(move || {
                for j in 0..25 {
                    let (_, connection) = mock_connection(None, false);
                    registry.set(&format!("net-{i}-{j}"), connection);
                    assert!(registry.resolve(None).is_ok());
                }
            });
        }
    });
    assert_eq!(registry.networks().len(), 101);
}

#[test]
fn builds_from_config() {
    let config = WalletConfig::from_json_str(&format!(
        r#"{{
            "networks": {{
                "Local": {{ "provider": "http://localhost:8545", "chainId": 1337, "signer": "{}" }},
                "binance": {{}},
                "fuji": {{ "chainId": 43113 }}
            }},
            "defaultNetwork": "local",
            "infuraProjectId": "abc"
        }}"#,
        crate::KEY
    ))
    .unwrap();
    let registry = ConnectionRegistry::from_config(&config).unwrap();

    assert_eq!(registry.default_network(), "local");
    assert_eq!(
        registry.networks(),
        vec!["binance".to_string(), "fuji".to_string(), "local".to_string(), "mainnet".to_string()]
    );

    let local = registry.resolve(None).unwrap();
    assert_eq!(chain_id_of(&local), Some(U64::from(1337)));
    assert_eq!(
        local.signer().map(|signer| format!("{:?}", signer.address())).as_deref(),
        Some(crate::ADDRESS)
    );
    assert_eq!(chain_id_of(&registry.get("binance").unwrap()), Some(U64::from(56)));
    assert_eq!(chain_id_of(&registry.get("fuji").unwrap()), Some(U64::from(43113)));
}

#[test]
fn config_errors() {
    let unknown = WalletConfig::from_json_str(r#"{"networks":{"custom":{}}}"#).unwrap();
    let err = ConnectionRegistry::from_config(&unknown).unwrap_err();
    assert!(matches!(err, WalletError::UnknownNetwork(name) if name == "custom"));

    let bad_key =
        WalletConfig::from_json_str(r#"{"networks":{"goerli":{"signer":"0x1234"}}}"#).unwrap();
    let err = ConnectionRegistry::from_config(&bad_key).unwrap_err();
    assert!(matches!(err, WalletError::DecodingError(_)));

    let bad_default = WalletConfig::from_json_str(r#"{"defaultNetwork":"goerli"}"#).unwrap();
    let err = ConnectionRegistry::from_config(&bad_default).unwrap_err();
    assert!(matches!(err, WalletError::MissingDefaultConnection(_)));
}
