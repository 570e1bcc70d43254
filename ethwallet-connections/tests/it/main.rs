use ethwallet_connections::{Connection, ConnectionRegistry, EthereumWallet};
use ethwallet_providers::{MockProvider, Provider};
use ethwallet_signers::LocalWallet;

mod dispatcher;
mod registry;
mod wallet;

pub const KEY: &str = "0x4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d";
pub const ADDRESS: &str = "0x90f8bf6a479f320ead074411a4b0e7944ea8c9c1";

pub fn signer() -> LocalWallet {
    KEY.parse().unwrap()
}

/// A connection over a mock transport, with its chain id already known when given
pub fn mock_connection(chain_id: Option<u64>, with_signer: bool) -> (MockProvider, Connection) {
    let mock = MockProvider::new();
    let provider = Provider::new(mock.clone());
    let provider = match chain_id {
        Some(chain_id) => provider.with_chain_id(chain_id),
        None => provider,
    };
    let signer = with_signer.then(signer);
    (mock, Connection::from_parts(provider, signer))
}

/// A wallet whose default network `local` is served by the mock
pub fn mock_wallet(chain_id: Option<u64>, with_signer: bool) -> (MockProvider, EthereumWallet) {
    let (mock, connection) = mock_connection(chain_id, with_signer);
    let registry = ConnectionRegistry::new([("local", connection)], Some("local")).unwrap();
    (mock, EthereumWallet::new(registry))
}

pub fn ether_mail() -> serde_json::Value {
    serde_json::json!({
        "types": {
            "EIP712Domain": [
                { "name": "name", "type": "string" },
                { "name": "version", "type": "string" },
                { "name": "chainId", "type": "uint256" },
                { "name": "verifyingContract", "type": "address" }
            ],
            "Person": [
                { "name": "name", "type": "string" },
                { "name": "wallet", "type": "address" }
            ],
            "Mail": [
                { "name": "from", "type": "Person" },
                { "name": "to", "type": "Person" },
                { "name": "contents", "type": "string" }
            ]
        },
        "primaryType": "Mail",
        "domain": {
            "name": "Ether Mail",
            "version": "1",
            "chainId": 1,
            "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
        },
        "message": {
            "from": { "name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" },
            "to": { "name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" },
            "contents": "Hello, Bob!"
        }
    })
}

pub const ETHER_MAIL_SIGNATURE: &str = "0x12bdd486cb42c3b3c414bb04253acfe7d402559e7637562987af6bd78508f38623c1cc09880613762cc913d49fd7d3c091be974c0dee83fb233300b6b58727311c";
