use crate::{mock_connection, mock_wallet, signer, ADDRESS};
use async_trait::async_trait;
use ethwallet_connections::{
    ArgsSignMessage, ArgsSignTransaction, ArgsSignerAddress, ArgsWaitForTransaction,
    ConnectionRef, ConnectionRegistry, EthereumWallet, SignTransactionOutput, WalletError,
};
use ethwallet_core::types::{Bytes, Signature, TxHash, U64};
use ethwallet_providers::{JsonRpcClient, Provider, ProviderError, WaitState};
use serde_json::{json, Value};

// https://eips.ethereum.org/EIPS/eip-155
const EIP155_KEY: &str = "4646464646464646464646464646464646464646464646464646464646464646";
const EIP155_UNSIGNED: &str =
    "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080";
const EIP155_SIGNED: &str = "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83";

// personal_sign of "hello" under the ganache key
const HELLO_SIGNATURE: &str = "0x1845faa75f53acb0c3e7247dcf294ce045c139722418dc9638709b54bafffa093591aeaaa195e7dc53f7e774c80e9a7f1371f0647a100d1c9e81db83d8ddd4781c";

fn eip155_wallet() -> EthereumWallet {
    let connection = ethwallet_connections::Connection::from_parts(
        Provider::new(ethwallet_providers::MockProvider::new()),
        Some(EIP155_KEY.parse().unwrap()),
    );
    EthereumWallet::new(ConnectionRegistry::new([("local", connection)], Some("local")).unwrap())
}

fn network(name: &str) -> Option<ConnectionRef> {
    Some(ConnectionRef { node: None, network_name_or_chain_id: Some(name.to_string()) })
}

#[tokio::test]
async fn signer_address_is_best_effort() {
    let (_, wallet) = mock_wallet(Some(1), true);
    let (_, read_only) = mock_connection(Some(5), false);
    wallet.registry().set("readonly", read_only);

    let address = wallet.signer_address(ArgsSignerAddress::default()).await;
    assert_eq!(address.as_deref(), Some(ADDRESS));

    // read-only connection
    let address =
        wallet.signer_address(ArgsSignerAddress { connection: network("readonly") }).await;
    assert_eq!(address, None);

    // unknown chain id
    let address = wallet.signer_address(ArgsSignerAddress { connection: network("31337") }).await;
    assert_eq!(address, None);

    // malformed node url
    let connection = Some(ConnectionRef { node: Some("nope".to_string()), ..Default::default() });
    assert_eq!(wallet.signer_address(ArgsSignerAddress { connection }).await, None);
}

#[tokio::test]
async fn signs_messages() {
    let (mock, wallet) = mock_wallet(Some(1), true);
    let args = ArgsSignMessage { message: Bytes::from(b"hello".to_vec()), connection: None };

    let first = wallet.sign_message(args.clone()).await.unwrap();
    let second = wallet.sign_message(args).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first, HELLO_SIGNATURE);

    let signature: Signature = first.parse().unwrap();
    assert!(signature.v == 27 || signature.v == 28);
    assert_eq!(signature.recover("hello").unwrap(), signer().address());
    assert_eq!(mock.pending_requests(), 0);
}

#[tokio::test]
async fn signing_needs_a_signer() {
    let (_, wallet) = mock_wallet(Some(1), false);
    let err = wallet
        .sign_message(ArgsSignMessage { message: Bytes::from(vec![1]), connection: None })
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::NoSigner));

    let err = wallet
        .sign_transaction(ArgsSignTransaction {
            rlp: EIP155_UNSIGNED.parse().unwrap(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::NoSigner));
}

#[tokio::test]
async fn signs_raw_transactions() {
    let wallet = eip155_wallet();

    let signed = wallet
        .sign_transaction(ArgsSignTransaction {
            rlp: EIP155_UNSIGNED.parse().unwrap(),
            output: SignTransactionOutput::SignedTransaction,
            connection: None,
        })
        .await
        .unwrap();
    assert_eq!(signed, format!("0x{EIP155_SIGNED}"));

    // the joined signature carries an electrum `v`
    let signature = wallet
        .sign_transaction(ArgsSignTransaction {
            rlp: EIP155_UNSIGNED.parse().unwrap(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        signature,
        "0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276\
         67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d831b"
    );

    // an already signed payload is signed again
    let resigned = wallet
        .sign_transaction(ArgsSignTransaction {
            rlp: EIP155_SIGNED.parse().unwrap(),
            output: SignTransactionOutput::SignedTransaction,
            connection: None,
        })
        .await
        .unwrap();
    assert_eq!(resigned, signed);
}

#[tokio::test]
async fn rejects_malformed_transactions() {
    let wallet = eip155_wallet();
    for rlp in ["0x", "0x05c0", "0xc3010203"] {
        let args = ArgsSignTransaction { rlp: rlp.parse().unwrap(), ..Default::default() };
        let err = wallet.sign_transaction(args).await.unwrap_err();
        assert!(matches!(err, WalletError::DecodingError(_)), "{rlp}");
    }
}

#[tokio::test(start_paused = true)]
async fn waits_without_confirmations() {
    let (mock, wallet) = mock_wallet(Some(1), false);
    let hash = TxHash::repeat_byte(7);
    mock.push(Value::Null).unwrap();
    mock.push(json!({ "hash": hash, "blockNumber": "0x64" })).unwrap();

    let confirmed = wallet
        .wait_for_transaction(ArgsWaitForTransaction {
            tx_hash: hash,
            confirmations: 0,
            timeout: None,
            connection: None,
        })
        .await
        .unwrap();
    assert!(confirmed);

    mock.assert_request("eth_getTransactionByHash", [hash]).unwrap();
    mock.assert_request("eth_getTransactionByHash", [hash]).unwrap();
    assert_eq!(mock.pending_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn waits_for_depth() {
    let (mock, wallet) = mock_wallet(Some(1), false);
    let hash = TxHash::repeat_byte(8);
    mock.push(json!({ "blockNumber": "0x64" })).unwrap();
    mock.push(U64::from(100)).unwrap();
    mock.push(U64::from(102)).unwrap();

    let args =
        ArgsWaitForTransaction { tx_hash: hash, confirmations: 3, timeout: None, connection: None };
    assert!(wallet.wait_for_transaction(args).await.unwrap());
}

/// A node that never mines anything
#[derive(Debug)]
struct Stuck;

#[async_trait]
impl JsonRpcClient for Stuck {
    async fn request(&self, _method: &str, _params: Value) -> Result<Value, ProviderError> {
        Ok(Value::Null)
    }
}

#[tokio::test(start_paused = true)]
async fn wait_times_out_while_polling() {
    let connection = ethwallet_connections::Connection::from_parts(Provider::new(Stuck), None);
    let registry = ConnectionRegistry::new([("stuck", connection)], Some("stuck")).unwrap();
    let wallet = EthereumWallet::new(registry);
    let hash = TxHash::repeat_byte(9);

    let err = wallet
        .wait_for_transaction(ArgsWaitForTransaction {
            tx_hash: hash,
            confirmations: 1,
            timeout: Some(2_000),
            connection: None,
        })
        .await
        .unwrap_err();

    match err {
        WalletError::TransactionTimeout { tx_hash, state } => {
            assert_eq!(tx_hash, hash);
            assert_eq!(state, WaitState::Polling);
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
}
