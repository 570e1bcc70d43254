use crate::{ether_mail, mock_wallet, signer, ADDRESS, ETHER_MAIL_SIGNATURE};
use ethwallet_connections::{ArgsRequest, WalletError};
use ethwallet_core::types::{Address, TxHash, TypedTransaction, U256, U64};
use ethwallet_providers::{JsonRpcError, MockResponse};
use ethwallet_signers::Signer;
use serde_json::{json, Value};
use tracing_test::traced_test;

fn request(method: &str, params: Value) -> ArgsRequest {
    ArgsRequest { method: method.to_string(), params: Some(params.to_string()), connection: None }
}

fn rpc_error(message: &str) -> MockResponse {
    MockResponse::Error(JsonRpcError { code: -32602, message: message.to_string(), data: None })
}

/// Decodes the raw transaction submitted through `eth_sendRawTransaction`, returning the
/// recovered sender and the signature's `v`
fn submitted(params: Value) -> (TypedTransaction, Address, u64) {
    let raw: ethwallet_core::types::Bytes = serde_json::from_value(params[0].clone()).unwrap();
    let (tx, signature) = TypedTransaction::decode(&raw).unwrap();
    let signature = signature.unwrap();
    let sender = signature.recover(tx.sighash()).unwrap();
    (tx, sender, signature.v)
}

#[tokio::test]
async fn chain_id_is_served_from_the_cache() {
    let (mock, wallet) = mock_wallet(Some(56), false);
    let res = wallet.request(request("eth_chainId", json!([]))).await.unwrap();
    assert_eq!(res, r#""0x38""#);
    assert_eq!(mock.pending_requests(), 0);
}

#[tokio::test]
async fn chain_id_is_fetched_once() {
    let (mock, wallet) = mock_wallet(None, false);
    mock.push(U64::from(5)).unwrap();

    let args = ArgsRequest { method: "eth_chainId".to_string(), ..Default::default() };
    assert_eq!(wallet.request(args.clone()).await.unwrap(), r#""0x5""#);
    assert_eq!(wallet.request(args).await.unwrap(), r#""0x5""#);

    mock.assert_request("eth_chainId", ()).unwrap();
    assert_eq!(mock.pending_requests(), 0);
}

#[tokio::test]
async fn forwards_reads_verbatim() {
    let (mock, wallet) = mock_wallet(Some(1), true);
    mock.push("0xde0b6b3a7640000").unwrap();

    let params = json!([ADDRESS, "latest"]);
    let res = wallet.request(request("eth_getBalance", params.clone())).await.unwrap();
    assert_eq!(res, r#""0xde0b6b3a7640000""#);
    mock.assert_request("eth_getBalance", params).unwrap();
}

#[tokio::test]
async fn signer_does_not_intercept_nonce_or_accounts() {
    let (mock, wallet) = mock_wallet(Some(1), true);
    mock.push("0x2").unwrap();
    mock.push(json!([])).unwrap();

    let nonce = json!([ADDRESS, "pending"]);
    assert_eq!(
        wallet.request(request("eth_getTransactionCount", nonce.clone())).await.unwrap(),
        r#""0x2""#
    );
    assert_eq!(wallet.request(request("eth_accounts", json!([]))).await.unwrap(), "[]");

    mock.assert_request("eth_getTransactionCount", nonce).unwrap();
    mock.assert_request("eth_accounts", json!([])).unwrap();
}

#[tokio::test]
async fn personal_sign_and_eth_sign() {
    let (mock, wallet) = mock_wallet(Some(1), true);
    let expected = format!("{:#}", signer().sign_message("hello").await.unwrap());

    // hex encoded message
    let res = wallet.request(request("personal_sign", json!(["0x68656c6c6f", ADDRESS]))).await;
    assert_eq!(res.unwrap(), format!("\"{expected}\""));

    // plain text message, address first
    let res = wallet.request(request("eth_sign", json!([ADDRESS, "hello"]))).await;
    assert_eq!(res.unwrap(), format!("\"{expected}\""));

    assert_eq!(mock.pending_requests(), 0);
}

#[tokio::test]
async fn signing_methods_are_forwarded_without_a_signer() {
    let (mock, wallet) = mock_wallet(Some(1), false);
    mock.push("0xabcd").unwrap();

    let params = json!(["0x68656c6c6f", ADDRESS]);
    let res = wallet.request(request("personal_sign", params.clone())).await.unwrap();
    assert_eq!(res, r#""0xabcd""#);
    mock.assert_request("personal_sign", params).unwrap();
}

#[tokio::test]
async fn signs_typed_data() {
    let (mock, wallet) = mock_wallet(Some(1), true);

    let res = wallet
        .request(request("eth_signTypedData_v4", json!([ADDRESS, ether_mail()])))
        .await
        .unwrap();
    assert_eq!(res, format!("\"{ETHER_MAIL_SIGNATURE}\""));

    // MetaMask style, the payload as a JSON string
    let res = wallet
        .request(request("eth_signTypedData_v4", json!([ADDRESS, ether_mail().to_string()])))
        .await
        .unwrap();
    assert_eq!(res, format!("\"{ETHER_MAIL_SIGNATURE}\""));

    assert_eq!(mock.pending_requests(), 0);
}

#[tokio::test]
async fn malformed_typed_data_is_a_decoding_error() {
    let (_, wallet) = mock_wallet(Some(1), true);

    let err = wallet
        .request(request("eth_signTypedData_v4", json!([ADDRESS, { "types": 1 }])))
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::DecodingError(_)));

    let err = wallet.request(request("eth_signTypedData_v4", json!([ADDRESS]))).await.unwrap_err();
    assert!(matches!(err, WalletError::DecodingError(_)));
}

#[tokio::test]
async fn sends_legacy_transaction() {
    let (mock, wallet) = mock_wallet(Some(1), true);
    let hash = TxHash::repeat_byte(0xaa);
    mock.push("0x9").unwrap();
    mock.push("0x5208").unwrap();
    mock.push("0x4a817c800").unwrap();
    mock.push(hash).unwrap();

    let to = Address::repeat_byte(0x35);
    let res = wallet
        .request(request(
            "eth_sendTransaction",
            json!([{ "to": to, "value": "0xde0b6b3a7640000" }]),
        ))
        .await
        .unwrap();
    assert_eq!(res, serde_json::to_string(&hash).unwrap());

    let from: Address = ADDRESS.parse().unwrap();
    mock.assert_request("eth_getTransactionCount", json!([from, "pending"])).unwrap();
    let (method, _) = mock.take_request().unwrap();
    assert_eq!(method, "eth_estimateGas");
    mock.assert_request("eth_gasPrice", ()).unwrap();

    let (method, params) = mock.take_request().unwrap();
    assert_eq!(method, "eth_sendRawTransaction");
    let (tx, signer, v) = submitted(params);
    assert_eq!(signer, from);
    assert!(matches!(tx, TypedTransaction::Legacy(_)));
    assert_eq!(tx.chain_id(), Some(U64::from(1)));
    // replay protected with the connection's chain id
    assert!(v == 37 || v == 38, "v = {v}");
    assert_eq!(tx.nonce(), Some(&U256::from(9)));
    assert_eq!(tx.gas(), Some(&U256::from(21000)));
    assert_eq!(tx.gas_price(), Some(U256::from(20_000_000_000u64)));
    assert_eq!(tx.to(), Some(&to));
}

#[tokio::test]
async fn sends_eip1559_transaction_object() {
    let (mock, wallet) = mock_wallet(Some(56), true);
    let hash = TxHash::repeat_byte(0xbb);
    mock.push("0x0").unwrap();
    mock.push("0x5208").unwrap();
    // the suggested tip is above the gas price
    mock.push("0x3b9aca00").unwrap();
    mock.push("0x1").unwrap();
    mock.push(hash).unwrap();

    let tx = json!({ "type": "0x02", "to": Address::repeat_byte(1), "value": 1 });
    let args = ArgsRequest {
        method: "eth_sendTransaction".to_string(),
        params: Some(tx.to_string()),
        connection: None,
    };
    assert_eq!(wallet.request(args).await.unwrap(), serde_json::to_string(&hash).unwrap());

    mock.take_request().unwrap();
    mock.take_request().unwrap();
    mock.assert_request("eth_maxPriorityFeePerGas", ()).unwrap();
    mock.assert_request("eth_gasPrice", ()).unwrap();
    let (_, params) = mock.take_request().unwrap();
    match submitted(params) {
        (TypedTransaction::Eip1559(tx), signer, v) => {
            assert!(v <= 1, "v = {v}");
            assert_eq!(signer, ADDRESS.parse::<Address>().unwrap());
            assert_eq!(tx.chain_id, Some(U64::from(56)));
            assert_eq!(tx.max_priority_fee_per_gas, Some(U256::from(1_000_000_000u64)));
            assert_eq!(tx.max_fee_per_gas, Some(U256::from(1_000_000_000u64)));
        }
        other => panic!("expected an EIP-1559 transaction, got {other:?}"),
    }
}

#[tokio::test]
async fn rejects_transactions_for_other_chains() {
    let (mock, wallet) = mock_wallet(Some(1), true);
    let err = wallet
        .request(request("eth_sendTransaction", json!([{ "to": ADDRESS, "chainId": "0x5" }])))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WalletError::ChainIdMismatch { tx, connection }
            if tx == U64::from(5) && connection == U64::from(1)
    ));
    assert_eq!(mock.pending_requests(), 0);
}

#[tokio::test]
async fn other_senders_are_forwarded() {
    let (mock, wallet) = mock_wallet(Some(1), true);
    let hash = TxHash::repeat_byte(0xcc);
    mock.push(hash).unwrap();

    let params = json!([{ "from": Address::repeat_byte(9), "to": ADDRESS }]);
    let res = wallet.request(request("eth_sendTransaction", params.clone())).await.unwrap();
    assert_eq!(res, serde_json::to_string(&hash).unwrap());
    mock.assert_request("eth_sendTransaction", params).unwrap();
}

#[tokio::test]
#[traced_test]
async fn retries_compact_transaction_type_once() {
    let (mock, wallet) = mock_wallet(Some(1), false);
    let hash = TxHash::repeat_byte(0xdd);
    mock.push_response(rpc_error("invalid transaction type 0x02, expected 0x2"));
    mock.push(hash).unwrap();

    let tx = json!({ "type": "0x02", "from": ADDRESS, "to": ADDRESS });
    let res = wallet.request(request("eth_sendTransaction", json!([tx]))).await.unwrap();
    assert_eq!(res, serde_json::to_string(&hash).unwrap());

    let mut retried = tx.clone();
    retried["type"] = json!("0x2");
    mock.assert_request("eth_sendTransaction", json!([tx])).unwrap();
    mock.assert_request("eth_sendTransaction", json!([retried])).unwrap();
    assert!(logs_contain("retrying with 0x2"));
}

#[tokio::test]
async fn retry_failure_is_propagated() {
    let (mock, wallet) = mock_wallet(Some(1), false);
    mock.push_response(rpc_error("bad type 0x2"));
    mock.push_response(rpc_error("still 0x2"));
    mock.push(TxHash::zero()).unwrap();

    let tx = json!({ "type": "0x02", "to": ADDRESS });
    let err = wallet.request(request("eth_sendTransaction", json!([tx]))).await.unwrap_err();
    assert_eq!(err.as_error_response().unwrap().message, "still 0x2");
    assert_eq!(mock.pending_requests(), 2);
}

#[tokio::test]
async fn other_errors_are_not_retried() {
    let cases = [
        // unrelated message
        (json!([{ "type": "0x02" }]), "nonce too low"),
        // already compact
        (json!([{ "type": "0x2" }]), "invalid type 0x2"),
        // no transaction
        (json!([]), "invalid type 0x2"),
    ];
    for (params, message) in cases {
        let (mock, wallet) = mock_wallet(Some(1), false);
        mock.push_response(rpc_error(message));

        let err = wallet.request(request("eth_sendTransaction", params)).await.unwrap_err();
        let response = err.as_error_response().unwrap();
        assert_eq!(response.code, -32602);
        assert_eq!(response.message, message);
        assert_eq!(mock.pending_requests(), 1);
    }
}

#[tokio::test]
async fn malformed_params_are_rejected() {
    let (mock, wallet) = mock_wallet(Some(1), true);
    let args = ArgsRequest {
        method: "eth_getBalance".to_string(),
        params: Some("[\"0x".to_string()),
        connection: None,
    };
    assert!(matches!(wallet.request(args).await, Err(WalletError::DecodingError(_))));
    assert_eq!(mock.pending_requests(), 0);
}
