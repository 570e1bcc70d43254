use async_trait::async_trait;
use ethwallet_core::types::{TxHash, U64};
use ethwallet_providers::{
    JsonRpcClient, JsonRpcError, MockProvider, MockResponse, Provider, ProviderError, RpcError,
    WaitState,
};
use serde_json::{json, Value};
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

/// A node which never includes the transaction
#[derive(Debug, Default)]
struct NeverMined {
    lookups: AtomicUsize,
}

#[async_trait]
impl JsonRpcClient for NeverMined {
    async fn request(&self, method: &str, _params: Value) -> Result<Value, ProviderError> {
        assert_eq!(method, "eth_getTransactionByHash");
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(Value::Null)
    }
}

/// A node which mined the transaction in block 10 and never advances its head
#[derive(Debug)]
struct StalledHead;

#[async_trait]
impl JsonRpcClient for StalledHead {
    async fn request(&self, method: &str, _params: Value) -> Result<Value, ProviderError> {
        match method {
            "eth_getTransactionByHash" => Ok(json!({ "blockNumber": "0xa" })),
            "eth_blockNumber" => Ok(json!("0xa")),
            other => Err(ProviderError::CustomError(format!("unexpected {other}"))),
        }
    }
}

fn mined_at(block: u64) -> Value {
    json!({ "hash": TxHash::repeat_byte(1), "blockNumber": U64::from(block) })
}

#[tokio::test(start_paused = true)]
async fn zero_confirmations_resolve_once_mined() {
    let mock = MockProvider::new();
    let provider = Provider::new(mock.clone());
    let hash = TxHash::repeat_byte(1);

    mock.push(Value::Null).unwrap();
    mock.push(mined_at(42)).unwrap();

    let block = provider.pending_transaction(hash).confirmations(0).await.unwrap();
    assert_eq!(block, U64::from(42));

    mock.assert_request("eth_getTransactionByHash", [hash]).unwrap();
    mock.assert_request("eth_getTransactionByHash", [hash]).unwrap();
    // no head lookups were needed
    assert_eq!(mock.pending_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn waits_for_confirmation_depth() {
    let mock = MockProvider::new();
    let provider = Provider::new(mock.clone());
    let hash = TxHash::repeat_byte(1);

    mock.push(mined_at(10)).unwrap();
    // a lagging head counts as no confirmation
    mock.push(U64::from(9)).unwrap();
    mock.push(U64::from(10)).unwrap();
    mock.push(U64::from(11)).unwrap();

    let block = provider.pending_transaction(hash).confirmations(2).await.unwrap();
    assert_eq!(block, U64::from(10));

    mock.assert_request("eth_getTransactionByHash", [hash]).unwrap();
    for _ in 0..3 {
        mock.assert_request("eth_blockNumber", ()).unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn one_confirmation_is_the_inclusion_block() {
    let mock = MockProvider::new();
    let provider = Provider::new(mock.clone());

    mock.push(mined_at(7)).unwrap();
    mock.push(U64::from(7)).unwrap();

    let block = provider.pending_transaction(TxHash::repeat_byte(1)).await.unwrap();
    assert_eq!(block, U64::from(7));
}

#[tokio::test(start_paused = true)]
async fn times_out_while_polling() {
    let node = NeverMined::default();
    let provider = Provider::new(node);
    let hash = TxHash::repeat_byte(2);

    let err = provider
        .pending_transaction(hash)
        .timeout(Duration::from_secs(1))
        .interval(Duration::from_millis(100))
        .await
        .unwrap_err();

    match err {
        ProviderError::TransactionTimeout { tx_hash, state } => {
            assert_eq!(tx_hash, hash);
            assert_eq!(state, WaitState::Polling);
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn polls_at_the_configured_interval() {
    let node = std::sync::Arc::new(NeverMined::default());
    let provider = Provider::from_client(node.clone());

    let _ = provider
        .pending_transaction(TxHash::zero())
        .timeout(Duration::from_millis(950))
        .interval(Duration::from_millis(100))
        .await;

    // lookups at 0, 100, ..., 900ms
    assert_eq!(node.lookups.load(Ordering::SeqCst), 10);
}

#[tokio::test(start_paused = true)]
async fn times_out_while_confirming() {
    let provider = Provider::new(StalledHead);

    let err = provider
        .pending_transaction(TxHash::repeat_byte(3))
        .confirmations(3)
        .timeout(Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProviderError::TransactionTimeout { state: WaitState::Mined(block), .. }
            if block == U64::from(10)
    ));
    assert!(err.to_string().contains("mined in block 10"));
}

#[tokio::test(start_paused = true)]
async fn transport_errors_are_not_retried() {
    let mock = MockProvider::new();
    let provider = Provider::new(mock.clone());
    mock.push_response(MockResponse::Error(JsonRpcError {
        code: -32601,
        message: "method not found".to_string(),
        data: None,
    }));

    let err = provider.pending_transaction(TxHash::zero()).await.unwrap_err();
    assert_eq!(err.as_error_response().unwrap().code, -32601);
    assert_eq!(mock.pending_requests(), 1);
}
