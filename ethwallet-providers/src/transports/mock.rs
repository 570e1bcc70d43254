use crate::{JsonRpcClient, ProviderError, RpcError};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use thiserror::Error;

/// Helper response type for `MockProvider`, allowing custom JSON-RPC errors to be provided.
/// `Value` for successful responses, `Error` for JSON-RPC errors.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Successful response with a `serde_json::Value`.
    Value(Value),

    /// Error response with a `JsonRpcError`.
    Error(super::JsonRpcError),
}

#[derive(Clone, Debug, Default)]
/// Mock transport used in test environments.
///
/// Responses are served in the order they were pushed and every request is recorded, so a test
/// can script a whole conversation with a node up front. Clones share both queues.
pub struct MockProvider {
    requests: Arc<Mutex<VecDeque<(String, Value)>>>,
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl JsonRpcClient for MockProvider {
    /// Pushes the `(method, params)` to the back of the `requests` queue,
    /// pops the responses from the front of the `responses` queue
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        lock(&self.requests).push_back((method.to_owned(), params));
        let element = lock(&self.responses).pop_front().ok_or(MockError::EmptyResponses)?;
        match element {
            MockResponse::Value(value) => Ok(value),
            MockResponse::Error(error) => Err(MockError::JsonRpcError(error).into()),
        }
    }
}

impl MockProvider {
    /// Instantiates a mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that the oldest unchecked request matches the provided method and params
    pub fn assert_request<T: Serialize + Send + Sync>(
        &self,
        method: &str,
        data: T,
    ) -> Result<(), MockError> {
        let (m, inp) = self.take_request()?;
        assert_eq!(m, method);
        assert_eq!(serde_json::to_value(data)?, inp);
        Ok(())
    }

    /// Removes and returns the oldest unchecked request
    pub fn take_request(&self) -> Result<(String, Value), MockError> {
        lock(&self.requests).pop_front().ok_or(MockError::EmptyRequests)
    }

    /// Returns the number of requests received and not yet checked
    pub fn pending_requests(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Pushes the data to the responses
    pub fn push<T: Serialize>(&self, data: T) -> Result<(), MockError> {
        let value = serde_json::to_value(data)?;
        lock(&self.responses).push_back(MockResponse::Value(value));
        Ok(())
    }

    /// Pushes the data or error to the responses
    pub fn push_response(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }
}

#[derive(Error, Debug)]
/// Errors for the `MockProvider`
pub enum MockError {
    /// (De)Serialization error
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// Empty requests array
    #[error("empty requests array, please push some requests")]
    EmptyRequests,

    /// Empty responses array
    #[error("empty responses array, please push some responses")]
    EmptyResponses,

    /// Custom JsonRpcError
    #[error("JSON-RPC error: {0}")]
    JsonRpcError(super::JsonRpcError),
}

impl RpcError for MockError {
    fn as_error_response(&self) -> Option<&super::JsonRpcError> {
        match self {
            MockError::JsonRpcError(e) => Some(e),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            MockError::SerdeJson(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MockError> for ProviderError {
    fn from(src: MockError) -> Self {
        ProviderError::JsonRpcClientError(Box::new(src))
    }
}
