use crate::{Provider, ProviderError};
use ethwallet_core::types::{TxHash, U64};
use std::{
    fmt,
    future::{Future, IntoFuture},
    ops::Deref,
    pin::Pin,
    time::Duration,
};
use tracing::{debug, trace};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const DEFAULT_CONFIRMATION_INTERVAL: Duration = Duration::from_millis(500);

/// Progress of a [`PendingTransaction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitState {
    /// The transaction has not been included in a block yet
    Polling,
    /// The transaction was included in the given block and is gaining confirmations
    Mined(U64),
    /// The transaction in the given block reached the requested depth
    Confirmed(U64),
}

impl fmt::Display for WaitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitState::Polling => f.write_str("waiting to be mined"),
            WaitState::Mined(block) => write!(f, "confirming, mined in block {block}"),
            WaitState::Confirmed(block) => write!(f, "confirmed in block {block}"),
        }
    }
}

/// A pending transaction is a transaction which has been submitted but is not yet mined.
/// `await`'ing on a pending transaction will resolve to the number of the block which mined it
/// once the transaction has enough `confirmations`. The default number of confirmations
/// is 1, but may be adjusted with the `confirmations` method.
///
/// The whole wait is bounded by `timeout`; when it elapses the future fails with
/// [`ProviderError::TransactionTimeout`] carrying the last observed [`WaitState`].
#[derive(Clone, Debug)]
#[must_use = "pending transactions do nothing unless awaited"]
pub struct PendingTransaction<'a> {
    tx_hash: TxHash,
    confirmations: usize,
    timeout: Duration,
    interval: Duration,
    confirmation_interval: Duration,
    provider: &'a Provider,
}

impl<'a> PartialEq for PendingTransaction<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.tx_hash == other.tx_hash
    }
}

impl<'a> PartialEq<TxHash> for PendingTransaction<'a> {
    fn eq(&self, other: &TxHash) -> bool {
        &self.tx_hash == other
    }
}

impl<'a> Eq for PendingTransaction<'a> {}

impl<'a> Deref for PendingTransaction<'a> {
    type Target = TxHash;

    fn deref(&self) -> &Self::Target {
        &self.tx_hash
    }
}

impl<'a> PendingTransaction<'a> {
    /// Creates a new pending transaction poller from a hash and a provider
    pub fn new(tx_hash: TxHash, provider: &'a Provider) -> Self {
        Self {
            tx_hash,
            confirmations: 1,
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
            confirmation_interval: DEFAULT_CONFIRMATION_INTERVAL,
            provider,
        }
    }

    /// Returns the hash of the awaited transaction
    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Sets the number of confirmations for the pending transaction to resolve.
    /// Zero resolves as soon as the transaction is mined.
    pub fn confirmations(mut self, confs: usize) -> Self {
        self.confirmations = confs;
        self
    }

    /// Sets the overall deadline of the wait
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    /// Sets the delay between lookups while the transaction is not mined
    pub fn interval(mut self, duration: Duration) -> Self {
        self.interval = duration;
        self
    }

    /// Sets the delay between head block lookups while the transaction gains confirmations
    pub fn confirmation_interval(mut self, duration: Duration) -> Self {
        self.confirmation_interval = duration;
        self
    }

    async fn wait(self) -> Result<U64, ProviderError> {
        let mut state = WaitState::Polling;
        let res = tokio::time::timeout(self.timeout, self.run(&mut state)).await;
        match res {
            Ok(res) => res,
            Err(_) => {
                debug!(tx_hash = ?self.tx_hash, %state, "timed out waiting for transaction");
                Err(ProviderError::TransactionTimeout { tx_hash: self.tx_hash, state })
            }
        }
    }

    async fn run(&self, state: &mut WaitState) -> Result<U64, ProviderError> {
        loop {
            match *state {
                WaitState::Polling => {
                    match self.provider.get_transaction_block(self.tx_hash).await? {
                        Some(block) => {
                            debug!(tx_hash = ?self.tx_hash, %block, "transaction mined");
                            *state = WaitState::Mined(block);
                        }
                        None => {
                            trace!(tx_hash = ?self.tx_hash, "transaction not mined yet");
                            tokio::time::sleep(self.interval).await;
                        }
                    }
                }
                WaitState::Mined(block) => {
                    if self.confirmations == 0 {
                        *state = WaitState::Confirmed(block);
                        continue
                    }

                    let head = self.provider.get_block_number().await?;
                    // a head behind the inclusion block counts as no confirmation
                    let depth = if head < block { 0 } else { (head - block).as_u64() + 1 };
                    trace!(
                        tx_hash = ?self.tx_hash,
                        depth,
                        wanted = self.confirmations,
                        "confirmations"
                    );
                    if depth >= self.confirmations as u64 {
                        debug!(tx_hash = ?self.tx_hash, %block, "transaction confirmed");
                        *state = WaitState::Confirmed(block);
                    } else {
                        tokio::time::sleep(self.confirmation_interval).await;
                    }
                }
                WaitState::Confirmed(block) => return Ok(block),
            }
        }
    }
}

impl<'a> IntoFuture for PendingTransaction<'a> {
    type Output = Result<U64, ProviderError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}
