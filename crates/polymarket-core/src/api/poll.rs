//! Polling a relayed transaction until it settles.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::types::{RelayerTransaction, RelayerTransactionState};
use crate::{Error, Result};

/// Default number of fetches before giving up.
pub const DEFAULT_MAX_POLLS: u32 = 10;

/// Default pause between fetches.
pub const DEFAULT_POLL_FREQUENCY: Duration = Duration::from_secs(2);

/// Shortest pause honoured between fetches.
pub const MIN_POLL_FREQUENCY: Duration = Duration::from_secs(1);

/// Cooperative cancellation signal shared between a poller and its owner.
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.sender.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// How often and how long to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub max_polls: u32,
    pub poll_frequency: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            max_polls: DEFAULT_MAX_POLLS,
            poll_frequency: DEFAULT_POLL_FREQUENCY,
        }
    }
}

impl PollOptions {
    pub fn new(max_polls: u32, poll_frequency: Duration) -> Self {
        Self {
            max_polls,
            poll_frequency,
        }
    }

    /// Replace out-of-range values with the defaults: zero polls becomes
    /// [`DEFAULT_MAX_POLLS`], a pause under [`MIN_POLL_FREQUENCY`] becomes
    /// [`DEFAULT_POLL_FREQUENCY`].
    pub fn normalized(self) -> Self {
        Self {
            max_polls: if self.max_polls == 0 {
                DEFAULT_MAX_POLLS
            } else {
                self.max_polls
            },
            poll_frequency: if self.poll_frequency < MIN_POLL_FREQUENCY {
                DEFAULT_POLL_FREQUENCY
            } else {
                self.poll_frequency
            },
        }
    }
}

/// Fetch a transaction until it reaches one of `target_states`.
///
/// `fetch` returns `None` while the relayer does not know the transaction
/// yet. The loop ends with the transaction on a target state, with
/// [`Error::TerminalState`] on `fail_state`, with [`Error::Cancelled`] as soon
/// as `cancel` fires, or with [`Error::Timeout`] after exactly `max_polls`
/// fetches. Fetch errors are returned as they are.
pub async fn poll_until_state<F, Fut>(
    transaction_id: &str,
    target_states: &[RelayerTransactionState],
    fail_state: Option<&RelayerTransactionState>,
    options: PollOptions,
    cancel: Option<&CancelToken>,
    mut fetch: F,
) -> Result<RelayerTransaction>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<RelayerTransaction>>>,
{
    let options = options.normalized();
    let cancelled = || Error::Cancelled {
        transaction_id: transaction_id.to_string(),
    };
    let mut polls = 0u32;

    loop {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(cancelled());
        }

        if let Some(transaction) = fetch().await? {
            if target_states.contains(&transaction.state) {
                debug!(transaction_id, state = %transaction.state, polls, "Transaction reached target state");
                return Ok(transaction);
            }
            if fail_state == Some(&transaction.state) {
                warn!(
                    transaction_id,
                    state = %transaction.state,
                    transaction_hash = %transaction.transaction_hash,
                    "Transaction reached failure state"
                );
                return Err(Error::TerminalState {
                    transaction_id: transaction_id.to_string(),
                    state: transaction.state.to_string(),
                    transaction_hash: transaction.transaction_hash,
                });
            }
        }

        polls += 1;
        if polls >= options.max_polls {
            return Err(Error::Timeout {
                transaction_id: transaction_id.to_string(),
                polls,
            });
        }

        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = tokio::time::sleep(options.poll_frequency) => {}
                    _ = token.cancelled() => return Err(cancelled()),
                }
            }
            None => tokio::time::sleep(options.poll_frequency).await,
        }
    }
}
