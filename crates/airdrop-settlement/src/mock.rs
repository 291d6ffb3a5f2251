//! Mock settlement contract for testing without chain access.
//!
//! Responses are pre-loaded and returned in FIFO order. When none remain,
//! `claim` fails with [`MockError::Exhausted`]. Every claim that reaches the
//! mock is recorded, so tests can assert on exactly what was submitted and
//! how many times.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use airdrop_types::EncodedClaim;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::SettlementContract;

/// Receipt handed back by [`MockSettlement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MockReceipt {
    pub tx_hash: String,
    pub block_number: u64,
}

/// Failures [`MockSettlement`] can be scripted to raise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockError {
    /// The contract reverted.
    #[error("execution reverted: {0}")]
    Reverted(String),
    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),
    /// No scripted response left.
    #[error("no mock response")]
    Exhausted,
}

/// Scripted, recording settlement contract.
#[derive(Default)]
pub struct MockSettlement {
    responses: Mutex<VecDeque<Result<MockReceipt, MockError>>>,
    calls: Mutex<Vec<EncodedClaim>>,
}

impl MockSettlement {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn push_success(&self, receipt: MockReceipt) {
        lock(&self.responses).push_back(Ok(receipt));
    }

    /// Queue a failure.
    pub fn push_failure(&self, error: MockError) {
        lock(&self.responses).push_back(Err(error));
    }

    /// Claims received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<EncodedClaim> {
        lock(&self.calls).clone()
    }

    /// Number of claims received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl SettlementContract for MockSettlement {
    type Receipt = MockReceipt;
    type Error = MockError;

    async fn claim(&self, claim: &EncodedClaim) -> Result<MockReceipt, MockError> {
        lock(&self.calls).push(claim.clone());
        lock(&self.responses)
            .pop_front()
            .unwrap_or(Err(MockError::Exhausted))
    }
}

const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<MockSettlement>();
    }
    let _ = check;
};
