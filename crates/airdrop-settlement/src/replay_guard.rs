//! Replay guard: refuses to submit the same claim twice.
//!
//! The claim pipeline has no idempotency key: if the invocation transport
//! redelivers an event, the claim is submitted again. [`ReplayGuard`] wraps
//! any [`SettlementContract`] and remembers a digest of every claim it has
//! let through. A repeat returns [`ReplayError::AlreadySubmitted`] without
//! calling the inner contract.
//!
//! A claim key is recorded *before* the call and is never released, even if
//! the call fails: a timed-out transaction may still land on chain.
//!
//! Memory is bounded. When `max_size` keys are held, the oldest is evicted.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, PoisonError};

use airdrop_types::EncodedClaim;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::SettlementContract;

/// Upper bound on slots reserved up front; the set grows past it on demand.
const PREALLOCATED_KEYS: usize = 1024;

/// SHA-256 digest identifying one claim tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClaimKey(pub [u8; 32]);

impl ClaimKey {
    /// Digest of the full parameter tuple.
    ///
    /// Format: `"airdrop:claim:v1:"` followed by each field as
    /// `len (u32 LE) || bytes`, in contract parameter order.
    #[must_use]
    pub fn of(claim: &EncodedClaim) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"airdrop:claim:v1:");
        let verified = if claim.verified { "1" } else { "0" };
        for field in [
            claim.receiver.as_str(),
            claim.id.as_str(),
            claim.username.as_str(),
            verified,
            claim.amount.as_str(),
            claim.inviter_id.as_str(),
            claim.invite_award.as_str(),
            claim.sig.as_str(),
        ] {
            let len = u32::try_from(field.len()).unwrap_or(u32::MAX);
            hasher.update(len.to_le_bytes());
            hasher.update(field.as_bytes());
        }
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "claim:{}", hex::encode(&self.0[..8]))
    }
}

/// Failure from a guarded settlement.
#[derive(Debug, Error)]
pub enum ReplayError<E: std::error::Error + 'static> {
    /// This exact claim was already let through.
    #[error("AD_ERR_400: Claim {key} already submitted at {first_seen}")]
    AlreadySubmitted {
        key: ClaimKey,
        first_seen: DateTime<Utc>,
    },
    /// The inner settlement's own error.
    #[error(transparent)]
    Inner(E),
}

/// Bounded set of submitted claim keys with FIFO eviction.
struct SeenClaims {
    seen: HashMap<ClaimKey, DateTime<Utc>>,
    /// Insertion order for eviction (front = oldest).
    order: VecDeque<ClaimKey>,
    max_size: usize,
}

impl SeenClaims {
    fn new(max_size: usize) -> Self {
        Self {
            seen: HashMap::with_capacity(max_size.min(PREALLOCATED_KEYS)),
            order: VecDeque::with_capacity(max_size.min(PREALLOCATED_KEYS)),
            max_size,
        }
    }

    /// Record `key`, or return when it was first recorded.
    fn mark(&mut self, key: ClaimKey, now: DateTime<Utc>) -> Result<(), DateTime<Utc>> {
        if let Some(first_seen) = self.seen.get(&key) {
            return Err(*first_seen);
        }

        if self.seen.len() >= self.max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }

        self.seen.insert(key, now);
        self.order.push_back(key);
        Ok(())
    }
}

/// Settlement decorator that lets each distinct claim through at most once.
pub struct ReplayGuard<S> {
    inner: S,
    seen: Mutex<SeenClaims>,
}

impl<S> ReplayGuard<S> {
    /// Wrap `inner`, remembering up to `max_size` claims.
    ///
    /// # Panics
    /// Panics if `max_size` is zero.
    pub fn new(inner: S, max_size: usize) -> Self {
        assert!(max_size > 0, "ReplayGuard max_size must be > 0");
        Self {
            inner,
            seen: Mutex::new(SeenClaims::new(max_size)),
        }
    }

    /// The wrapped settlement.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Whether a claim with this key has been let through.
    pub fn is_submitted(&self, key: &ClaimKey) -> bool {
        self.lock().seen.contains_key(key)
    }

    /// Number of claim keys currently remembered.
    pub fn len(&self) -> usize {
        self.lock().seen.len()
    }

    /// Whether no claim has been let through yet.
    pub fn is_empty(&self) -> bool {
        self.lock().seen.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SeenClaims> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admit<E: std::error::Error + 'static>(&self, key: ClaimKey) -> Result<(), ReplayError<E>> {
        self.lock()
            .mark(key, Utc::now())
            .map_err(|first_seen| ReplayError::AlreadySubmitted { key, first_seen })
    }
}

#[async_trait]
impl<S: SettlementContract> SettlementContract for ReplayGuard<S> {
    type Receipt = S::Receipt;
    type Error = ReplayError<S::Error>;

    async fn claim(&self, claim: &EncodedClaim) -> Result<Self::Receipt, Self::Error> {
        let key = ClaimKey::of(claim);
        if let Err(err) = self.admit(key) {
            tracing::warn!(key = %key, error = %err, "Replayed claim blocked");
            return Err(err);
        }
        self.inner.claim(claim).await.map_err(ReplayError::Inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MockError, MockReceipt, MockSettlement};
    use airdrop_types::ClaimRequest;

    fn claim(id: &str) -> EncodedClaim {
        ClaimRequest {
            receiver: "0x7Ad941fAf1227105624D3170e851Bb54FE88D558".into(),
            id: id.into(),
            username: id.into(),
            verified: true,
            amount: "1000".into(),
            inviter_id: String::new(),
            invite_award: "0".into(),
            sig: "0x01".into(),
        }
        .encode()
    }

    fn receipt(block_number: u64) -> MockReceipt {
        MockReceipt {
            tx_hash: format!("0x{block_number:02x}"),
            block_number,
        }
    }

    #[test]
    fn key_depends_on_every_field() {
        let base = claim("id001");
        let mut flipped = base.clone();
        flipped.verified = false;
        let mut other_sig = base.clone();
        other_sig.sig = "0x02".into();

        assert_eq!(ClaimKey::of(&base), ClaimKey::of(&base.clone()));
        assert_ne!(ClaimKey::of(&base), ClaimKey::of(&flipped));
        assert_ne!(ClaimKey::of(&base), ClaimKey::of(&other_sig));
        assert_ne!(ClaimKey::of(&base), ClaimKey::of(&claim("id002")));
    }

    #[tokio::test]
    async fn first_claim_passes_through() {
        let mock = MockSettlement::new();
        mock.push_success(receipt(1));
        let guard = ReplayGuard::new(mock, 10);

        let got = guard.claim(&claim("id001")).await.unwrap();
        assert_eq!(got, receipt(1));
        assert!(guard.is_submitted(&ClaimKey::of(&claim("id001"))));
        assert_eq!(guard.len(), 1);
    }

    #[tokio::test]
    async fn replay_blocked_without_inner_call() {
        let mock = MockSettlement::new();
        mock.push_success(receipt(1));
        mock.push_success(receipt(2));
        let guard = ReplayGuard::new(mock, 10);

        guard.claim(&claim("id001")).await.unwrap();
        let err = guard.claim(&claim("id001")).await.unwrap_err();

        assert!(
            matches!(err, ReplayError::AlreadySubmitted { key, .. } if key == ClaimKey::of(&claim("id001"))),
            "Expected AlreadySubmitted, got: {err:?}"
        );
        assert!(err.to_string().starts_with("AD_ERR_400"));
        assert_eq!(guard.inner().call_count(), 1);
    }

    #[tokio::test]
    async fn failed_attempt_still_blocks_replay() {
        let mock = MockSettlement::new();
        mock.push_failure(MockError::Network("timeout".into()));
        mock.push_success(receipt(2));
        let guard = ReplayGuard::new(mock, 10);

        let first = guard.claim(&claim("id001")).await.unwrap_err();
        assert!(matches!(first, ReplayError::Inner(MockError::Network(_))));

        let second = guard.claim(&claim("id001")).await.unwrap_err();
        assert!(matches!(second, ReplayError::AlreadySubmitted { .. }));
        assert_eq!(guard.inner().call_count(), 1);
    }

    #[tokio::test]
    async fn distinct_claims_pass() {
        let mock = MockSettlement::new();
        for n in 0..3 {
            mock.push_success(receipt(n));
        }
        let guard = ReplayGuard::new(mock, 10);

        for id in ["a", "b", "c"] {
            guard.claim(&claim(id)).await.unwrap();
        }
        assert_eq!(guard.len(), 3);
        assert_eq!(guard.inner().call_count(), 3);
    }

    #[tokio::test]
    async fn evicts_oldest() {
        let mock = MockSettlement::new();
        for n in 0..5 {
            mock.push_success(receipt(n));
        }
        let guard = ReplayGuard::new(mock, 3);

        for id in ["t1", "t2", "t3", "t4"] {
            guard.claim(&claim(id)).await.unwrap();
        }
        assert_eq!(guard.len(), 3);
        assert!(!guard.is_submitted(&ClaimKey::of(&claim("t1"))), "t1 should have been evicted");
        assert!(guard.is_submitted(&ClaimKey::of(&claim("t4"))));

        // t1 is forgotten, so it goes through again.
        guard.claim(&claim("t1")).await.unwrap();
        assert_eq!(guard.inner().call_count(), 5);
    }

    #[test]
    fn empty_guard() {
        let guard = ReplayGuard::new(MockSettlement::new(), 10);
        assert!(guard.is_empty());
        assert_eq!(guard.len(), 0);
    }

    #[tokio::test]
    async fn huge_capacity_reserves_lazily() {
        let mock = MockSettlement::new();
        mock.push_success(receipt(1));
        let guard = ReplayGuard::new(mock, usize::MAX);
        assert!(guard.lock().seen.capacity() < usize::MAX);

        guard.claim(&claim("id001")).await.unwrap();
        let err = guard.claim(&claim("id001")).await.unwrap_err();
        assert!(matches!(err, ReplayError::AlreadySubmitted { .. }));
    }

    #[test]
    #[should_panic(expected = "max_size must be > 0")]
    fn zero_max_size_panics() {
        let _ = ReplayGuard::new(MockSettlement::new(), 0);
    }
}
