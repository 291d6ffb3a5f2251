//! Claim submitter: normalize a claim and hand it to the settlement contract.
//!
//! Per invocation the flow is `Pending → {Succeeded, Failed}`:
//! 1. Encode `id` and `inviterId` into fixed-width hex
//! 2. Reject identifiers wider than `bytes16` (no call is made)
//! 3. Call [`SettlementContract::claim`] exactly once
//! 4. Return its receipt or error unchanged
//!
//! There is no retry and no deduplication here. Wrap the settlement in a
//! [`ReplayGuard`](crate::ReplayGuard) if the caller can redeliver events.

use std::sync::Arc;

use airdrop_types::{AirdropError, ClaimRequest};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::SettlementContract;

/// Failure of a single claim submission.
#[derive(Debug, Error)]
pub enum ClaimError<E: std::error::Error + 'static> {
    /// The claim could not be encoded for the contract. Nothing was sent.
    #[error(transparent)]
    Encoding(AirdropError),
    /// The settlement call failed. Carries the settlement error as raised.
    #[error(transparent)]
    Submission(E),
}

impl<E: std::error::Error + 'static> ClaimError<E> {
    /// Whether the claim was rejected before anything was sent.
    #[must_use]
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding(_))
    }

    /// The settlement error, if the failure came from the call.
    #[must_use]
    pub fn submission(&self) -> Option<&E> {
        match self {
            Self::Submission(err) => Some(err),
            Self::Encoding(_) => None,
        }
    }

    /// Take the settlement error out, if the failure came from the call.
    pub fn into_submission(self) -> Option<E> {
        match self {
            Self::Submission(err) => Some(err),
            Self::Encoding(_) => None,
        }
    }
}

/// Submits claims through an injected settlement contract handle.
///
/// The handle is built once at startup and shared read-only; submitters are
/// cheap to clone and safe to use from concurrent tasks.
pub struct ClaimSubmitter<S> {
    settlement: Arc<S>,
}

impl<S> Clone for ClaimSubmitter<S> {
    fn clone(&self) -> Self {
        Self {
            settlement: Arc::clone(&self.settlement),
        }
    }
}

impl<S: SettlementContract> ClaimSubmitter<S> {
    /// Create a submitter over an established settlement handle.
    #[must_use]
    pub fn new(settlement: Arc<S>) -> Self {
        Self { settlement }
    }

    /// The settlement handle this submitter calls.
    #[must_use]
    pub fn settlement(&self) -> &S {
        &self.settlement
    }

    /// Encode and submit one claim.
    ///
    /// # Errors
    /// - [`ClaimError::Encoding`] if `id` or `inviterId` is wider than the
    ///   contract field; the settlement is not called.
    /// - [`ClaimError::Submission`] with the settlement's own error.
    pub async fn submit(
        &self,
        request: &ClaimRequest,
    ) -> Result<S::Receipt, ClaimError<S::Error>> {
        let span = tracing::info_span!("claim", invocation = %Uuid::now_v7());

        async move {
            tracing::info!(
                receiver = %request.receiver,
                id = %request.id,
                username = %request.username,
                verified = request.verified,
                amount = %request.amount,
                inviter = %request.inviter_id,
                "Claim received"
            );

            let encoded = request.encode();
            if let Err(err) = encoded.ensure_fits() {
                tracing::warn!(error = %err, "Claim rejected before submission");
                return Err(ClaimError::Encoding(err));
            }

            tracing::debug!(
                id = %encoded.id,
                inviter = %encoded.inviter_id,
                "Identifiers encoded"
            );

            match self.settlement.claim(&encoded).await {
                Ok(receipt) => {
                    tracing::info!("Claim settled");
                    Ok(receipt)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Claim submission failed");
                    Err(ClaimError::Submission(err))
                }
            }
        }
        .instrument(span)
        .await
    }
}

const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<ClaimSubmitter<crate::MockSettlement>>();
    }
    let _ = check;
};
