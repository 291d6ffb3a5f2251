//! The settlement contract seam.

use std::sync::Arc;

use airdrop_types::EncodedClaim;
use async_trait::async_trait;

/// The one operation the claim pipeline consumes from the settlement system.
///
/// ## Contract
///
/// - `claim` is state-mutating and may be irreversible.
/// - Implementations MUST NOT modify the claim.
/// - Implementations MUST NOT retry internally.
/// - Authorization, double-claim prevention, and balance transfer happen
///   behind this call, never in front of it.
///
/// Receipt and error types are associated so that callers get back exactly
/// what the settlement system produced.
#[async_trait]
pub trait SettlementContract: Send + Sync {
    /// Confirmation artifact returned on success.
    type Receipt: Send;
    /// Failure raised by the call.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Submit a claim with the parameter order
    /// `(receiver, id, username, verified, amount, inviterId, inviteAward, sig)`.
    async fn claim(&self, claim: &EncodedClaim) -> Result<Self::Receipt, Self::Error>;
}

#[async_trait]
impl<S: SettlementContract + ?Sized> SettlementContract for Arc<S> {
    type Receipt = S::Receipt;
    type Error = S::Error;

    async fn claim(&self, claim: &EncodedClaim) -> Result<Self::Receipt, Self::Error> {
        (**self).claim(claim).await
    }
}
