//! Claim request model.
//!
//! A [`ClaimRequest`] arrives once per invocation and is turned into an
//! [`EncodedClaim`] exactly once before submission:
//!
//! ```text
//!   ClaimRequest ──encode()──▶ EncodedClaim ──ensure_fits()──▶ settlement.claim()
//! ```
//!
//! Only `id` and `inviter_id` change shape; every other field is carried
//! verbatim. Address, amount, and signature formats are the settlement
//! contract's to judge.

use serde::{Deserialize, Serialize};

use crate::{encode_identifier, AirdropError, EncodedIdentifier, Result};

/// An incoming airdrop claim, exactly as delivered by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    /// Chain address receiving the award.
    pub receiver: String,
    /// Free-form claimant identifier in the off-chain system.
    pub id: String,
    /// Display name, passed through unchanged.
    pub username: String,
    /// Whether the claimant's identity was verified.
    pub verified: bool,
    /// Award in the ledger's smallest unit, as an integer string.
    pub amount: String,
    /// Identifier of the referring party; empty when there is none.
    pub inviter_id: String,
    /// Referral bonus, as an integer string.
    pub invite_award: String,
    /// Hex signature authorizing this exact claim tuple.
    pub sig: String,
}

impl ClaimRequest {
    /// Parse a claim request from a JSON event object.
    ///
    /// # Errors
    /// Returns [`AirdropError::InvalidClaimRequest`] if a field is missing or
    /// has the wrong JSON type.
    pub fn from_json(event: &str) -> Result<Self> {
        serde_json::from_str(event).map_err(|e| AirdropError::InvalidClaimRequest {
            reason: e.to_string(),
        })
    }

    /// Parse a claim request from an already-decoded JSON value.
    ///
    /// # Errors
    /// Returns [`AirdropError::InvalidClaimRequest`] on a shape mismatch.
    pub fn from_value(event: serde_json::Value) -> Result<Self> {
        serde_json::from_value(event).map_err(|e| AirdropError::InvalidClaimRequest {
            reason: e.to_string(),
        })
    }

    /// Whether this claim carries a referral.
    #[must_use]
    pub fn has_inviter(&self) -> bool {
        !self.inviter_id.is_empty()
    }

    /// Replace both identifiers with their canonical encoding.
    #[must_use]
    pub fn encode(&self) -> EncodedClaim {
        EncodedClaim {
            receiver: self.receiver.clone(),
            id: encode_identifier(&self.id),
            username: self.username.clone(),
            verified: self.verified,
            amount: self.amount.clone(),
            inviter_id: encode_identifier(&self.inviter_id),
            invite_award: self.invite_award.clone(),
            sig: self.sig.clone(),
        }
    }
}

/// A claim with its identifiers in fixed-width form, ready for submission.
///
/// Field order matches the settlement contract's `claim` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedClaim {
    pub receiver: String,
    pub id: EncodedIdentifier,
    pub username: String,
    pub verified: bool,
    pub amount: String,
    pub inviter_id: EncodedIdentifier,
    pub invite_award: String,
    pub sig: String,
}

impl EncodedClaim {
    /// Check that both identifiers fit the contract's `bytes16` field.
    ///
    /// # Errors
    /// Returns [`AirdropError::IdentifierTooWide`] naming the first field
    /// that does not fit.
    pub fn ensure_fits(&self) -> Result<()> {
        self.id.to_field_bytes("id")?;
        self.inviter_id.to_field_bytes("inviterId")?;
        Ok(())
    }
}
