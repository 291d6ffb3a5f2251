//! # airdrop-settlement
//!
//! Claim normalization and submission to the airdrop settlement contract.
//!
//! ## Architecture
//!
//! The [`ClaimSubmitter`] receives a [`ClaimRequest`](airdrop_types::ClaimRequest) and:
//! 1. Encodes `id` and `inviterId` into fixed-width hex
//! 2. Rejects identifiers wider than the contract's `bytes16` field
//! 3. Makes exactly one `claim` call through an injected [`SettlementContract`]
//! 4. Returns the receipt or the settlement error verbatim
//!
//! ```text
//! ClaimRequest → encode() → ensure_fits() → SettlementContract::claim() → Receipt | Error
//! ```
//!
//! Signature checks, double-claim prevention, and balance transfer belong to
//! the contract. Nothing here retries: a claim settles funds and a second
//! attempt may settle twice.
//!
//! ## Settlement implementations
//!
//! - [`EvmSettlement`]: JSON-RPC endpoint + local private-key wallet
//! - [`ReplayGuard`]: opt-in decorator refusing repeated claims
//! - [`MockSettlement`]: scripted responses for tests

pub mod contract;
pub mod evm;
pub mod mock;
pub mod replay_guard;
pub mod submitter;

pub use contract::SettlementContract;
pub use evm::{ClaimReceipt, EvmSettlement, EvmSettlementError};
pub use mock::{MockError, MockReceipt, MockSettlement};
pub use replay_guard::{ClaimKey, ReplayError, ReplayGuard};
pub use submitter::{ClaimError, ClaimSubmitter};
