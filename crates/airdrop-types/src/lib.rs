//! # airdrop-types
//!
//! Shared types, errors, and configuration for the **airdrop claimer**.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Claim model**: [`ClaimRequest`], [`EncodedClaim`]
//! - **Identifier encoding**: [`encode_identifier`], [`EncodedIdentifier`]
//! - **Configuration**: [`ClaimerConfig`], [`NetworkConfig`]
//! - **Errors**: [`AirdropError`] with `AD_ERR_` prefix codes
//! - **Constants**: field widths and configuration defaults

pub mod claim;
pub mod config;
pub mod constants;
pub mod error;
pub mod identifier;

pub use claim::*;
pub use config::*;
pub use error::*;
pub use identifier::*;

// Constants are accessed via `airdrop_types::constants::FOO`
// (not re-exported to avoid name collisions).
