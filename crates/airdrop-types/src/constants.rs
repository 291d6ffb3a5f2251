//! System-wide constants for the airdrop claimer.

/// Width of the contract's fixed-size identifier field (`bytes16`).
pub const IDENTIFIER_FIELD_BYTES: usize = 16;

/// Number of hex digits an identifier is padded to (excluding the prefix).
pub const IDENTIFIER_HEX_DIGITS: usize = IDENTIFIER_FIELD_BYTES * 2;

/// Prefix marking a string as hex.
pub const HEX_PREFIX: &str = "0x";

/// Character used to right-pad encoded identifiers.
pub const IDENTIFIER_PAD: char = '0';

/// Network used when `NETWORK` is unset.
pub const DEFAULT_NETWORK: &str = "mainnet";

/// Replay guard cache size when `DEDUP_CACHE_SIZE` is unset (guard disabled).
pub const DEFAULT_DEDUP_CACHE_SIZE: usize = 0;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
