//! EVM settlement binding.
//!
//! Connects the claim pipeline to the airdrop contract over JSON-RPC, signing
//! with a local private key. The claim tuple arrives as strings; this module
//! turns them into ABI values at the last moment:
//!
//! | Claim field               | ABI type  |
//! |---------------------------|-----------|
//! | `receiver`                | `address` |
//! | `id`, `inviterId`         | `bytes16` |
//! | `username`                | `string`  |
//! | `verified`                | `bool`    |
//! | `amount`, `inviteAward`   | `uint256` |
//! | `sig`                     | `bytes`   |
//!
//! A value that has no ABI form fails with
//! [`EvmSettlementError::InvalidArgument`] and nothing is broadcast.
//! RPC and confirmation failures come back as the underlying alloy errors.
//!
//! With preflight enabled, each claim first asks the contract who signed it
//! and logs the answer. Preflight runs inside [`SettlementContract::claim`],
//! so a [`ReplayGuard`](crate::ReplayGuard) in front of this binding blocks
//! replays before any view call is made.

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, FixedBytes, B256, U256};
use alloy::providers::{DynProvider, PendingTransactionError, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use airdrop_types::{AirdropError, ClaimerConfig, EncodedClaim, EncodedIdentifier};
use async_trait::async_trait;
use thiserror::Error;

use crate::SettlementContract;

sol! {
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IAirdrop {
        /// Settle a signed claim, paying `amount` to `receiver` and
        /// `inviteAward` to the inviter when `inviterId` is set.
        function claim(
            address receiver,
            bytes16 id,
            string username,
            bool verified,
            uint256 amount,
            bytes16 inviterId,
            uint256 inviteAward,
            bytes sig
        ) external;

        /// Digest the contract expects `sig` to be over.
        function getProveHash(
            address receiver,
            bytes16 id,
            string username,
            bool verified,
            uint256 amount,
            bytes16 inviterId,
            uint256 inviteAward
        ) external view returns (bytes32);

        /// Address recovered from `sig` over `proveHash`.
        function getMsgSigner(bytes32 proveHash, bytes sig) external view returns (address);
    }
}

/// Receipt of a settled claim transaction.
pub type ClaimReceipt = TransactionReceipt;

/// Failure from the EVM settlement binding.
#[derive(Debug, Error)]
pub enum EvmSettlementError {
    /// A claim field has no representation in its ABI type.
    #[error("AD_ERR_300: Argument `{field}` is not a valid {abi_type}: {reason}")]
    InvalidArgument {
        field: &'static str,
        abi_type: &'static str,
        reason: String,
    },
    /// RPC call or transaction submission failed, including reverts.
    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),
    /// The transaction was broadcast but its receipt could not be obtained.
    #[error(transparent)]
    Confirmation(#[from] PendingTransactionError),
}

/// Airdrop contract handle bound to a signing wallet.
pub struct EvmSettlement {
    contract: IAirdrop::IAirdropInstance<DynProvider>,
    wallet: Address,
    preflight: bool,
}

impl EvmSettlement {
    /// Build the signer, provider, and contract handle from configuration.
    ///
    /// No network traffic happens here.
    pub fn connect(config: &ClaimerConfig) -> airdrop_types::Result<Self> {
        let signer: PrivateKeySigner = config
            .private_key
            .parse()
            .map_err(|e| AirdropError::Configuration(format!("PRIVATE_KEY: {e}")))?;
        let wallet = signer.address();

        let rpc_url = config.network.rpc_url()?;
        let rpc_url = rpc_url
            .parse()
            .map_err(|e| AirdropError::Configuration(format!("RPC URL `{rpc_url}`: {e}")))?;

        let contract_address: Address = config.contract_address.parse().map_err(|e| {
            AirdropError::Configuration(format!(
                "AIRDROP_CONTRACT `{}`: {e}",
                config.contract_address
            ))
        })?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url)
            .erased();

        tracing::info!(
            network = %config.network.name,
            contract = %contract_address,
            wallet = %wallet,
            preflight = config.preflight,
            "Settlement binding ready"
        );

        Ok(Self {
            contract: IAirdrop::new(contract_address, provider),
            wallet,
            preflight: config.preflight,
        })
    }

    /// Address of the wallet paying for claim transactions.
    #[must_use]
    pub fn wallet_address(&self) -> Address {
        self.wallet
    }

    /// Address of the airdrop contract.
    #[must_use]
    pub fn contract_address(&self) -> Address {
        *self.contract.address()
    }

    /// Whether each claim is preceded by the diagnostic views.
    #[must_use]
    pub fn preflight_enabled(&self) -> bool {
        self.preflight
    }

    /// Ask the contract for the digest a claim's signature must cover.
    pub async fn prove_hash(&self, claim: &EncodedClaim) -> Result<B256, EvmSettlementError> {
        let call = prove_hash_call(claim)?;
        Ok(self.contract.call_builder(&call).call().await?)
    }

    /// Ask the contract which address signed a claim. Read-only.
    pub async fn recover_signer(&self, claim: &EncodedClaim) -> Result<Address, EvmSettlementError> {
        let call = IAirdrop::getMsgSignerCall {
            proveHash: self.prove_hash(claim).await?,
            sig: parse_bytes("sig", &claim.sig)?,
        };
        Ok(self.contract.call_builder(&call).call().await?)
    }

    async fn run_preflight(&self, claim: &EncodedClaim) {
        match self.recover_signer(claim).await {
            Ok(signer) => tracing::debug!(signer = %signer, id = %claim.id, "Preflight signer recovered"),
            Err(err) => tracing::warn!(error = %err, id = %claim.id, "Preflight failed"),
        }
    }
}

#[async_trait]
impl SettlementContract for EvmSettlement {
    type Receipt = ClaimReceipt;
    type Error = EvmSettlementError;

    async fn claim(&self, claim: &EncodedClaim) -> Result<ClaimReceipt, EvmSettlementError> {
        let call = claim_call(claim)?;
        if self.preflight {
            self.run_preflight(claim).await;
        }
        let pending = self.contract.call_builder(&call).send().await?;
        tracing::info!(tx_hash = %pending.tx_hash(), "Claim transaction broadcast");

        let receipt = pending.get_receipt().await?;
        tracing::info!(
            tx_hash = %receipt.transaction_hash,
            block = ?receipt.block_number,
            status = receipt.status(),
            gas_used = receipt.gas_used,
            "Claim transaction mined"
        );
        Ok(receipt)
    }
}

/// ABI arguments for `claim`.
pub fn claim_call(claim: &EncodedClaim) -> Result<IAirdrop::claimCall, EvmSettlementError> {
    Ok(IAirdrop::claimCall {
        receiver: parse_address("receiver", &claim.receiver)?,
        id: parse_identifier("id", &claim.id)?,
        username: claim.username.clone(),
        verified: claim.verified,
        amount: parse_uint("amount", &claim.amount)?,
        inviterId: parse_identifier("inviterId", &claim.inviter_id)?,
        inviteAward: parse_uint("inviteAward", &claim.invite_award)?,
        sig: parse_bytes("sig", &claim.sig)?,
    })
}

/// ABI arguments for `getProveHash`.
pub fn prove_hash_call(
    claim: &EncodedClaim,
) -> Result<IAirdrop::getProveHashCall, EvmSettlementError> {
    Ok(IAirdrop::getProveHashCall {
        receiver: parse_address("receiver", &claim.receiver)?,
        id: parse_identifier("id", &claim.id)?,
        username: claim.username.clone(),
        verified: claim.verified,
        amount: parse_uint("amount", &claim.amount)?,
        inviterId: parse_identifier("inviterId", &claim.inviter_id)?,
        inviteAward: parse_uint("inviteAward", &claim.invite_award)?,
    })
}

fn invalid(field: &'static str, abi_type: &'static str, reason: impl ToString) -> EvmSettlementError {
    EvmSettlementError::InvalidArgument {
        field,
        abi_type,
        reason: reason.to_string(),
    }
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, EvmSettlementError> {
    value.parse().map_err(|e| invalid(field, "address", e))
}

/// Decimal digits, or `0x` followed by hex digits. Nothing else is accepted.
fn parse_uint(field: &'static str, value: &str) -> Result<U256, EvmSettlementError> {
    let (digits, radix) = match value.strip_prefix("0x") {
        Some(hex) => (hex, 16),
        None => (value, 10),
    };
    let well_formed = !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    if !well_formed {
        return Err(invalid(
            field,
            "uint256",
            format!("`{value}` is neither decimal nor 0x-prefixed hex"),
        ));
    }
    U256::from_str_radix(digits, u64::from(radix)).map_err(|e| invalid(field, "uint256", e))
}

fn parse_bytes(field: &'static str, value: &str) -> Result<Bytes, EvmSettlementError> {
    value.parse().map_err(|e| invalid(field, "bytes", e))
}

fn parse_identifier(
    field: &'static str,
    value: &EncodedIdentifier,
) -> Result<FixedBytes<16>, EvmSettlementError> {
    value
        .to_field_bytes(field)
        .map(FixedBytes::from)
        .map_err(|e| invalid(field, "bytes16", e))
}
