//! Capability gateways
//!
//! Thin interfaces to the two external, non-transactional systems the
//! workflow depends on: the blockchain ledger and the payment processor.
//! All durable state lives in the local store; both gateways are treated as
//! unreliable, retryable oracles. No business logic lives here.
//!
//! Bindings:
//! - [`ledger::RpcLedger`] - JSON-RPC ledger node
//! - [`mock::InMemoryLedger`] - local stand-in for dev and tests
//! - [`ledger::NullLedger`] - capability absent (callers branch on
//!   [`LedgerGateway::is_available`])
//! - [`payment::HostedCheckoutGateway`] - provider-neutral hosted checkout

pub mod ledger;
pub mod mock;
pub mod payment;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gateway error types
///
/// Downstream of a durable local commit these are absorbed and logged,
/// never surfaced (see services layer).
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway transport error: {0}")]
    Transport(String),

    #[error("Confirmation not received after {attempts} attempts")]
    ConfirmationTimeout { attempts: u32 },

    #[error("Call rejected: {0}")]
    Rejected(String),

    #[error("Capability not available")]
    Unavailable,
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result of a confirmed mint call
#[derive(Debug, Clone)]
pub struct MintReceipt {
    /// Ledger-assigned token identifier
    pub token_id: i64,
    pub transaction_hash: String,
}

/// Blockchain ledger capability
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Whether a real ledger is bound; callers use this to skip optional
    /// corroboration paths instead of relying on wiring-time conditionals
    fn is_available(&self) -> bool {
        true
    }

    /// Mint a ticket token and block until the transaction is confirmed
    /// (bounded polling)
    async fn mint(&self, recipient: &str, event_id: i64, metadata_uri: &str)
    -> GatewayResult<MintReceipt>;

    /// Contract view: does `address` currently own `token_id`?
    async fn verify_ownership(&self, address: &str, token_id: i64) -> GatewayResult<bool>;

    /// Record attendance for a token on-chain
    async fn mark_attendance(&self, token_id: i64) -> GatewayResult<()>;

    /// Anchor a 32-byte content hash under a token; returns the transaction
    /// hash
    async fn anchor_hash(&self, token_id: i64, hash: &[u8; 32]) -> GatewayResult<String>;
}

/// Checkout session request
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub amount_cents: i64,
    pub currency: String,
    pub description: String,
    /// Caller-side reference appended to the success redirect
    pub success_ref: String,
    pub cancel_ref: String,
}

/// Opened checkout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub session_id: String,
    pub pay_url: String,
}

/// Payment processor capability
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a payable session for the given amount
    async fn create_session(&self, request: &SessionRequest) -> GatewayResult<CheckoutSession>;

    /// Verify an inbound notification's authenticity (HMAC / signature)
    fn verify_notification(&self, payload: &[u8], signature: &str) -> bool;
}
