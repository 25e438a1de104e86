//! Shared server state
//!
//! One [`ServerState`] is built at startup and cloned into every handler.
//! The ledger and payment gateways are trait objects so the bindings can be
//! swapped per deployment (and per test) without touching the services.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::config::{Config, LedgerMode};
use crate::db::DbService;
use crate::gateway::ledger::{NullLedger, RpcLedger};
use crate::gateway::mock::InMemoryLedger;
use crate::gateway::payment::HostedCheckoutGateway;
use crate::gateway::{LedgerGateway, PaymentGateway};
use crate::message::LiveChannel;
use crate::services::lottery::LotteryLocks;
use crate::utils::AppResult;

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub ledger: Arc<dyn LedgerGateway>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub live: LiveChannel,
    pub lottery_locks: Arc<LotteryLocks>,
}

impl ServerState {
    /// Open the database and wire the gateways per configuration
    pub async fn initialize(config: Config) -> AppResult<Self> {
        let db = DbService::new(&config.database_path).await?;

        let ledger: Arc<dyn LedgerGateway> = match config.ledger.mode {
            LedgerMode::Rpc => {
                tracing::info!(rpc_url = %config.ledger.rpc_url, "Ledger: JSON-RPC node");
                Arc::new(RpcLedger::new(config.ledger.clone()))
            }
            LedgerMode::Memory => {
                tracing::info!("Ledger: in-memory stand-in");
                Arc::new(InMemoryLedger::new())
            }
            LedgerMode::Off => {
                tracing::info!("Ledger: disabled");
                Arc::new(NullLedger)
            }
        };

        let payment_gateway: Arc<dyn PaymentGateway> = Arc::new(HostedCheckoutGateway::new(
            &config.payment.webhook_secret,
            config.payment.checkout_base_url.clone(),
        ));

        Ok(Self {
            jwt_service: Arc::new(JwtService::new(config.jwt.clone())),
            config: Arc::new(config),
            pool: db.pool,
            ledger,
            payment_gateway,
            live: LiveChannel::new(),
            lottery_locks: Arc::new(LotteryLocks::new()),
        })
    }

    /// State over an in-memory database and gateways; integration tests
    /// drive the full router against this.
    #[cfg(test)]
    pub async fn for_tests() -> Self {
        let config = Config::from_env();
        let db = DbService::in_memory().await.expect("in-memory db");
        Self {
            jwt_service: Arc::new(JwtService::new(config.jwt.clone())),
            config: Arc::new(config),
            pool: db.pool,
            ledger: Arc::new(InMemoryLedger::new()),
            payment_gateway: Arc::new(HostedCheckoutGateway::new(
                "test-secret",
                "http://checkout.local",
            )),
            live: LiveChannel::new(),
            lottery_locks: Arc::new(LotteryLocks::new()),
        }
    }
}
