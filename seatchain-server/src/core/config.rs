//! Server configuration
//!
//! All settings load from environment variables with defaults:
//!
//! | Env var | Default | Notes |
//! |---------|---------|-------|
//! | WORK_DIR | /var/lib/seatchain | logs, database |
//! | HTTP_PORT | 3000 | |
//! | DATABASE_PATH | `<WORK_DIR>/seatchain.db` | SQLite file |
//! | PUBLIC_BASE_URL | http://localhost:5173 | redirects, metadata and verify links |
//! | RECONCILE_INTERVAL_SECS | 300 | 0 disables the re-mint sweep |
//! | WEBHOOK_SECRET | dev-webhook-secret | HMAC key for payment notifications |
//! | CHECKOUT_BASE_URL | http://localhost:4242 | hosted payment page |
//! | LEDGER_MODE | memory | `rpc` / `memory` / `off` |
//! | LEDGER_RPC_URL | http://localhost:8545 | |
//! | LEDGER_CONTRACT_ADDRESS | (empty) | ticket contract |
//! | LEDGER_SENDER_ADDRESS | (empty) | node-managed operator account |
//! | LEDGER_POLL_MS | 2000 | receipt polling interval |
//! | LEDGER_POLL_ATTEMPTS | 15 | receipt polling ceiling |

use crate::auth::JwtConfig;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Which ledger binding to construct at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerMode {
    /// JSON-RPC node
    Rpc,
    /// In-process stand-in (dev, tests)
    Memory,
    /// Capability absent
    Off,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// HMAC-SHA256 key for webhook signatures
    pub webhook_secret: String,
    /// Hosted payment page base URL
    pub checkout_base_url: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub mode: LedgerMode,
    pub rpc_url: String,
    pub contract_address: String,
    pub sender_address: String,
    pub receipt_poll_ms: u64,
    pub receipt_poll_attempts: u32,
    pub request_timeout_ms: u64,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub database_path: String,
    /// Base URL for user-facing links (payment redirects, ticket metadata,
    /// certificate verification)
    pub public_base_url: String,
    pub jwt: JwtConfig,
    pub payment: PaymentConfig,
    pub ledger: LedgerConfig,
    /// Interval of the unminted-payment sweep; 0 disables it
    pub reconcile_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let work_dir = env_or("WORK_DIR", "/var/lib/seatchain");
        let database_path =
            env_or("DATABASE_PATH", &format!("{work_dir}/seatchain.db"));

        let ledger_mode = match env_or("LEDGER_MODE", "memory").to_ascii_lowercase().as_str() {
            "rpc" => LedgerMode::Rpc,
            "off" => LedgerMode::Off,
            _ => LedgerMode::Memory,
        };

        Self {
            work_dir,
            http_port: env_parse("HTTP_PORT", 3000),
            database_path,
            public_base_url: env_or("PUBLIC_BASE_URL", "http://localhost:5173"),
            jwt: JwtConfig::from_env(),
            payment: PaymentConfig {
                webhook_secret: env_or("WEBHOOK_SECRET", "dev-webhook-secret"),
                checkout_base_url: env_or("CHECKOUT_BASE_URL", "http://localhost:4242"),
                success_url: env_or(
                    "PAYMENT_SUCCESS_URL",
                    "http://localhost:5173/payment/success",
                ),
                cancel_url: env_or(
                    "PAYMENT_CANCEL_URL",
                    "http://localhost:5173/payment/cancel",
                ),
            },
            ledger: LedgerConfig {
                mode: ledger_mode,
                rpc_url: env_or("LEDGER_RPC_URL", "http://localhost:8545"),
                contract_address: env_or("LEDGER_CONTRACT_ADDRESS", ""),
                sender_address: env_or("LEDGER_SENDER_ADDRESS", ""),
                receipt_poll_ms: env_parse("LEDGER_POLL_MS", 2000),
                receipt_poll_attempts: env_parse("LEDGER_POLL_ATTEMPTS", 15),
                request_timeout_ms: env_parse("LEDGER_REQUEST_TIMEOUT_MS", 10_000),
            },
            reconcile_interval_secs: env_parse("RECONCILE_INTERVAL_SECS", 300),
        }
    }
}
