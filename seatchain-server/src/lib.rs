//! Seatchain Server - lottery-based event ticketing workflow
//!
//! # Pipeline
//!
//! Application intake → seat lottery → hosted checkout → NFT ticket mint →
//! gate check-in → attendance certificate. Every stage is idempotent under
//! retries and duplicate deliveries; the SQLite store is the source of
//! truth and the two external systems (payment processor, blockchain
//! ledger) are treated as unreliable, retryable oracles.
//!
//! # Module structure
//!
//! ```text
//! seatchain-server/src/
//! ├── core/          # config, state, server lifecycle, background tasks
//! ├── auth/          # JWT validation, CurrentUser, middleware
//! ├── gateway/       # ledger and payment capability bindings
//! ├── services/      # the workflow stages
//! ├── api/           # HTTP routes and handlers
//! ├── message/       # live broadcast channel
//! ├── db/            # pool, migrations, repositories
//! └── utils/         # errors, logging, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod gateway;
pub mod message;
pub mod services;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   _____            __       __          _
  / ___/___  ____ _/ /______/ /_  ____ _(_)___
  \__ \/ _ \/ __ `/ __/ ___/ __ \/ __ `/ / __ \
 ___/ /  __/ /_/ / /_/ /__/ / / / /_/ / / / / /
/____/\___/\__,_/\__/\___/_/ /_/\__,_/_/_/ /_/

  Event Ticketing Workflow Server v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
