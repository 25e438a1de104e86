//! In-memory ledger stand-in
//!
//! Local binding for development and tests: sequential token ids, recorded
//! attendance and anchors, and a failure switch so tests can exercise the
//! degraded paths (mint timeout, anchor failure).

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use super::{GatewayError, GatewayResult, LedgerGateway, MintReceipt};

#[derive(Default)]
struct LedgerState {
    /// token id -> owner address
    owners: HashMap<i64, String>,
    attended: HashSet<i64>,
    /// token id -> anchored hash
    anchors: HashMap<i64, [u8; 32]>,
}

pub struct InMemoryLedger {
    next_token: AtomicI64,
    failing: AtomicBool,
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            next_token: AtomicI64::new(1),
            failing: AtomicBool::new(false),
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Make every subsequent call fail with a confirmation timeout
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn minted_count(&self) -> usize {
        self.state.lock().expect("ledger state lock").owners.len()
    }

    pub fn owner_of(&self, token_id: i64) -> Option<String> {
        self.state
            .lock()
            .expect("ledger state lock")
            .owners
            .get(&token_id)
            .cloned()
    }

    pub fn attendance_marked(&self, token_id: i64) -> bool {
        self.state
            .lock()
            .expect("ledger state lock")
            .attended
            .contains(&token_id)
    }

    pub fn anchored_hash(&self, token_id: i64) -> Option<[u8; 32]> {
        self.state
            .lock()
            .expect("ledger state lock")
            .anchors
            .get(&token_id)
            .copied()
    }

    fn check_failing(&self) -> GatewayResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::ConfirmationTimeout { attempts: 1 });
        }
        Ok(())
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerGateway for InMemoryLedger {
    async fn mint(
        &self,
        recipient: &str,
        _event_id: i64,
        _metadata_uri: &str,
    ) -> GatewayResult<MintReceipt> {
        self.check_failing()?;
        let token_id = self.next_token.fetch_add(1, Ordering::SeqCst);
        self.state
            .lock()
            .expect("ledger state lock")
            .owners
            .insert(token_id, recipient.to_ascii_lowercase());
        Ok(MintReceipt {
            token_id,
            transaction_hash: format!("0xmem{token_id:060x}"),
        })
    }

    async fn verify_ownership(&self, address: &str, token_id: i64) -> GatewayResult<bool> {
        self.check_failing()?;
        Ok(self
            .state
            .lock()
            .expect("ledger state lock")
            .owners
            .get(&token_id)
            .is_some_and(|owner| owner.eq_ignore_ascii_case(address)))
    }

    async fn mark_attendance(&self, token_id: i64) -> GatewayResult<()> {
        self.check_failing()?;
        self.state
            .lock()
            .expect("ledger state lock")
            .attended
            .insert(token_id);
        Ok(())
    }

    async fn anchor_hash(&self, token_id: i64, hash: &[u8; 32]) -> GatewayResult<String> {
        self.check_failing()?;
        self.state
            .lock()
            .expect("ledger state lock")
            .anchors
            .insert(token_id, *hash);
        Ok(format!("0xanchor{token_id:057x}"))
    }
}
