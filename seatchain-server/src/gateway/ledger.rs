//! JSON-RPC ledger gateway
//!
//! Talks to a ledger node over JSON-RPC: state-changing calls go through
//! `eth_sendTransaction` (the node holds the operator key) followed by
//! bounded `eth_getTransactionReceipt` polling; views go through
//! `eth_call`. The receipt-log decoding that extracts a minted token id is
//! deliberately contained here - nothing outside this module inspects raw
//! receipt structure.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

use super::{GatewayError, GatewayResult, LedgerGateway, MintReceipt};
use crate::core::LedgerConfig;

// Selectors for the ticket contract's entry points (4-byte keccak prefixes
// of the canonical signatures).
const SEL_MINT_TICKET: &str = "0x3dbd4ab5"; // mintTicket(address,uint256,string)
const SEL_OWNER_OF: &str = "0x6352211e"; // ownerOf(uint256)
const SEL_MARK_ATTENDANCE: &str = "0xca33c874"; // markAttendance(uint256)
const SEL_ISSUE_CERT_HASH: &str = "0x9b6a1f72"; // issueCertificateHash(uint256,bytes32)

/// Ledger bound to a JSON-RPC node
pub struct RpcLedger {
    client: reqwest::Client,
    config: LedgerConfig,
}

impl RpcLedger {
    pub fn new(config: LedgerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    async fn rpc(&self, method: &str, params: Value) -> GatewayResult<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("{method}: {e}")))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("{method}: invalid response: {e}")))?;

        if let Some(err) = payload.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown node error");
            return Err(GatewayError::Rejected(format!("{method}: {message}")));
        }

        Ok(payload.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Submit a state-changing call and wait for its receipt
    async fn send_and_confirm(&self, data: String) -> GatewayResult<Value> {
        let tx = json!([{
            "from": self.config.sender_address,
            "to": self.config.contract_address,
            "data": data,
        }]);

        let result = self.rpc("eth_sendTransaction", tx).await?;
        let tx_hash = result
            .as_str()
            .ok_or_else(|| GatewayError::Transport("missing transaction hash".into()))?
            .to_string();

        self.wait_for_receipt(&tx_hash).await
    }

    /// Bounded polling: fixed interval, fixed attempt ceiling
    async fn wait_for_receipt(&self, tx_hash: &str) -> GatewayResult<Value> {
        let attempts = self.config.receipt_poll_attempts;
        for _ in 0..attempts {
            let receipt = self
                .rpc("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if !receipt.is_null() {
                let status = receipt.get("status").and_then(Value::as_str).unwrap_or("0x0");
                if status != "0x1" {
                    return Err(GatewayError::Rejected(format!(
                        "transaction {tx_hash} reverted"
                    )));
                }
                return Ok(receipt);
            }
            tokio::time::sleep(Duration::from_millis(self.config.receipt_poll_ms)).await;
        }
        Err(GatewayError::ConfirmationTimeout { attempts })
    }

    /// The mint event carries the token id as its third (indexed) topic.
    fn extract_token_id(&self, receipt: &Value) -> GatewayResult<i64> {
        let logs = receipt
            .get("logs")
            .and_then(Value::as_array)
            .ok_or_else(|| GatewayError::Rejected("receipt has no logs".into()))?;

        let contract = self.config.contract_address.to_ascii_lowercase();
        let topic = logs
            .iter()
            .filter(|log| {
                log.get("address")
                    .and_then(Value::as_str)
                    .is_some_and(|a| a.eq_ignore_ascii_case(&contract))
            })
            .filter_map(|log| log.get("topics").and_then(Value::as_array))
            .find(|topics| topics.len() >= 3)
            .and_then(|topics| topics[2].as_str())
            .ok_or_else(|| GatewayError::Rejected("mint log not found in receipt".into()))?;

        parse_word_as_i64(topic)
    }
}

#[async_trait]
impl LedgerGateway for RpcLedger {
    async fn mint(
        &self,
        recipient: &str,
        event_id: i64,
        metadata_uri: &str,
    ) -> GatewayResult<MintReceipt> {
        let data = format!(
            "{SEL_MINT_TICKET}{}{}{}",
            encode_address(recipient)?,
            encode_u64(event_id as u64),
            encode_string_at_tail(metadata_uri, 3)
        );

        let receipt = self.send_and_confirm(data).await?;
        let token_id = self.extract_token_id(&receipt)?;
        let transaction_hash = receipt
            .get("transactionHash")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(MintReceipt {
            token_id,
            transaction_hash,
        })
    }

    async fn verify_ownership(&self, address: &str, token_id: i64) -> GatewayResult<bool> {
        let data = format!("{SEL_OWNER_OF}{}", encode_u64(token_id as u64));
        let call = json!([{ "to": self.config.contract_address, "data": data }, "latest"]);
        let result = self.rpc("eth_call", call).await?;

        let word = result
            .as_str()
            .ok_or_else(|| GatewayError::Transport("empty ownerOf result".into()))?;
        Ok(word_to_address(word).eq_ignore_ascii_case(address.trim_start_matches("0x")))
    }

    async fn mark_attendance(&self, token_id: i64) -> GatewayResult<()> {
        let data = format!("{SEL_MARK_ATTENDANCE}{}", encode_u64(token_id as u64));
        self.send_and_confirm(data).await?;
        Ok(())
    }

    async fn anchor_hash(&self, token_id: i64, hash: &[u8; 32]) -> GatewayResult<String> {
        let data = format!(
            "{SEL_ISSUE_CERT_HASH}{}{}",
            encode_u64(token_id as u64),
            hex::encode(hash)
        );
        let receipt = self.send_and_confirm(data).await?;
        Ok(receipt
            .get("transactionHash")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}

/// Ledger capability absent - every call reports `Unavailable`.
///
/// Bound when no chain is configured; callers must branch on
/// `is_available()` for optional corroboration paths.
pub struct NullLedger;

#[async_trait]
impl LedgerGateway for NullLedger {
    fn is_available(&self) -> bool {
        false
    }

    async fn mint(&self, _: &str, _: i64, _: &str) -> GatewayResult<MintReceipt> {
        Err(GatewayError::Unavailable)
    }

    async fn verify_ownership(&self, _: &str, _: i64) -> GatewayResult<bool> {
        Err(GatewayError::Unavailable)
    }

    async fn mark_attendance(&self, _: i64) -> GatewayResult<()> {
        Err(GatewayError::Unavailable)
    }

    async fn anchor_hash(&self, _: i64, _: &[u8; 32]) -> GatewayResult<String> {
        Err(GatewayError::Unavailable)
    }
}

// ========== ABI encoding helpers ==========

fn encode_address(address: &str) -> GatewayResult<String> {
    let hex_part = address.trim_start_matches("0x");
    if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(GatewayError::Rejected(format!(
            "malformed recipient address: {address}"
        )));
    }
    Ok(format!("{:0>64}", hex_part.to_ascii_lowercase()))
}

fn encode_u64(value: u64) -> String {
    format!("{value:064x}")
}

/// Dynamic string argument placed after `head_words` fixed-size words:
/// offset word, then length word, then UTF-8 data right-padded to 32 bytes.
fn encode_string_at_tail(value: &str, head_words: usize) -> String {
    let offset = encode_u64((head_words * 32) as u64);
    let bytes = value.as_bytes();
    let length = encode_u64(bytes.len() as u64);
    let mut data = hex::encode(bytes);
    let rem = data.len() % 64;
    if rem != 0 {
        data.push_str(&"0".repeat(64 - rem));
    }
    format!("{offset}{length}{data}")
}

/// Interpret a 32-byte hex word as a small unsigned integer
fn parse_word_as_i64(word: &str) -> GatewayResult<i64> {
    let trimmed = word.trim_start_matches("0x").trim_start_matches('0');
    if trimmed.is_empty() {
        return Ok(0);
    }
    if trimmed.len() > 15 {
        return Err(GatewayError::Rejected(format!(
            "token id out of range: {word}"
        )));
    }
    i64::from_str_radix(trimmed, 16)
        .map_err(|_| GatewayError::Rejected(format!("malformed token id topic: {word}")))
}

/// Last 20 bytes of a 32-byte return word, as bare hex
fn word_to_address(word: &str) -> String {
    let hex_part = word.trim_start_matches("0x");
    if hex_part.len() >= 40 {
        hex_part[hex_part.len() - 40..].to_string()
    } else {
        hex_part.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_static_words() {
        assert_eq!(encode_u64(1), format!("{:0>64}", "1"));
        let addr = encode_address("0x00000000000000000000000000000000DeaDBeef").unwrap();
        assert_eq!(addr.len(), 64);
        assert!(addr.ends_with("deadbeef"));
        assert!(encode_address("0x123").is_err());
    }

    #[test]
    fn encodes_dynamic_string() {
        let encoded = encode_string_at_tail("abc", 3);
        // offset 0x60, length 3, "abc" padded to one word
        assert!(encoded.starts_with(&encode_u64(96)));
        assert!(encoded.contains(&encode_u64(3)));
        assert_eq!(encoded.len() % 64, 0);
    }

    #[test]
    fn parses_token_id_from_topic_word() {
        let word = "0x000000000000000000000000000000000000000000000000000000000000002a";
        assert_eq!(parse_word_as_i64(word).unwrap(), 42);
        assert_eq!(parse_word_as_i64("0x0").unwrap(), 0);
        assert!(parse_word_as_i64(&format!("0x{}", "f".repeat(64))).is_err());
    }

    #[test]
    fn owner_word_reduces_to_address() {
        let word = "0x0000000000000000000000001111111111111111111111111111111111111111";
        assert_eq!(word_to_address(word), "1".repeat(40));
    }
}
