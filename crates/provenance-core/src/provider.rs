//! Transfer-history provider interface.
//!
//! Retrieval of on-chain history lives outside this system (indexer,
//! RPC, identity resolver). The engine only depends on this trait; the
//! in-memory implementation backs tests and offline scenario runs.

use crate::types::{IdentitySignals, TransferRecord};
use crate::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregate inbound currency value from one source address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingTotal {
    pub source: String,
    pub total_value: Decimal,
}

/// Read-only snapshot access to a wallet's on-chain history.
#[async_trait]
pub trait TransferHistory: Send + Sync {
    /// All transfers touching `address` as sender or receiver, across
    /// every creator, not just the analysis target.
    async fn transfers_for(&self, address: &str) -> Result<Vec<TransferRecord>>;

    /// Inbound currency transfers aggregated by source, used for
    /// funding-source detection.
    async fn inbound_value_transfers(&self, address: &str) -> Result<Vec<FundingTotal>>;

    /// Verified-identity hints for `address`, when the external
    /// resolver knows any. Absence is neutral.
    async fn identity_signals(&self, _address: &str) -> Result<Option<IdentitySignals>> {
        Ok(None)
    }
}

/// In-memory provider over a fixed transfer set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransferHistory {
    transfers: Vec<TransferRecord>,
    funding: HashMap<String, Vec<FundingTotal>>,
    identities: HashMap<String, IdentitySignals>,
}

impl InMemoryTransferHistory {
    pub fn new(transfers: Vec<TransferRecord>) -> Self {
        Self {
            transfers,
            funding: HashMap::new(),
            identities: HashMap::new(),
        }
    }

    pub fn with_funding(mut self, address: impl Into<String>, funding: Vec<FundingTotal>) -> Self {
        self.funding.insert(address.into(), funding);
        self
    }

    pub fn with_identity(mut self, address: impl Into<String>, signals: IdentitySignals) -> Self {
        self.identities.insert(address.into(), signals);
        self
    }
}

#[async_trait]
impl TransferHistory for InMemoryTransferHistory {
    async fn transfers_for(&self, address: &str) -> Result<Vec<TransferRecord>> {
        Ok(self
            .transfers
            .iter()
            .filter(|t| t.from == address || t.to == address)
            .cloned()
            .collect())
    }

    async fn inbound_value_transfers(&self, address: &str) -> Result<Vec<FundingTotal>> {
        if let Some(explicit) = self.funding.get(address) {
            return Ok(explicit.clone());
        }

        // Fall back to aggregating sale values by sender.
        let mut by_source: HashMap<String, Decimal> = HashMap::new();
        for t in self.transfers.iter().filter(|t| t.to == address) {
            *by_source.entry(t.from.clone()).or_default() += t.value;
        }
        let mut totals: Vec<FundingTotal> = by_source
            .into_iter()
            .map(|(source, total_value)| FundingTotal {
                source,
                total_value,
            })
            .collect();
        totals.sort_by(|a, b| b.total_value.cmp(&a.total_value));
        Ok(totals)
    }

    async fn identity_signals(&self, address: &str) -> Result<Option<IdentitySignals>> {
        Ok(self.identities.get(address).copied())
    }
}
