//! Row records for the Cyclus output tables
//!
//! Table and column names are exact keys into the artifact and must match the
//! simulator's schema byte for byte.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Table names as written by the simulator
pub mod table {
    pub const AGENT_ENTRY: &str = "AgentEntry";
    pub const AGENT_EXIT: &str = "AgentExit";
    pub const RESOURCES: &str = "Resources";
    pub const TRANSACTIONS: &str = "Transactions";
    pub const COMPOSITIONS: &str = "Compositions";
    pub const INFO: &str = "Info";
    pub const ENRICHMENTS: &str = "Enrichments";
}

// ----------------------------------------------------------------------------
// Identifiers
// ----------------------------------------------------------------------------

/// Simulator-assigned agent identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub i64);

/// Simulator-assigned resource identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub i64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Typed Records
// ----------------------------------------------------------------------------

/// One row per agent ever instantiated during the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEntryRecord {
    pub agent_id: AgentId,
    /// Fully qualified archetype, e.g. `:cycamore:Reactor`
    pub spec: String,
    pub prototype: String,
    pub enter_time: i64,
}

/// One row per decommissioned agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentExitRecord {
    pub agent_id: AgentId,
    pub exit_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub resource_id: ResourceId,
    pub quantity: f64,
}

/// Transfer of one resource from sender to receiver at a time step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub sender_id: AgentId,
    pub receiver_id: AgentId,
    pub resource_id: ResourceId,
    pub time: i64,
}

/// Enrichment facility bookkeeping, only written by enrichment archetypes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub time: i64,
    pub swu: f64,
    pub natural_uranium: f64,
}

// ----------------------------------------------------------------------------
// Pass-through Tables
// ----------------------------------------------------------------------------

/// A dynamically typed cell from a table the harness does not interpret
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<rusqlite::types::Value> for CellValue {
    fn from(value: rusqlite::types::Value) -> Self {
        use rusqlite::types::Value;
        match value {
            Value::Null => CellValue::Null,
            Value::Integer(i) => CellValue::Integer(i),
            Value::Real(r) => CellValue::Real(r),
            Value::Text(t) => CellValue::Text(t),
            Value::Blob(b) => CellValue::Blob(b),
        }
    }
}

/// Column names plus rows in on-disk order
///
/// Used for `Compositions` and `Info`, which scenario checks may read but the
/// harness never interprets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpaqueTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl OpaqueTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, or `None` if the table has no such column
    pub fn column(&self, name: &str) -> Option<Vec<&CellValue>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().filter_map(|row| row.get(index)).collect())
    }
}
