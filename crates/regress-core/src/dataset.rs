//! Result dataset loading
//!
//! Opens a simulator artifact read-only, materialises the fixed set of named
//! tables into in-memory row records and builds the lookup indices the
//! scenario checks rely on. The connection is closed before [`ResultDataset::load`]
//! returns; nothing stays backed by an open handle.
//!
//! ## Tables
//!
//! - `AgentEntry`, `Resources`, `Transactions`, `Compositions`, `Info` - required
//! - `AgentExit` - optional, absent when no agent was decommissioned
//! - `Enrichments` - optional, only written by enrichment facilities

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::DatasetError;
use crate::records::{
    table, AgentEntryRecord, AgentExitRecord, AgentId, CellValue, EnrichmentRecord, OpaqueTable,
    ResourceId, ResourceRecord, TransactionRecord,
};
use crate::resolver::{find_ids, AgentLabel};

// ----------------------------------------------------------------------------
// Materialised Tables
// ----------------------------------------------------------------------------

/// Every table the harness reads, in on-disk row order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetTables {
    pub agent_entry: Vec<AgentEntryRecord>,
    pub agent_exit: Option<Vec<AgentExitRecord>>,
    pub resources: Vec<ResourceRecord>,
    pub transactions: Vec<TransactionRecord>,
    pub compositions: OpaqueTable,
    pub info: OpaqueTable,
    pub enrichments: Option<Vec<EnrichmentRecord>>,
}

/// Row counts per table, for logging and the `inspect` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub agent_entry: usize,
    pub agent_exit: Option<usize>,
    pub resources: usize,
    pub transactions: usize,
    pub compositions: usize,
    pub info: usize,
    pub enrichments: Option<usize>,
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn optional(count: Option<usize>) -> String {
            count.map_or_else(|| "absent".to_string(), |n| n.to_string())
        }

        writeln!(f, "{:<14}{}", table::AGENT_ENTRY, self.agent_entry)?;
        writeln!(f, "{:<14}{}", table::AGENT_EXIT, optional(self.agent_exit))?;
        writeln!(f, "{:<14}{}", table::RESOURCES, self.resources)?;
        writeln!(f, "{:<14}{}", table::TRANSACTIONS, self.transactions)?;
        writeln!(f, "{:<14}{}", table::COMPOSITIONS, self.compositions)?;
        writeln!(f, "{:<14}{}", table::INFO, self.info)?;
        write!(f, "{:<14}{}", table::ENRICHMENTS, optional(self.enrichments))
    }
}

// ----------------------------------------------------------------------------
// Result Dataset
// ----------------------------------------------------------------------------

/// Read-only snapshot of one simulator run
#[derive(Debug, Clone)]
pub struct ResultDataset {
    tables: DatasetTables,
    resource_quantities: HashMap<ResourceId, f64>,
    enter_times: HashMap<AgentId, i64>,
    exit_times: HashMap<AgentId, i64>,
}

impl ResultDataset {
    /// Open the artifact at `path` and load every table
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        info!("Loading artifact {}", path.display());

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| DatasetError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let tables = read_tables(&conn)?;

        if let Err((_, e)) = conn.close() {
            warn!("Failed to close artifact {}: {}", path.display(), e);
        }

        let dataset = Self::from_tables(tables)?;
        debug!("Loaded tables:\n{}", dataset.summary());
        Ok(dataset)
    }

    /// Build a dataset from already materialised tables
    ///
    /// Verifies that agent and resource ids are unique and builds the
    /// quantity and timing indices.
    pub fn from_tables(tables: DatasetTables) -> Result<Self, DatasetError> {
        let mut enter_times = HashMap::with_capacity(tables.agent_entry.len());
        for agent in &tables.agent_entry {
            if enter_times.insert(agent.agent_id, agent.enter_time).is_some() {
                return Err(DatasetError::DuplicateId {
                    table: table::AGENT_ENTRY,
                    column: "AgentId",
                    id: agent.agent_id.0,
                });
            }
        }

        let mut resource_quantities = HashMap::with_capacity(tables.resources.len());
        for resource in &tables.resources {
            match resource_quantities.entry(resource.resource_id) {
                Entry::Occupied(_) => {
                    return Err(DatasetError::DuplicateId {
                        table: table::RESOURCES,
                        column: "ResourceId",
                        id: resource.resource_id.0,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(resource.quantity);
                }
            }
        }

        let mut exit_times = HashMap::new();
        for exit in tables.agent_exit.iter().flatten() {
            exit_times.entry(exit.agent_id).or_insert(exit.exit_time);
        }

        Ok(Self {
            tables,
            resource_quantities,
            enter_times,
            exit_times,
        })
    }

    pub fn agent_entry(&self) -> &[AgentEntryRecord] {
        &self.tables.agent_entry
    }

    /// `None` when the run decommissioned nothing
    pub fn agent_exit(&self) -> Option<&[AgentExitRecord]> {
        self.tables.agent_exit.as_deref()
    }

    pub fn resources(&self) -> &[ResourceRecord] {
        &self.tables.resources
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.tables.transactions
    }

    pub fn compositions(&self) -> &OpaqueTable {
        &self.tables.compositions
    }

    pub fn info(&self) -> &OpaqueTable {
        &self.tables.info
    }

    pub fn enrichments(&self) -> Option<&[EnrichmentRecord]> {
        self.tables.enrichments.as_deref()
    }

    /// The ResourceId -> Quantity index
    pub fn resource_quantities(&self) -> &HashMap<ResourceId, f64> {
        &self.resource_quantities
    }

    /// Quantity of a resource; unknown ids are an error, never zero
    pub fn resource_quantity(&self, resource_id: ResourceId) -> Result<f64, DatasetError> {
        self.resource_quantities
            .get(&resource_id)
            .copied()
            .ok_or(DatasetError::UnknownResource(resource_id))
    }

    pub fn enter_time(&self, agent_id: AgentId) -> Result<i64, DatasetError> {
        self.enter_times
            .get(&agent_id)
            .copied()
            .ok_or(DatasetError::UnknownAgent(agent_id))
    }

    /// Exit time, or `None` if the agent was never decommissioned
    pub fn exit_time(&self, agent_id: AgentId) -> Option<i64> {
        self.exit_times.get(&agent_id).copied()
    }

    /// Agents whose label column contains `pattern`, in table order
    pub fn agents_matching(&self, label: AgentLabel, pattern: &str) -> Vec<AgentId> {
        let agents = &self.tables.agent_entry;
        let labels: Vec<&str> = agents
            .iter()
            .map(|a| match label {
                AgentLabel::Spec => a.spec.as_str(),
                AgentLabel::Prototype => a.prototype.as_str(),
            })
            .collect();
        let ids: Vec<AgentId> = agents.iter().map(|a| a.agent_id).collect();

        find_ids(pattern, &labels, &ids)
    }

    pub fn summary(&self) -> DatasetSummary {
        let t = &self.tables;
        DatasetSummary {
            agent_entry: t.agent_entry.len(),
            agent_exit: t.agent_exit.as_ref().map(Vec::len),
            resources: t.resources.len(),
            transactions: t.transactions.len(),
            compositions: t.compositions.len(),
            info: t.info.len(),
            enrichments: t.enrichments.as_ref().map(Vec::len),
        }
    }

    pub fn into_tables(self) -> DatasetTables {
        self.tables
    }
}

// ----------------------------------------------------------------------------
// SQLite Readers
// ----------------------------------------------------------------------------

fn read_tables(conn: &Connection) -> Result<DatasetTables, DatasetError> {
    for required in [
        table::AGENT_ENTRY,
        table::RESOURCES,
        table::TRANSACTIONS,
        table::COMPOSITIONS,
        table::INFO,
    ] {
        if !table_exists(conn, required)? {
            return Err(DatasetError::MissingTable { table: required });
        }
    }

    let agent_entry = read_rows(
        conn,
        table::AGENT_ENTRY,
        "SELECT AgentId, Spec, Prototype, EnterTime FROM AgentEntry ORDER BY rowid",
        |row| {
            Ok(AgentEntryRecord {
                agent_id: AgentId(row.get(0)?),
                spec: row.get(1)?,
                prototype: row.get(2)?,
                enter_time: row.get(3)?,
            })
        },
    )?;

    let agent_exit = if table_exists(conn, table::AGENT_EXIT)? {
        Some(read_rows(
            conn,
            table::AGENT_EXIT,
            "SELECT AgentId, ExitTime FROM AgentExit ORDER BY rowid",
            |row| {
                Ok(AgentExitRecord {
                    agent_id: AgentId(row.get(0)?),
                    exit_time: row.get(1)?,
                })
            },
        )?)
    } else {
        None
    };

    let resources = read_rows(
        conn,
        table::RESOURCES,
        "SELECT ResourceId, Quantity FROM Resources ORDER BY rowid",
        |row| {
            Ok(ResourceRecord {
                resource_id: ResourceId(row.get(0)?),
                quantity: row.get(1)?,
            })
        },
    )?;

    let transactions = read_rows(
        conn,
        table::TRANSACTIONS,
        "SELECT SenderId, ReceiverId, ResourceId, Time FROM Transactions ORDER BY rowid",
        |row| {
            Ok(TransactionRecord {
                sender_id: AgentId(row.get(0)?),
                receiver_id: AgentId(row.get(1)?),
                resource_id: ResourceId(row.get(2)?),
                time: row.get(3)?,
            })
        },
    )?;

    let compositions = read_opaque(conn, table::COMPOSITIONS)?;
    let info = read_opaque(conn, table::INFO)?;

    let enrichments = if table_exists(conn, table::ENRICHMENTS)? {
        Some(read_rows(
            conn,
            table::ENRICHMENTS,
            "SELECT Time, SWU, Natural_Uranium FROM Enrichments ORDER BY rowid",
            |row| {
                Ok(EnrichmentRecord {
                    time: row.get(0)?,
                    swu: row.get(1)?,
                    natural_uranium: row.get(2)?,
                })
            },
        )?)
    } else {
        None
    };

    Ok(DatasetTables {
        agent_entry,
        agent_exit,
        resources,
        transactions,
        compositions,
        info,
        enrichments,
    })
}

fn table_exists(conn: &Connection, name: &'static str) -> Result<bool, DatasetError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .map_err(|source| DatasetError::Query { table: name, source })?;
    Ok(count > 0)
}

fn read_rows<T, F>(
    conn: &Connection,
    table: &'static str,
    sql: &str,
    map: F,
) -> Result<Vec<T>, DatasetError>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let query_err = |source| DatasetError::Query { table, source };

    let mut stmt = conn.prepare(sql).map_err(query_err)?;
    let rows = stmt.query_map([], map).map_err(query_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
}

fn read_opaque(conn: &Connection, table: &'static str) -> Result<OpaqueTable, DatasetError> {
    let query_err = |source| DatasetError::Query { table, source };

    let mut stmt = conn
        .prepare(&format!("SELECT * FROM \"{}\" ORDER BY rowid", table))
        .map_err(query_err)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i).map(CellValue::from))
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .map_err(query_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(query_err)?;

    Ok(OpaqueTable { columns, rows })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
