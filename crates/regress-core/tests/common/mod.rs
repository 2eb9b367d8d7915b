//! Test utilities for the regression harness
//!
//! Writes synthetic artifacts in the layout of the Cyclus SQLite backend and
//! provides in-process simulators so the harness lifecycle can be exercised
//! without a Cyclus installation.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection};

use regress_core::records::{CellValue, OpaqueTable};
use regress_core::{
    AgentEntryRecord, AgentExitRecord, AgentId, DatasetTables, EnrichmentRecord, ExecutionError,
    HarnessConfig, ResourceId, ResourceRecord, Simulator, TransactionRecord,
};

const SIM_ID: &[u8] = &[0x5a; 16];

// ----------------------------------------------------------------------------
// Artifact Writer
// ----------------------------------------------------------------------------

const SCHEMA: &str = "
    CREATE TABLE AgentEntry (SimId BLOB, AgentId INTEGER, Kind TEXT, Spec TEXT,
        Prototype TEXT, ParentId INTEGER, Lifetime INTEGER, EnterTime INTEGER);
    CREATE TABLE Resources (SimId BLOB, ResourceId INTEGER, ObjId INTEGER, Type TEXT,
        TimeCreated INTEGER, Quantity REAL, Units TEXT, QualId INTEGER,
        Parent1 INTEGER, Parent2 INTEGER);
    CREATE TABLE Transactions (SimId BLOB, TransactionId INTEGER, SenderId INTEGER,
        ReceiverId INTEGER, ResourceId INTEGER, Commodity TEXT, Time INTEGER);
    CREATE TABLE Compositions (SimId BLOB, QualId INTEGER, NucId INTEGER, MassFrac REAL);
    CREATE TABLE Info (SimId BLOB, Handle TEXT, InitialYear INTEGER, InitialMonth INTEGER,
        Duration INTEGER);
";

/// Write `tables` to a fresh SQLite file at `path`
///
/// `AgentExit` and `Enrichments` are only created when present in `tables`.
pub fn write_artifact(path: &Path, tables: &DatasetTables) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(SCHEMA).unwrap();

    for a in &tables.agent_entry {
        conn.execute(
            "INSERT INTO AgentEntry VALUES (?1, ?2, 'Facility', ?3, ?4, -1, -1, ?5)",
            params![SIM_ID, a.agent_id.0, a.spec, a.prototype, a.enter_time],
        )
        .unwrap();
    }

    if let Some(exits) = &tables.agent_exit {
        conn.execute_batch("CREATE TABLE AgentExit (SimId BLOB, AgentId INTEGER, ExitTime INTEGER);")
            .unwrap();
        for e in exits {
            conn.execute(
                "INSERT INTO AgentExit VALUES (?1, ?2, ?3)",
                params![SIM_ID, e.agent_id.0, e.exit_time],
            )
            .unwrap();
        }
    }

    for (i, r) in tables.resources.iter().enumerate() {
        conn.execute(
            "INSERT INTO Resources VALUES (?1, ?2, ?3, 'Material', 0, ?4, 'kg', 1, 0, 0)",
            params![SIM_ID, r.resource_id.0, i as i64, r.quantity],
        )
        .unwrap();
    }

    for (i, t) in tables.transactions.iter().enumerate() {
        conn.execute(
            "INSERT INTO Transactions VALUES (?1, ?2, ?3, ?4, ?5, 'fuel', ?6)",
            params![SIM_ID, i as i64, t.sender_id.0, t.receiver_id.0, t.resource_id.0, t.time],
        )
        .unwrap();
    }

    conn.execute(
        "INSERT INTO Compositions VALUES (?1, 1, 922350000, 0.05), (?1, 1, 922380000, 0.95)",
        params![SIM_ID],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO Info VALUES (?1, 'synthetic', 2000, 1, 5)",
        params![SIM_ID],
    )
    .unwrap();

    if let Some(rows) = &tables.enrichments {
        conn.execute_batch(
            "CREATE TABLE Enrichments (SimId BLOB, ResourceId INTEGER, AgentId INTEGER,
                Time INTEGER, Natural_Uranium REAL, Tails REAL, SWU REAL);",
        )
        .unwrap();
        for e in rows {
            conn.execute(
                "INSERT INTO Enrichments VALUES (?1, 0, 0, ?2, ?3, 0.0, ?4)",
                params![SIM_ID, e.time, e.natural_uranium, e.swu],
            )
            .unwrap();
        }
    }
}

pub fn drop_table(path: &Path, table: &str) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(&format!("DROP TABLE {};", table)).unwrap();
}

/// The two mass fractions every synthetic artifact carries
pub fn expected_compositions() -> OpaqueTable {
    OpaqueTable {
        columns: ["SimId", "QualId", "NucId", "MassFrac"].map(String::from).to_vec(),
        rows: [(922350000, 0.05), (922380000, 0.95)]
            .into_iter()
            .map(|(nuc, frac)| {
                vec![
                    CellValue::Blob(SIM_ID.to_vec()),
                    CellValue::Integer(1),
                    CellValue::Integer(nuc),
                    CellValue::Real(frac),
                ]
            })
            .collect(),
    }
}

// ----------------------------------------------------------------------------
// Synthetic Runs
// ----------------------------------------------------------------------------

pub fn agent(id: i64, spec: &str, prototype: &str, enter_time: i64) -> AgentEntryRecord {
    AgentEntryRecord {
        agent_id: AgentId(id),
        spec: spec.to_string(),
        prototype: prototype.to_string(),
        enter_time,
    }
}

/// A run that satisfies the `growth` scenario
pub fn growth_run() -> DatasetTables {
    DatasetTables {
        agent_entry: vec![
            agent(1, ":agents:NullRegion", "SingleRegion", 0),
            agent(2, ":cycamore:GrowthRegion", "Growth", 0),
            agent(3, ":cycamore:Source", "Source2", 1),
            agent(4, ":cycamore:Source", "Source1", 2),
            agent(5, ":cycamore:Source", "Source1", 3),
        ],
        ..Default::default()
    }
}

/// A run that satisfies the `dynamic-capacitated` scenario
pub fn dynamic_capacitated_run() -> DatasetTables {
    let trades = [(1, 4, 1), (2, 5, 1), (1, 4, 2), (2, 6, 2), (3, 7, 2), (1, 6, 3), (2, 7, 3)];

    DatasetTables {
        agent_entry: vec![
            agent(1, ":agents:Source", "source", 1),
            agent(2, ":agents:Source", "source", 1),
            agent(3, ":agents:Source", "source", 1),
            agent(4, ":agents:Sink", "sink", 1),
            agent(5, ":agents:Sink", "sink", 1),
            agent(6, ":agents:Sink", "sink", 2),
            agent(7, ":agents:Sink", "sink", 2),
        ],
        agent_exit: Some(
            [(4, 2), (5, 2), (6, 3), (7, 3)]
                .into_iter()
                .map(|(id, exit_time)| AgentExitRecord {
                    agent_id: AgentId(id),
                    exit_time,
                })
                .collect(),
        ),
        resources: (0..trades.len() as i64)
            .map(|i| ResourceRecord {
                resource_id: ResourceId(100 + i),
                quantity: 1.0,
            })
            .collect(),
        transactions: trades
            .iter()
            .enumerate()
            .map(|(i, &(sender, receiver, time))| TransactionRecord {
                sender_id: AgentId(sender),
                receiver_id: AgentId(receiver),
                resource_id: ResourceId(100 + i as i64),
                time,
            })
            .collect(),
        ..Default::default()
    }
}

/// A run that satisfies the `physor-enrichment` scenario
pub fn physor_enrichment_run() -> DatasetTables {
    let swu = [6.9, 10.0, 4.14, 6.9];
    let natural_uranium = [13.03, 16.55, 7.82, 13.03];
    let second_reactor = [1.0, 0.8, 0.2, 1.0];

    let mut tables = DatasetTables {
        agent_entry: vec![
            agent(10, ":cycamore:EnrichmentFacility", "enrichment", 0),
            agent(11, ":cycamore:Reactor", "lwr", 0),
            agent(12, ":cycamore:Reactor", "lwr", 0),
        ],
        enrichments: Some(
            (0..4)
                .map(|t| EnrichmentRecord {
                    time: t as i64,
                    swu: swu[t],
                    natural_uranium: natural_uranium[t],
                })
                .collect(),
        ),
        ..Default::default()
    };

    for t in 0..4 {
        for (slot, (receiver, quantity)) in [(11, 1.0), (12, second_reactor[t])].into_iter().enumerate() {
            let resource_id = ResourceId(200 + (t * 2 + slot) as i64);
            tables.resources.push(ResourceRecord {
                resource_id,
                quantity,
            });
            tables.transactions.push(TransactionRecord {
                sender_id: AgentId(10),
                receiver_id: AgentId(receiver),
                resource_id,
                time: t as i64,
            });
        }
    }
    tables
}

/// A run that satisfies the `physor-sources` scenario
///
/// The UOX source is registered before the MOX source, while MOX makes the
/// first delivery.
pub fn physor_sources_run() -> DatasetTables {
    const UOX: i64 = 4;
    const MOX: i64 = 5;
    let deliveries = [
        (MOX, 1, 1.0, 1),
        (MOX, 1, 1.0, 2),
        (MOX, 2, 1.0, 2),
        (MOX, 1, 1.0, 3),
        (MOX, 2, 1.0, 3),
        (MOX, 3, 0.5, 3),
        (UOX, 3, 0.5, 3),
        (UOX, 1, 1.0, 4),
        (MOX, 2, 1.0, 4),
        (MOX, 3, 1.0, 4),
    ];

    DatasetTables {
        agent_entry: vec![
            agent(UOX, ":cycamore:Source", "uox_source", 0),
            agent(MOX, ":cycamore:Source", "mox_source", 0),
            agent(1, ":cycamore:Reactor", "lwr", 1),
            agent(2, ":cycamore:Reactor", "lwr", 2),
            agent(3, ":cycamore:Reactor", "lwr", 3),
        ],
        resources: deliveries
            .iter()
            .enumerate()
            .map(|(i, &(_, _, quantity, _))| ResourceRecord {
                resource_id: ResourceId(300 + i as i64),
                quantity,
            })
            .collect(),
        transactions: deliveries
            .iter()
            .enumerate()
            .map(|(i, &(sender, receiver, _, time))| TransactionRecord {
                sender_id: AgentId(sender),
                receiver_id: AgentId(receiver),
                resource_id: ResourceId(300 + i as i64),
                time,
            })
            .collect(),
        ..Default::default()
    }
}

// ----------------------------------------------------------------------------
// In-process Simulators
// ----------------------------------------------------------------------------

/// Writes a fixed artifact instead of running a simulator
pub struct FixtureSimulator {
    tables: DatasetTables,
    runs: AtomicUsize,
}

impl FixtureSimulator {
    pub fn new(tables: DatasetTables) -> Arc<Self> {
        Arc::new(Self {
            tables,
            runs: AtomicUsize::new(0),
        })
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Simulator for FixtureSimulator {
    async fn run(&self, _input: &Path, output: &Path) -> Result<(), ExecutionError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        write_artifact(output, &self.tables);
        Ok(())
    }
}

/// Writes a partial artifact, then reports a failed run
pub struct CrashingSimulator;

#[async_trait]
impl Simulator for CrashingSimulator {
    async fn run(&self, _input: &Path, output: &Path) -> Result<(), ExecutionError> {
        std::fs::write(output, b"partial").unwrap();
        Err(ExecutionError::Failed {
            status: "exit status: 1".to_string(),
            stdout: String::new(),
            stderr: "segmentation fault".to_string(),
        })
    }
}

/// Leaves a directory where the artifact belongs, then reports a failed run
///
/// The artifact path cannot be removed as a file, so every cleanup fails.
pub struct ObstructingSimulator;

#[async_trait]
impl Simulator for ObstructingSimulator {
    async fn run(&self, _input: &Path, output: &Path) -> Result<(), ExecutionError> {
        std::fs::create_dir(output).unwrap();
        std::fs::write(output.join("partial"), b"partial").unwrap();
        Err(ExecutionError::Failed {
            status: "exit status: 2".to_string(),
            stdout: String::new(),
            stderr: "cannot open input".to_string(),
        })
    }
}

/// Exits cleanly but leaves a file that is not a database
pub struct GarbageSimulator;

#[async_trait]
impl Simulator for GarbageSimulator {
    async fn run(&self, _input: &Path, output: &Path) -> Result<(), ExecutionError> {
        std::fs::write(output, b"SQLite format? not really, just some bytes").unwrap();
        Ok(())
    }
}

/// Configuration whose artifacts land in `dir`
pub fn config_in(dir: &Path) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.simulator.working_dir = dir.to_path_buf();
    config.artifacts.output_dir = PathBuf::from(".");
    config
}

/// Files currently in `dir`
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}
