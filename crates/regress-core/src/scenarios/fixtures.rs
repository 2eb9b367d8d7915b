//! In-memory datasets for scenario unit tests

use crate::dataset::{DatasetTables, ResultDataset};
use crate::records::{
    AgentEntryRecord, AgentExitRecord, AgentId, EnrichmentRecord, ResourceId, ResourceRecord,
    TransactionRecord,
};

/// Builds [`DatasetTables`] row by row, assigning resource ids as it goes
#[derive(Default)]
pub(crate) struct TablesBuilder {
    tables: DatasetTables,
    next_resource: i64,
}

impl TablesBuilder {
    pub(crate) fn new() -> Self {
        Self {
            next_resource: 1000,
            ..Default::default()
        }
    }

    pub(crate) fn agent(mut self, id: i64, spec: &str, prototype: &str, enter_time: i64) -> Self {
        self.tables.agent_entry.push(AgentEntryRecord {
            agent_id: AgentId(id),
            spec: spec.to_string(),
            prototype: prototype.to_string(),
            enter_time,
        });
        self
    }

    pub(crate) fn exit(mut self, id: i64, exit_time: i64) -> Self {
        self.tables
            .agent_exit
            .get_or_insert_with(Vec::new)
            .push(AgentExitRecord {
                agent_id: AgentId(id),
                exit_time,
            });
        self
    }

    /// A transaction moving a fresh resource of `quantity`
    pub(crate) fn transfer(mut self, sender: i64, receiver: i64, quantity: f64, time: i64) -> Self {
        let resource_id = ResourceId(self.next_resource);
        self.next_resource += 1;

        self.tables.resources.push(ResourceRecord {
            resource_id,
            quantity,
        });
        self.tables.transactions.push(TransactionRecord {
            sender_id: AgentId(sender),
            receiver_id: AgentId(receiver),
            resource_id,
            time,
        });
        self
    }

    pub(crate) fn enrichment(mut self, time: i64, swu: f64, natural_uranium: f64) -> Self {
        self.tables
            .enrichments
            .get_or_insert_with(Vec::new)
            .push(EnrichmentRecord {
                time,
                swu,
                natural_uranium,
            });
        self
    }

    pub(crate) fn tables(self) -> DatasetTables {
        self.tables
    }

    pub(crate) fn build(self) -> ResultDataset {
        ResultDataset::from_tables(self.tables).unwrap()
    }
}

/// Names of the checks that failed
pub(crate) fn failed(outcomes: &[crate::check::CheckOutcome]) -> Vec<&str> {
    outcomes
        .iter()
        .filter(|o| !o.passed)
        .map(|o| o.name.as_str())
        .collect()
}
