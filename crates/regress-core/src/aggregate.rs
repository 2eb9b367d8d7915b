//! Per-time-step aggregation
//!
//! Every aggregate covers the full requested horizon `0..horizon`: a step with
//! no matching rows yields zero, never a missing entry. A selected row whose
//! time falls outside the horizon is a [`DatasetError::TimeOutOfHorizon`].

use std::collections::HashSet;

use crate::dataset::ResultDataset;
use crate::errors::DatasetError;
use crate::records::{AgentId, TransactionRecord};

/// Selects transactions by sender and/or receiver
///
/// An unset side matches any agent.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    senders: Option<HashSet<AgentId>>,
    receivers: Option<HashSet<AgentId>>,
}

impl TransactionFilter {
    /// Matches every transaction
    pub fn any() -> Self {
        Self::default()
    }

    pub fn sender(self, id: AgentId) -> Self {
        self.senders([id])
    }

    pub fn receiver(self, id: AgentId) -> Self {
        self.receivers([id])
    }

    pub fn senders(mut self, ids: impl IntoIterator<Item = AgentId>) -> Self {
        self.senders = Some(ids.into_iter().collect());
        self
    }

    pub fn receivers(mut self, ids: impl IntoIterator<Item = AgentId>) -> Self {
        self.receivers = Some(ids.into_iter().collect());
        self
    }

    pub fn matches(&self, tx: &TransactionRecord) -> bool {
        let side = |set: &Option<HashSet<AgentId>>, id: AgentId| {
            set.as_ref().map_or(true, |ids| ids.contains(&id))
        };
        side(&self.senders, tx.sender_id) && side(&self.receivers, tx.receiver_id)
    }
}

/// Step index of `time` within `0..horizon`
fn step(time: i64, horizon: usize) -> Result<usize, DatasetError> {
    usize::try_from(time)
        .ok()
        .filter(|&t| t < horizon)
        .ok_or(DatasetError::TimeOutOfHorizon { time, horizon })
}

/// Sum `value_of` over `rows`, grouped by `time_of`, for steps `0..horizon`
pub fn sum_per_step<T>(
    rows: &[T],
    horizon: usize,
    time_of: impl Fn(&T) -> i64,
    value_of: impl Fn(&T) -> f64,
) -> Result<Vec<f64>, DatasetError> {
    let mut sums = vec![0.0; horizon];
    for row in rows {
        sums[step(time_of(row), horizon)?] += value_of(row);
    }
    Ok(sums)
}

/// Transacted quantity per step for the transactions `filter` selects
///
/// Each transaction contributes the quantity of the resource it moved; a
/// resource missing from the index is an error, wherever the transaction
/// falls in time.
pub fn quantity_per_step(
    dataset: &ResultDataset,
    filter: &TransactionFilter,
    horizon: usize,
) -> Result<Vec<f64>, DatasetError> {
    let mut sums = vec![0.0; horizon];
    for tx in dataset.transactions().iter().filter(|tx| filter.matches(tx)) {
        let quantity = dataset.resource_quantity(tx.resource_id)?;
        sums[step(tx.time, horizon)?] += quantity;
    }
    Ok(sums)
}

/// Number of transactions per step that `filter` selects
///
/// Resources are resolved the same way as in [`quantity_per_step`], so a
/// count never includes a transaction whose resource is unknown.
pub fn count_per_step(
    dataset: &ResultDataset,
    filter: &TransactionFilter,
    horizon: usize,
) -> Result<Vec<usize>, DatasetError> {
    let mut counts = vec![0; horizon];
    for tx in dataset.transactions().iter().filter(|tx| filter.matches(tx)) {
        dataset.resource_quantity(tx.resource_id)?;
        counts[step(tx.time, horizon)?] += 1;
    }
    Ok(counts)
}
