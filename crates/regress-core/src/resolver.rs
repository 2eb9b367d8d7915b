//! Agent id resolution by label
//!
//! Agent ids are assigned by the simulator and have no a priori relation to
//! the role an agent plays in a scenario. The only stable handle is the
//! agent's archetype spec (e.g. `:cycamore:Reactor`) or its prototype name,
//! matched by substring.

use serde::{Deserialize, Serialize};

/// Which `AgentEntry` label column to match against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentLabel {
    /// The archetype spec, e.g. `:agents:Sink`
    Spec,
    /// The prototype name declared in the input file
    Prototype,
}

/// Ids whose label contains `pattern`, in table order
///
/// Matching is a case-sensitive plain substring test. An empty result is not
/// an error; callers assert the cardinality they expect.
///
/// # Panics
///
/// Panics if `labels` and `ids` have different lengths; they must be two
/// columns of the same table.
pub fn find_ids<L, I>(pattern: &str, labels: &[L], ids: &[I]) -> Vec<I>
where
    L: AsRef<str>,
    I: Copy,
{
    assert_eq!(
        labels.len(),
        ids.len(),
        "label and id columns must have the same length"
    );

    labels
        .iter()
        .zip(ids)
        .filter(|(label, _)| label.as_ref().contains(pattern))
        .map(|(_, id)| *id)
        .collect()
}
