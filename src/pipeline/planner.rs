use crate::error::{Result, SplitError};
use crate::pipeline::normalizer::Record;
use crate::registry::AgentRef;

/// Number of agents that participate in a single distribution.
pub const DISTRIBUTION_FANOUT: usize = 5;

/// One agent's contiguous share of a batch. May be empty when the batch is
/// smaller than the fan-out.
#[derive(Debug, Clone)]
pub struct AgentSlice {
    pub agent: AgentRef,
    pub records: Vec<Record>,
}

/// Per-agent share of a batch, for reporting. Only agents that received at
/// least one record appear in a summary.
#[derive(Debug, Clone)]
pub struct AgentCount {
    pub agent: AgentRef,
    pub count: usize,
}

/// A balanced partition of one batch across the participating agents.
#[derive(Debug, Clone)]
pub struct DistributionPlan {
    slices: Vec<AgentSlice>,
}

impl DistributionPlan {
    /// All slices in agent order, empty slices included.
    pub fn slices(&self) -> &[AgentSlice] {
        &self.slices
    }

    pub fn total(&self) -> usize {
        self.slices.iter().map(|s| s.records.len()).sum()
    }

    /// Ordered `{agent, count}` summary, omitting agents that received
    /// nothing.
    pub fn summary(&self) -> Vec<AgentCount> {
        self.slices
            .iter()
            .filter(|s| !s.records.is_empty())
            .map(|s| AgentCount {
                agent: s.agent.clone(),
                count: s.records.len(),
            })
            .collect()
    }
}

/// Per-slot record counts for a batch of `total` records: the first
/// `total % fanout` slots take one extra record.
pub fn slot_counts(total: usize, fanout: usize) -> Vec<usize> {
    let base = total / fanout;
    let remainder = total % fanout;
    (0..fanout)
        .map(|i| base + usize::from(i < remainder))
        .collect()
}

/// Partition `records` into contiguous, order-preserving slices across the
/// first `fanout` agents of `pool`.
///
/// Agents beyond the first `fanout` receive nothing. Fails when the pool is
/// smaller than the fan-out, regardless of record count.
pub fn plan(records: Vec<Record>, pool: &[AgentRef], fanout: usize) -> Result<DistributionPlan> {
    assert!(fanout > 0, "fanout must be positive");

    if pool.len() < fanout {
        return Err(SplitError::InsufficientAgents {
            required: fanout,
            available: pool.len(),
        });
    }

    let counts = slot_counts(records.len(), fanout);
    let mut slices = Vec::with_capacity(fanout);
    let mut remaining = records;

    for (agent, count) in pool.iter().take(fanout).zip(counts) {
        let tail = remaining.split_off(count);
        slices.push(AgentSlice {
            agent: agent.clone(),
            records: remaining,
        });
        remaining = tail;
    }
    debug_assert!(remaining.is_empty());

    Ok(DistributionPlan { slices })
}
