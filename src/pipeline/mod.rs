pub mod decoder;
pub mod grouping;
pub mod normalizer;
pub mod planner;
pub mod writer;

pub use decoder::{decode, RawRow, TabularFormat};
pub use grouping::{group_by_agent, AgentGroup};
pub use normalizer::{normalize, Record};
pub use planner::{plan, AgentCount, AgentSlice, DistributionPlan, DISTRIBUTION_FANOUT};
pub use writer::{commit, Assignment};

use crate::error::Result;
use crate::registry::AgentRef;
use crate::store::AssignmentStore;

/// Run the full ingestion pipeline for one upload:
/// decode → normalize → plan → persist.
///
/// Fail-fast: any stage failure aborts the request before the next stage
/// runs, so a decode or validation error never touches the store.
pub fn ingest(
    buffer: &[u8],
    filename: &str,
    pool: &[AgentRef],
    fanout: usize,
    store: &mut AssignmentStore,
) -> Result<(Vec<Assignment>, Vec<AgentCount>)> {
    let rows = decoder::decode(buffer, filename)?;
    let records = normalizer::normalize(&rows)?;
    let plan = planner::plan(records, pool, fanout)?;
    writer::commit(&plan, store)
}
