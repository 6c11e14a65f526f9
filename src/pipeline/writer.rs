use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::pipeline::normalizer::Record;
use crate::pipeline::planner::{AgentCount, DistributionPlan};
use crate::store::AssignmentStore;

/// The persisted association of one record with one agent. Created once,
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub first_name: String,
    pub phone: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    pub fn new(agent_id: Uuid, record: &Record) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent_id,
            first_name: record.first_name.clone(),
            phone: record.phone.clone(),
            notes: record.notes.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Persist one assignment per planned record through a single store call.
///
/// The batch write is not atomic: if the store fails partway, earlier writes
/// stay in place and the failure propagates as `Persistence`.
pub fn commit(
    plan: &DistributionPlan,
    store: &mut AssignmentStore,
) -> Result<(Vec<Assignment>, Vec<AgentCount>)> {
    let mut batch = Vec::with_capacity(plan.total());
    for slice in plan.slices() {
        for record in &slice.records {
            batch.push(Assignment::new(slice.agent.id, record));
        }
    }

    store.insert_many(&batch)?;

    let summary = plan.summary();
    tracing::info!(
        total = batch.len(),
        agents = summary.len(),
        "Batch persisted"
    );

    Ok((batch, summary))
}
