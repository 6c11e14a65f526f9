use uuid::Uuid;

use crate::error::{Result, SplitError};
use crate::pipeline::writer::Assignment;

pub const DEFAULT_MAX_ASSIGNMENTS: usize = 10_000;

/// In-memory assignment store, capacity-bounded.
#[derive(Debug)]
pub struct AssignmentStore {
    assignments: Vec<Assignment>,
    max_assignments: usize,
}

impl Default for AssignmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ASSIGNMENTS)
    }

    pub fn with_capacity(max_assignments: usize) -> Self {
        Self {
            assignments: Vec::new(),
            max_assignments,
        }
    }

    /// Persist a batch in order. Not atomic: writes that landed before a
    /// capacity failure stay in place.
    pub fn insert_many(&mut self, batch: &[Assignment]) -> Result<()> {
        for (written, assignment) in batch.iter().enumerate() {
            if self.assignments.len() >= self.max_assignments {
                return Err(SplitError::Persistence(format!(
                    "store at capacity ({}) after {} of {} writes",
                    self.max_assignments,
                    written,
                    batch.len()
                )));
            }
            self.assignments.push(assignment.clone());
        }
        Ok(())
    }

    /// All assignments in insertion order.
    pub fn all(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Assignments for one agent, preserving insertion order.
    pub fn for_agent(&self, agent_id: &Uuid) -> Vec<Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.agent_id == *agent_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.assignments.len() >= self.max_assignments
    }
}
