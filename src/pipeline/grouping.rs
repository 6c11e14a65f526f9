use uuid::Uuid;

use crate::pipeline::writer::Assignment;

/// One agent's assignments, in the order they appeared in the input list.
#[derive(Debug, Clone)]
pub struct AgentGroup {
    pub agent_id: Uuid,
    pub items: Vec<Assignment>,
}

/// Regroup a flat assignment list by agent.
///
/// Agents appear in first-seen order; each group preserves the input's
/// relative order. Used both for the upload response and for the persisted
/// listing view.
pub fn group_by_agent(assignments: &[Assignment]) -> Vec<AgentGroup> {
    let mut groups: Vec<AgentGroup> = Vec::new();

    for assignment in assignments {
        match groups.iter_mut().find(|g| g.agent_id == assignment.agent_id) {
            Some(group) => group.items.push(assignment.clone()),
            None => groups.push(AgentGroup {
                agent_id: assignment.agent_id,
                items: vec![assignment.clone()],
            }),
        }
    }

    groups
}
