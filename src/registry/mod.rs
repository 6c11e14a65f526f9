use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SplitError};

/// Identity of a worker agent. Owned by the registry; the pipeline only
/// reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: String,
}

impl AgentRef {
    pub fn new(name: &str, email: &str, mobile: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            mobile: mobile.trim().to_string(),
        }
    }
}

/// Partial update for an existing agent. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
}

/// In-memory agent directory.
///
/// Registration order is the pool order the planner consumes, so it is
/// preserved.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: Vec<AgentRef>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new agent. Emails are unique, case-insensitive.
    pub fn add(&mut self, agent: AgentRef) -> Result<AgentRef> {
        if self.agents.iter().any(|a| a.email == agent.email) {
            return Err(SplitError::DuplicateAgent(agent.email));
        }
        tracing::info!(agent_id = %agent.id, email = %agent.email, "Agent registered");
        self.agents.push(agent.clone());
        Ok(agent)
    }

    /// All agents in registration order.
    pub fn agents(&self) -> &[AgentRef] {
        &self.agents
    }

    pub fn get(&self, id: &Uuid) -> Option<&AgentRef> {
        self.agents.iter().find(|a| a.id == *id)
    }

    /// Apply a partial update. Email uniqueness is re-checked against the
    /// other agents.
    pub fn update(&mut self, id: &Uuid, update: AgentUpdate) -> Result<AgentRef> {
        if let Some(email) = &update.email {
            let email = email.trim().to_lowercase();
            if self.agents.iter().any(|a| a.id != *id && a.email == email) {
                return Err(SplitError::DuplicateAgent(email));
            }
        }

        let agent = self
            .agents
            .iter_mut()
            .find(|a| a.id == *id)
            .ok_or(SplitError::AgentNotFound(*id))?;

        if let Some(name) = update.name {
            agent.name = name.trim().to_string();
        }
        if let Some(email) = update.email {
            agent.email = email.trim().to_lowercase();
        }
        if let Some(mobile) = update.mobile {
            agent.mobile = mobile.trim().to_string();
        }

        Ok(agent.clone())
    }

    pub fn remove(&mut self, id: &Uuid) -> Result<AgentRef> {
        let position = self
            .agents
            .iter()
            .position(|a| a.id == *id)
            .ok_or(SplitError::AgentNotFound(*id))?;
        let agent = self.agents.remove(position);
        tracing::info!(agent_id = %agent.id, "Agent removed");
        Ok(agent)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
