use serde::{Deserialize, Serialize};

/// The identity on whose behalf an operation runs.
///
/// Stamped onto deadline periods, timeline entries, responsible assignments
/// and audit events. Authentication happens elsewhere; the engine trusts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub actor_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Session {
    pub fn new(actor_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            name: name.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Display form used for authors, e.g. "Cap. Silva (Corregedor)".
    pub fn display_name(&self) -> String {
        match &self.role {
            Some(role) => format!("{} ({role})", self.name),
            None => self.name.clone(),
        }
    }
}
