//! Project context supplied by the host

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Addresses one logical project: the bind cache is scoped by `project_id`,
/// and the two table refs name the catalog and cache tables in the host's
/// database. Table creation and naming belong to the host; `new` only
/// applies the conventional `<quota_table>_bind` derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectContext {
    pub project_id: Uuid,
    pub quota_table: String,
    pub bind_table: String,
}

impl ProjectContext {
    /// Create a context with the conventional bind table name
    pub fn new(project_id: Uuid, quota_table: impl Into<String>) -> Self {
        let quota_table = quota_table.into();
        let bind_table = format!("{}_bind", quota_table);
        Self {
            project_id,
            quota_table,
            bind_table,
        }
    }

    /// Override the derived bind table name
    pub fn with_bind_table(mut self, bind_table: impl Into<String>) -> Self {
        self.bind_table = bind_table.into();
        self
    }
}
