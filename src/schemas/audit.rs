use serde::{Deserialize, Serialize};

use crate::api::pagination::default_limit;
use crate::core::time::format_primitive;
use crate::db::models::AuditLog;

#[derive(Debug, Deserialize)]
pub(crate) struct AuditLogQuery {
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
    #[serde(default)]
    #[serde(alias = "actorId")]
    pub(crate) actor_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "entityType")]
    pub(crate) entity_type: Option<String>,
    #[serde(default)]
    #[serde(alias = "entityId")]
    pub(crate) entity_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AuditLogResponse {
    pub(crate) id: String,
    pub(crate) actor_id: String,
    pub(crate) action: String,
    pub(crate) entity_type: String,
    pub(crate) entity_id: String,
    pub(crate) details: serde_json::Value,
    pub(crate) created_at: String,
}

impl AuditLogResponse {
    pub(crate) fn from_db(entry: AuditLog) -> Self {
        Self {
            id: entry.id,
            actor_id: entry.actor_id,
            action: entry.action,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            details: entry.details.0,
            created_at: format_primitive(entry.created_at),
        }
    }
}
