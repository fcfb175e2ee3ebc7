use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Material;
use crate::db::types::MaterialType;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MaterialCreate {
    #[serde(alias = "materialType")]
    pub(crate) material_type: MaterialType,
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default = "default_max_score")]
    #[serde(alias = "maxScore")]
    #[validate(range(exclusive_min = 0.0, message = "max_score must be positive"))]
    pub(crate) max_score: f64,
    /// RFC 3339 timestamp.
    #[serde(default)]
    #[serde(alias = "dueAt")]
    pub(crate) due_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MaterialListQuery {
    #[serde(default)]
    #[serde(alias = "materialType")]
    pub(crate) material_type: Option<MaterialType>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MaterialResponse {
    pub(crate) id: String,
    pub(crate) class_id: String,
    pub(crate) material_type: MaterialType,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) max_score: f64,
    pub(crate) due_at: Option<String>,
    pub(crate) created_by: String,
    pub(crate) created_at: String,
}

impl MaterialResponse {
    pub(crate) fn from_db(material: Material) -> Self {
        Self {
            id: material.id,
            class_id: material.class_id,
            material_type: material.material_type,
            title: material.title,
            description: material.description,
            max_score: material.max_score,
            due_at: material.due_at.map(format_primitive),
            created_by: material.created_by,
            created_at: format_primitive(material.created_at),
        }
    }
}

fn default_max_score() -> f64 {
    100.0
}
