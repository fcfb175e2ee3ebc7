use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Material;
use crate::db::types::MaterialType;

pub(crate) const COLUMNS: &str = "\
    id, class_id, material_type, title, description, max_score, due_at, created_by, \
    created_at, updated_at";

pub(crate) struct CreateMaterial<'a> {
    pub(crate) id: &'a str,
    pub(crate) class_id: &'a str,
    pub(crate) material_type: MaterialType,
    pub(crate) title: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) max_score: f64,
    pub(crate) due_at: Option<PrimitiveDateTime>,
    pub(crate) created_by: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateMaterial<'_>,
) -> Result<Material, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!(
        "INSERT INTO materials (
            id, class_id, material_type, title, description, max_score, due_at, created_by,
            created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$9)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.class_id)
    .bind(params.material_type)
    .bind(params.title)
    .bind(params.description)
    .bind(params.max_score)
    .bind(params.due_at)
    .bind(params.created_by)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    material_id: &str,
) -> Result<Option<Material>, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!("SELECT {COLUMNS} FROM materials WHERE id = $1"))
        .bind(material_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_class(
    pool: &PgPool,
    class_id: &str,
    material_type: Option<MaterialType>,
) -> Result<Vec<Material>, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!(
        "SELECT {COLUMNS}
         FROM materials
         WHERE class_id = $1 AND ($2::materialtype IS NULL OR material_type = $2)
         ORDER BY created_at"
    ))
    .bind(class_id)
    .bind(material_type)
    .fetch_all(pool)
    .await
}
