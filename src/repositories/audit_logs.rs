use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::AuditLog;

const COLUMNS: &str = "id, actor_id, action, entity_type, entity_id, details, created_at";

pub(crate) struct AppendAudit<'a> {
    pub(crate) id: &'a str,
    pub(crate) actor_id: &'a str,
    pub(crate) action: &'a str,
    pub(crate) entity_type: &'a str,
    pub(crate) entity_id: &'a str,
    pub(crate) details: serde_json::Value,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn append(pool: &PgPool, entry: AppendAudit<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_logs (id, actor_id, action, entity_type, entity_id, details, created_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)",
    )
    .bind(entry.id)
    .bind(entry.actor_id)
    .bind(entry.action)
    .bind(entry.entity_type)
    .bind(entry.entity_id)
    .bind(Json(entry.details))
    .bind(entry.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) struct ListAudit {
    pub(crate) actor_id: Option<String>,
    pub(crate) entity_type: Option<String>,
    pub(crate) entity_id: Option<String>,
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

pub(crate) async fn list(pool: &PgPool, params: ListAudit) -> Result<(Vec<AuditLog>, i64), sqlx::Error> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_logs");
    push_filters(&mut count, &params);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM audit_logs"));
    push_filters(&mut select, &params);
    select.push(" ORDER BY created_at DESC OFFSET ");
    select.push_bind(params.skip.max(0));
    select.push(" LIMIT ");
    select.push_bind(params.limit.clamp(1, 500));
    let items = select.build_query_as::<AuditLog>().fetch_all(pool).await?;

    Ok((items, total))
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, params: &ListAudit) {
    let mut separator = " WHERE ";
    for (column, value) in [
        ("actor_id", &params.actor_id),
        ("entity_type", &params.entity_type),
        ("entity_id", &params.entity_id),
    ] {
        if let Some(value) = value {
            builder.push(separator).push(column).push(" = ").push_bind(value.clone());
            separator = " AND ";
        }
    }
}
