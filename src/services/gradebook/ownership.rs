use async_trait::async_trait;
use sqlx::PgPool;

use crate::repositories;

/// A gradebook resource whose owner is the teacher of the enclosing class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OwnedResource<'a> {
    Class(&'a str),
    Material(&'a str),
    Submission(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ownership {
    Allowed,
    Denied,
}

impl Ownership {
    pub(crate) fn is_allowed(self) -> bool {
        matches!(self, Ownership::Allowed)
    }
}

/// Answers whether `caller_id` owns `resource`. Unknown resources are `Denied`.
#[async_trait]
pub(crate) trait OwnershipResolver: Send + Sync {
    async fn resolve_ownership(
        &self,
        caller_id: &str,
        resource: OwnedResource<'_>,
    ) -> Result<Ownership, sqlx::Error>;
}

#[derive(Clone)]
pub(crate) struct PgOwnershipResolver {
    pool: PgPool,
}

impl PgOwnershipResolver {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnershipResolver for PgOwnershipResolver {
    async fn resolve_ownership(
        &self,
        caller_id: &str,
        resource: OwnedResource<'_>,
    ) -> Result<Ownership, sqlx::Error> {
        let owner = match resource {
            OwnedResource::Class(id) => repositories::classes::find_owner_id(&self.pool, id).await?,
            OwnedResource::Material(id) => {
                repositories::classes::find_owner_of_material(&self.pool, id).await?
            }
            OwnedResource::Submission(id) => {
                repositories::classes::find_owner_of_submission(&self.pool, id).await?
            }
        };

        Ok(match owner {
            Some(owner) if owner == caller_id => Ownership::Allowed,
            _ => Ownership::Denied,
        })
    }
}
