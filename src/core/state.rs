use std::sync::Arc;

use sqlx::PgPool;

use crate::core::{config::Settings, redis::RedisHandle};
use crate::services::gradebook::{GradeStore, OwnershipResolver, PgGradeStore, PgOwnershipResolver};

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    redis: RedisHandle,
    grades: Arc<dyn GradeStore>,
    ownership: Arc<dyn OwnershipResolver>,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool, redis: RedisHandle) -> Self {
        let grades: Arc<dyn GradeStore> = Arc::new(PgGradeStore::new(db.clone()));
        let ownership: Arc<dyn OwnershipResolver> = Arc::new(PgOwnershipResolver::new(db.clone()));
        Self { inner: Arc::new(InnerState { settings, db, redis, grades, ownership }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.inner.redis
    }

    pub(crate) fn grades(&self) -> &dyn GradeStore {
        self.inner.grades.as_ref()
    }

    pub(crate) fn ownership(&self) -> &dyn OwnershipResolver {
        self.inner.ownership.as_ref()
    }
}
