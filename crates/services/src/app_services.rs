use std::sync::Arc;

use storage::default_catalog;
use storage::repository::{CatalogRepository, Storage, StorageError};
use tracing::info;
use wheel_core::model::UserId;

use crate::Clock;
use crate::action_plan::ActionPlanService;
use crate::assessment::AssessmentLoopService;
use crate::error::AppServicesError;
use crate::history::HistoryService;

/// Assembles app-facing services for one user.
#[derive(Clone)]
pub struct AppServices {
    user_id: UserId,
    assessment_loop: Arc<AssessmentLoopService>,
    action_plans: Arc<ActionPlanService>,
    history: Arc<HistoryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage. Stores the built-in catalog
    /// when the database has none yet.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or catalog setup fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        user_id: UserId,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        ensure_catalog(storage.catalog.as_ref()).await?;
        Ok(Self::from_storage(&storage, clock, user_id))
    }

    /// Build services over in-memory storage preloaded with the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if the built-in catalog is invalid.
    pub fn new_in_memory(clock: Clock, user_id: UserId) -> Result<Self, AppServicesError> {
        let storage = Storage::in_memory_with_catalog(default_catalog()?);
        Ok(Self::from_storage(&storage, clock, user_id))
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, user_id: UserId) -> Self {
        let assessment_loop = Arc::new(AssessmentLoopService::new(
            clock,
            Arc::clone(&storage.catalog),
            Arc::clone(&storage.assessments),
        ));
        let action_plans = Arc::new(ActionPlanService::new(
            clock,
            Arc::clone(&storage.assessments),
            Arc::clone(&storage.plans),
        ));
        let history = Arc::new(HistoryService::new(Arc::clone(&storage.assessments)));

        Self {
            user_id,
            assessment_loop,
            action_plans,
            history,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn assessment_loop(&self) -> Arc<AssessmentLoopService> {
        Arc::clone(&self.assessment_loop)
    }

    #[must_use]
    pub fn action_plans(&self) -> Arc<ActionPlanService> {
        Arc::clone(&self.action_plans)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }
}

async fn ensure_catalog(catalog: &dyn CatalogRepository) -> Result<(), AppServicesError> {
    match catalog.fetch_catalog().await {
        Ok(_) => Ok(()),
        Err(StorageError::NotFound) => {
            let defaults = default_catalog()?;
            catalog.upsert_catalog(&defaults).await?;
            info!(areas = defaults.step_count(), "stored built-in catalog");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
