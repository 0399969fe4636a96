#![forbid(unsafe_code)]

pub mod catalog;
pub mod repository;
pub mod sqlite;

pub use catalog::{default_areas, default_catalog};
pub use repository::{
    ActionPlanRepository, AssessmentRepository, CatalogRepository, InMemoryRepository,
    ResponseMap, ResponseRecord, Storage, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
