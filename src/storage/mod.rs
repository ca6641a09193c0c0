//! Persistence seams and the bundled in-memory store

pub mod in_memory;

pub use in_memory::InMemoryStore;

use async_trait::async_trait;

use crate::core::entity::Entity;
use crate::core::error::CrudResult;
use crate::filter::{Condition, Query};

/// A source that can evaluate compiled filters itself.
///
/// This is the deferred path of the filter compiler: the match count is
/// taken first, then filtering, ordering and the skip/take window are pushed
/// down through a single [`Query`].
#[async_trait]
pub trait QuerySource<T: Entity>: Send + Sync {
    /// Number of entities matching `condition`
    async fn count(&self, condition: &Condition) -> CrudResult<usize>;

    /// Entities matching the query, ordered and windowed
    async fn fetch(&self, query: &Query) -> CrudResult<Vec<T>>;
}

/// Persistence collaborator of [`crate::service::CrudService`]
#[async_trait]
pub trait EntityStore<T: Entity>: QuerySource<T> {
    /// Insert an entity. An id of `0` asks the store to assign one.
    async fn insert(&self, entity: T) -> CrudResult<T>;

    async fn get(&self, id: i64) -> CrudResult<Option<T>>;

    /// Every entity, in id order
    async fn list(&self) -> CrudResult<Vec<T>>;

    /// Replace an existing entity; `NotFound` when its id is unknown
    async fn update(&self, entity: T) -> CrudResult<T>;

    /// Remove an entity; `NotFound` when its id is unknown
    async fn delete(&self, id: i64) -> CrudResult<()>;
}
