//! In-memory entity store for testing and development

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

use crate::core::entity::Entity;
use crate::core::error::{CrudError, CrudResult, EntityError};
use crate::filter::{Condition, Query};
use crate::storage::{EntityStore, QuerySource};

/// In-memory store keyed by id
///
/// Useful for testing and development. Uses RwLock for thread-safe access and
/// evaluates pushed-down queries over its own contents.
pub struct InMemoryStore<T> {
    items: Arc<RwLock<BTreeMap<i64, T>>>,
}

impl<T> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T: Entity> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Store pre-filled with `items`; ids of `0` are assigned in order
    pub fn with_items(items: impl IntoIterator<Item = T>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.items.write() {
            for mut item in items {
                if item.id() == 0 {
                    match next_id::<T>(&map) {
                        Ok(id) => item.set_id(id),
                        Err(err) => {
                            warn!(error = %err, "seed item skipped");
                            continue;
                        }
                    }
                }
                map.insert(item.id(), item);
            }
        }
        store
    }

    fn read(&self) -> CrudResult<RwLockReadGuard<'_, BTreeMap<i64, T>>> {
        self.items
            .read()
            .map_err(|e| CrudError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> CrudResult<RwLockWriteGuard<'_, BTreeMap<i64, T>>> {
        self.items
            .write()
            .map_err(|e| CrudError::Internal(format!("Failed to acquire write lock: {}", e)))
    }

    fn not_found(id: i64) -> CrudError {
        EntityError::NotFound {
            entity_type: T::type_name().to_string(),
            id,
        }
        .into()
    }
}

impl<T: Entity> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One past the highest id in use
fn next_id<T: Entity>(map: &BTreeMap<i64, T>) -> CrudResult<i64> {
    match map.keys().next_back() {
        None => Ok(1),
        Some(last) => last.checked_add(1).ok_or_else(|| {
            EntityError::Conflict {
                entity_type: T::type_name().to_string(),
                message: format!("no id left after {}", last),
            }
            .into()
        }),
    }
}

#[async_trait]
impl<T: Entity> QuerySource<T> for InMemoryStore<T> {
    async fn count(&self, condition: &Condition) -> CrudResult<usize> {
        let items = self.read()?;
        Ok(items.values().filter(|item| condition.evaluate(*item)).count())
    }

    async fn fetch(&self, query: &Query) -> CrudResult<Vec<T>> {
        let items = self.read()?;
        Ok(query.execute(items.values().cloned()))
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for InMemoryStore<T> {
    async fn insert(&self, mut entity: T) -> CrudResult<T> {
        let mut items = self.write()?;

        if entity.id() == 0 {
            entity.set_id(next_id::<T>(&items)?);
        } else if items.contains_key(&entity.id()) {
            return Err(EntityError::Conflict {
                entity_type: T::type_name().to_string(),
                message: format!("id {} is already taken", entity.id()),
            }
            .into());
        }

        items.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn get(&self, id: i64) -> CrudResult<Option<T>> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn list(&self) -> CrudResult<Vec<T>> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn update(&self, entity: T) -> CrudResult<T> {
        let mut items = self.write()?;
        let slot = items
            .get_mut(&entity.id())
            .ok_or_else(|| Self::not_found(entity.id()))?;
        *slot = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, id: i64) -> CrudResult<()> {
        let mut items = self.write()?;
        items.remove(&id).map(|_| ()).ok_or_else(|| Self::not_found(id))
    }
}
