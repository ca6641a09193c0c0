//! Generic CRUD service: store + shared cache + filter compiler

use std::slice;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::CacheProvider;
use crate::core::entity::Entity;
use crate::core::error::{CrudError, CrudResult, EntityError};
use crate::filter::{CompileOptions, FilterCompiler, FilterRequest, PaginatedList};
use crate::relation::RelationLoader;
use crate::storage::EntityStore;

/// CRUD operations for one entity type.
///
/// The complete list of `T` is cached under `"{type_name}:all"` in the
/// `type_name` group. Plain list requests and id lookups are served from it;
/// requests with a search term go to the store through the deferred path,
/// unless relations are attached: those need the loaded list.
pub struct CrudService<T: Entity> {
    store: Arc<dyn EntityStore<T>>,
    cache: Arc<CacheProvider>,
    options: CompileOptions,
    relations: Vec<Arc<dyn RelationLoader<T>>>,
}

impl<T: Entity> Clone for CrudService<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            options: self.options.clone(),
            relations: self.relations.clone(),
        }
    }
}

impl<T: Entity> CrudService<T> {
    pub fn new(store: Arc<dyn EntityStore<T>>, cache: Arc<CacheProvider>) -> Self {
        Self {
            store,
            cache,
            options: CompileOptions::default(),
            relations: Vec::new(),
        }
    }

    /// Base compile options; the request language is set per call
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve embedded references with `loader` whenever `T` is read from
    /// the store. The related type should list `T` in the cache relation map,
    /// otherwise cached `T` lists keep stale names until they expire.
    pub fn include(mut self, loader: impl RelationLoader<T> + 'static) -> Self {
        let related = loader.related_type();
        if !self
            .cache
            .dependents_of(related)
            .iter()
            .any(|group| group == T::type_name())
        {
            warn!(
                entity = T::type_name(),
                related, "relation not in the cache relation map"
            );
        }
        self.relations.push(Arc::new(loader));
        self
    }

    pub fn cache(&self) -> &Arc<CacheProvider> {
        &self.cache
    }

    fn group() -> &'static str {
        T::type_name()
    }

    /// Cache key of the complete list
    pub fn list_key() -> String {
        format!("{}:all", T::type_name())
    }

    /// Complete list, from the cache when possible
    pub async fn all(&self) -> CrudResult<Arc<Vec<T>>> {
        let store = Arc::clone(&self.store);
        let relations = self.relations.clone();
        self.cache
            .get_or_set(&Self::list_key(), Self::group(), None, || async move {
                let mut items = store.list().await?;
                load_relations(&relations, &mut items).await?;
                Ok::<_, CrudError>(items)
            })
            .await
    }

    pub async fn get_by_id(&self, id: i64) -> CrudResult<T> {
        self.all()
            .await?
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or_else(|| {
                EntityError::NotFound {
                    entity_type: T::type_name().to_string(),
                    id,
                }
                .into()
            })
    }

    pub async fn get_list(
        &self,
        request: FilterRequest,
        lang: Option<String>,
    ) -> CrudResult<PaginatedList<T>> {
        let options = self.options.clone().with_lang(lang);
        let compiler = FilterCompiler::<T>::new(request.clone(), options);

        if request.search_term().is_none() || !self.relations.is_empty() {
            let items = self.all().await?;
            compiler.apply_to_list(Vec::clone(&items))
        } else {
            debug!(entity = T::type_name(), "search request, querying store");
            compiler.apply_to_source(self.store.as_ref()).await
        }
    }

    pub async fn create(&self, entity: T) -> CrudResult<T> {
        let mut created = self.store.insert(entity).await?;
        self.cache.clear_owner_and_relations(Self::group());
        load_relations(&self.relations, slice::from_mut(&mut created)).await?;
        debug!(entity = T::type_name(), id = created.id(), "created");
        Ok(created)
    }

    pub async fn update(&self, entity: T) -> CrudResult<T> {
        let mut updated = self.store.update(entity).await?;
        load_relations(&self.relations, slice::from_mut(&mut updated)).await?;
        self.cache
            .update_item_in_cached_lists(Self::group(), &updated);
        self.cache.clear_relations(Self::group());
        debug!(entity = T::type_name(), id = updated.id(), "updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> CrudResult<()> {
        self.store.delete(id).await?;
        self.cache.delete_from_cached_lists::<T>(Self::group(), id);
        debug!(entity = T::type_name(), id, "deleted");
        Ok(())
    }
}

async fn load_relations<T: Entity>(
    relations: &[Arc<dyn RelationLoader<T>>],
    items: &mut [T],
) -> CrudResult<()> {
    for loader in relations {
        loader.load(items).await?;
    }
    Ok(())
}
