//! Entity registry for managing entity descriptors and generating CRUD routes

use axum::routing::{delete, get, post, put};
use axum::Router;
use std::collections::HashMap;

use super::handlers::{self, EntityState, RestEntity};

/// Trait that describes how to build routes for an entity
pub trait EntityDescriptor: Send + Sync {
    /// The entity type name (e.g., "User"), also its cache group
    fn type_name(&self) -> &str;

    /// The URL segment (e.g., "users")
    fn resource_name(&self) -> &str;

    /// Build the CRUD routes for this entity
    ///
    /// Should return a Router with routes like:
    /// - GET /{resource}/{id}
    /// - GET /{resource}/All
    /// - POST /{resource}/Create
    /// - PUT /{resource}/Update
    /// - DELETE /{resource}/Delete/{id}
    fn build_routes(&self) -> Router;
}

/// Descriptor serving any [`RestEntity`] through the generic handlers
pub struct CrudDescriptor<T: RestEntity> {
    state: EntityState<T>,
}

impl<T: RestEntity> CrudDescriptor<T> {
    pub fn new(state: EntityState<T>) -> Self {
        Self { state }
    }
}

impl<T: RestEntity> EntityDescriptor for CrudDescriptor<T> {
    fn type_name(&self) -> &str {
        T::type_name()
    }

    fn resource_name(&self) -> &str {
        T::resource_name()
    }

    fn build_routes(&self) -> Router {
        let base = format!("/{}", T::resource_name());

        Router::new()
            .route(&format!("{}/All", base), get(handlers::list::<T>))
            .route(&format!("{}/Create", base), post(handlers::create::<T>))
            .route(&format!("{}/Update", base), put(handlers::update::<T>))
            .route(
                &format!("{}/Delete/{{id}}", base),
                delete(handlers::delete::<T>),
            )
            .route(&format!("{}/{{id}}", base), get(handlers::get_by_id::<T>))
            .with_state(self.state.clone())
    }
}

/// Registry for all entities exposed by the server
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: HashMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            descriptors: HashMap::new(),
        }
    }

    /// Register an entity descriptor
    ///
    /// The entity type name is used as the key; registering the same type
    /// again replaces the previous descriptor.
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let type_name = descriptor.type_name().to_string();
        self.descriptors.insert(type_name, descriptor);
    }

    /// Build a router with all registered entity routes
    pub fn build_routes(&self) -> Router {
        let mut router = Router::new();

        for descriptor in self.descriptors.values() {
            router = router.merge(descriptor.build_routes());
        }

        router
    }

    /// Get all registered entity types
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal mock EntityDescriptor for testing
    struct MockDescriptor {
        type_name: String,
        resource_name: String,
    }

    impl MockDescriptor {
        fn new(type_name: &str, resource_name: &str) -> Self {
            Self {
                type_name: type_name.to_string(),
                resource_name: resource_name.to_string(),
            }
        }
    }

    impl EntityDescriptor for MockDescriptor {
        fn type_name(&self) -> &str {
            &self.type_name
        }

        fn resource_name(&self) -> &str {
            &self.resource_name
        }

        fn build_routes(&self) -> Router {
            Router::new()
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = EntityRegistry::new();
        assert!(registry.entity_types().is_empty());
    }

    #[test]
    fn test_register_multiple_entities() {
        let mut registry = EntityRegistry::new();
        registry.register(Box::new(MockDescriptor::new("User", "users")));
        registry.register(Box::new(MockDescriptor::new("Role", "roles")));
        let types = registry.entity_types();
        assert_eq!(types.len(), 2);
        assert!(types.contains(&"Role"));
    }

    #[test]
    fn test_register_duplicate_replaces() {
        let mut registry = EntityRegistry::new();
        registry.register(Box::new(MockDescriptor::new("User", "users")));
        registry.register(Box::new(MockDescriptor::new("User", "people")));
        assert_eq!(registry.entity_types().len(), 1);
    }

    #[test]
    fn test_build_routes_with_entities() {
        let mut registry = EntityRegistry::new();
        registry.register(Box::new(MockDescriptor::new("User", "users")));
        registry.register(Box::new(MockDescriptor::new("Role", "roles")));
        let _router = registry.build_routes();
    }

    mod crud {
        use super::*;
        use crate::cache::CacheProvider;
        use crate::config::{CacheConfig, PaginationConfig};
        use crate::core::entity::Entity;
        use crate::core::field::{FieldKind, Schema};
        use crate::service::CrudService;
        use crate::storage::InMemoryStore;
        use axum::body::Body;
        use axum::http::{Method, Request, StatusCode};
        use serde::{Deserialize, Serialize};
        use std::sync::{Arc, OnceLock};
        use tower::ServiceExt;

        #[derive(Debug, Clone, Serialize, Deserialize)]
        struct Note {
            id: i64,
            text: String,
        }

        impl Entity for Note {
            fn type_name() -> &'static str {
                "Note"
            }

            fn resource_name() -> &'static str {
                "notes"
            }

            fn id(&self) -> i64 {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = id;
            }

            fn schema() -> &'static Schema<Self> {
                static SCHEMA: OnceLock<Schema<Note>> = OnceLock::new();
                SCHEMA.get_or_init(|| {
                    Schema::builder()
                        .field("Text", FieldKind::String, |n: &Note| n.text.clone().into())
                        .build()
                })
            }
        }

        fn descriptor() -> CrudDescriptor<Note> {
            let store = InMemoryStore::with_items(vec![Note {
                id: 1,
                text: "hello".to_string(),
            }]);
            let service = CrudService::new(
                Arc::new(store),
                Arc::new(CacheProvider::new(CacheConfig::default())),
            );
            CrudDescriptor::new(EntityState {
                service,
                pagination: PaginationConfig::default(),
            })
        }

        async fn status(method: Method, uri: &str) -> StatusCode {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            descriptor()
                .build_routes()
                .oneshot(request)
                .await
                .unwrap()
                .status()
        }

        #[test]
        fn test_descriptor_names_come_from_entity() {
            let descriptor = descriptor();
            assert_eq!(descriptor.type_name(), "Note");
            assert_eq!(descriptor.resource_name(), "notes");
        }

        #[tokio::test]
        async fn test_generated_routes() {
            assert_eq!(status(Method::GET, "/notes/All").await, StatusCode::OK);
            assert_eq!(status(Method::GET, "/notes/1").await, StatusCode::OK);
            assert_eq!(status(Method::GET, "/notes/2").await, StatusCode::NOT_FOUND);
            assert_eq!(status(Method::DELETE, "/notes/Delete/1").await, StatusCode::OK);
            assert_eq!(status(Method::GET, "/notes/abc").await, StatusCode::BAD_REQUEST);
            assert_eq!(
                status(Method::POST, "/notes/All").await,
                StatusCode::METHOD_NOT_ALLOWED
            );
        }
    }
}
