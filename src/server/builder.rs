//! ServerBuilder for fluent API to build HTTP servers

use anyhow::Result;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::entity_registry::{CrudDescriptor, EntityRegistry};
use super::handlers::{EntityState, RestEntity};
use crate::cache::{spawn_sweeper, CacheProvider};
use crate::config::AppConfig;
use crate::filter::CompileOptions;
use crate::service::CrudService;
use crate::storage::EntityStore;

/// Builder for creating HTTP servers with generated CRUD routes
///
/// Every registered entity shares one [`CacheProvider`], built from the
/// `cache` section of the configuration, so the relation map must be in the
/// config before calling [`ServerBuilder::new`].
///
/// # Example
///
/// ```ignore
/// let config = AppConfig::default();
/// ServerBuilder::new(config)
///     .register(InMemoryStore::<Role>::new())
///     .register(InMemoryStore::<User>::new())
///     .serve()
///     .await?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    cache: Arc<CacheProvider>,
    entity_registry: EntityRegistry,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new(config: AppConfig) -> Self {
        let cache = Arc::new(CacheProvider::new(config.cache.clone()));
        Self {
            config,
            cache,
            entity_registry: EntityRegistry::new(),
            custom_routes: Vec::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The cache shared by every registered entity
    pub fn cache(&self) -> Arc<CacheProvider> {
        Arc::clone(&self.cache)
    }

    /// Service for `T` over `store`, wired to the shared cache
    pub fn service<T: RestEntity>(&self, store: impl EntityStore<T> + 'static) -> CrudService<T> {
        let options = CompileOptions {
            lang: None,
            strict_literals: self.config.filtering.strict_literals,
            languages: self.config.localization.supported_languages.clone(),
        };
        CrudService::new(Arc::new(store), self.cache()).with_options(options)
    }

    /// Expose `T` over HTTP, backed by `store`
    pub fn register<T: RestEntity>(self, store: impl EntityStore<T> + 'static) -> Self {
        let service = self.service(store);
        self.register_service(service)
    }

    /// Expose an already built service
    pub fn register_service<T: RestEntity>(mut self, service: CrudService<T>) -> Self {
        let state = EntityState {
            service,
            pagination: self.config.pagination.clone(),
        };
        tracing::debug!(
            entity = T::type_name(),
            resource = T::resource_name(),
            "registering entity routes"
        );
        self.entity_registry
            .register(Box::new(CrudDescriptor::new(state)));
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for endpoints that don't fit the CRUD pattern.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the final router
    ///
    /// This generates:
    /// - `GET /health` with cache counters
    /// - CRUD routes for all registered entities
    /// - the custom routes
    pub fn build(self) -> Router {
        let mut app = health_routes(self.cache.clone(), &self.entity_registry)
            .merge(self.entity_registry.build_routes());

        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }

        if self.config.server.cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app.layer(TraceLayer::new_for_http())
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the configured address
    /// - Start the expired-entry sweeper
    /// - Serve requests until SIGTERM or Ctrl+C
    /// - Stop the sweeper and flush the cache
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.addr();
        let sweep_interval = self.config.cache.sweep_interval();
        let cache = self.cache();

        let app = self.build();
        let listener = TcpListener::bind(&addr).await?;
        let sweeper = spawn_sweeper(Arc::clone(&cache), sweep_interval);

        tracing::info!("Server listening on {}", addr);

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        sweeper.abort();
        cache.flush();
        served?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

fn health_routes(cache: Arc<CacheProvider>, registry: &EntityRegistry) -> Router {
    let mut entities: Vec<String> = registry
        .entity_types()
        .into_iter()
        .map(str::to_string)
        .collect();
    entities.sort();
    let entities = Arc::new(entities);

    Router::new()
        .route(
            "/health",
            get(move |State(cache): State<Arc<CacheProvider>>| {
                let entities = Arc::clone(&entities);
                async move { health_check(cache, &entities) }
            }),
        )
        .with_state(cache)
}

fn health_check(cache: Arc<CacheProvider>, entities: &[String]) -> Json<Value> {
    let stats = cache.stats();
    Json(json!({
        "status": "ok",
        "service": "crudkit",
        "entities": entities,
        "cache": {
            "entries": stats.entries,
            "groups": stats.groups,
            "hits": stats.hits,
            "misses": stats.misses,
            "hitRate": stats.hit_rate(),
        }
    }))
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
