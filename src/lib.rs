//! # crudkit
//!
//! Generic CRUD scaffolding for REST APIs in Rust.
//!
//! ## Features
//!
//! - **Dynamic filtering**: `FieldName / operation / value` clauses compiled into a typed
//!   condition tree, evaluated in memory or pushed down to a query source
//! - **Multi-key sorting** with null-first ordering and localized sort keys
//! - **Pagination** with a consistent envelope (`data`, `currentPage`, `itemsPerPage`,
//!   `totalItems`, `totalPages`)
//! - **Free-text search** across string and localized fields
//! - **Grouped cache** with sliding + absolute expiration and relation-map invalidation
//! - **Embedded references** resolved against the related service on every load
//! - **Generated routes** (`/All`, `/Create`, `/Update`, `/Delete/{id}`, `/{id}`) per entity
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crudkit::prelude::*;
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Tag { id: i64, label: String }
//!
//! impl Entity for Tag {
//!     fn type_name() -> &'static str { "Tag" }
//!     fn resource_name() -> &'static str { "tags" }
//!     fn id(&self) -> i64 { self.id }
//!     fn set_id(&mut self, id: i64) { self.id = id; }
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: OnceLock<Schema<Tag>> = OnceLock::new();
//!         SCHEMA.get_or_init(|| {
//!             Schema::builder()
//!                 .field("Label", FieldKind::String, |t: &Tag| t.label.clone().into())
//!                 .build()
//!         })
//!     }
//! }
//!
//! ServerBuilder::new(AppConfig::default())
//!     .register(InMemoryStore::<Tag>::new())
//!     .serve()
//!     .await?;
//! ```

pub mod cache;
pub mod config;
pub mod core;
pub mod filter;
pub mod relation;
pub mod server;
pub mod service;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        entity::Entity,
        error::{CrudError, CrudResult},
        field::{FieldDescriptor, FieldKind, FieldType, FieldValue, RelatedRef, Schema},
        localized::LocalizedText,
    };

    // === Filtering ===
    pub use crate::filter::{
        CompileOptions, Condition, FilterClause, FilterCompiler, FilterParams, FilterRequest,
        PaginatedList, PaginatedResult, Query, SortClause, SortDirection,
    };

    // === Cache ===
    pub use crate::cache::{CacheProvider, CacheStats, spawn_sweeper};

    // === Storage & services ===
    pub use crate::relation::{Include, RelationLoader};
    pub use crate::service::CrudService;
    pub use crate::storage::{EntityStore, InMemoryStore, QuerySource};

    // === Config ===
    pub use crate::config::{AppConfig, CacheConfig, PaginationConfig};

    // === Server ===
    pub use crate::server::{EntityDescriptor, EntityRegistry, RequestLang, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::OnceLock;

    // === Axum ===
    pub use axum::{
        Router,
        extract::{Path, State},
        routing::{delete, get, post, put},
    };
}
