//! Server module for building HTTP servers with generated CRUD routes
//!
//! The `ServerBuilder` registers, for each entity store:
//! - `GET /{resource}/{id}` and `GET /{resource}/All` (filtered, sorted, paginated)
//! - `POST /{resource}/Create`, `PUT /{resource}/Update`, `DELETE /{resource}/Delete/{id}`
//!
//! plus a `/health` route reporting cache counters.

pub mod builder;
pub mod entity_registry;
pub mod handlers;
pub mod lang;

pub use builder::ServerBuilder;
pub use entity_registry::{CrudDescriptor, EntityDescriptor, EntityRegistry};
pub use handlers::{EntityState, ListQuery, RestEntity};
pub use lang::{request_lang, RequestLang};
