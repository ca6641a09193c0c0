//! Core module containing the entity capability, field schema and errors

pub mod entity;
pub mod error;
pub mod field;
pub mod localized;

pub use entity::Entity;
pub use error::{ConfigError, CrudError, CrudResult, EntityError, FilterError, RequestError};
pub use field::{
    FieldDescriptor, FieldKind, FieldType, FieldValue, RelatedRef, Schema, SchemaBuilder,
};
pub use localized::{LocalizedText, DEFAULT_LOCALE, SUPPORTED_LANGUAGES};
