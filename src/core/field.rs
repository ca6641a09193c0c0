//! Field values, field descriptors and per-entity schemas
//!
//! A [`Schema`] is the explicit table the filter compiler works against: one
//! [`FieldDescriptor`] per filterable/sortable field, each with a declared
//! [`FieldType`] and a plain accessor function.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::core::entity::Entity;
use crate::core::localized::LocalizedText;

/// Declared kind of an entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    /// Enumeration, variants listed in ordinal order
    Enum(&'static [&'static str]),
    /// Calendar date without time
    Date,
    /// Local date and time, no offset
    DateTime,
    /// Date and time with a UTC offset
    Timestamp,
    /// Per-language text, only reachable through free-text search
    Localized,
    /// To-one relation to another entity exposing a display name
    Relation,
    /// To-many relation, compared through the related identifiers
    Collection,
}

impl FieldKind {
    pub fn is_date_like(&self) -> bool {
        matches!(self, FieldKind::Date | FieldKind::DateTime | FieldKind::Timestamp)
    }

    /// Kinds that support `gt`/`lt`/`gte`/`lte`
    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            FieldKind::String
                | FieldKind::Integer
                | FieldKind::Float
                | FieldKind::Date
                | FieldKind::DateTime
                | FieldKind::Timestamp
        )
    }

    /// Kinds holding a single comparable value
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            FieldKind::Localized | FieldKind::Relation | FieldKind::Collection
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Enum(_) => "enum",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Localized => "localized text",
            FieldKind::Relation => "relation",
            FieldKind::Collection => "collection",
        };
        f.write_str(name)
    }
}

/// Kind plus nullability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldType {
    pub kind: FieldKind,
    pub nullable: bool,
}

impl FieldType {
    pub fn required(kind: FieldKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    pub fn optional(kind: FieldKind) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }
}

/// Reference to a related entity, as seen from the owning entity.
///
/// Only `id` is authoritative; `name` is filled in from the related entity
/// when the owner is read through a service with a matching
/// [`Include`](crate::relation::Include).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedRef {
    pub id: i64,
    #[serde(default)]
    pub name: LocalizedText,
}

impl RelatedRef {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            name: LocalizedText::new(),
        }
    }
}

/// A typed runtime value read from an entity field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Enum ordinal
    Enum(usize),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<FixedOffset>),
    Localized(LocalizedText),
    Relation(RelatedRef),
    Ids(Vec<i64>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Calendar date of a date-like value
    pub fn date_part(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            FieldValue::DateTime(dt) => Some(dt.date()),
            FieldValue::Timestamp(ts) => Some(ts.date_naive()),
            _ => None,
        }
    }

    /// Compare two scalar values of compatible variants.
    ///
    /// Returns `None` when either side is null or the variants are not
    /// comparable with each other.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        use FieldValue::*;
        match (self, other) {
            (String(a), String(b)) => Some(a.cmp(b)),
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Enum(a), Enum(b)) => Some(a.cmp(b)),
            (Date(a), Date(b)) => Some(a.cmp(b)),
            (DateTime(a), DateTime(b)) => Some(a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Equality with the same semantics as [`FieldValue::compare`]
    pub fn matches(&self, other: &FieldValue) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::DateTime(value)
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value.fixed_offset())
    }
}

impl From<LocalizedText> for FieldValue {
    fn from(value: LocalizedText) -> Self {
        FieldValue::Localized(value)
    }
}

impl From<RelatedRef> for FieldValue {
    fn from(value: RelatedRef) -> Self {
        FieldValue::Relation(value)
    }
}

impl From<Vec<i64>> for FieldValue {
    fn from(value: Vec<i64>) -> Self {
        FieldValue::Ids(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Reads one field out of an entity
pub type Accessor<T> = fn(&T) -> FieldValue;

/// One entry of an entity's field table
pub struct FieldDescriptor<T> {
    pub name: &'static str,
    pub field_type: FieldType,
    pub searchable: bool,
    accessor: Accessor<T>,
}

impl<T> FieldDescriptor<T> {
    pub fn new(name: &'static str, field_type: FieldType, accessor: Accessor<T>) -> Self {
        let searchable = matches!(field_type.kind, FieldKind::String | FieldKind::Localized);
        Self {
            name,
            field_type,
            searchable,
            accessor,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.field_type.kind
    }

    pub fn value(&self, entity: &T) -> FieldValue {
        (self.accessor)(entity)
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("searchable", &self.searchable)
            .finish()
    }
}

/// Declaration-ordered field table of one entity type.
///
/// Lookups are case-insensitive: `age`, `Age` and `AGE` resolve the same field.
pub struct Schema<T> {
    fields: IndexMap<String, FieldDescriptor<T>>,
}

impl<T> Schema<T> {
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.get(&name.to_lowercase())
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor<T>> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T: Entity> Schema<T> {
    /// Start a schema; `Id` is always the first field
    pub fn builder() -> SchemaBuilder<T> {
        let builder = SchemaBuilder {
            fields: IndexMap::new(),
        };
        builder.field("Id", FieldKind::Integer, |e: &T| FieldValue::Integer(e.id()))
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields.values()).finish()
    }
}

/// Fluent builder for [`Schema`]
pub struct SchemaBuilder<T> {
    fields: IndexMap<String, FieldDescriptor<T>>,
}

impl<T> SchemaBuilder<T> {
    /// Non-nullable field
    pub fn field(self, name: &'static str, kind: FieldKind, accessor: Accessor<T>) -> Self {
        self.push(FieldDescriptor::new(name, FieldType::required(kind), accessor))
    }

    /// Nullable field
    pub fn optional(self, name: &'static str, kind: FieldKind, accessor: Accessor<T>) -> Self {
        self.push(FieldDescriptor::new(name, FieldType::optional(kind), accessor))
    }

    /// Derived field: filterable and sortable, but never part of free-text search
    pub fn computed(self, name: &'static str, kind: FieldKind, accessor: Accessor<T>) -> Self {
        let mut descriptor = FieldDescriptor::new(name, FieldType::required(kind), accessor);
        descriptor.searchable = false;
        self.push(descriptor)
    }

    pub fn push(mut self, descriptor: FieldDescriptor<T>) -> Self {
        self.fields
            .insert(descriptor.name.to_lowercase(), descriptor);
        self
    }

    pub fn build(self) -> Schema<T> {
        Schema {
            fields: self.fields,
        }
    }
}
