//! Entity trait defining the capability every managed type exposes

use crate::core::field::Schema;

/// Base trait for all entities handled by the framework.
///
/// An entity has:
/// - a stable 64-bit identifier
/// - a type name, used as its cache group
/// - a resource name, used as its URL segment
/// - a [`Schema`] listing its typed, filterable fields
///
/// The schema is built once per type, typically behind a `OnceLock`:
///
/// ```rust,ignore
/// impl Entity for Role {
///     fn type_name() -> &'static str { "Role" }
///     fn resource_name() -> &'static str { "roles" }
///     fn id(&self) -> i64 { self.id }
///     fn set_id(&mut self, id: i64) { self.id = id; }
///
///     fn schema() -> &'static Schema<Self> {
///         static SCHEMA: OnceLock<Schema<Role>> = OnceLock::new();
///         SCHEMA.get_or_init(|| {
///             Schema::builder()
///                 .field("Name", FieldKind::Localized, |r: &Role| r.name.clone().into())
///                 .build()
///         })
///     }
/// }
/// ```
pub trait Entity: Clone + Send + Sync + 'static {
    /// Type name, also the cache group owning this entity's cached lists (e.g. "User")
    fn type_name() -> &'static str;

    /// The plural resource name used in URLs (e.g. "users")
    fn resource_name() -> &'static str;

    /// Unique identifier of this instance
    fn id(&self) -> i64;

    /// Assign the identifier (used by stores that generate ids)
    fn set_id(&mut self, id: i64);

    /// Field table of this entity type
    fn schema() -> &'static Schema<Self>;
}
