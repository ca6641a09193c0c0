//! Read-time resolution of embedded references
//!
//! An entity embedding a [`RelatedRef`] stores only the related id. Loaders
//! attached to a [`CrudService`] fill in the related entity's current name
//! every time the owner is read from its store, so a listing rebuilt after
//! the related entity changed carries the new name.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::core::entity::Entity;
use crate::core::error::CrudResult;
use crate::core::field::RelatedRef;
use crate::core::localized::LocalizedText;
use crate::service::CrudService;

/// Refreshes the references embedded in a batch of `T`
#[async_trait]
pub trait RelationLoader<T: Entity>: Send + Sync {
    /// Type name of the related entity
    fn related_type(&self) -> &'static str;

    async fn load(&self, items: &mut [T]) -> CrudResult<()>;
}

/// Accessor for one optional reference slot of `T`
pub type RefSlot<T> = fn(&mut T) -> &mut Option<RelatedRef>;

/// Resolves one [`RelatedRef`] slot of `T` against the full list of `R`.
///
/// ```rust,ignore
/// fn user_role(user: &mut User) -> &mut Option<RelatedRef> { &mut user.role }
/// fn role_name(role: &Role) -> LocalizedText { role.name.clone() }
///
/// let users = users.include(Include::new(roles.clone(), user_role, role_name));
/// ```
///
/// References to an `R` that no longer exists are cleared.
pub struct Include<T, R: Entity> {
    related: CrudService<R>,
    slot: RefSlot<T>,
    name: fn(&R) -> LocalizedText,
}

impl<T, R: Entity> Include<T, R> {
    pub fn new(related: CrudService<R>, slot: RefSlot<T>, name: fn(&R) -> LocalizedText) -> Self {
        Self {
            related,
            slot,
            name,
        }
    }
}

#[async_trait]
impl<T: Entity, R: Entity> RelationLoader<T> for Include<T, R> {
    fn related_type(&self) -> &'static str {
        R::type_name()
    }

    async fn load(&self, items: &mut [T]) -> CrudResult<()> {
        let related = self.related.all().await?;
        let by_id: HashMap<i64, &R> = related.iter().map(|r| (r.id(), r)).collect();

        for item in items.iter_mut() {
            let slot = (self.slot)(item);
            let Some(id) = slot.as_ref().map(|reference| reference.id) else {
                continue;
            };
            *slot = match by_id.get(&id) {
                Some(entity) => Some(RelatedRef {
                    id,
                    name: (self.name)(entity),
                }),
                None => {
                    debug!(
                        entity = T::type_name(),
                        related = R::type_name(),
                        id,
                        "dangling reference cleared"
                    );
                    None
                }
            };
        }
        Ok(())
    }
}
