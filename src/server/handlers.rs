//! Generic HTTP handlers for entity CRUD
//!
//! Every handler is generic over the entity type; routes are assembled per
//! entity by [`CrudDescriptor`](super::entity_registry::CrudDescriptor).

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::config::PaginationConfig;
use crate::core::entity::Entity;
use crate::core::error::{CrudError, CrudResult, RequestError};
use crate::filter::{FilterParams, PaginatedResult};
use crate::server::lang::RequestLang;
use crate::service::CrudService;

/// State shared by the handlers of one entity type
pub struct EntityState<T: Entity> {
    pub service: CrudService<T>,
    pub pagination: PaginationConfig,
}

impl<T: Entity> Clone for EntityState<T> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            pagination: self.pagination.clone(),
        }
    }
}

/// Bound shared by every entity exposed over HTTP
pub trait RestEntity: Entity + Serialize + DeserializeOwned {}

impl<T: Entity + Serialize + DeserializeOwned> RestEntity for T {}

/// List query string; one that does not deserialize is rejected as
/// [`RequestError::InvalidParameter`] instead of a plain-text 400
pub struct ListQuery(pub FilterParams);

impl<S: Send + Sync> FromRequestParts<S> for ListQuery {
    type Rejection = CrudError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<FilterParams>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| RequestError::InvalidParameter {
                parameter: "query".to_string(),
                message: rejection.body_text(),
            })?;
        Ok(Self(params))
    }
}

/// GET /{resource}/{id}
pub async fn get_by_id<T: RestEntity>(
    State(state): State<EntityState<T>>,
    Path(id): Path<i64>,
) -> CrudResult<Json<T>> {
    let entity = state.service.get_by_id(id).await?;
    Ok(Json(entity))
}

/// GET /{resource}/All
pub async fn list<T: RestEntity>(
    State(state): State<EntityState<T>>,
    RequestLang(lang): RequestLang,
    ListQuery(params): ListQuery,
) -> CrudResult<Json<PaginatedResult<T>>> {
    let request = params.into_request(&state.pagination)?;
    let page = state.service.get_list(request, lang).await?;
    Ok(Json(page.into_result()))
}

/// POST /{resource}/Create
pub async fn create<T: RestEntity>(
    State(state): State<EntityState<T>>,
    Json(entity): Json<T>,
) -> CrudResult<(StatusCode, Json<T>)> {
    let created = state.service.create(entity).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /{resource}/Update
pub async fn update<T: RestEntity>(
    State(state): State<EntityState<T>>,
    Json(entity): Json<T>,
) -> CrudResult<Json<T>> {
    let updated = state.service.update(entity).await?;
    Ok(Json(updated))
}

/// DELETE /{resource}/Delete/{id}
pub async fn delete<T: RestEntity>(
    State(state): State<EntityState<T>>,
    Path(id): Path<i64>,
) -> CrudResult<Json<Value>> {
    state.service.delete(id).await?;
    Ok(Json(json!({
        "deleted": true,
        "id": id,
    })))
}
