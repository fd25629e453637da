//! JSON CRUD routes over a [`RecordService`].

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::records::{Record, RecordId, Stateful, Stored};
use crate::relations::RelationError;
use crate::sequence::SequenceService;
use crate::service::{RecordService, ServiceError};
use crate::store::{Repository, RepositoryError, SearchScope};

type SharedService<T, R, S> = Arc<RecordService<T, R, S>>;

/// Query of a list request: `include_archived` plus `<reference field>=<id>` filters,
/// e.g. `?department_id=3` on students.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub include_archived: bool,
    pub references: Vec<(&'static str, RecordId)>,
}

impl ListParams {
    pub fn parse<T: Record>(pairs: &[(String, String)]) -> Result<Self, String> {
        let mut params = Self::default();
        for (key, value) in pairs {
            if key == "include_archived" {
                params.include_archived = value
                    .parse()
                    .map_err(|_| format!("include_archived must be true or false, got '{value}'"))?;
                continue;
            }

            let relation = T::RELATIONS
                .iter()
                .find(|relation| relation.field == key.as_str())
                .ok_or_else(|| format!("unknown filter '{key}' for {}", T::MODEL))?;
            let id = value
                .parse::<u64>()
                .map_err(|_| format!("{key} must be a record id, got '{value}'"))?;
            params.references.push((relation.field, RecordId(id)));
        }
        Ok(params)
    }

    pub fn scope(&self) -> SearchScope {
        if self.include_archived {
            SearchScope::IncludeArchived
        } else {
            SearchScope::ActiveOnly
        }
    }

    pub fn admits<T: Record>(&self, record: &T) -> bool {
        self.references
            .iter()
            .all(|(field, id)| record.reference(field) == Some(*id))
    }
}

/// CRUD and archive endpoints for a record collection mounted at `path`.
pub fn record_router<T, R, S>(path: &str, service: SharedService<T, R, S>) -> Router
where
    T: Record,
    R: Repository<T> + 'static,
    S: SequenceService + 'static,
{
    crud_routes::<T, R, S>(path).with_state(service)
}

/// [`record_router`] plus `POST {path}/:id/actions/:action` for status helpers.
pub fn stateful_record_router<T, R, S>(path: &str, service: SharedService<T, R, S>) -> Router
where
    T: Stateful,
    R: Repository<T> + 'static,
    S: SequenceService + 'static,
{
    crud_routes::<T, R, S>(path)
        .route(
            &format!("{path}/:id/actions/:action"),
            post(action_handler::<T, R, S>),
        )
        .with_state(service)
}

fn crud_routes<T, R, S>(path: &str) -> Router<SharedService<T, R, S>>
where
    T: Record,
    R: Repository<T> + 'static,
    S: SequenceService + 'static,
{
    Router::new()
        .route(path, get(list_handler::<T, R, S>).post(create_handler::<T, R, S>))
        .route(
            &format!("{path}/:id"),
            get(get_handler::<T, R, S>)
                .put(update_handler::<T, R, S>)
                .delete(delete_handler::<T, R, S>),
        )
        .route(&format!("{path}/:id/archive"), post(archive_handler::<T, R, S>))
        .route(&format!("{path}/:id/restore"), post(restore_handler::<T, R, S>))
}

pub(crate) async fn list_handler<T, R, S>(
    State(service): State<SharedService<T, R, S>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response
where
    T: Record,
    R: Repository<T> + 'static,
    S: SequenceService + 'static,
{
    let params = match ListParams::parse::<T>(&pairs) {
        Ok(params) => params,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
    };
    match service.search(params.scope(), &|record| params.admits(record)) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn create_handler<T, R, S>(
    State(service): State<SharedService<T, R, S>>,
    Json(record): Json<T>,
) -> Response
where
    T: Record,
    R: Repository<T> + 'static,
    S: SequenceService + 'static,
{
    match service.create(record) {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn get_handler<T, R, S>(
    State(service): State<SharedService<T, R, S>>,
    Path(id): Path<u64>,
) -> Response
where
    T: Record,
    R: Repository<T> + 'static,
    S: SequenceService + 'static,
{
    respond(service.get(RecordId(id)))
}

pub(crate) async fn update_handler<T, R, S>(
    State(service): State<SharedService<T, R, S>>,
    Path(id): Path<u64>,
    Json(record): Json<T>,
) -> Response
where
    T: Record,
    R: Repository<T> + 'static,
    S: SequenceService + 'static,
{
    respond(service.update(RecordId(id), record))
}

pub(crate) async fn delete_handler<T, R, S>(
    State(service): State<SharedService<T, R, S>>,
    Path(id): Path<u64>,
) -> Response
where
    T: Record,
    R: Repository<T> + 'static,
    S: SequenceService + 'static,
{
    match service.delete(RecordId(id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn archive_handler<T, R, S>(
    State(service): State<SharedService<T, R, S>>,
    Path(id): Path<u64>,
) -> Response
where
    T: Record,
    R: Repository<T> + 'static,
    S: SequenceService + 'static,
{
    respond(service.archive(RecordId(id)))
}

pub(crate) async fn restore_handler<T, R, S>(
    State(service): State<SharedService<T, R, S>>,
    Path(id): Path<u64>,
) -> Response
where
    T: Record,
    R: Repository<T> + 'static,
    S: SequenceService + 'static,
{
    respond(service.restore(RecordId(id)))
}

pub(crate) async fn action_handler<T, R, S>(
    State(service): State<SharedService<T, R, S>>,
    Path((id, action)): Path<(u64, String)>,
) -> Response
where
    T: Stateful,
    R: Repository<T> + 'static,
    S: SequenceService + 'static,
{
    let raw = serde_json::Value::String(action.clone());
    let parsed = match serde_json::from_value::<T::Action>(raw) {
        Ok(parsed) => parsed,
        Err(_) => {
            let payload = json!({
                "error": format!("unknown action '{action}' for {}", T::MODEL),
            });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    respond(service.transition(RecordId(id), parsed))
}

fn respond<T: Record>(result: Result<Stored<T>, ServiceError>) -> Response {
    match result {
        Ok(stored) => (StatusCode::OK, Json(stored)).into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            err if err.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Repository(RepositoryError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ServiceError::Repository(RepositoryError::NotArchivable { .. }) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Relation(RelationError::InUse { .. }) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = json!({ "error": self.to_string() });
        (status, Json(payload)).into_response()
    }
}
