//! In-memory implementation of the remote data service.
//!
//! Serves every model in a `Schema` under `/{model}` and `/{model}/{id}`,
//! plus `/health` and `/version`. Errors are `{"error": "..."}` bodies:
//! 404 for an unknown model or identifier, 400 for a malformed identifier,
//! 422 for a payload that does not fit the model.

pub mod schema;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub use schema::{FieldKind, FieldSchema, IdStrategy, ModelSchema, Schema};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Rows of one model, in creation order.
#[derive(Debug, Default)]
pub struct Table {
    next_id: i64,
    rows: Vec<Map<String, Value>>,
}

impl Table {
    fn position(&self, id_field: &str, id: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.get(id_field).map(id_key).as_deref() == Some(id))
    }
}

pub type Db = Arc<RwLock<HashMap<&'static str, Table>>>;

#[derive(Clone)]
pub struct AppState {
    schema: Arc<Schema>,
    db: Db,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown model `{0}`")]
    UnknownModel(String),

    #[error("{model} {id} not found")]
    NotFound { model: &'static str, id: String },

    #[error("malformed identifier `{0}`")]
    BadId(String),

    #[error("{0}")]
    Invalid(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::UnknownModel(_) | ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadId(_) => StatusCode::BAD_REQUEST,
            ApiError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn app() -> Router {
    app_with_schema(Schema::default())
}

pub fn app_with_schema(schema: Schema) -> Router {
    let tables = schema
        .models
        .iter()
        .map(|m| (m.name, Table::default()))
        .collect();
    let state = AppState {
        schema: Arc::new(schema),
        db: Arc::new(RwLock::new(tables)),
    };
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/{model}", get(list_entities).post(create_entity))
        .route(
            "/{model}/{id}",
            get(get_entity).patch(update_entity).delete(delete_entity),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Identifiers are compared in their path form.
fn id_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn lookup_model<'a>(state: &'a AppState, name: &str) -> Result<&'a ModelSchema, ApiError> {
    state
        .schema
        .model(name)
        .ok_or_else(|| ApiError::UnknownModel(name.to_string()))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn version() -> Json<Value> {
    Json(json!({ "version": VERSION }))
}

async fn list_entities(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let model = lookup_model(&state, &name)?;
    let db = state.db.read().await;
    let rows: Vec<Value> = db
        .get(model.name)
        .map(|t| t.rows.iter().cloned().map(Value::Object).collect())
        .unwrap_or_default();
    Ok(Json(rows))
}

async fn create_entity(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let model = lookup_model(&state, &name)?;
    let mut row = model.prepare_create(payload)?;

    let mut db = state.db.write().await;
    let table = db.entry(model.name).or_default();
    let id = match model.id_strategy {
        IdStrategy::Uuid => Value::String(Uuid::new_v4().to_string()),
        IdStrategy::AutoIncrement => {
            table.next_id += 1;
            Value::from(table.next_id)
        }
    };
    tracing::info!(model = model.name, id = %id_key(&id), "created");
    row.insert(model.id_field.to_string(), id);
    table.rows.push(row.clone());
    Ok((StatusCode::CREATED, Json(Value::Object(row))))
}

async fn get_entity(
    State(state): State<AppState>,
    Path((name, raw_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let model = lookup_model(&state, &name)?;
    let id = model.parse_id(&raw_id)?;
    let db = state.db.read().await;
    db.get(model.name)
        .and_then(|t| t.position(model.id_field, &id).map(|i| t.rows[i].clone()))
        .map(|row| Json(Value::Object(row)))
        .ok_or(ApiError::NotFound {
            model: model.name,
            id,
        })
}

async fn update_entity(
    State(state): State<AppState>,
    Path((name, raw_id)): Path<(String, String)>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let model = lookup_model(&state, &name)?;
    let id = model.parse_id(&raw_id)?;

    let mut db = state.db.write().await;
    let table = db.entry(model.name).or_default();
    let index = table
        .position(model.id_field, &id)
        .ok_or_else(|| ApiError::NotFound {
            model: model.name,
            id: id.clone(),
        })?;
    let changes = model.prepare_update(payload)?;
    let row = &mut table.rows[index];
    row.extend(changes);
    tracing::info!(model = model.name, id = %id, "updated");
    Ok(Json(Value::Object(row.clone())))
}

async fn delete_entity(
    State(state): State<AppState>,
    Path((name, raw_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let model = lookup_model(&state, &name)?;
    let id = model.parse_id(&raw_id)?;

    let mut db = state.db.write().await;
    let table = db.entry(model.name).or_default();
    let index = table
        .position(model.id_field, &id)
        .ok_or_else(|| ApiError::NotFound {
            model: model.name,
            id: id.clone(),
        })?;
    table.rows.remove(index);
    tracing::info!(model = model.name, id = %id, "deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_key_matches_path_form() {
        assert_eq!(id_key(&json!(7)), "7");
        assert_eq!(id_key(&json!("abc")), "abc");
    }

    #[test]
    fn table_finds_rows_by_identifier() {
        let mut table = Table::default();
        for id in [1, 2, 3] {
            let mut row = Map::new();
            row.insert("id".to_string(), json!(id));
            table.rows.push(row);
        }
        assert_eq!(table.position("id", "2"), Some(1));
        assert_eq!(table.position("id", "9"), None);
    }

    #[test]
    fn api_errors_map_to_statuses() {
        let cases = [
            (ApiError::UnknownModel("x".into()), StatusCode::NOT_FOUND),
            (
                ApiError::NotFound {
                    model: "user",
                    id: "1".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (ApiError::BadId("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::Invalid("bad".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn default_schema_has_user_and_post() {
        let schema = Schema::default();
        assert!(schema.model("user").is_some());
        assert!(schema.model("post").is_some());
        assert!(schema.model("comment").is_none());
    }
}
