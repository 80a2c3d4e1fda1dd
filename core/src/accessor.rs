//! Per-model CRUD accessor.
//!
//! # Design
//! `Accessor<M>` holds only the base address and a shared transport; it
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. The plain operations (`create`,
//! `find_many`, ...) run exactly one build → execute → parse cycle: no
//! retries, no batching, no caching.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ClientError, RemoteError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::model::{Model, ModelDescriptor};
use crate::transport::Transport;

/// CRUD operations for one model.
pub struct Accessor<M: Model> {
    base_url: Arc<str>,
    transport: Arc<dyn Transport>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Clone for Accessor<M> {
    fn clone(&self) -> Self {
        Self {
            base_url: Arc::clone(&self.base_url),
            transport: Arc::clone(&self.transport),
            _model: PhantomData,
        }
    }
}

impl<M: Model> fmt::Debug for Accessor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("model", &M::DESCRIPTOR.name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl<M: Model> Accessor<M> {
    pub(crate) fn new(base_url: Arc<str>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url,
            transport,
            _model: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &'static ModelDescriptor {
        M::DESCRIPTOR
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Create an entity. The returned instance carries the identifier the
    /// service assigned.
    pub fn create(&self, data: &M::Create) -> Result<M, ClientError> {
        let request = self.build_create(data)?;
        self.parse_create(self.send(&request)?)
    }

    /// Fetch a fresh snapshot of every entity of this model.
    pub fn find_many(&self) -> Result<Vec<M>, ClientError> {
        let request = self.build_find_many();
        self.parse_find_many(self.send(&request)?)
    }

    /// Look an entity up by identifier. Absence is `Ok(None)`, not an error.
    pub fn find_unique(&self, id: &M::Id) -> Result<Option<M>, ClientError> {
        let request = self.build_find_unique(id);
        self.parse_find_unique(self.send(&request)?, id)
    }

    /// Merge `data` into the stored entity and return the result.
    pub fn update(&self, id: &M::Id, data: &M::Update) -> Result<M, ClientError> {
        let request = self.build_update(id, data)?;
        self.parse_update(self.send(&request)?, id)
    }

    pub fn delete(&self, id: &M::Id) -> Result<(), ClientError> {
        let request = self.build_delete(id);
        self.parse_delete(self.send(&request)?, id)
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_create(&self, data: &M::Create) -> Result<HttpRequest, ClientError> {
        let body = self.encode(data, |d, v| d.check_create(v))?;
        Ok(HttpRequest::new(HttpMethod::Post, self.collection_url()).with_json_body(body))
    }

    pub fn build_find_many(&self) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.collection_url())
    }

    pub fn build_find_unique(&self, id: &M::Id) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.entity_url(id))
    }

    pub fn build_update(&self, id: &M::Id, data: &M::Update) -> Result<HttpRequest, ClientError> {
        let body = self.encode(data, |d, v| d.check_update(v))?;
        Ok(HttpRequest::new(HttpMethod::Patch, self.entity_url(id)).with_json_body(body))
    }

    pub fn build_delete(&self, id: &M::Id) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, self.entity_url(id))
    }

    // -----------------------------------------------------------------------
    // Response parsers
    // -----------------------------------------------------------------------

    pub fn parse_create(&self, response: HttpResponse) -> Result<M, ClientError> {
        self.check_status(&response, 201, None)?;
        self.decode_entity(&response.body)
    }

    pub fn parse_find_many(&self, response: HttpResponse) -> Result<Vec<M>, ClientError> {
        if response.status != 200 {
            return Err(self.remote(RemoteError::Status {
                status: response.status,
                body: response.body,
            }));
        }
        let value: Value = serde_json::from_str(&response.body)
            .map_err(|e| self.remote(RemoteError::Decode(e.to_string())))?;
        let Value::Array(items) = value else {
            return Err(self.remote(RemoteError::Decode(format!(
                "expected a JSON array of {} entities",
                M::DESCRIPTOR.name
            ))));
        };
        items.into_iter().map(|item| self.decode_value(item)).collect()
    }

    pub fn parse_find_unique(
        &self,
        response: HttpResponse,
        id: &M::Id,
    ) -> Result<Option<M>, ClientError> {
        match self.check_status(&response, 200, Some(id)) {
            Ok(()) => self.decode_addressed(&response.body, id).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn parse_update(&self, response: HttpResponse, id: &M::Id) -> Result<M, ClientError> {
        self.check_status(&response, 200, Some(id))?;
        self.decode_addressed(&response.body, id)
    }

    pub fn parse_delete(&self, response: HttpResponse, id: &M::Id) -> Result<(), ClientError> {
        self.check_status(&response, 204, Some(id))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, M::DESCRIPTOR.name)
    }

    fn entity_url(&self, id: &M::Id) -> String {
        let id = id.to_string();
        format!(
            "{}/{}/{}",
            self.base_url,
            M::DESCRIPTOR.name,
            urlencoding::encode(&id)
        )
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError> {
        let model = M::DESCRIPTOR.name;
        tracing::debug!(model, method = request.method.as_str(), url = %request.url, "sending request");
        match self.transport.execute(request) {
            Ok(response) => {
                tracing::debug!(model, status = response.status, "received response");
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(model, url = %request.url, error = %e, "request failed");
                Err(self.remote(RemoteError::Transport(e)))
            }
        }
    }

    fn encode<T: Serialize>(
        &self,
        data: &T,
        check: impl FnOnce(&ModelDescriptor, &Value) -> Result<(), String>,
    ) -> Result<String, ClientError> {
        let value = serde_json::to_value(data).map_err(|e| self.invalid(e.to_string()))?;
        check(M::DESCRIPTOR, &value).map_err(|message| self.invalid(message))?;
        serde_json::to_string(&value).map_err(|e| self.invalid(e.to_string()))
    }

    fn decode_entity(&self, body: &str) -> Result<M, ClientError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| self.remote(RemoteError::Decode(e.to_string())))?;
        self.decode_value(value)
    }

    /// Decode an entity that must carry the identifier the request addressed.
    fn decode_addressed(&self, body: &str, id: &M::Id) -> Result<M, ClientError> {
        let entity = self.decode_entity(body)?;
        if entity.id() != id {
            return Err(self.remote(RemoteError::Decode(format!(
                "requested {} {id}, service returned {}",
                M::DESCRIPTOR.name,
                entity.id()
            ))));
        }
        Ok(entity)
    }

    fn decode_value(&self, value: Value) -> Result<M, ClientError> {
        M::DESCRIPTOR
            .check_entity(&value)
            .map_err(|message| self.remote(RemoteError::Decode(message)))?;
        serde_json::from_value(value).map_err(|e| self.remote(RemoteError::Decode(e.to_string())))
    }

    /// Map a status code to the outcome taxonomy. A 404 only means "not
    /// found" when an identifier was addressed and the service answered
    /// with its `{"error": ...}` body. A bare 404 (wrong path prefix, a
    /// proxy) or one on a collection path is a service failure.
    fn check_status(
        &self,
        response: &HttpResponse,
        expected: u16,
        id: Option<&M::Id>,
    ) -> Result<(), ClientError> {
        match (response.status, id) {
            (status, _) if status == expected => Ok(()),
            (404, Some(id)) if error_envelope(&response.body).is_some() => {
                Err(ClientError::NotFound {
                    model: M::DESCRIPTOR.name,
                    id: id.to_string(),
                })
            }
            (400 | 422, _) => Err(self.invalid(error_message(&response.body))),
            (status, _) => Err(self.remote(RemoteError::Status {
                status,
                body: response.body.clone(),
            })),
        }
    }

    fn invalid(&self, message: String) -> ClientError {
        ClientError::Validation {
            model: M::DESCRIPTOR.name,
            message,
        }
    }

    fn remote(&self, source: RemoteError) -> ClientError {
        ClientError::Remote {
            model: M::DESCRIPTOR.name,
            source,
        }
    }
}

/// The message of an `{"error": "..."}` body, if `body` is one.
fn error_envelope(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
}

/// Pull the message out of an `{"error": "..."}` body, falling back to the
/// raw text.
fn error_message(body: &str) -> String {
    error_envelope(body).unwrap_or_else(|| body.to_string())
}
