//! Model schema for the in-memory service.
//!
//! Kept separate from the client's generated descriptors so the
//! integration tests notice when the two drift apart.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    Uuid,
}

impl FieldKind {
    fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Uuid => "uuid",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Float => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Uuid => value.as_str().is_some_and(|s| Uuid::parse_str(s).is_ok()),
        }
    }
}

/// How the service assigns identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    Uuid,
    AutoIncrement,
}

#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
    /// Rejects `""` for text fields.
    pub non_empty: bool,
    /// Stored when the field is omitted on create. `None` stores `null`.
    pub default: Option<Value>,
}

impl FieldSchema {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            nullable: false,
            non_empty: false,
            default: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    fn check(&self, value: &Value) -> Result<(), ApiError> {
        if value.is_null() {
            if self.nullable {
                return Ok(());
            }
            return Err(ApiError::Invalid(format!(
                "field `{}` may not be null",
                self.name
            )));
        }
        if !self.kind.accepts(value) {
            return Err(ApiError::Invalid(format!(
                "field `{}` must be of type {}",
                self.name,
                self.kind.name()
            )));
        }
        if self.non_empty && value.as_str().is_some_and(str::is_empty) {
            return Err(ApiError::Invalid(format!(
                "field `{}` may not be empty",
                self.name
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ModelSchema {
    pub name: &'static str,
    pub id_field: &'static str,
    pub id_strategy: IdStrategy,
    pub fields: Vec<FieldSchema>,
}

impl ModelSchema {
    fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate a create payload and fill in defaults for omitted fields.
    /// The identifier is added by the store.
    pub fn prepare_create(&self, payload: Value) -> Result<Map<String, Value>, ApiError> {
        let mut object = self.check_payload(payload)?;
        for field in &self.fields {
            if object.contains_key(field.name) {
                continue;
            }
            if field.required {
                return Err(ApiError::Invalid(format!(
                    "missing required field `{}`",
                    field.name
                )));
            }
            object.insert(
                field.name.to_string(),
                field.default.clone().unwrap_or(Value::Null),
            );
        }
        Ok(object)
    }

    /// Validate a partial update. Nothing is required.
    pub fn prepare_update(&self, payload: Value) -> Result<Map<String, Value>, ApiError> {
        self.check_payload(payload)
    }

    /// Check that a path segment is a well-formed identifier for this model
    /// and return it in the form it is stored under.
    pub fn parse_id(&self, raw: &str) -> Result<String, ApiError> {
        match self.id_strategy {
            IdStrategy::Uuid => Uuid::parse_str(raw)
                .map(|id| id.to_string())
                .map_err(|_| ApiError::BadId(raw.to_string())),
            IdStrategy::AutoIncrement => raw
                .parse::<i64>()
                .map(|id| id.to_string())
                .map_err(|_| ApiError::BadId(raw.to_string())),
        }
    }

    fn check_payload(&self, payload: Value) -> Result<Map<String, Value>, ApiError> {
        let Value::Object(object) = payload else {
            return Err(ApiError::Invalid("payload must be a JSON object".to_string()));
        };
        for (name, value) in &object {
            if name == self.id_field {
                return Err(ApiError::Invalid(format!(
                    "field `{name}` is assigned by the service"
                )));
            }
            let field = self
                .field(name)
                .ok_or_else(|| ApiError::Invalid(format!("unknown field `{name}`")))?;
            field.check(value)?;
        }
        Ok(object)
    }
}

/// Every model the service knows about.
#[derive(Debug, Clone)]
pub struct Schema {
    pub models: Vec<ModelSchema>,
}

impl Schema {
    pub fn model(&self, name: &str) -> Option<&ModelSchema> {
        self.models.iter().find(|m| m.name == name)
    }
}

impl Default for Schema {
    /// The `user` and `post` models.
    fn default() -> Self {
        Self {
            models: vec![
                ModelSchema {
                    name: "user",
                    id_field: "id",
                    id_strategy: IdStrategy::Uuid,
                    fields: vec![
                        FieldSchema::new("name", FieldKind::Text).required().non_empty(),
                        FieldSchema::new("email", FieldKind::Text).nullable(),
                    ],
                },
                ModelSchema {
                    name: "post",
                    id_field: "id",
                    id_strategy: IdStrategy::AutoIncrement,
                    fields: vec![
                        FieldSchema::new("title", FieldKind::Text).required().non_empty(),
                        FieldSchema::new("body", FieldKind::Text).nullable(),
                        FieldSchema::new("published", FieldKind::Boolean)
                            .default_value(Value::Bool(false)),
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> ModelSchema {
        Schema::default().model("user").cloned().unwrap()
    }

    fn post() -> ModelSchema {
        Schema::default().model("post").cloned().unwrap()
    }

    #[test]
    fn create_fills_defaults() {
        let object = post().prepare_create(json!({"title": "Hello"})).unwrap();
        assert_eq!(object["body"], Value::Null);
        assert_eq!(object["published"], false);
    }

    #[test]
    fn create_rejects_missing_required_field() {
        let err = user().prepare_create(json!({"email": "a@b.c"})).unwrap_err();
        assert_eq!(err.to_string(), "missing required field `name`");
    }

    #[test]
    fn create_rejects_empty_name() {
        let err = user().prepare_create(json!({"name": ""})).unwrap_err();
        assert_eq!(err.to_string(), "field `name` may not be empty");
    }

    #[test]
    fn payload_rejects_identifier_unknown_fields_and_bad_types() {
        assert!(user().prepare_update(json!({"id": "x"})).is_err());
        assert!(user().prepare_update(json!({"age": 3})).is_err());
        assert!(post().prepare_update(json!({"published": "yes"})).is_err());
        assert!(post().prepare_update(json!({"published": null})).is_err());
        assert!(post().prepare_update(json!({"body": null})).is_ok());
        assert!(post().prepare_update(json!("title")).is_err());
    }

    #[test]
    fn ids_are_parsed_per_strategy() {
        assert_eq!(post().parse_id("42").unwrap(), "42");
        assert!(matches!(post().parse_id("abc"), Err(ApiError::BadId(_))));

        let id = "6F1C2D3E-0000-4000-8000-000000000000";
        assert_eq!(
            user().parse_id(id).unwrap(),
            "6f1c2d3e-0000-4000-8000-000000000000"
        );
        assert!(matches!(user().parse_id("not-a-uuid"), Err(ApiError::BadId(_))));
    }
}
