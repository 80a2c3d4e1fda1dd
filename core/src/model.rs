//! Model descriptors and the `Model` trait implemented by generated types.
//!
//! # Design
//! A `ModelDescriptor` is static data emitted alongside each generated
//! entity type. Accessors use it twice: to name the remote collection, and
//! to check payloads on both sides of the wire. Outgoing create/update
//! payloads are checked before a request is built; incoming entities are
//! checked before they are handed to serde for the typed conversion.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Primitive type of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Uuid,
}

impl FieldType {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Uuid => value
                .as_str()
                .is_some_and(|s| uuid::Uuid::parse_str(s).is_ok()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Uuid => "uuid",
        };
        f.write_str(name)
    }
}

/// A non-identifier field of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub ty: FieldType,
    /// Must be supplied on create.
    pub required: bool,
    /// Accepts `null`.
    pub nullable: bool,
}

/// Static description of one model, produced by the code generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Unique within a client; also the collection path segment.
    pub name: &'static str,
    pub id_field: &'static str,
    pub id_type: FieldType,
    pub fields: &'static [FieldDescriptor],
}

impl ModelDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check a create payload: no identifier, no undeclared fields, every
    /// required field present, every value of the declared type.
    pub fn check_create(&self, payload: &Value) -> Result<(), String> {
        let object = self.check_input(payload)?;
        for field in self.fields.iter().filter(|f| f.required) {
            if !object.contains_key(field.name) {
                return Err(format!("missing required field `{}`", field.name));
            }
        }
        Ok(())
    }

    /// Check an update payload. Same as create, except nothing is required.
    pub fn check_update(&self, payload: &Value) -> Result<(), String> {
        self.check_input(payload).map(|_| ())
    }

    /// Check that an entity returned by the service conforms to this model.
    /// Fields the model does not declare are tolerated.
    pub fn check_entity(&self, value: &Value) -> Result<(), String> {
        let object = value
            .as_object()
            .ok_or_else(|| format!("{} entity is not a JSON object", self.name))?;

        match object.get(self.id_field) {
            Some(id) if self.id_type.accepts(id) => {}
            Some(_) => {
                return Err(format!(
                    "identifier `{}` must be of type {}",
                    self.id_field, self.id_type
                ))
            }
            None => return Err(format!("identifier `{}` is missing", self.id_field)),
        }

        for field in self.fields {
            match object.get(field.name) {
                None if field.required => {
                    return Err(format!("missing required field `{}`", field.name))
                }
                None => {}
                Some(value) => check_value(field, value)?,
            }
        }
        Ok(())
    }

    fn check_input<'a>(&self, payload: &'a Value) -> Result<&'a Map<String, Value>, String> {
        let object = payload
            .as_object()
            .ok_or_else(|| "payload is not a JSON object".to_string())?;

        for (name, value) in object {
            if name == self.id_field {
                return Err(format!("identifier `{name}` is assigned by the service"));
            }
            let field = self
                .field(name)
                .ok_or_else(|| format!("unknown field `{name}`"))?;
            check_value(field, value)?;
        }
        Ok(object)
    }
}

fn check_value(field: &FieldDescriptor, value: &Value) -> Result<(), String> {
    if value.is_null() {
        if field.nullable {
            return Ok(());
        }
        return Err(format!("field `{}` may not be null", field.name));
    }
    if !field.ty.accepts(value) {
        return Err(format!("field `{}` must be of type {}", field.name, field.ty));
    }
    Ok(())
}

/// Deserializer for nullable members of update inputs.
///
/// With `#[serde(default)]` an absent field stays `None` (leave unchanged),
/// an explicit `null` becomes `Some(None)` (clear) and a value becomes
/// `Some(Some(v))`.
pub fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Implemented by every generated entity type.
///
/// `Create` carries the fields required on create as non-optional members;
/// `Update` carries every field as optional and omits the ones left unset.
pub trait Model: DeserializeOwned + Send + Sync + 'static {
    type Id: fmt::Display + fmt::Debug + Clone + PartialEq + Send + Sync;
    type Create: Serialize;
    type Update: Serialize;

    const DESCRIPTOR: &'static ModelDescriptor;

    fn id(&self) -> &Self::Id;
}
