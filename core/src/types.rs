//! Generated model types.
//!
//! One entity struct, one create input and one update input per model, plus
//! the static descriptor the accessors check payloads against. Required
//! fields are plain members of the create input; every member of an update
//! input is optional and left out of the JSON when unset, so the service
//! only touches the fields the caller supplied. Nullable members of an
//! update input are `Option<Option<T>>`: `Some(None)` sends an explicit
//! `null` and clears the stored value.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{deserialize_nullable, FieldDescriptor, FieldType, Model, ModelDescriptor};

/// Every model known to this client, in declaration order.
pub const MODELS: &[&ModelDescriptor] = &[&USER_DESCRIPTOR, &POST_DESCRIPTOR];

// ---------------------------------------------------------------------------
// user
// ---------------------------------------------------------------------------

pub const USER_DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "user",
    id_field: "id",
    id_type: FieldType::Uuid,
    fields: &[
        FieldDescriptor {
            name: "name",
            ty: FieldType::String,
            required: true,
            nullable: false,
        },
        FieldDescriptor {
            name: "email",
            ty: FieldType::String,
            required: false,
            nullable: true,
        },
    ],
};

/// A `user` entity as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Create input for `user`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateUser {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Partial update for `user`. Omitted fields stay unchanged on the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_nullable"
    )]
    pub email: Option<Option<String>>,
}

impl Model for User {
    type Id = Uuid;
    type Create = CreateUser;
    type Update = UpdateUser;

    const DESCRIPTOR: &'static ModelDescriptor = &USER_DESCRIPTOR;

    fn id(&self) -> &Uuid {
        &self.id
    }
}

// ---------------------------------------------------------------------------
// post
// ---------------------------------------------------------------------------

pub const POST_DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "post",
    id_field: "id",
    id_type: FieldType::Integer,
    fields: &[
        FieldDescriptor {
            name: "title",
            ty: FieldType::String,
            required: true,
            nullable: false,
        },
        FieldDescriptor {
            name: "body",
            ty: FieldType::String,
            required: false,
            nullable: true,
        },
        FieldDescriptor {
            name: "published",
            ty: FieldType::Boolean,
            required: false,
            nullable: false,
        },
    ],
};

/// A `post` entity as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// Create input for `post`. `published` defaults to `false` on the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatePost {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// Partial update for `post`. Omitted fields stay unchanged on the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdatePost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_nullable"
    )]
    pub body: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

impl Model for Post {
    type Id = i64;
    type Create = CreatePost;
    type Update = UpdatePost;

    const DESCRIPTOR: &'static ModelDescriptor = &POST_DESCRIPTOR;

    fn id(&self) -> &i64 {
        &self.id
    }
}
