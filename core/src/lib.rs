//! Generated client runtime for a remote CRUD data service.
//!
//! # Overview
//! `create_client` validates a base address and returns a `Client` with one
//! accessor per model (`client.user`, `client.post`). Each accessor call
//! issues exactly one request and returns a typed entity or a typed
//! `ClientError`.
//!
//! ```no_run
//! use uniorm_client::{create_client, CreateUser, UpdateUser};
//!
//! # fn main() -> Result<(), uniorm_client::ClientError> {
//! let client = create_client("http://localhost:6499")?;
//! let created = client.user.create(&CreateUser { name: "Alice".into(), email: None })?;
//! let updated = client.user.update(
//!     &created.id,
//!     &UpdateUser { name: Some("Alice Updated".into()), ..Default::default() },
//! )?;
//! assert_eq!(updated.name, "Alice Updated");
//! client.user.delete(&created.id)?;
//! assert!(client.user.find_unique(&created.id)?.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - Accessors are stateless: base address, descriptor and a shared
//!   `Transport`, all read-only after construction.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (consumes an `HttpResponse`), so the wire mapping is testable
//!   without I/O.
//! - Entity types are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod accessor;
pub mod client;
pub mod error;
pub mod http;
pub mod model;
pub mod transport;
pub mod types;

pub use accessor::Accessor;
pub use client::{
    create_client, Client, ClientBuilder, ClientConfig, ServiceHealth, ServiceVersion,
};
pub use error::{ClientError, RemoteError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use model::{deserialize_nullable, FieldDescriptor, FieldType, Model, ModelDescriptor};
pub use transport::{Transport, UreqTransport, DEFAULT_BODY_LIMIT};
pub use types::{CreatePost, CreateUser, Post, UpdatePost, UpdateUser, User, MODELS};
