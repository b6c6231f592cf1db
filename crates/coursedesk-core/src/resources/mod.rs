//! Resource clients.
//!
//! Each client is a table of [`Endpoint`](crate::api::Endpoint) constants
//! plus thin wrappers that bind arguments and call the shared
//! [`ApiClient`](crate::api::ApiClient). Typed methods decode into the
//! [`models`](crate::models); the `*_as` variants decode into any
//! caller-supplied type.

pub mod auth;
pub mod category;
pub mod course;

pub use auth::AuthApi;
pub use category::CategoryApi;
pub use course::{CourseApi, CoursePayload};
