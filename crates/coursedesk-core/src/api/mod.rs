//! REST API client module for the course management backend.
//!
//! This module provides the `ApiClient` primitive every resource client is
//! built on, the `Endpoint` descriptors those clients declare, request
//! building and the HTTP transport.
//!
//! The API uses bearer token authentication; the token comes from the
//! shared [`Session`](crate::auth::Session).

pub mod client;
pub mod endpoint;
pub mod error;
pub mod request;
pub mod transport;

pub use client::{ApiClient, CallArgs, ResponseBody};
pub use endpoint::{Endpoint, PayloadKind, ResponseKind};
pub use error::ApiError;
pub use request::{FilePart, MultipartForm, PartValue, Payload, IMPORT_FILE_FIELD};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
