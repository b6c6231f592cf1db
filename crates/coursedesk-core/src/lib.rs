//! coursedesk core library.
//!
//! Typed client for a course management backend: authentication, category
//! CRUD and course CRUD with spreadsheet import/export, all going through one
//! shared [`ApiClient`](api::ApiClient). Also provides the route guard a
//! navigation layer consults before each route change.

pub mod api;
pub mod auth;
pub mod config;
pub mod guard;
pub mod models;
pub mod resources;

pub use api::{ApiClient, ApiError};
pub use auth::Session;
pub use config::Config;
pub use guard::{Navigation, RouteGuard};
pub use resources::{AuthApi, CategoryApi, CourseApi};
