//! Data models for the course management API.
//!
//! - `Credentials`, `Registration`, `AuthResponse`: login/register payloads
//! - `Category`, `CategoryInput`: category records
//! - `Course`, `CourseInput`: course records
//! - `Paginated<T>`: one page of a list endpoint
//!
//! Records keep unknown fields in a flattened `extra` map so nothing the
//! server sends is lost.

pub mod auth;
pub mod category;
pub mod course;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use auth::{AuthResponse, Credentials, Registration};
pub use category::{Category, CategoryInput};
pub use course::{Course, CourseInput};

/// Record identifier; the server may use numbers or strings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(id) => write!(f, "{}", id),
            ResourceId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Int(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        id.parse().map(ResourceId::Int).unwrap_or_else(|_| ResourceId::Text(id.to_string()))
    }
}

/// One page of a paginated list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub last_page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl<T> Paginated<T> {
    /// Whether another page follows this one
    pub fn has_next(&self) -> bool {
        match (self.current_page, self.last_page) {
            (Some(current), Some(last)) => current < last,
            _ => false,
        }
    }
}

/// Generic `{ "message": ... }` acknowledgement (delete, logout, import)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
