use serde::{Deserialize, Serialize};

use super::ResourceId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: ResourceId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<ResourceId>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Course {
    /// Title for display, falling back to a `name` field or the id
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .or_else(|| {
                self.extra
                    .get("name")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("Course {}", self.id))
    }
}

/// JSON body for creating or updating a course.
/// Fields the server accepts beyond these go in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseInput {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<ResourceId>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
