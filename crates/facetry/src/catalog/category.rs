use serde::{Deserialize, Serialize};

use super::path;

/// A node of a client's product taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub client_id: String,
    /// Canonical breadcrumb, segments joined with `" > "`.
    pub category_path: String,
    /// Number of path segments.
    pub level: u32,
    /// Last path segment.
    pub name: String,
    pub is_visible: bool,
}

impl Category {
    /// Builds a category from a raw breadcrumb such as `"Marine>Safety"`.
    ///
    /// Returns `None` when the last segment is empty (no name). Empty
    /// leading or interior segments are dropped, so `"> Boats"` becomes
    /// `"Boats"`.
    pub fn from_breadcrumb(client_id: &str, raw: &str) -> Option<Self> {
        let mut segments = path::split(raw);
        if segments.last().map_or(true, |name| name.is_empty()) {
            return None;
        }
        segments.retain(|s| !s.is_empty());
        let name = segments.last()?.clone();
        Some(Self {
            id: uuid::Uuid::new_v4().to_string(),
            client_id: client_id.to_string(),
            category_path: path::join(&segments),
            level: segments.len() as u32,
            name,
            is_visible: true,
        })
    }

    pub fn segments(&self) -> Vec<&str> {
        path::segments(&self.category_path)
    }

    /// Returns the first segment (the level-1 ancestor).
    pub fn root(&self) -> &str {
        self.category_path
            .split(path::SEPARATOR)
            .next()
            .unwrap_or(&self.category_path)
    }
}
