pub mod app_config;
pub mod category;
pub mod post;
pub mod tag;
pub mod user;

use serde::{Deserialize, Serialize};

/// One language variant of a translatable entity, as needed to build
/// language-switch links.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Translation {
    pub language: String,
    pub slug: String,
}

impl Translation {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Translation {
            language: row.get("language")?,
            slug: row.get("slug")?,
        })
    }
}

/// Identifies the model backing an object list, used to derive template names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentType {
    pub app_label: &'static str,
    pub model_name: &'static str,
}
