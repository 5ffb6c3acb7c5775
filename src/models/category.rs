use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// A category resolved in one language.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Category {
    pub id: i64,
    pub namespace: String,
    pub parent_id: Option<i64>,
    pub language: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub namespace: String,
    pub parent_id: Option<i64>,
    pub translations: Vec<CategoryTranslationForm>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryTranslationForm {
    pub language: String,
    pub name: String,
    /// Generated from `name` when empty.
    pub slug: String,
}

impl Category {
    pub const SELECT_COLS: &'static str =
        "c.id, c.namespace, c.parent_id, ct.language, ct.name, ct.slug";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Category {
            id: row.get("id")?,
            namespace: row.get("namespace")?,
            parent_id: row.get("parent_id")?,
            language: row.get("language")?,
            name: row.get("name")?,
            slug: row.get("slug")?,
        })
    }
}
