use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Per-namespace configuration of a blog instance.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub id: i64,
    pub namespace: String,
    pub template_prefix: Option<String>,
    pub paginate_by: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AppConfigForm {
    pub namespace: String,
    pub template_prefix: Option<String>,
    pub paginate_by: Option<i64>,
}

impl AppConfig {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(AppConfig {
            id: row.get("id")?,
            namespace: row.get("namespace")?,
            template_prefix: row.get("template_prefix")?,
            paginate_by: row.get("paginate_by")?,
        })
    }

    /// Configured template directory, ignoring blank values.
    pub fn template_prefix(&self) -> Option<&str> {
        self.template_prefix
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Configured page size; zero or negative means "not set".
    pub fn paginate_by(&self) -> Option<i64> {
        self.paginate_by.filter(|n| *n > 0)
    }
}
