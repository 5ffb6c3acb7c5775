use serde::Serialize;
use serde_json::{json, Value};

use crate::config::BlogSettings;
use crate::models::app_config::AppConfig;
use crate::models::post::{Post, PostQuery};
use crate::store::Store;

use super::ViewError;

/// Page size: the namespace's `paginate_by` when set, else the global default.
pub fn resolve_per_page(config: Option<&AppConfig>, settings: &BlogSettings) -> i64 {
    config
        .and_then(AppConfig::paginate_by)
        .unwrap_or(settings.pagination)
        .max(1)
}

/// One page of a list of `count` objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub number: i64,
    pub num_pages: i64,
    pub per_page: i64,
    pub count: i64,
}

impl Page {
    /// Resolve the raw `page` parameter: absent means the first page, `last`
    /// the last one. The first page always exists, even for an empty list.
    pub fn new(count: i64, per_page: i64, raw: Option<&str>) -> Result<Self, ViewError> {
        let per_page = per_page.max(1);
        let num_pages = if count <= 0 {
            1
        } else {
            count / per_page + i64::from(count % per_page != 0)
        };

        let number = match raw.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(s) => s.parse::<i64>().map_err(|_| {
                ViewError::NotFound("Page is not 'last', nor can it be converted to an int.".to_string())
            })?,
        };

        if number < 1 || number > num_pages {
            return Err(ViewError::NotFound(format!(
                "Invalid page ({}): That page contains no results",
                number
            )));
        }

        Ok(Page {
            number,
            num_pages,
            per_page,
            count: count.max(0),
        })
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.per_page)
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// 1-based index of the first object on this page (0 for an empty list).
    pub fn start_index(&self) -> i64 {
        if self.count == 0 {
            0
        } else {
            self.offset() + 1
        }
    }

    pub fn end_index(&self) -> i64 {
        if self.number == self.num_pages {
            self.count
        } else {
            self.number.saturating_mul(self.per_page)
        }
    }

    pub fn paginator_context(&self) -> Value {
        json!({
            "count": self.count,
            "num_pages": self.num_pages,
            "per_page": self.per_page,
        })
    }

    pub fn page_context(&self) -> Value {
        json!({
            "number": self.number,
            "has_next": self.has_next(),
            "has_previous": self.has_previous(),
            "has_other_pages": self.has_next() || self.has_previous(),
            "next_page_number": if self.has_next() { Some(self.number + 1) } else { None },
            "previous_page_number": if self.has_previous() { Some(self.number - 1) } else { None },
            "start_index": self.start_index(),
            "end_index": self.end_index(),
        })
    }
}

/// Evaluate one page of `query`.
pub fn paginate(
    store: &dyn Store,
    query: &PostQuery,
    per_page: i64,
    raw_page: Option<&str>,
) -> Result<(Page, Vec<Post>), ViewError> {
    let count = store.post_count(query)?;
    let page = Page::new(count, per_page, raw_page)?;
    let posts = store.post_list(query, page.per_page, page.offset())?;
    Ok((page, posts))
}
