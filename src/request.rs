use std::collections::{BTreeMap, HashMap};

use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;
use serde_json::Value;

use crate::config::BlogSettings;
use crate::toolbar::Toolbar;

/// Header value browsers' XHR libraries send to mark AJAX requests.
const AJAX_HEADER: &str = "X-Requested-With";
const AJAX_MARKER: &str = "XMLHttpRequest";

/// The parts of an HTTP request the blog views read, plus a per-request
/// attribute stash later exposed to templates as `request`.
#[derive(Debug, Clone)]
pub struct BlogRequest {
    pub language: String,
    pub is_ajax: bool,
    pub query: HashMap<String, String>,
    pub toolbar: Option<Toolbar>,
    pub stash: BTreeMap<String, Value>,
}

impl BlogRequest {
    pub fn new(language: &str) -> Self {
        BlogRequest {
            language: language.to_string(),
            is_ajax: false,
            query: HashMap::new(),
            toolbar: None,
            stash: BTreeMap::new(),
        }
    }

    /// Edit/preview mode. A request without a toolbar is not in edit mode.
    pub fn edit_mode(&self) -> bool {
        self.toolbar.as_ref().map_or(false, |t| t.edit_mode)
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn set_attr(&mut self, key: &str, value: Value) {
        self.stash.insert(key.to_string(), value);
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.stash.get(key)
    }
}

/// Pick the request language: an explicit `language` parameter, then the
/// highest weighted supported `Accept-Language` entry (a regional tag also
/// matches its primary language), then the default.
pub fn negotiate_language(
    explicit: Option<&str>,
    accept_language: Option<&str>,
    settings: &BlogSettings,
) -> String {
    if let Some(lang) = explicit.map(|l| l.trim().to_lowercase()) {
        if settings.supports_language(&lang) {
            return lang;
        }
    }

    if let Some(header) = accept_language {
        let mut ranked: Vec<(String, f32)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';');
                let tag = pieces.next()?.trim().to_lowercase();
                if tag.is_empty() {
                    return None;
                }
                let q = pieces
                    .find_map(|p| p.trim().strip_prefix("q=").map(str::to_string))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((tag, q))
            })
            .collect();
        // Stable sort keeps header order among equal weights
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        for (tag, q) in ranked {
            if q <= 0.0 {
                continue;
            }
            if settings.supports_language(&tag) {
                return tag;
            }
            if let Some(primary) = tag.split('-').next() {
                if settings.supports_language(primary) {
                    return primary.to_string();
                }
            }
        }
    }

    settings.default_language.clone()
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for BlogRequest {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let settings = match request.guard::<&State<BlogSettings>>().await {
            Outcome::Success(s) => s,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        let query: HashMap<String, String> = request
            .uri()
            .query()
            .map(|q| {
                q.segments()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        let headers = request.headers();
        let language = negotiate_language(
            query.get("language").map(String::as_str),
            headers.get_one("Accept-Language"),
            settings,
        );

        let toolbar = if settings.toolbar_enabled {
            let edit_mode = settings.allow_edit_mode && query.contains_key("edit");
            Some(Toolbar::new(edit_mode))
        } else {
            None
        };

        Outcome::Success(BlogRequest {
            language,
            is_ajax: headers.get_one(AJAX_HEADER) == Some(AJAX_MARKER),
            query,
            toolbar,
            stash: BTreeMap::new(),
        })
    }
}
