//! Blog views: one handler function per route, composed from the shared
//! helpers in this module (`query`, `ajax`, `paginate`).

use chrono::{NaiveDateTime, Utc};
use rocket_dyn_templates::Template;
use serde_json::{json, Map, Value};

use crate::config::BlogSettings;
use crate::models::app_config::AppConfig;
use crate::models::post::Post;
use crate::request::BlogRequest;
use crate::store::Store;
use crate::urls;

pub mod ajax;
pub mod archive;
pub mod author;
pub mod category;
pub mod detail;
pub mod error;
pub mod list;
pub mod paginate;
pub mod query;
pub mod tagged;

pub use error::ViewError;

/// Everything a view needs besides the request itself.
pub struct ViewEnv<'a> {
    pub store: &'a dyn Store,
    pub settings: &'a BlogSettings,
    /// Reference instant for publish-state checks.
    pub now: NaiveDateTime,
}

impl<'a> ViewEnv<'a> {
    pub fn new(store: &'a dyn Store, settings: &'a BlogSettings) -> Self {
        ViewEnv {
            store,
            settings,
            now: Utc::now().naive_utc(),
        }
    }

    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }
}

/// Static description of a view.
#[derive(Debug, Clone, Copy)]
pub struct ViewSpec {
    pub name: &'static str,
    /// Route name used to build the canonical URL of the page.
    pub view_url_name: Option<&'static str>,
    pub base_template_name: &'static str,
}

/// A template name plus the context to render it with.
#[derive(Debug, Clone)]
pub struct TemplateResponse {
    pub template: String,
    pub context: Value,
}

impl TemplateResponse {
    pub fn into_template(self) -> Template {
        Template::render(self.template, self.context)
    }
}

/// `<template_prefix>/<base_template_name>`, the prefix coming from the
/// namespace's app-configuration when set.
pub fn template_name(env: &ViewEnv, config: Option<&AppConfig>, base_template_name: &str) -> String {
    let prefix = config
        .and_then(AppConfig::template_prefix)
        .unwrap_or(&env.settings.default_template_prefix);
    format!("{}/{}", prefix.trim_end_matches('/'), base_template_name)
}

/// Absolute canonical URL of a view instance.
pub fn view_url(
    env: &ViewEnv,
    spec: &ViewSpec,
    namespace: &str,
    args: &[String],
) -> Result<String, ViewError> {
    let name = spec.view_url_name.ok_or_else(|| {
        ViewError::ImproperlyConfigured(format!(
            "Missing `view_url_name` attribute on {}",
            spec.name
        ))
    })?;
    let path = urls::reverse(name, namespace, args).ok_or_else(|| {
        ViewError::ImproperlyConfigured(format!(
            "Reverse for '{}' with arguments {:?} not found",
            name, args
        ))
    })?;
    Ok(urls::absolute(&env.settings.site_url, &path))
}

/// Context keys every blog page gets. Call after the view has updated the
/// toolbar and the request stash.
pub(crate) fn common_context(
    env: &ViewEnv,
    req: &BlogRequest,
    spec: &ViewSpec,
    namespace: &str,
    url_args: &[String],
) -> Result<Map<String, Value>, ViewError> {
    let url = view_url(env, spec, namespace, url_args)?;

    let mut context = Map::new();
    context.insert(
        "toolbar".into(),
        req.toolbar
            .as_ref()
            .map(|t| t.context(env.settings, &url))
            .unwrap_or(Value::Null),
    );
    context.insert("view_url".into(), Value::String(url));
    context.insert("namespace".into(), json!(namespace));
    context.insert("language".into(), json!(req.language));
    context.insert("site_name".into(), json!(env.settings.site_name));
    context.insert("request".into(), json!(req.stash));
    Ok(context)
}

/// A post as templates see it: every field plus its URL and a display date.
pub fn post_json(post: &Post) -> Value {
    let mut value = serde_json::to_value(post).unwrap_or_else(|_| json!({}));
    if let Value::Object(ref mut map) = value {
        let url = urls::reverse("post-detail", &post.namespace, &post.url_args()).unwrap_or_default();
        map.insert("url".into(), Value::String(url));
        map.insert(
            "date_display".into(),
            Value::String(post.date_published.format("%B %-d, %Y").to_string()),
        );
    }
    value
}
