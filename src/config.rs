use serde::Serialize;

use crate::store::Store;

/// Global blog settings, read once from the `settings` table at launch and
/// handed to every view. App-configuration (per namespace) overrides some of
/// these at request time.
#[derive(Debug, Clone, Serialize)]
pub struct BlogSettings {
    pub site_name: String,
    pub site_url: String,
    /// Default page size when the namespace does not configure one.
    pub pagination: i64,
    pub posts_list_truncwords_count: i64,
    pub use_placeholder: bool,
    /// Request stash key holding the resolved app-configuration.
    pub current_namespace_attr: String,
    /// Request stash key holding the post rendered by the detail view.
    pub current_post_attr: String,
    pub default_language: String,
    pub languages: Vec<String>,
    pub language_fallbacks: Vec<String>,
    pub toolbar_enabled: bool,
    pub allow_edit_mode: bool,
    pub default_template_prefix: String,
}

impl Default for BlogSettings {
    fn default() -> Self {
        BlogSettings {
            site_name: "Inkpost".to_string(),
            site_url: "http://localhost:8000".to_string(),
            pagination: 10,
            posts_list_truncwords_count: 100,
            use_placeholder: true,
            current_namespace_attr: "blog_current_config".to_string(),
            current_post_attr: "blog_current_post".to_string(),
            default_language: "en".to_string(),
            languages: vec!["en".to_string(), "de".to_string()],
            language_fallbacks: vec!["en".to_string()],
            toolbar_enabled: true,
            allow_edit_mode: false,
            default_template_prefix: "blog".to_string(),
        }
    }
}

/// Seed values for the `settings` table, mirroring `BlogSettings::default()`.
pub fn defaults() -> Vec<(&'static str, String)> {
    let d = BlogSettings::default();
    vec![
        ("site_name", d.site_name),
        ("site_url", d.site_url),
        ("blog_pagination", d.pagination.to_string()),
        (
            "blog_posts_list_truncwords_count",
            d.posts_list_truncwords_count.to_string(),
        ),
        ("blog_use_placeholder", d.use_placeholder.to_string()),
        ("blog_current_namespace", d.current_namespace_attr),
        ("blog_current_post_identifier", d.current_post_attr),
        ("blog_default_language", d.default_language),
        ("blog_languages", d.languages.join(",")),
        ("blog_language_fallbacks", d.language_fallbacks.join(",")),
        ("blog_toolbar_enabled", d.toolbar_enabled.to_string()),
        ("blog_allow_edit_mode", d.allow_edit_mode.to_string()),
        ("blog_template_prefix", d.default_template_prefix),
    ]
}

impl BlogSettings {
    pub fn load(store: &dyn Store) -> Self {
        let d = BlogSettings::default();

        let flag = |key: &str, default: bool| -> bool {
            match store.setting_get(key) {
                Some(_) => store.setting_get_bool(key),
                None => default,
            }
        };
        let number = |key: &str, default: i64| -> i64 {
            store
                .setting_get(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let languages = split_list(&store.setting_get_or("blog_languages", &d.languages.join(",")));
        let default_language = store.setting_get_or("blog_default_language", &d.default_language);

        BlogSettings {
            site_name: store.setting_get_or("site_name", &d.site_name),
            site_url: store.setting_get_or("site_url", &d.site_url),
            pagination: number("blog_pagination", d.pagination).max(1),
            posts_list_truncwords_count: number(
                "blog_posts_list_truncwords_count",
                d.posts_list_truncwords_count,
            )
            .max(0),
            use_placeholder: flag("blog_use_placeholder", d.use_placeholder),
            current_namespace_attr: store
                .setting_get_or("blog_current_namespace", &d.current_namespace_attr),
            current_post_attr: store
                .setting_get_or("blog_current_post_identifier", &d.current_post_attr),
            languages: if languages.is_empty() {
                vec![default_language.clone()]
            } else {
                languages
            },
            default_language,
            language_fallbacks: split_list(&store.setting_get_or(
                "blog_language_fallbacks",
                &d.language_fallbacks.join(","),
            )),
            toolbar_enabled: flag("blog_toolbar_enabled", d.toolbar_enabled),
            allow_edit_mode: flag("blog_allow_edit_mode", d.allow_edit_mode),
            default_template_prefix: store
                .setting_get_or("blog_template_prefix", &d.default_template_prefix),
        }
    }

    pub fn supports_language(&self, language: &str) -> bool {
        self.languages.iter().any(|l| l == language)
    }

    /// `language` followed by the configured fallbacks, without repeats.
    pub fn candidate_languages(&self, language: &str) -> Vec<String> {
        let mut out = vec![language.to_string()];
        for fallback in &self.language_fallbacks {
            if !out.contains(fallback) {
                out.push(fallback.clone());
            }
        }
        out
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
