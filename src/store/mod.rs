use chrono::NaiveDateTime;

use crate::models::app_config::{AppConfig, AppConfigForm};
use crate::models::category::{Category, CategoryForm};
use crate::models::post::{Post, PostForm, PostQuery};
use crate::models::tag::{Tag, TagForm};
use crate::models::user::{User, UserForm};
use crate::models::Translation;

pub mod sqlite;

/// Unified data-access trait. Every database operation goes through here.
/// Implementation: `SqliteStore` (wraps rusqlite/r2d2).
///
/// Lookups return `Option`; queries whose failure must surface as a server
/// error return `Result<_, String>`.
pub trait Store: Send + Sync {
    // ── Lifecycle ───────────────────────────────────────────────────
    fn run_migrations(&self) -> Result<(), String>;
    fn seed_defaults(&self) -> Result<(), String>;

    // ── Settings ────────────────────────────────────────────────────
    fn setting_get(&self, key: &str) -> Option<String>;
    fn setting_get_or(&self, key: &str, default: &str) -> String {
        self.setting_get(key).unwrap_or_else(|| default.to_string())
    }
    fn setting_get_bool(&self, key: &str) -> bool {
        self.setting_get(key)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false)
    }
    fn setting_set(&self, key: &str, value: &str) -> Result<(), String>;

    // ── App configs ─────────────────────────────────────────────────
    fn app_config_find(&self, namespace: &str) -> Option<AppConfig>;
    fn app_config_save(&self, form: &AppConfigForm) -> Result<i64, String>;

    // ── Users ───────────────────────────────────────────────────────
    fn user_find_by_id(&self, id: i64) -> Option<User>;
    fn user_find_by_username(&self, username: &str) -> Option<User>;
    fn user_create(&self, form: &UserForm) -> Result<i64, String>;

    // ── Posts ───────────────────────────────────────────────────────
    fn post_list(&self, query: &PostQuery, limit: i64, offset: i64) -> Result<Vec<Post>, String>;
    fn post_count(&self, query: &PostQuery) -> Result<i64, String>;
    /// Post whose translation in `language` has `slug`. When `published_at`
    /// is set, unpublished posts are skipped.
    fn post_find_by_slug(
        &self,
        language: &str,
        slug: &str,
        published_at: Option<&NaiveDateTime>,
    ) -> Result<Option<Post>, String>;
    fn post_translations(&self, post_id: i64) -> Vec<Translation>;
    fn post_create(&self, form: &PostForm) -> Result<i64, String>;

    // ── Categories ──────────────────────────────────────────────────
    /// Every category with a translation in one of `languages` carrying
    /// `slug`, each resolved in the first of `languages` it is translated to.
    fn category_active_by_slug(&self, languages: &[String], slug: &str)
        -> Result<Vec<Category>, String>;
    fn category_for_post(&self, post_id: i64, language: &str) -> Vec<Category>;
    fn category_translations(&self, category_id: i64) -> Vec<Translation>;
    fn category_create(&self, form: &CategoryForm) -> Result<i64, String>;

    // ── Tags ────────────────────────────────────────────────────────
    fn tag_find_by_slug(&self, slug: &str) -> Option<Tag>;
    fn tag_for_post(&self, post_id: i64) -> Vec<Tag>;
    fn tag_create(&self, form: &TagForm) -> Result<i64, String>;
    fn tag_find_or_create(&self, name: &str) -> Result<i64, String> {
        let slug_str = slug::slugify(name);
        if let Some(existing) = self.tag_find_by_slug(&slug_str) {
            return Ok(existing.id);
        }
        self.tag_create(&TagForm {
            name: name.to_string(),
            slug: slug_str,
        })
    }
}
