#![cfg(test)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rocket::http::{Header, Status};
use rocket::local::blocking::Client;
use serde_json::Value;

use crate::config::BlogSettings;
use crate::db::{run_migrations, seed_defaults, DbPool};
use crate::models::app_config::AppConfigForm;
use crate::models::category::{CategoryForm, CategoryTranslationForm};
use crate::models::post::{PostForm, PostQuery, PostTranslationForm};
use crate::models::user::UserForm;
use crate::render::truncate_words;
use crate::request::{negotiate_language, BlogRequest};
use crate::store::sqlite::SqliteStore;
use crate::store::Store;
use crate::toolbar::{Toolbar, ToolbarObject};
use crate::urls;
use crate::views::ajax::AjaxList;
use crate::views::archive::post_archive;
use crate::views::author::author_entries;
use crate::views::category::{category_entries, resolve_category};
use crate::views::detail::{find_post, post_detail};
use crate::views::list::post_list;
use crate::views::paginate::Page;
use crate::views::tagged::tagged_list;
use crate::views::{view_url, ViewEnv, ViewError, ViewSpec};

/// Atomic counter for unique shared-cache DB names so parallel tests don't collide.
static TEST_DB_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Create a fresh in-memory SQLite pool with all migrations + seed defaults applied.
/// Uses a named shared-cache in-memory DB so every pooled connection sees the same data.
fn test_pool() -> DbPool {
    let id = TEST_DB_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let uri = format!("file:testdb_{}?mode=memory&cache=shared", id);
    let manager = SqliteConnectionManager::file(uri);
    let pool = Pool::builder()
        .max_size(2)
        .build(manager)
        .expect("Failed to create test pool");
    {
        let conn = pool.get().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
    }
    run_migrations(&pool).expect("Failed to run migrations");
    seed_defaults(&pool).expect("Failed to seed defaults");
    pool
}

fn test_store() -> SqliteStore {
    SqliteStore::new(test_pool())
}

fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

/// Reference "now" for every view test.
fn now() -> NaiveDateTime {
    dt(2024, 6, 15)
}

fn en_request() -> BlogRequest {
    let mut req = BlogRequest::new("en");
    req.toolbar = Some(Toolbar::new(false));
    req
}

fn edit_request() -> BlogRequest {
    let mut req = BlogRequest::new("en");
    req.toolbar = Some(Toolbar::new(true));
    req
}

struct PostFixture<'a> {
    namespace: &'a str,
    slug: &'a str,
    date: NaiveDateTime,
    publish: bool,
    end: Option<NaiveDateTime>,
    author_id: Option<i64>,
    category_ids: Vec<i64>,
    tag_ids: Vec<i64>,
    languages: &'a [&'a str],
}

impl<'a> PostFixture<'a> {
    fn new(slug: &'a str, date: NaiveDateTime) -> Self {
        PostFixture {
            namespace: "main",
            slug,
            date,
            publish: true,
            end: None,
            author_id: None,
            category_ids: vec![],
            tag_ids: vec![],
            languages: &["en"],
        }
    }

    fn create(self, store: &dyn Store) -> i64 {
        let translations = self
            .languages
            .iter()
            .map(|lang| PostTranslationForm {
                language: lang.to_string(),
                title: format!("{} ({})", self.slug, lang),
                slug: if *lang == "en" {
                    self.slug.to_string()
                } else {
                    format!("{}-{}", self.slug, lang)
                },
                abstract_text: format!("<p>Abstract of {}</p>", self.slug),
                post_text: format!("<p>Body of {}</p>", self.slug),
                ..Default::default()
            })
            .collect();
        store
            .post_create(&PostForm {
                namespace: self.namespace.to_string(),
                author_id: self.author_id,
                publish: self.publish,
                date_published: self.date,
                date_published_end: self.end,
                main_image: None,
                translations,
                category_ids: self.category_ids,
                tag_ids: self.tag_ids,
            })
            .unwrap()
    }
}

fn create_user(store: &dyn Store, username: &str) -> i64 {
    store
        .user_create(&UserForm {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        })
        .unwrap()
}

fn create_category(store: &dyn Store, namespace: &str, en_slug: &str, de_slug: &str) -> i64 {
    store
        .category_create(&CategoryForm {
            namespace: namespace.to_string(),
            parent_id: None,
            translations: vec![
                CategoryTranslationForm {
                    language: "en".to_string(),
                    name: en_slug.to_string(),
                    slug: en_slug.to_string(),
                },
                CategoryTranslationForm {
                    language: "de".to_string(),
                    name: de_slug.to_string(),
                    slug: de_slug.to_string(),
                },
            ],
        })
        .unwrap()
}

fn slugs(context: &Value) -> Vec<String> {
    context["post_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap().to_string())
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════

#[test]
fn settings_seeded_defaults_load() {
    let store = test_store();
    let settings = BlogSettings::load(&store);
    assert_eq!(settings.pagination, 10);
    assert_eq!(settings.default_language, "en");
    assert_eq!(settings.languages, vec!["en", "de"]);
    assert!(settings.toolbar_enabled);
    assert!(!settings.allow_edit_mode);
}

#[test]
fn settings_overrides_are_read() {
    let store = test_store();
    store.setting_set("blog_pagination", "3").unwrap();
    store.setting_set("blog_languages", "en, fr ,de").unwrap();
    store.setting_set("blog_allow_edit_mode", "true").unwrap();
    store.setting_set("blog_template_prefix", "theme").unwrap();
    let settings = BlogSettings::load(&store);
    assert_eq!(settings.pagination, 3);
    assert_eq!(settings.languages, vec!["en", "fr", "de"]);
    assert!(settings.allow_edit_mode);
    assert_eq!(settings.default_template_prefix, "theme");
}

#[test]
fn settings_invalid_pagination_falls_back() {
    let store = test_store();
    store.setting_set("blog_pagination", "lots").unwrap();
    assert_eq!(BlogSettings::load(&store).pagination, 10);
}

// ═══════════════════════════════════════════════════════════
// Store
// ═══════════════════════════════════════════════════════════

#[test]
fn store_post_create_generates_slug() {
    let store = test_store();
    let id = store
        .post_create(&PostForm {
            namespace: "main".to_string(),
            author_id: None,
            publish: true,
            date_published: dt(2024, 1, 1),
            date_published_end: None,
            main_image: None,
            translations: vec![PostTranslationForm {
                language: "en".to_string(),
                title: "Hello Rust World".to_string(),
                ..Default::default()
            }],
            category_ids: vec![],
            tag_ids: vec![],
        })
        .unwrap();
    let post = store
        .post_find_by_slug("en", "hello-rust-world", None)
        .unwrap()
        .unwrap();
    assert_eq!(post.id, id);
    assert_eq!(post.language, "en");
}

#[test]
fn store_tag_find_or_create_is_idempotent() {
    let store = test_store();
    let a = store.tag_find_or_create("Web Dev").unwrap();
    let b = store.tag_find_or_create("Web Dev").unwrap();
    assert_eq!(a, b);
    assert_eq!(store.tag_find_by_slug("web-dev").unwrap().name, "Web Dev");
}

#[test]
fn store_app_config_save_upserts() {
    let store = test_store();
    let form = AppConfigForm {
        namespace: "main".to_string(),
        template_prefix: Some("custom".to_string()),
        paginate_by: Some(5),
    };
    let id = store.app_config_save(&form).unwrap();
    let again = store
        .app_config_save(&AppConfigForm {
            paginate_by: Some(7),
            ..form
        })
        .unwrap();
    assert_eq!(id, again);
    let config = store.app_config_find("main").unwrap();
    assert_eq!(config.paginate_by(), Some(7));
    assert_eq!(config.template_prefix(), Some("custom"));
    assert!(store.app_config_find("other").is_none());
}

#[test]
fn store_query_is_lazy_and_composable() {
    let store = test_store();
    let tag = store.tag_find_or_create("rust").unwrap();
    PostFixture {
        tag_ids: vec![tag],
        ..PostFixture::new("tagged", dt(2024, 2, 1))
    }
    .create(&store);
    PostFixture::new("plain", dt(2024, 3, 1)).create(&store);

    let base = PostQuery::new("en").namespace("main");
    let narrowed = base.clone().tagged("rust").year(2024).month(2);
    assert_eq!(store.post_count(&base).unwrap(), 2);
    assert_eq!(store.post_count(&narrowed).unwrap(), 1);
    assert_eq!(store.post_list(&narrowed, 10, 0).unwrap()[0].slug, "tagged");
}

#[test]
fn store_post_list_newest_first() {
    let store = test_store();
    PostFixture::new("old", dt(2023, 1, 1)).create(&store);
    PostFixture::new("new", dt(2024, 1, 1)).create(&store);
    let posts = store.post_list(&PostQuery::new("en"), 10, 0).unwrap();
    assert_eq!(posts[0].slug, "new");
    assert_eq!(posts[1].slug, "old");
}

// ═══════════════════════════════════════════════════════════
// Publish window and edit mode
// ═══════════════════════════════════════════════════════════

fn publish_fixtures(store: &dyn Store) {
    PostFixture::new("live", dt(2024, 1, 1)).create(store);
    PostFixture {
        publish: false,
        ..PostFixture::new("draft", dt(2024, 1, 2))
    }
    .create(store);
    PostFixture::new("scheduled", dt(2025, 1, 1)).create(store);
    PostFixture {
        end: Some(dt(2024, 3, 1)),
        ..PostFixture::new("expired", dt(2024, 1, 3))
    }
    .create(store);
}

#[test]
fn list_shows_only_published_posts() {
    let store = test_store();
    publish_fixtures(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_list(&env, &mut en_request(), "main").unwrap();
    assert_eq!(slugs(&resp.context), vec!["live"]);
}

#[test]
fn list_in_edit_mode_shows_unpublished() {
    let store = test_store();
    publish_fixtures(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_list(&env, &mut edit_request(), "main").unwrap();
    assert_eq!(slugs(&resp.context).len(), 4);
}

#[test]
fn request_without_toolbar_is_not_in_edit_mode() {
    let req = BlogRequest::new("en");
    assert!(!req.edit_mode());
    assert!(edit_request().edit_mode());
    assert!(!en_request().edit_mode());
}

#[test]
fn post_is_published_window() {
    let store = test_store();
    publish_fixtures(&store);
    let expired = store.post_find_by_slug("en", "expired", None).unwrap().unwrap();
    assert!(expired.is_published(&dt(2024, 2, 1)));
    assert!(!expired.is_published(&now()));
}

#[test]
fn list_scoped_to_namespace() {
    let store = test_store();
    PostFixture::new("here", dt(2024, 1, 1)).create(&store);
    PostFixture {
        namespace: "other",
        ..PostFixture::new("there", dt(2024, 1, 1))
    }
    .create(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_list(&env, &mut en_request(), "main").unwrap();
    assert_eq!(slugs(&resp.context), vec!["here"]);
}

#[test]
fn list_prefers_request_language_then_fallbacks() {
    let store = test_store();
    PostFixture::new("english-only", dt(2024, 1, 1)).create(&store);
    PostFixture {
        languages: &["en", "de"],
        ..PostFixture::new("both", dt(2024, 1, 2))
    }
    .create(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_list(&env, &mut BlogRequest::new("de"), "main").unwrap();
    assert_eq!(slugs(&resp.context), vec!["both-de", "english-only"]);
    assert_eq!(resp.context["post_list"][0]["language"], "de");
    assert_eq!(resp.context["post_list"][1]["language"], "en");
}

#[test]
fn list_without_fallbacks_requires_request_language() {
    let store = test_store();
    PostFixture::new("english-only", dt(2024, 1, 1)).create(&store);
    PostFixture {
        languages: &["en", "de"],
        ..PostFixture::new("both", dt(2024, 1, 2))
    }
    .create(&store);
    let settings = BlogSettings {
        language_fallbacks: vec![],
        ..BlogSettings::default()
    };
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_list(&env, &mut BlogRequest::new("de"), "main").unwrap();
    assert_eq!(slugs(&resp.context), vec!["both-de"]);
}

#[test]
fn list_and_detail_agree_on_fallback_language() {
    let store = test_store();
    PostFixture::new("english-only", dt(2024, 1, 1)).create(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_list(&env, &mut BlogRequest::new("de"), "main").unwrap();
    assert_eq!(slugs(&resp.context), vec!["english-only"]);
    assert!(post_detail(&env, &mut BlogRequest::new("de"), "main", "english-only").is_ok());
}

// ═══════════════════════════════════════════════════════════
// Templates and AJAX selection
// ═══════════════════════════════════════════════════════════

#[test]
fn list_uses_full_template_by_default() {
    let store = test_store();
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_list(&env, &mut en_request(), "main").unwrap();
    assert_eq!(resp.template, "blog/post_list");
    assert_eq!(resp.context["page_template"], "blog/post_list_page");
}

#[test]
fn list_ajax_request_uses_page_template() {
    let store = test_store();
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let mut req = en_request();
    req.is_ajax = true;
    let resp = post_list(&env, &mut req, "main").unwrap();
    assert_eq!(resp.template, "blog/post_list_page");
}

#[test]
fn list_ajax_request_for_other_key_uses_full_template() {
    let store = test_store();
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let mut req = en_request();
    req.is_ajax = true;
    req.query
        .insert("querystring_key".to_string(), "comments".to_string());
    let resp = post_list(&env, &mut req, "main").unwrap();
    assert_eq!(resp.template, "blog/post_list");
}

#[test]
fn list_template_prefix_from_app_config() {
    let store = test_store();
    store
        .app_config_save(&AppConfigForm {
            namespace: "main".to_string(),
            template_prefix: Some("custom/".to_string()),
            paginate_by: None,
        })
        .unwrap();
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_list(&env, &mut en_request(), "main").unwrap();
    assert_eq!(resp.template, "custom/post_list");
}

#[test]
fn ajax_page_template_requires_model() {
    let ajax = AjaxList::default();
    assert_eq!(
        ajax.page_template(None),
        Err(ViewError::ImproperlyConfigured(
            "AjaxListMixin requires a page_template".to_string()
        ))
    );
    let explicit = AjaxList {
        page_template: Some("blog/custom_page".to_string()),
        ..AjaxList::default()
    };
    assert_eq!(explicit.page_template(None).unwrap(), "blog/custom_page");
    assert_eq!(
        ajax.page_template(Some(PostQuery::new("en").model())).unwrap(),
        "blog/post_list_page"
    );
}

#[test]
fn view_url_requires_name() {
    let store = test_store();
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings);
    let spec = ViewSpec {
        name: "NamelessView",
        view_url_name: None,
        base_template_name: "post_list",
    };
    let err = view_url(&env, &spec, "main", &[]).unwrap_err();
    assert!(matches!(err, ViewError::ImproperlyConfigured(ref m) if m.contains("NamelessView")));
    assert_eq!(err.status(), Status::InternalServerError);
}

#[test]
fn list_context_carries_common_keys() {
    let store = test_store();
    PostFixture::new("first", dt(2024, 1, 1)).create(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_list(&env, &mut en_request(), "main").unwrap();
    let ctx = &resp.context;
    assert_eq!(ctx["view_url"], "http://localhost:8000/blog/main");
    assert_eq!(ctx["TRUNCWORDS_COUNT"], 100);
    assert_eq!(ctx["namespace"], "main");
    assert_eq!(
        ctx["post_list"][0]["url"],
        "/blog/main/2024/01/01/first"
    );
    assert_eq!(ctx["post_list"][0]["date_display"], "January 1, 2024");
    // Stash holds the (missing) app-configuration
    assert!(ctx["request"]["blog_current_config"].is_null());
    assert_eq!(ctx["toolbar"]["edit_mode"], false);
    assert!(ctx["page_links"]["next"].is_null());
}

#[test]
fn list_stashes_app_config_on_request() {
    let store = test_store();
    store
        .app_config_save(&AppConfigForm {
            namespace: "main".to_string(),
            template_prefix: None,
            paginate_by: Some(3),
        })
        .unwrap();
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let mut req = en_request();
    post_list(&env, &mut req, "main").unwrap();
    let stashed = req.attr(&settings.current_namespace_attr).unwrap();
    assert_eq!(stashed["namespace"], "main");
    assert_eq!(stashed["paginate_by"], 3);
}

// ═══════════════════════════════════════════════════════════
// Pagination
// ═══════════════════════════════════════════════════════════

fn five_posts(store: &dyn Store) {
    for (i, slug) in ["p1", "p2", "p3", "p4", "p5"].iter().enumerate() {
        PostFixture::new(*slug, dt(2024, 1, 1 + i as u32)).create(store);
    }
}

#[test]
fn list_paginates_by_app_config() {
    let store = test_store();
    five_posts(&store);
    store
        .app_config_save(&AppConfigForm {
            namespace: "main".to_string(),
            template_prefix: None,
            paginate_by: Some(2),
        })
        .unwrap();
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_list(&env, &mut en_request(), "main").unwrap();
    assert_eq!(slugs(&resp.context), vec!["p5", "p4"]);
    assert_eq!(resp.context["paginator"]["num_pages"], 3);
    assert_eq!(resp.context["is_paginated"], true);
    assert_eq!(resp.context["request"]["blog_current_config"]["paginate_by"], 2);

    let mut req = en_request();
    req.query.insert("page".to_string(), "last".to_string());
    let resp = post_list(&env, &mut req, "main").unwrap();
    assert_eq!(slugs(&resp.context), vec!["p1"]);
    assert_eq!(resp.context["page_obj"]["has_next"], false);
}

#[test]
fn list_paginates_by_global_default() {
    let store = test_store();
    five_posts(&store);
    let settings = BlogSettings {
        pagination: 4,
        ..BlogSettings::default()
    };
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_list(&env, &mut en_request(), "main").unwrap();
    assert_eq!(slugs(&resp.context).len(), 4);
}

#[test]
fn list_invalid_page_is_not_found() {
    let store = test_store();
    five_posts(&store);
    let settings = BlogSettings {
        pagination: 2,
        ..BlogSettings::default()
    };
    let env = ViewEnv::new(&store, &settings).at(now());

    for raw in ["4", "0", "abc"] {
        let mut req = en_request();
        req.query.insert("page".to_string(), raw.to_string());
        let err = post_list(&env, &mut req, "main").unwrap_err();
        assert_eq!(err.status(), Status::NotFound, "page={}", raw);
    }
}

#[test]
fn list_page_links_keep_query_and_language() {
    let store = test_store();
    five_posts(&store);
    let settings = BlogSettings {
        pagination: 2,
        ..BlogSettings::default()
    };
    let env = ViewEnv::new(&store, &settings).at(now());

    let mut req = en_request();
    req.query.insert("edit".to_string(), String::new());
    req.query.insert("page".to_string(), "2".to_string());
    let resp = post_list(&env, &mut req, "main").unwrap();
    assert_eq!(
        resp.context["page_links"]["next"],
        "http://localhost:8000/blog/main?edit=&language=en&page=3"
    );
    assert_eq!(
        resp.context["page_links"]["previous"],
        "http://localhost:8000/blog/main?edit=&language=en&page=1"
    );
}

#[test]
fn list_huge_page_size_does_not_overflow() {
    let store = test_store();
    five_posts(&store);
    store
        .app_config_save(&AppConfigForm {
            namespace: "main".to_string(),
            template_prefix: None,
            paginate_by: Some(i64::MAX),
        })
        .unwrap();
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_list(&env, &mut en_request(), "main").unwrap();
    assert_eq!(slugs(&resp.context).len(), 5);
    assert_eq!(resp.context["paginator"]["num_pages"], 1);
    assert_eq!(resp.context["is_paginated"], false);
}

#[test]
fn page_math() {
    let page = Page::new(5, 2, Some("2")).unwrap();
    assert_eq!(page.offset(), 2);
    assert_eq!(page.start_index(), 3);
    assert_eq!(page.end_index(), 4);
    assert!(page.has_next() && page.has_previous());

    let last = Page::new(5, 2, Some("last")).unwrap();
    assert_eq!(last.number, 3);
    assert_eq!(last.end_index(), 5);

    let huge = Page::new(3, i64::MAX, Some("last")).unwrap();
    assert_eq!(huge.num_pages, 1);
    assert_eq!(huge.end_index(), 3);
    let full = Page::new(i64::MAX, i64::MAX - 1, Some("1")).unwrap();
    assert_eq!(full.num_pages, 2);
    assert_eq!(full.end_index(), i64::MAX - 1);

    let empty = Page::new(0, 10, None).unwrap();
    assert_eq!(empty.num_pages, 1);
    assert_eq!(empty.start_index(), 0);
    assert!(Page::new(0, 10, Some("2")).is_err());
}

// ═══════════════════════════════════════════════════════════
// Archive
// ═══════════════════════════════════════════════════════════

fn archive_fixtures(store: &dyn Store) {
    PostFixture::new("march-2024", dt(2024, 3, 10)).create(store);
    PostFixture::new("may-2024", dt(2024, 5, 2)).create(store);
    PostFixture::new("march-2023", dt(2023, 3, 4)).create(store);
}

#[test]
fn archive_by_year() {
    let store = test_store();
    archive_fixtures(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_archive(&env, &mut en_request(), "main", Some(2024), None).unwrap();
    assert_eq!(slugs(&resp.context), vec!["may-2024", "march-2024"]);
    assert_eq!(resp.context["archive_date"], "2024-01-01");
    assert_eq!(resp.context["year"], 2024);
    assert!(resp.context["month"].is_null());
    assert_eq!(resp.context["view_url"], "http://localhost:8000/blog/main/2024");
}

#[test]
fn archive_by_month() {
    let store = test_store();
    archive_fixtures(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_archive(&env, &mut en_request(), "main", Some(2024), Some(3)).unwrap();
    assert_eq!(slugs(&resp.context), vec!["march-2024"]);
    assert_eq!(resp.context["archive_date"], "2024-03-01");
    assert_eq!(resp.context["archive_date_display"], "March 2024");
}

#[test]
fn archive_invalid_month_is_not_found() {
    let store = test_store();
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let err = post_archive(&env, &mut en_request(), "main", Some(2024), Some(13)).unwrap_err();
    assert!(matches!(err, ViewError::NotFound(_)));
}

#[test]
fn archive_without_year_or_month_is_unfiltered() {
    let store = test_store();
    archive_fixtures(&store);
    PostFixture {
        publish: false,
        ..PostFixture::new("draft-2024", dt(2024, 4, 1))
    }
    .create(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_archive(&env, &mut en_request(), "main", None, None).unwrap();
    assert_eq!(
        slugs(&resp.context),
        vec!["may-2024", "march-2024", "march-2023"]
    );
    assert!(resp.context["year"].is_null());
    assert!(resp.context["month"].is_null());
    assert!(resp.context.get("archive_date").is_none());
    assert_eq!(resp.context["view_url"], "http://localhost:8000/blog/main");
}

#[test]
fn archive_empty_year_renders() {
    let store = test_store();
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = post_archive(&env, &mut en_request(), "main", Some(1999), None).unwrap();
    assert!(slugs(&resp.context).is_empty());
    assert_eq!(resp.context["is_paginated"], false);
}

// ═══════════════════════════════════════════════════════════
// Tag / author / category
// ═══════════════════════════════════════════════════════════

#[test]
fn tagged_lists_posts_with_tag() {
    let store = test_store();
    let rust = store.tag_find_or_create("Rust").unwrap();
    PostFixture {
        tag_ids: vec![rust],
        ..PostFixture::new("with-tag", dt(2024, 1, 1))
    }
    .create(&store);
    PostFixture::new("without-tag", dt(2024, 1, 2)).create(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = tagged_list(&env, &mut en_request(), "main", "rust").unwrap();
    assert_eq!(slugs(&resp.context), vec!["with-tag"]);
    assert_eq!(resp.context["tag"]["name"], "Rust");
    assert_eq!(resp.context["tagged_entries"], "rust");
}

#[test]
fn tagged_unknown_tag_is_not_found() {
    let store = test_store();
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let err = tagged_list(&env, &mut en_request(), "main", "nope").unwrap_err();
    assert_eq!(err.status(), Status::NotFound);
}

#[test]
fn author_lists_own_posts() {
    let store = test_store();
    let ada = create_user(&store, "ada");
    let bob = create_user(&store, "bob");
    PostFixture {
        author_id: Some(ada),
        ..PostFixture::new("by-ada", dt(2024, 1, 1))
    }
    .create(&store);
    PostFixture {
        author_id: Some(bob),
        ..PostFixture::new("by-bob", dt(2024, 1, 2))
    }
    .create(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = author_entries(&env, &mut en_request(), "main", "ada").unwrap();
    assert_eq!(slugs(&resp.context), vec!["by-ada"]);
    assert_eq!(resp.context["author"]["username"], "ada");
    assert_eq!(resp.context["author_name"], "Ada Lovelace");
}

#[test]
fn author_unknown_is_not_found() {
    let store = test_store();
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let err = author_entries(&env, &mut en_request(), "main", "ghost").unwrap_err();
    assert!(matches!(err, ViewError::NotFound(_)));
}

#[test]
fn category_lists_posts_and_sets_toolbar_object() {
    let store = test_store();
    let news = create_category(&store, "main", "news", "nachrichten");
    PostFixture {
        category_ids: vec![news],
        ..PostFixture::new("in-news", dt(2024, 1, 1))
    }
    .create(&store);
    PostFixture::new("elsewhere", dt(2024, 1, 2)).create(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let mut req = en_request();
    let resp = category_entries(&env, &mut req, "main", "news").unwrap();
    assert_eq!(slugs(&resp.context), vec!["in-news"]);
    assert_eq!(resp.context["category"]["slug"], "news");

    let toolbar = req.toolbar.as_ref().unwrap();
    assert!(matches!(toolbar.object, Some(ToolbarObject::Category { id, .. }) if id == news));
    let links = toolbar.language_links(&settings, "unused");
    assert_eq!(
        links[1].url,
        "http://localhost:8000/blog/main/category/nachrichten?language=de"
    );
}

#[test]
fn category_unknown_is_not_found() {
    let store = test_store();
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let err = category_entries(&env, &mut en_request(), "main", "missing").unwrap_err();
    assert!(matches!(err, ViewError::NotFound(_)));
}

#[test]
fn category_ambiguous_slug_is_server_error() {
    let store = test_store();
    create_category(&store, "main", "news", "nachrichten");
    create_category(&store, "other", "news", "neuigkeiten");

    let err = resolve_category(&store, &["en".to_string()], "news").unwrap_err();
    assert!(matches!(err, ViewError::MultipleFound(_)));
    assert_eq!(err.status(), Status::InternalServerError);
    let other = resolve_category(&store, &["de".to_string()], "neuigkeiten").unwrap();
    assert_eq!(other.namespace, "other");
}

#[test]
fn category_slug_matches_fallback_language() {
    let store = test_store();
    let news = create_category(&store, "main", "news", "nachrichten");
    PostFixture {
        category_ids: vec![news],
        ..PostFixture::new("in-news", dt(2024, 1, 1))
    }
    .create(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let resp = category_entries(&env, &mut BlogRequest::new("de"), "main", "news").unwrap();
    assert_eq!(slugs(&resp.context), vec!["in-news"]);
    // Resolved in the request language even when matched through a fallback
    assert_eq!(resp.context["category"]["slug"], "nachrichten");
    assert_eq!(resp.context["category"]["language"], "de");
}

#[test]
fn category_same_slug_in_two_active_languages_is_ambiguous() {
    let store = test_store();
    create_category(&store, "main", "news", "nachrichten");
    create_category(&store, "main", "updates", "news");
    let settings = BlogSettings::default();

    let err = resolve_category(&store, &settings.candidate_languages("de"), "news").unwrap_err();
    assert!(matches!(err, ViewError::MultipleFound(_)));
    let only_en = resolve_category(&store, &settings.candidate_languages("en"), "news").unwrap();
    assert_eq!(only_en.name, "news");
}

// ═══════════════════════════════════════════════════════════
// Detail
// ═══════════════════════════════════════════════════════════

#[test]
fn detail_renders_post() {
    let store = test_store();
    let ada = create_user(&store, "ada");
    let rust = store.tag_find_or_create("Rust").unwrap();
    let news = create_category(&store, "main", "news", "nachrichten");
    PostFixture {
        author_id: Some(ada),
        tag_ids: vec![rust],
        category_ids: vec![news],
        languages: &["en", "de"],
        ..PostFixture::new("hello", dt(2024, 2, 3))
    }
    .create(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let mut req = en_request();
    let resp = post_detail(&env, &mut req, "main", "hello").unwrap();
    assert_eq!(resp.template, "blog/post_detail");
    let ctx = &resp.context;
    assert_eq!(ctx["post"]["slug"], "hello");
    assert_eq!(ctx["author"]["username"], "ada");
    assert_eq!(ctx["tags"][0]["slug"], "rust");
    assert_eq!(ctx["categories"][0]["slug"], "news");
    assert_eq!(ctx["meta"]["jsonld"]["@type"], "BlogPosting");
    assert_eq!(ctx["view_url"], "http://localhost:8000/blog/main/2024/02/03/hello");
    assert_eq!(ctx["request"]["blog_current_post"]["slug"], "hello");
    assert_eq!(req.attr(&settings.current_post_attr).unwrap()["id"], ctx["post"]["id"]);
    assert_eq!(ctx["use_placeholder"], true);

    let links = req.toolbar.as_ref().unwrap().language_links(&settings, "unused");
    assert_eq!(links.len(), 2);
    assert_eq!(
        links[1].url,
        "http://localhost:8000/blog/main/2024/02/03/hello-de?language=de"
    );
}

#[test]
fn detail_unpublished_is_not_found_outside_edit_mode() {
    let store = test_store();
    PostFixture {
        publish: false,
        ..PostFixture::new("draft", dt(2024, 1, 1))
    }
    .create(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let err = post_detail(&env, &mut en_request(), "main", "draft").unwrap_err();
    assert!(matches!(err, ViewError::NotFound(_)));
    assert!(post_detail(&env, &mut edit_request(), "main", "draft").is_ok());
}

#[test]
fn detail_falls_back_to_fallback_language() {
    let store = test_store();
    PostFixture::new("english", dt(2024, 1, 1)).create(&store);
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let req = BlogRequest::new("de");
    let post = find_post(&env, &req, "english").unwrap().unwrap();
    assert_eq!(post.language, "en");

    let no_fallback = BlogSettings {
        language_fallbacks: vec![],
        ..BlogSettings::default()
    };
    let env = ViewEnv::new(&store, &no_fallback).at(now());
    assert!(find_post(&env, &req, "english").unwrap().is_none());
}

#[test]
fn detail_unknown_slug_is_not_found() {
    let store = test_store();
    let settings = BlogSettings::default();
    let env = ViewEnv::new(&store, &settings).at(now());

    let err = post_detail(&env, &mut en_request(), "main", "nothing").unwrap_err();
    assert_eq!(err.status(), Status::NotFound);
}

// ═══════════════════════════════════════════════════════════
// Language, URLs and filters
// ═══════════════════════════════════════════════════════════

#[test]
fn language_negotiation_order() {
    let settings = BlogSettings::default();
    assert_eq!(negotiate_language(Some("de"), Some("en"), &settings), "de");
    assert_eq!(negotiate_language(Some("xx"), Some("de"), &settings), "de");
    assert_eq!(
        negotiate_language(None, Some("fr;q=0.9, de-AT;q=0.8, en;q=0.1"), &settings),
        "de"
    );
    assert_eq!(negotiate_language(None, Some("fr, it"), &settings), "en");
    assert_eq!(negotiate_language(None, None, &settings), "en");
}

#[test]
fn reverse_routes() {
    let args = |a: &[&str]| a.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    assert_eq!(urls::reverse("posts-latest", "main", &[]).unwrap(), "/blog/main");
    assert_eq!(
        urls::reverse("posts-archive", "main", &args(&["2024", "3"])).unwrap(),
        "/blog/main/2024/3"
    );
    assert_eq!(
        urls::reverse("posts-tagged", "main", &args(&["rust"])).unwrap(),
        "/blog/main/tag/rust"
    );
    assert!(urls::reverse("posts-latest", "main", &args(&["extra"])).is_none());
    assert!(urls::reverse("unknown", "main", &[]).is_none());
}

#[test]
fn with_language_replaces_existing_value() {
    assert_eq!(
        urls::with_language("http://localhost:8000/blog/main?language=en&page=2", "de"),
        "http://localhost:8000/blog/main?page=2&language=de"
    );
}

#[test]
fn truncate_words_cuts_long_text() {
    assert_eq!(truncate_words("one two three four", 2), "one two …");
    assert_eq!(truncate_words("one two", 5), "one two");
    assert_eq!(truncate_words("keep  all", 0), "keep  all");
}

// ═══════════════════════════════════════════════════════════
// HTTP
// ═══════════════════════════════════════════════════════════

fn client_with(setup: impl FnOnce(&dyn Store)) -> Client {
    let pool = test_pool();
    let store = SqliteStore::new(pool.clone());
    setup(&store);
    let figment = rocket::Config::figment().merge(("template_dir", "website/templates"));
    let rocket = crate::mount_blog(rocket::custom(figment), Arc::new(SqliteStore::new(pool)));
    Client::tracked(rocket).expect("valid rocket instance")
}

#[test]
fn http_latest_posts_page() {
    let client = client_with(|store| {
        PostFixture::new("first-post", dt(2020, 5, 1)).create(store);
        PostFixture {
            publish: false,
            ..PostFixture::new("hidden-post", dt(2020, 5, 2))
        }
        .create(store);
    });
    let response = client.get("/blog/main").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert!(body.contains("first-post"));
    assert!(!body.contains("hidden-post"));
    assert!(body.contains("<html"));
}

#[test]
fn http_trailing_slash_reaches_same_page() {
    let client = client_with(|store| {
        PostFixture::new("first-post", dt(2020, 5, 1)).create(store);
    });
    let response = client.get("/blog/main/").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert!(response.into_string().unwrap().contains("first-post"));
    assert_eq!(client.get("/blog/main/2020/").dispatch().status(), Status::Ok);
}

#[test]
fn http_pagination_links_keep_language() {
    let client = client_with(|store| {
        for day in 1..=12 {
            let slug = format!("entry-{}", day);
            PostFixture {
                languages: &["en", "de"],
                ..PostFixture::new(&slug, dt(2020, 5, day))
            }
            .create(store);
        }
    });
    let body = client
        .get("/blog/main?language=de")
        .dispatch()
        .into_string()
        .unwrap();
    let start = body.find(r#"class="next" href=""#).expect("next link") + r#"class="next" href=""#.len();
    let href = &body[start..start + body[start..].find('"').unwrap()];
    assert!(href.contains("language=de"), "{}", href);
    assert!(href.contains("page=2"), "{}", href);
    assert!(body.contains("entry-12-de"));
}

#[test]
fn http_ajax_request_renders_fragment() {
    let client = client_with(|store| {
        PostFixture::new("first-post", dt(2020, 5, 1)).create(store);
    });
    let response = client
        .get("/blog/main")
        .header(Header::new("X-Requested-With", "XMLHttpRequest"))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert!(body.contains("first-post"));
    assert!(!body.contains("<html"));
}

#[test]
fn http_archive_and_detail() {
    let client = client_with(|store| {
        PostFixture::new("first-post", dt(2020, 5, 1)).create(store);
    });
    assert_eq!(client.get("/blog/main/2020").dispatch().status(), Status::Ok);
    assert_eq!(client.get("/blog/main/2020/5").dispatch().status(), Status::Ok);
    assert_eq!(client.get("/blog/main/2020/13").dispatch().status(), Status::NotFound);

    let response = client.get("/blog/main/2020/05/01/first-post").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert!(body.contains("Body of first-post"));
    assert!(body.contains("application/ld+json"));
}

#[test]
fn http_missing_objects_are_404() {
    let client = client_with(|_| {});
    assert_eq!(client.get("/blog/main/tag/nope").dispatch().status(), Status::NotFound);
    assert_eq!(client.get("/blog/main/author/ghost").dispatch().status(), Status::NotFound);
    assert_eq!(
        client.get("/blog/main/category/missing").dispatch().status(),
        Status::NotFound
    );
    assert_eq!(
        client.get("/blog/main/2020/01/01/missing").dispatch().status(),
        Status::NotFound
    );
    assert_eq!(client.get("/blog/main?page=9").dispatch().status(), Status::NotFound);
}
