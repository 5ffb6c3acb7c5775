use chrono::NaiveDateTime;
use rusqlite::types::ToSql;
use rusqlite::{params, OptionalExtension};

use crate::db::DbPool;
use crate::models::app_config::{AppConfig, AppConfigForm};
use crate::models::category::{Category, CategoryForm};
use crate::models::post::{Post, PostForm, PostQuery};
use crate::models::tag::{Tag, TagForm};
use crate::models::user::{User, UserForm};
use crate::models::Translation;

use super::Store;

/// SQLite-backed implementation of the Store trait.
pub struct SqliteStore {
    pub pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn new_at(path: &str) -> Result<Self, String> {
        let pool = crate::db::init_pool_at(path)?;
        Ok(Self { pool })
    }
}

/// Subquery picking the id of the row of `table` that belongs to
/// `<owner>.id` through `fk`, in the first of `languages` available.
fn preferred_translation(
    table: &str,
    fk: &str,
    owner: &str,
    languages: &[String],
) -> (String, Vec<Box<dyn ToSql>>) {
    let marks = vec!["?"; languages.len()].join(", ");
    // CASE needs at least one WHEN
    let order = if languages.is_empty() {
        "x.id".to_string()
    } else {
        let ranks: String = (0..languages.len())
            .map(|i| format!(" WHEN ? THEN {}", i))
            .collect();
        format!("CASE x.language{} END", ranks)
    };
    let sql = format!(
        "(SELECT x.id FROM {table} x
          WHERE x.{fk} = {owner}.id AND x.language IN ({marks})
          ORDER BY {order} LIMIT 1)"
    );

    let mut values: Vec<Box<dyn ToSql>> = Vec::with_capacity(languages.len() * 2);
    for _ in 0..2 {
        for language in languages {
            values.push(Box::new(language.clone()));
        }
    }
    (sql, values)
}

/// FROM/WHERE clause and bound parameters for a post query.
fn post_filter(query: &PostQuery) -> (String, Vec<Box<dyn ToSql>>) {
    let (translation, mut values) =
        preferred_translation("post_translations", "post_id", "p", &query.languages);
    let mut sql = format!(
        "FROM posts p
         JOIN post_translations t ON t.id = {}
         WHERE 1 = 1",
        translation
    );

    if let Some(ref namespace) = query.namespace {
        sql.push_str(" AND p.namespace = ?");
        values.push(Box::new(namespace.clone()));
    }
    if let Some(now) = query.published_at {
        sql.push_str(
            " AND p.publish = 1 AND p.date_published <= ?
              AND (p.date_published_end IS NULL OR p.date_published_end > ?)",
        );
        values.push(Box::new(now));
        values.push(Box::new(now));
    }
    if let Some(year) = query.year {
        sql.push_str(" AND CAST(strftime('%Y', p.date_published) AS INTEGER) = ?");
        values.push(Box::new(year));
    }
    if let Some(month) = query.month {
        sql.push_str(" AND CAST(strftime('%m', p.date_published) AS INTEGER) = ?");
        values.push(Box::new(month));
    }
    if let Some(ref tag) = query.tag_slug {
        sql.push_str(
            " AND EXISTS (SELECT 1 FROM post_tags pt JOIN tags tg ON tg.id = pt.tag_id
                          WHERE pt.post_id = p.id AND tg.slug = ?)",
        );
        values.push(Box::new(tag.clone()));
    }
    if let Some(category_id) = query.category_id {
        sql.push_str(
            " AND EXISTS (SELECT 1 FROM post_categories pc
                          WHERE pc.post_id = p.id AND pc.category_id = ?)",
        );
        values.push(Box::new(category_id));
    }
    if let Some(ref username) = query.author_username {
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM users u WHERE u.id = p.author_id AND u.{} = ?)",
            User::USERNAME_FIELD
        ));
        values.push(Box::new(username.clone()));
    }

    (sql, values)
}

impl Store for SqliteStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn run_migrations(&self) -> Result<(), String> {
        crate::db::run_migrations(&self.pool).map_err(|e| e.to_string())
    }

    fn seed_defaults(&self) -> Result<(), String> {
        crate::db::seed_defaults(&self.pool).map_err(|e| e.to_string())
    }

    // ── Settings ────────────────────────────────────────────────────

    fn setting_get(&self, key: &str) -> Option<String> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .ok()
    }

    fn setting_set(&self, key: &str, value: &str) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    // ── App configs ─────────────────────────────────────────────────

    fn app_config_find(&self, namespace: &str) -> Option<AppConfig> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM app_configs WHERE namespace = ?1",
            params![namespace],
            AppConfig::from_row,
        )
        .ok()
    }

    fn app_config_save(&self, form: &AppConfigForm) -> Result<i64, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.query_row(
            "INSERT INTO app_configs (namespace, template_prefix, paginate_by)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(namespace) DO UPDATE
                SET template_prefix = ?2, paginate_by = ?3
             RETURNING id",
            params![form.namespace, form.template_prefix, form.paginate_by],
            |row| row.get(0),
        )
        .map_err(|e| e.to_string())
    }

    // ── Users ───────────────────────────────────────────────────────

    fn user_find_by_id(&self, id: i64) -> Option<User> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM users WHERE id = ?1",
            params![id],
            User::from_row,
        )
        .ok()
    }

    fn user_find_by_username(&self, username: &str) -> Option<User> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            &format!("SELECT * FROM users WHERE {} = ?1", User::USERNAME_FIELD),
            params![username],
            User::from_row,
        )
        .ok()
    }

    fn user_create(&self, form: &UserForm) -> Result<i64, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO users (username, email, first_name, last_name) VALUES (?1, ?2, ?3, ?4)",
            params![form.username, form.email, form.first_name, form.last_name],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }

    // ── Posts ───────────────────────────────────────────────────────

    fn post_list(&self, query: &PostQuery, limit: i64, offset: i64) -> Result<Vec<Post>, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;

        let (filter, mut values) = post_filter(query);
        let sql = format!(
            "SELECT {} {}
             ORDER BY p.date_published DESC, p.date_created DESC, p.id DESC
             LIMIT ? OFFSET ?",
            Post::SELECT_COLS,
            filter
        );
        values.push(Box::new(limit));
        values.push(Box::new(offset));

        let mut stmt = conn.prepare(&sql).map_err(|e| e.to_string())?;
        let params_refs: Vec<&dyn ToSql> = values.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(params_refs.as_slice(), Post::from_row)
            .map_err(|e| e.to_string())?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())
    }

    fn post_count(&self, query: &PostQuery) -> Result<i64, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;

        let (filter, values) = post_filter(query);
        let sql = format!("SELECT COUNT(*) {}", filter);
        let params_refs: Vec<&dyn ToSql> = values.iter().map(|p| p.as_ref()).collect();

        conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))
            .map_err(|e| e.to_string())
    }

    fn post_find_by_slug(
        &self,
        language: &str,
        slug: &str,
        published_at: Option<&NaiveDateTime>,
    ) -> Result<Option<Post>, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;

        let mut sql = format!(
            "SELECT {} FROM posts p
             JOIN post_translations t ON t.post_id = p.id
             WHERE t.language = ?1 AND t.slug = ?2",
            Post::SELECT_COLS
        );
        let post = match published_at {
            Some(now) => {
                sql.push_str(
                    " AND p.publish = 1 AND p.date_published <= ?3
                      AND (p.date_published_end IS NULL OR p.date_published_end > ?3)",
                );
                conn.query_row(&sql, params![language, slug, now], Post::from_row)
            }
            None => conn.query_row(&sql, params![language, slug], Post::from_row),
        };

        post.optional().map_err(|e| e.to_string())
    }

    fn post_translations(&self, post_id: i64) -> Vec<Translation> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare(
            "SELECT language, slug FROM post_translations WHERE post_id = ?1 ORDER BY language",
        ) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![post_id], Translation::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn post_create(&self, form: &PostForm) -> Result<i64, String> {
        let mut conn = self.pool.get().map_err(|e| e.to_string())?;
        let tx = conn.transaction().map_err(|e| e.to_string())?;

        tx.execute(
            "INSERT INTO posts (namespace, author_id, publish, date_published, date_published_end, main_image)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                form.namespace,
                form.author_id,
                form.publish,
                form.date_published,
                form.date_published_end,
                form.main_image,
            ],
        )
        .map_err(|e| e.to_string())?;
        let id = tx.last_insert_rowid();

        for tr in &form.translations {
            let slug_str = if tr.slug.trim().is_empty() {
                slug::slugify(&tr.title)
            } else {
                tr.slug.clone()
            };
            tx.execute(
                "INSERT INTO post_translations
                    (post_id, language, title, slug, abstract_text, meta_title, meta_description, meta_keywords, post_text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id,
                    tr.language,
                    tr.title,
                    slug_str,
                    tr.abstract_text,
                    tr.meta_title,
                    tr.meta_description,
                    tr.meta_keywords,
                    tr.post_text,
                ],
            )
            .map_err(|e| e.to_string())?;
        }

        for category_id in &form.category_ids {
            tx.execute(
                "INSERT OR IGNORE INTO post_categories (post_id, category_id) VALUES (?1, ?2)",
                params![id, category_id],
            )
            .map_err(|e| e.to_string())?;
        }
        for tag_id in &form.tag_ids {
            tx.execute(
                "INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?1, ?2)",
                params![id, tag_id],
            )
            .map_err(|e| e.to_string())?;
        }

        tx.commit().map_err(|e| e.to_string())?;
        Ok(id)
    }

    // ── Categories ──────────────────────────────────────────────────

    fn category_active_by_slug(
        &self,
        languages: &[String],
        slug: &str,
    ) -> Result<Vec<Category>, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;

        let (translation, mut values) =
            preferred_translation("category_translations", "category_id", "c", languages);
        let marks = vec!["?"; languages.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM categories c
             JOIN category_translations ct ON ct.id = {}
             WHERE EXISTS (SELECT 1 FROM category_translations m
                           WHERE m.category_id = c.id AND m.language IN ({}) AND m.slug = ?)
             ORDER BY c.id",
            Category::SELECT_COLS,
            translation,
            marks
        );
        for language in languages {
            values.push(Box::new(language.clone()));
        }
        values.push(Box::new(slug.to_string()));

        let mut stmt = conn.prepare(&sql).map_err(|e| e.to_string())?;
        let params_refs: Vec<&dyn ToSql> = values.iter().map(|p| p.as_ref()).collect();
        let rows = stmt
            .query_map(params_refs.as_slice(), Category::from_row)
            .map_err(|e| e.to_string())?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())
    }

    fn category_for_post(&self, post_id: i64, language: &str) -> Vec<Category> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare(&format!(
            "SELECT {} FROM categories c
             JOIN category_translations ct ON ct.category_id = c.id AND ct.language = ?2
             JOIN post_categories pc ON pc.category_id = c.id
             WHERE pc.post_id = ?1
             ORDER BY ct.name",
            Category::SELECT_COLS
        )) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![post_id, language], Category::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn category_translations(&self, category_id: i64) -> Vec<Translation> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare(
            "SELECT language, slug FROM category_translations WHERE category_id = ?1 ORDER BY language",
        ) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![category_id], Translation::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn category_create(&self, form: &CategoryForm) -> Result<i64, String> {
        let mut conn = self.pool.get().map_err(|e| e.to_string())?;
        let tx = conn.transaction().map_err(|e| e.to_string())?;

        tx.execute(
            "INSERT INTO categories (namespace, parent_id) VALUES (?1, ?2)",
            params![form.namespace, form.parent_id],
        )
        .map_err(|e| e.to_string())?;
        let id = tx.last_insert_rowid();

        for tr in &form.translations {
            let slug_str = if tr.slug.trim().is_empty() {
                slug::slugify(&tr.name)
            } else {
                tr.slug.clone()
            };
            tx.execute(
                "INSERT INTO category_translations (category_id, language, name, slug)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, tr.language, tr.name, slug_str],
            )
            .map_err(|e| e.to_string())?;
        }

        tx.commit().map_err(|e| e.to_string())?;
        Ok(id)
    }

    // ── Tags ────────────────────────────────────────────────────────

    fn tag_find_by_slug(&self, slug: &str) -> Option<Tag> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM tags WHERE slug = ?1",
            params![slug],
            Tag::from_row,
        )
        .ok()
    }

    fn tag_for_post(&self, post_id: i64) -> Vec<Tag> {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare(
            "SELECT t.* FROM tags t
             JOIN post_tags pt ON pt.tag_id = t.id
             WHERE pt.post_id = ?1
             ORDER BY t.name",
        ) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![post_id], Tag::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn tag_create(&self, form: &TagForm) -> Result<i64, String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO tags (name, slug) VALUES (?1, ?2)",
            params![form.name, form.slug],
        )
        .map_err(|e| e.to_string())?;
        Ok(conn.last_insert_rowid())
    }
}
