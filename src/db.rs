use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::config;

pub type DbPool = Pool<SqliteConnectionManager>;

pub const DEFAULT_DB_PATH: &str = "website/db/inkpost.db";

pub fn init_pool_at(path: &str) -> Result<DbPool, String> {
    if let Some(dir) = Path::new(path).parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
            log::info!("Created database directory: {}", dir.display());
        }
    }

    let manager = SqliteConnectionManager::file(path);
    let pool = Pool::builder()
        .max_size(10)
        .build(manager)
        .map_err(|e| e.to_string())?;

    // Enable WAL mode for better concurrent read performance
    let conn = pool.get().map_err(|e| e.to_string())?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .map_err(|e| e.to_string())?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- Per-namespace app configuration
        CREATE TABLE IF NOT EXISTS app_configs (
            id INTEGER PRIMARY KEY,
            namespace TEXT UNIQUE NOT NULL,
            template_prefix TEXT,
            paginate_by INTEGER
        );

        -- Authors
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            email TEXT NOT NULL DEFAULT '',
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT ''
        );

        -- Blog posts (language-independent fields)
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY,
            namespace TEXT NOT NULL,
            author_id INTEGER,
            publish INTEGER NOT NULL DEFAULT 0,
            date_published DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            date_published_end DATETIME,
            date_created DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            date_modified DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            main_image TEXT,
            enable_comments INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE SET NULL
        );

        -- Post translations, one per language
        CREATE TABLE IF NOT EXISTS post_translations (
            id INTEGER PRIMARY KEY,
            post_id INTEGER NOT NULL,
            language TEXT NOT NULL,
            title TEXT NOT NULL,
            slug TEXT NOT NULL,
            abstract_text TEXT NOT NULL DEFAULT '',
            meta_title TEXT NOT NULL DEFAULT '',
            meta_description TEXT NOT NULL DEFAULT '',
            meta_keywords TEXT NOT NULL DEFAULT '',
            post_text TEXT NOT NULL DEFAULT '',
            FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
            UNIQUE(post_id, language),
            UNIQUE(language, slug)
        );

        -- Categories
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY,
            namespace TEXT NOT NULL,
            parent_id INTEGER,
            FOREIGN KEY (parent_id) REFERENCES categories(id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS category_translations (
            id INTEGER PRIMARY KEY,
            category_id INTEGER NOT NULL,
            language TEXT NOT NULL,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE,
            UNIQUE(category_id, language)
        );

        -- Tags
        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT UNIQUE NOT NULL
        );

        -- Many-to-many: posts <-> categories
        CREATE TABLE IF NOT EXISTS post_categories (
            post_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            UNIQUE(post_id, category_id)
        );

        -- Many-to-many: posts <-> tags
        CREATE TABLE IF NOT EXISTS post_tags (
            post_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            UNIQUE(post_id, tag_id)
        );

        -- Settings (key-value)
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_posts_namespace ON posts(namespace);
        CREATE INDEX IF NOT EXISTS idx_posts_published ON posts(date_published);
        CREATE INDEX IF NOT EXISTS idx_post_translations_lang ON post_translations(language, post_id);
        CREATE INDEX IF NOT EXISTS idx_category_translations_slug ON category_translations(language, slug);
        ",
    )?;

    Ok(())
}

pub fn seed_defaults(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    for (key, value) in config::defaults() {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }

    Ok(())
}
