use chrono::NaiveDateTime;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::ContentType;

/// A post resolved in exactly one language: the shared row plus the fields
/// of the translation matching `language`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    pub id: i64,
    pub namespace: String,
    pub author_id: Option<i64>,
    pub publish: bool,
    pub date_published: NaiveDateTime,
    pub date_published_end: Option<NaiveDateTime>,
    pub date_created: NaiveDateTime,
    pub date_modified: NaiveDateTime,
    pub main_image: Option<String>,
    pub enable_comments: bool,
    pub language: String,
    pub title: String,
    pub slug: String,
    pub abstract_text: String,
    pub meta_title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub post_text: String,
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub namespace: String,
    pub author_id: Option<i64>,
    pub publish: bool,
    pub date_published: NaiveDateTime,
    pub date_published_end: Option<NaiveDateTime>,
    pub main_image: Option<String>,
    pub translations: Vec<PostTranslationForm>,
    pub category_ids: Vec<i64>,
    pub tag_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PostTranslationForm {
    pub language: String,
    pub title: String,
    /// Generated from `title` when empty.
    pub slug: String,
    pub abstract_text: String,
    pub meta_title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub post_text: String,
}

impl Post {
    pub const CONTENT_TYPE: ContentType = ContentType {
        app_label: "blog",
        model_name: "post",
    };

    pub const SELECT_COLS: &'static str = "p.id, p.namespace, p.author_id, p.publish, \
         p.date_published, p.date_published_end, p.date_created, p.date_modified, \
         p.main_image, p.enable_comments, t.language, t.title, t.slug, t.abstract_text, \
         t.meta_title, t.meta_description, t.meta_keywords, t.post_text";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Post {
            id: row.get("id")?,
            namespace: row.get("namespace")?,
            author_id: row.get("author_id")?,
            publish: row.get("publish")?,
            date_published: row.get("date_published")?,
            date_published_end: row.get("date_published_end")?,
            date_created: row.get("date_created")?,
            date_modified: row.get("date_modified")?,
            main_image: row.get("main_image")?,
            enable_comments: row.get("enable_comments")?,
            language: row.get("language")?,
            title: row.get("title")?,
            slug: row.get("slug")?,
            abstract_text: row.get("abstract_text")?,
            meta_title: row.get("meta_title")?,
            meta_description: row.get("meta_description")?,
            meta_keywords: row.get("meta_keywords")?,
            post_text: row.get("post_text")?,
        })
    }

    /// Whether a visitor outside edit mode may see this post at `now`.
    pub fn is_published(&self, now: &NaiveDateTime) -> bool {
        self.publish
            && self.date_published <= *now
            && self.date_published_end.map_or(true, |end| end > *now)
    }

    /// Path arguments of the detail route: year, month, day, slug.
    pub fn url_args(&self) -> Vec<String> {
        vec![
            self.date_published.format("%Y").to_string(),
            self.date_published.format("%m").to_string(),
            self.date_published.format("%d").to_string(),
            self.slug.clone(),
        ]
    }
}

/// A lazily evaluated, filterable set of posts.
///
/// Nothing touches the database until a `Store` evaluates the query with
/// `post_list` or `post_count`; the narrowing methods only record filters.
#[derive(Debug, Clone, PartialEq)]
pub struct PostQuery {
    /// Acceptable translation languages, most preferred first. Each post is
    /// resolved in the first of these it has a translation for.
    pub languages: Vec<String>,
    pub namespace: Option<String>,
    /// When set, only posts published at this instant are matched.
    pub published_at: Option<NaiveDateTime>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub tag_slug: Option<String>,
    pub category_id: Option<i64>,
    pub author_username: Option<String>,
}

impl PostQuery {
    /// All posts with an active translation in `language`.
    pub fn new(language: &str) -> Self {
        PostQuery {
            languages: vec![language.to_string()],
            namespace: None,
            published_at: None,
            year: None,
            month: None,
            tag_slug: None,
            category_id: None,
            author_username: None,
        }
    }

    pub fn model(&self) -> ContentType {
        Post::CONTENT_TYPE
    }

    /// Also accept translations in `languages`, after those already set.
    pub fn fallbacks(mut self, languages: &[String]) -> Self {
        for language in languages {
            if !self.languages.contains(language) {
                self.languages.push(language.clone());
            }
        }
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    pub fn published(mut self, now: NaiveDateTime) -> Self {
        self.published_at = Some(now);
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn tagged(mut self, slug: &str) -> Self {
        self.tag_slug = Some(slug.to_string());
        self
    }

    pub fn in_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn by_author(mut self, username: &str) -> Self {
        self.author_username = Some(username.to_string());
        self
    }
}
