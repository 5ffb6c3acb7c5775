use serde::Serialize;
use serde_json::Value;

use crate::config::BlogSettings;
use crate::models::post::Post;
use crate::models::tag::Tag;
use crate::models::user::User;
use crate::urls;

use super::{build_post_jsonld, strip_tags};

/// Structured metadata of a post page (title, description, Open Graph and
/// article fields), rendered by the detail template's `<head>`.
#[derive(Debug, Clone, Serialize)]
pub struct PostMeta {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub url: String,
    pub image: Option<String>,
    pub locale: String,
    pub site_name: String,
    pub object_type: &'static str,
    pub published_time: String,
    pub modified_time: String,
    pub expiration_time: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub jsonld: Value,
}

/// Build metadata for a post page
pub fn build_post_meta(
    settings: &BlogSettings,
    post: &Post,
    author: Option<&User>,
    tags: &[Tag],
) -> PostMeta {
    let title = if post.meta_title.trim().is_empty() {
        post.title.clone()
    } else {
        post.meta_title.clone()
    };
    let description = if post.meta_description.trim().is_empty() {
        strip_tags(&post.abstract_text)
    } else {
        post.meta_description.clone()
    };

    let mut keywords: Vec<String> = post
        .meta_keywords
        .split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    for tag in tags {
        if !keywords.iter().any(|k| k.eq_ignore_ascii_case(&tag.name)) {
            keywords.push(tag.name.clone());
        }
    }

    let path = urls::reverse("post-detail", &post.namespace, &post.url_args()).unwrap_or_default();
    let url = urls::absolute(&settings.site_url, &path);
    let image = post
        .main_image
        .as_deref()
        .filter(|i| !i.is_empty())
        .map(|i| urls::absolute(&settings.site_url, i));

    let mut meta = PostMeta {
        title,
        description,
        keywords,
        url,
        image,
        locale: post.language.clone(),
        site_name: settings.site_name.clone(),
        object_type: "Article",
        published_time: post.date_published.format("%Y-%m-%dT%H:%M:%S").to_string(),
        modified_time: post.date_modified.format("%Y-%m-%dT%H:%M:%S").to_string(),
        expiration_time: post
            .date_published_end
            .map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string()),
        author: author.map(User::full_name),
        tags: tags.iter().map(|t| t.name.clone()).collect(),
        jsonld: Value::Null,
    };
    meta.jsonld = build_post_jsonld(&meta);
    meta
}
