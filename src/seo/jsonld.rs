use serde_json::{json, Value};

use super::meta::PostMeta;

/// Build schema.org `BlogPosting` structured data for a post page
pub fn build_post_jsonld(meta: &PostMeta) -> Value {
    let mut ld = json!({
        "@context": "https://schema.org",
        "@type": "BlogPosting",
        "headline": meta.title,
        "description": meta.description,
        "url": meta.url,
        "inLanguage": meta.locale,
        "datePublished": meta.published_time,
        "dateModified": meta.modified_time,
        "keywords": meta.keywords.join(", "),
        "publisher": {
            "@type": "Organization",
            "name": meta.site_name,
        },
    });

    if let Some(ref author) = meta.author {
        ld["author"] = json!({ "@type": "Person", "name": author });
    }
    if let Some(ref image) = meta.image {
        ld["image"] = json!(image);
    }

    ld
}
