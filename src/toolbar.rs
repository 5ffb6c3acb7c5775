use serde::Serialize;

use crate::config::BlogSettings;
use crate::models::category::Category;
use crate::models::post::Post;
use crate::models::Translation;
use crate::urls;

/// The object a page is about, as far as the editing toolbar cares: enough
/// to link every translation of it.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolbarObject {
    Post {
        id: i64,
        namespace: String,
        /// Year, month and day segments of the detail URL.
        date_args: [String; 3],
        translations: Vec<Translation>,
    },
    Category {
        id: i64,
        namespace: String,
        translations: Vec<Translation>,
    },
}

impl ToolbarObject {
    pub fn post(post: &Post, translations: Vec<Translation>) -> Self {
        let args = post.url_args();
        ToolbarObject::Post {
            id: post.id,
            namespace: post.namespace.clone(),
            date_args: [args[0].clone(), args[1].clone(), args[2].clone()],
            translations,
        }
    }

    pub fn category(category: &Category, translations: Vec<Translation>) -> Self {
        ToolbarObject::Category {
            id: category.id,
            namespace: category.namespace.clone(),
            translations,
        }
    }

    fn translations(&self) -> &[Translation] {
        match self {
            ToolbarObject::Post { translations, .. } => translations,
            ToolbarObject::Category { translations, .. } => translations,
        }
    }

    fn path_for(&self, translation: &Translation) -> Option<String> {
        match self {
            ToolbarObject::Post {
                namespace,
                date_args,
                ..
            } => {
                let mut args = date_args.to_vec();
                args.push(translation.slug.clone());
                urls::reverse("post-detail", namespace, &args)
            }
            ToolbarObject::Category { namespace, .. } => {
                urls::reverse("posts-category", namespace, &[translation.slug.clone()])
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LanguageLink {
    pub language: String,
    pub url: String,
}

/// Per-request state of the in-page editing toolbar.
///
/// Requests without a toolbar are never in edit mode.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Toolbar {
    pub edit_mode: bool,
    pub object: Option<ToolbarObject>,
}

impl Toolbar {
    pub fn new(edit_mode: bool) -> Self {
        Toolbar {
            edit_mode,
            object: None,
        }
    }

    /// Tell the toolbar which object the page renders, so the language
    /// switcher can point at its translations.
    pub fn set_object(&mut self, object: ToolbarObject) {
        self.object = Some(object);
    }

    /// Links to the current page in every configured language. With an
    /// object set, only languages the object is translated into are listed,
    /// each pointing at that translation's slug; otherwise `fallback_url` is
    /// used for every language.
    pub fn language_links(&self, settings: &BlogSettings, fallback_url: &str) -> Vec<LanguageLink> {
        settings
            .languages
            .iter()
            .filter_map(|language| {
                let url = match self.object {
                    Some(ref object) => {
                        let tr = object
                            .translations()
                            .iter()
                            .find(|t| &t.language == language)?;
                        urls::absolute(&settings.site_url, &object.path_for(tr)?)
                    }
                    None => fallback_url.to_string(),
                };
                Some(LanguageLink {
                    language: language.clone(),
                    url: urls::with_language(&url, language),
                })
            })
            .collect()
    }

    pub fn context(&self, settings: &BlogSettings, view_url: &str) -> serde_json::Value {
        serde_json::json!({
            "edit_mode": self.edit_mode,
            "object": self.object,
            "language_links": self.language_links(settings, view_url),
        })
    }
}
