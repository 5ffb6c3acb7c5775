use serde_json::{json, Map};

use crate::models::category::Category;
use crate::request::BlogRequest;
use crate::store::Store;
use crate::toolbar::ToolbarObject;

use super::list::{render_list, ListPage};
use super::query::base_queryset;
use super::{TemplateResponse, ViewEnv, ViewError, ViewSpec};

pub const CATEGORY_ENTRIES: ViewSpec = ViewSpec {
    name: "CategoryEntriesView",
    view_url_name: Some("posts-category"),
    base_template_name: "post_list",
};

/// The one category translated to `slug` in any of `languages`.
pub fn resolve_category(
    store: &dyn Store,
    languages: &[String],
    slug: &str,
) -> Result<Category, ViewError> {
    let mut found = store.category_active_by_slug(languages, slug)?;
    match found.len() {
        0 => Err(ViewError::NotFound(format!(
            "No category found matching the slug {:?}",
            slug
        ))),
        1 => Ok(found.remove(0)),
        n => Err(ViewError::MultipleFound(format!(
            "get() returned more than one category for slug {:?} -- it returned {}!",
            slug, n
        ))),
    }
}

/// Posts filed under the category with translated slug `category`.
pub fn category_entries(
    env: &ViewEnv,
    req: &mut BlogRequest,
    namespace: &str,
    category: &str,
) -> Result<TemplateResponse, ViewError> {
    let languages = env.settings.candidate_languages(&req.language);
    let category = resolve_category(env.store, &languages, category)?;

    if let Some(toolbar) = req.toolbar.as_mut() {
        let translations = env.store.category_translations(category.id);
        toolbar.set_object(ToolbarObject::category(&category, translations));
    }

    let config = env.store.app_config_find(namespace);
    let query = base_queryset(env, req, config.as_ref(), namespace).in_category(category.id);

    let url_args = vec![category.slug.clone()];
    let mut extra = Map::new();
    extra.insert("category".into(), json!(category));

    render_list(
        env,
        req,
        ListPage {
            spec: &CATEGORY_ENTRIES,
            namespace,
            config: config.as_ref(),
            query,
            url_args,
            extra,
        },
    )
}
