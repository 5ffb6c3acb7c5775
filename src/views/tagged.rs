use serde_json::{json, Map};

use crate::request::BlogRequest;

use super::list::{render_list, ListPage};
use super::query::base_queryset;
use super::{TemplateResponse, ViewEnv, ViewError, ViewSpec};

pub const TAGGED_LIST: ViewSpec = ViewSpec {
    name: "TaggedListView",
    view_url_name: Some("posts-tagged"),
    base_template_name: "post_list",
};

/// Posts carrying the tag with slug `tag`.
pub fn tagged_list(
    env: &ViewEnv,
    req: &mut BlogRequest,
    namespace: &str,
    tag: &str,
) -> Result<TemplateResponse, ViewError> {
    let config = env.store.app_config_find(namespace);
    let query = base_queryset(env, req, config.as_ref(), namespace).tagged(tag);

    let tag_obj = env
        .store
        .tag_find_by_slug(tag)
        .ok_or_else(|| ViewError::NotFound(format!("No tag found matching the slug {:?}", tag)))?;

    let mut extra = Map::new();
    extra.insert("tag".into(), json!(tag_obj));
    extra.insert("tagged_entries".into(), json!(tag));

    render_list(
        env,
        req,
        ListPage {
            spec: &TAGGED_LIST,
            namespace,
            config: config.as_ref(),
            query,
            url_args: vec![tag.to_string()],
            extra,
        },
    )
}
