use serde_json::{json, Map};

use crate::request::BlogRequest;

use super::list::{render_list, ListPage};
use super::query::base_queryset;
use super::{TemplateResponse, ViewEnv, ViewError, ViewSpec};

pub const AUTHOR_ENTRIES: ViewSpec = ViewSpec {
    name: "AuthorEntriesView",
    view_url_name: Some("posts-author"),
    base_template_name: "post_list",
};

/// Posts written by the user named `username`.
pub fn author_entries(
    env: &ViewEnv,
    req: &mut BlogRequest,
    namespace: &str,
    username: &str,
) -> Result<TemplateResponse, ViewError> {
    let config = env.store.app_config_find(namespace);
    let query = base_queryset(env, req, config.as_ref(), namespace).by_author(username);

    let author = env
        .store
        .user_find_by_username(username)
        .ok_or_else(|| ViewError::NotFound(format!("No user matching {:?}", username)))?;

    let mut extra = Map::new();
    extra.insert("author".into(), json!(author));
    extra.insert("author_name".into(), json!(author.full_name()));

    render_list(
        env,
        req,
        ListPage {
            spec: &AUTHOR_ENTRIES,
            namespace,
            config: config.as_ref(),
            query,
            url_args: vec![username.to_string()],
            extra,
        },
    )
}
