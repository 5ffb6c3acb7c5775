use serde_json::{json, Map, Value};

use crate::models::app_config::AppConfig;
use crate::models::post::PostQuery;
use crate::request::BlogRequest;
use crate::urls;

use super::ajax::AjaxList;
use super::paginate::{paginate, resolve_per_page};
use super::query::base_queryset;
use super::{common_context, post_json, template_name, TemplateResponse, ViewEnv, ViewError, ViewSpec};

pub const POST_LIST: ViewSpec = ViewSpec {
    name: "PostListView",
    view_url_name: Some("posts-latest"),
    base_template_name: "post_list",
};

/// Inputs of one paginated post list page.
pub(crate) struct ListPage<'a> {
    pub spec: &'a ViewSpec,
    pub namespace: &'a str,
    pub config: Option<&'a AppConfig>,
    pub query: PostQuery,
    /// Path arguments of the page's own route.
    pub url_args: Vec<String>,
    /// View specific context entries.
    pub extra: Map<String, Value>,
}

/// Paginate, pick the template and assemble the context of a list page.
pub(crate) fn render_list(
    env: &ViewEnv,
    req: &BlogRequest,
    page: ListPage,
) -> Result<TemplateResponse, ViewError> {
    let ajax = AjaxList::default();
    let per_page = resolve_per_page(page.config, env.settings);
    let (current, posts) = paginate(env.store, &page.query, per_page, req.query_param(&ajax.key))?;

    let page_template = ajax.page_template(Some(page.query.model()))?;
    let template = ajax.select(
        req,
        &page_template,
        template_name(env, page.config, page.spec.base_template_name),
    );

    let mut context = page.extra;
    context.extend(common_context(env, req, page.spec, page.namespace, &page.url_args)?);
    let view_url = context
        .get("view_url")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    context.insert(
        "post_list".into(),
        Value::Array(posts.iter().map(post_json).collect()),
    );
    context.insert("paginator".into(), current.paginator_context());
    context.insert("page_obj".into(), current.page_context());
    context.insert(
        "is_paginated".into(),
        json!(current.has_next() || current.has_previous()),
    );
    context.insert(
        "page_links".into(),
        json!({
            "previous": current
                .has_previous()
                .then(|| page_link(&view_url, req, &ajax.key, current.number - 1)),
            "next": current
                .has_next()
                .then(|| page_link(&view_url, req, &ajax.key, current.number + 1)),
        }),
    );
    context.insert("page_template".into(), Value::String(page_template));
    context.insert(
        "TRUNCWORDS_COUNT".into(),
        json!(env.settings.posts_list_truncwords_count),
    );

    log::debug!(
        "{} {}: page {}/{} ({} posts)",
        page.spec.name,
        page.namespace,
        current.number,
        current.num_pages,
        current.count
    );

    Ok(TemplateResponse {
        template,
        context: Value::Object(context),
    })
}

/// URL of page `number` of the current list. Keeps the request's other
/// query parameters and pins the resolved language.
fn page_link(view_url: &str, req: &BlogRequest, key: &str, number: i64) -> String {
    let number = number.to_string();
    let mut pairs: Vec<(&str, &str)> = req
        .query
        .iter()
        .filter(|(k, _)| k.as_str() != key && k.as_str() != "language")
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    pairs.sort();
    pairs.push(("language", req.language.as_str()));
    pairs.push((key, number.as_str()));
    urls::with_query(view_url, &pairs)
}

/// Latest posts of a namespace.
pub fn post_list(
    env: &ViewEnv,
    req: &mut BlogRequest,
    namespace: &str,
) -> Result<TemplateResponse, ViewError> {
    let config = env.store.app_config_find(namespace);
    let query = base_queryset(env, req, config.as_ref(), namespace);

    render_list(
        env,
        req,
        ListPage {
            spec: &POST_LIST,
            namespace,
            config: config.as_ref(),
            query,
            url_args: vec![],
            extra: Map::new(),
        },
    )
}
