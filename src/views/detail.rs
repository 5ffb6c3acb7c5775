use serde_json::{json, Value};

use crate::models::post::Post;
use crate::request::BlogRequest;
use crate::seo;
use crate::toolbar::ToolbarObject;

use super::{common_context, post_json, template_name, TemplateResponse, ViewEnv, ViewError, ViewSpec};

pub const POST_DETAIL: ViewSpec = ViewSpec {
    name: "PostDetailView",
    view_url_name: Some("post-detail"),
    base_template_name: "post_detail",
};

/// Find a post by its slug in the request language, then in each fallback
/// language. Namespaces are not consulted; unpublished posts are skipped
/// outside edit mode.
pub fn find_post(env: &ViewEnv, req: &BlogRequest, slug: &str) -> Result<Option<Post>, ViewError> {
    let published_at = if req.edit_mode() { None } else { Some(&env.now) };

    for language in env.settings.candidate_languages(&req.language) {
        if let Some(post) = env.store.post_find_by_slug(&language, slug, published_at)? {
            return Ok(Some(post));
        }
    }
    Ok(None)
}

/// A single post.
pub fn post_detail(
    env: &ViewEnv,
    req: &mut BlogRequest,
    namespace: &str,
    slug: &str,
) -> Result<TemplateResponse, ViewError> {
    let post = find_post(env, req, slug)?
        .ok_or_else(|| ViewError::NotFound(format!("No post found matching the slug {:?}", slug)))?;

    if let Some(toolbar) = req.toolbar.as_mut() {
        let translations = env.store.post_translations(post.id);
        toolbar.set_object(ToolbarObject::post(&post, translations));
    }

    let config = env.store.app_config_find(namespace);
    let author = post.author_id.and_then(|id| env.store.user_find_by_id(id));
    let tags = env.store.tag_for_post(post.id);
    let categories = env.store.category_for_post(post.id, &post.language);
    let meta = seo::build_post_meta(env.settings, &post, author.as_ref(), &tags);

    let post_value = post_json(&post);
    req.set_attr(&env.settings.current_post_attr, post_value.clone());

    let mut context = common_context(env, req, &POST_DETAIL, namespace, &post.url_args())?;
    context.insert("post".into(), post_value);
    context.insert("meta".into(), json!(meta));
    context.insert("use_placeholder".into(), json!(env.settings.use_placeholder));
    context.insert("author".into(), json!(author));
    context.insert("tags".into(), json!(tags));
    context.insert("categories".into(), json!(categories));

    Ok(TemplateResponse {
        template: template_name(env, config.as_ref(), POST_DETAIL.base_template_name),
        context: Value::Object(context),
    })
}
