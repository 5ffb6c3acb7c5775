use serde_json::Value;

use crate::models::app_config::AppConfig;
use crate::models::post::PostQuery;
use crate::request::BlogRequest;

use super::ViewEnv;

/// Base post query shared by every list view: posts of `namespace` with a
/// translation in the request language or one of its fallbacks, restricted
/// to published posts unless the request is in edit mode.
///
/// Also stashes the resolved app-configuration on the request so templates
/// can reach it.
pub fn base_queryset(
    env: &ViewEnv,
    req: &mut BlogRequest,
    config: Option<&AppConfig>,
    namespace: &str,
) -> PostQuery {
    let mut query = PostQuery::new(&req.language)
        .fallbacks(&env.settings.language_fallbacks)
        .namespace(namespace);
    if !req.edit_mode() {
        query = query.published(env.now);
    }

    let stashed = serde_json::to_value(config).unwrap_or(Value::Null);
    req.set_attr(&env.settings.current_namespace_attr, stashed);

    query
}
