use std::sync::Arc;

use rocket::State;
use rocket_dyn_templates::Template;

use crate::config::BlogSettings;
use crate::request::BlogRequest;
use crate::store::Store;
use crate::views::{self, ViewEnv, ViewError};

// Static segments outrank the archive routes, whose `<year>` would
// otherwise collide with `author`, `category` and `tag`.

// ── Latest posts ───────────────────────────────────────

#[get("/<namespace>", rank = 1)]
pub fn posts_latest(
    store: &State<Arc<dyn Store>>,
    settings: &State<BlogSettings>,
    mut req: BlogRequest,
    namespace: &str,
) -> Result<Template, ViewError> {
    let env = ViewEnv::new(store.inner().as_ref(), settings.inner());
    views::list::post_list(&env, &mut req, namespace).map(|r| r.into_template())
}

// ── Archives ──────────────────────────────────────────

#[get("/<namespace>/<year>", rank = 3)]
pub fn posts_archive_year(
    store: &State<Arc<dyn Store>>,
    settings: &State<BlogSettings>,
    mut req: BlogRequest,
    namespace: &str,
    year: i32,
) -> Result<Template, ViewError> {
    let env = ViewEnv::new(store.inner().as_ref(), settings.inner());
    views::archive::post_archive(&env, &mut req, namespace, Some(year), None)
        .map(|r| r.into_template())
}

#[get("/<namespace>/<year>/<month>", rank = 3)]
pub fn posts_archive_month(
    store: &State<Arc<dyn Store>>,
    settings: &State<BlogSettings>,
    mut req: BlogRequest,
    namespace: &str,
    year: i32,
    month: u32,
) -> Result<Template, ViewError> {
    let env = ViewEnv::new(store.inner().as_ref(), settings.inner());
    views::archive::post_archive(&env, &mut req, namespace, Some(year), Some(month))
        .map(|r| r.into_template())
}

// ── Author / category / tag ───────────────────────────

#[get("/<namespace>/author/<username>", rank = 1)]
pub fn posts_author(
    store: &State<Arc<dyn Store>>,
    settings: &State<BlogSettings>,
    mut req: BlogRequest,
    namespace: &str,
    username: &str,
) -> Result<Template, ViewError> {
    let env = ViewEnv::new(store.inner().as_ref(), settings.inner());
    views::author::author_entries(&env, &mut req, namespace, username).map(|r| r.into_template())
}

#[get("/<namespace>/category/<category>", rank = 1)]
pub fn posts_category(
    store: &State<Arc<dyn Store>>,
    settings: &State<BlogSettings>,
    mut req: BlogRequest,
    namespace: &str,
    category: &str,
) -> Result<Template, ViewError> {
    let env = ViewEnv::new(store.inner().as_ref(), settings.inner());
    views::category::category_entries(&env, &mut req, namespace, category)
        .map(|r| r.into_template())
}

#[get("/<namespace>/tag/<tag>", rank = 1)]
pub fn posts_tagged(
    store: &State<Arc<dyn Store>>,
    settings: &State<BlogSettings>,
    mut req: BlogRequest,
    namespace: &str,
    tag: &str,
) -> Result<Template, ViewError> {
    let env = ViewEnv::new(store.inner().as_ref(), settings.inner());
    views::tagged::tagged_list(&env, &mut req, namespace, tag).map(|r| r.into_template())
}

// ── Single post ───────────────────────────────────────

/// Date segments only shape the URL; the post is found by slug alone.
#[get("/<namespace>/<_>/<_>/<_>/<slug>", rank = 1)]
pub fn post_detail(
    store: &State<Arc<dyn Store>>,
    settings: &State<BlogSettings>,
    mut req: BlogRequest,
    namespace: &str,
    slug: &str,
) -> Result<Template, ViewError> {
    let env = ViewEnv::new(store.inner().as_ref(), settings.inner());
    views::detail::post_detail(&env, &mut req, namespace, slug).map(|r| r.into_template())
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        posts_latest,
        posts_archive_year,
        posts_archive_month,
        posts_author,
        posts_category,
        posts_tagged,
        post_detail,
    ]
}
