#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket::response::content::RawHtml;
use rocket::{Build, Rocket};

mod config;
mod db;
mod models;
mod render;
mod request;
mod routes;
mod seo;
mod store;
mod toolbar;
mod urls;
mod views;

#[cfg(test)]
mod tests;

use config::BlogSettings;
use store::sqlite::SqliteStore;
use store::Store;

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Internal server error.</p><a href='/'>← Home</a></body></html>".to_string())
}

/// Attach the blog to `rocket`: managed store and settings, templates,
/// routes and catchers. `/blog/<ns>/` and `/blog/<ns>` reach the same page.
pub fn mount_blog(rocket: Rocket<Build>, store: Arc<dyn Store>) -> Rocket<Build> {
    let settings = BlogSettings::load(store.as_ref());
    log::info!(
        "Blog languages: {} (default {})",
        settings.languages.join(", "),
        settings.default_language
    );

    rocket
        .manage(store)
        .manage(settings)
        .attach(render::fairing())
        .mount(urls::MOUNT, routes::blog::routes())
        .register("/", catchers![not_found, server_error])
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let db_path = std::env::var("INKPOST_DB").unwrap_or_else(|_| db::DEFAULT_DB_PATH.to_string());
    let store = SqliteStore::new_at(&db_path).expect("Failed to initialize database pool");
    store.run_migrations().expect("Failed to run database migrations");
    store.seed_defaults().expect("Failed to seed default settings");
    log::info!("Database ready at {}", db_path);

    eprintln!("Blog mounted at: {}", urls::MOUNT);

    mount_blog(rocket::build(), Arc::new(store))
}
