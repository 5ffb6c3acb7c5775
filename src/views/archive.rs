use chrono::NaiveDate;
use serde_json::{json, Map};

use crate::request::BlogRequest;

use super::list::{render_list, ListPage};
use super::query::base_queryset;
use super::{TemplateResponse, ViewEnv, ViewError, ViewSpec};

pub const POST_ARCHIVE: ViewSpec = ViewSpec {
    name: "PostArchiveView",
    view_url_name: Some("posts-archive"),
    base_template_name: "post_list",
};

/// Posts published in a year, or in one month of a year.
pub fn post_archive(
    env: &ViewEnv,
    req: &mut BlogRequest,
    namespace: &str,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<TemplateResponse, ViewError> {
    if let Some(m) = month {
        if !(1..=12).contains(&m) {
            return Err(ViewError::NotFound(format!("Invalid month: {}", m)));
        }
    }
    let archive_date = match year {
        Some(y) => Some(NaiveDate::from_ymd_opt(y, month.unwrap_or(1), 1).ok_or_else(|| {
            ViewError::NotFound(format!("Invalid archive date: {}-{}", y, month.unwrap_or(1)))
        })?),
        None => None,
    };

    let config = env.store.app_config_find(namespace);
    let mut query = base_queryset(env, req, config.as_ref(), namespace);
    if let Some(m) = month {
        query = query.month(m);
    }
    if let Some(y) = year {
        query = query.year(y);
    }

    let url_args: Vec<String> = year
        .map(|y| y.to_string())
        .into_iter()
        .chain(month.map(|m| m.to_string()))
        .collect();

    let mut extra = Map::new();
    extra.insert("year".into(), json!(year));
    extra.insert("month".into(), json!(month));
    if let Some(date) = archive_date {
        extra.insert("archive_date".into(), json!(date));
        extra.insert(
            "archive_date_display".into(),
            json!(date.format(if month.is_some() { "%B %Y" } else { "%Y" }).to_string()),
        );
    }

    render_list(
        env,
        req,
        ListPage {
            spec: &POST_ARCHIVE,
            namespace,
            config: config.as_ref(),
            query,
            url_args,
            extra,
        },
    )
}
