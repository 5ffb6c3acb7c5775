use crate::models::ContentType;
use crate::request::BlogRequest;

use super::ViewError;

/// AJAX pagination support for list views.
///
/// Every list page exposes a *page template* rendering only the paginated
/// fragment; the full-page template includes it. When a request is an AJAX
/// request for this list's pagination key, the fragment is rendered alone.
#[derive(Debug, Clone)]
pub struct AjaxList {
    /// Query parameter carrying the page number.
    pub key: String,
    /// Explicit fragment template; derived from the model when `None`.
    pub page_template: Option<String>,
    pub template_name_suffix: String,
    pub page_template_suffix: String,
}

impl Default for AjaxList {
    fn default() -> Self {
        AjaxList {
            key: "page".to_string(),
            page_template: None,
            template_name_suffix: "_list".to_string(),
            page_template_suffix: "_page".to_string(),
        }
    }
}

impl AjaxList {
    /// The fragment template, e.g. `blog/post_list_page` for a post list.
    pub fn page_template(&self, model: Option<ContentType>) -> Result<String, ViewError> {
        if let Some(ref explicit) = self.page_template {
            return Ok(explicit.clone());
        }
        let model = model.ok_or_else(|| {
            ViewError::ImproperlyConfigured("AjaxListMixin requires a page_template".to_string())
        })?;
        Ok(format!(
            "{}/{}{}{}",
            model.app_label,
            model.model_name.to_lowercase(),
            self.template_name_suffix,
            self.page_template_suffix
        ))
    }

    /// Template to render: the fragment for an AJAX request whose
    /// `querystring_key` (defaulting to our key) names this list, otherwise
    /// `default`.
    pub fn select(&self, req: &BlogRequest, page_template: &str, default: String) -> String {
        let querystring_key = req.query_param("querystring_key").unwrap_or(&self.key);
        if req.is_ajax && querystring_key == self.key {
            page_template.to_string()
        } else {
            default
        }
    }
}
