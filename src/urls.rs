use url::Url;

/// Mount point of the blog routes.
pub const MOUNT: &str = "/blog";

/// Reverse a named blog route for `namespace`. Returns `None` when the name is
/// unknown or the argument count does not fit any pattern of that name.
pub fn reverse(name: &str, namespace: &str, args: &[String]) -> Option<String> {
    let path = match (name, args) {
        ("posts-latest", []) => format!("{}/{}", MOUNT, namespace),
        ("posts-archive", [year]) => format!("{}/{}/{}", MOUNT, namespace, year),
        ("posts-archive", [year, month]) => {
            format!("{}/{}/{}/{}", MOUNT, namespace, year, month)
        }
        ("posts-author", [username]) => format!("{}/{}/author/{}", MOUNT, namespace, username),
        ("posts-category", [category]) => {
            format!("{}/{}/category/{}", MOUNT, namespace, category)
        }
        ("posts-tagged", [tag]) => format!("{}/{}/tag/{}", MOUNT, namespace, tag),
        ("post-detail", [year, month, day, slug]) => {
            format!("{}/{}/{}/{}/{}/{}", MOUNT, namespace, year, month, day, slug)
        }
        _ => return None,
    };
    Some(path)
}

/// Join `path` onto the site URL. Falls back to the bare path when the site
/// URL does not parse.
pub fn absolute(site_url: &str, path: &str) -> String {
    match Url::parse(site_url).and_then(|base| base.join(path)) {
        Ok(u) => u.to_string(),
        Err(e) => {
            log::warn!("Invalid site_url {:?}: {}", site_url, e);
            path.to_string()
        }
    }
}

/// Add `language=<code>` to an absolute URL, replacing any existing value.
pub fn with_language(url: &str, language: &str) -> String {
    with_query(url, &[("language", language)])
}

/// Set `pairs` on the query of an absolute URL. Existing values of those
/// keys are dropped; other pairs are kept in place.
pub fn with_query(url: &str, pairs: &[(&str, &str)]) -> String {
    match Url::parse(url) {
        Ok(mut u) => {
            let kept: Vec<(String, String)> = u
                .query_pairs()
                .filter(|(k, _)| !pairs.iter().any(|(key, _)| k == key))
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            u.query_pairs_mut()
                .clear()
                .extend_pairs(kept)
                .extend_pairs(pairs.iter().copied());
            u.to_string()
        }
        Err(_) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs.iter().copied())
                .finish();
            format!("{}?{}", url, query)
        }
    }
}
