pub mod jsonld;
pub mod meta;

// Re-export commonly used functions
pub use jsonld::build_post_jsonld;
pub use meta::{build_post_meta, PostMeta};

/// Drop HTML tags, keeping their text content, and collapse whitespace.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
