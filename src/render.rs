use std::collections::HashMap;

use rocket::fairing::Fairing;
use rocket_dyn_templates::tera::{self, Value};
use rocket_dyn_templates::Template;

/// Template fairing with the blog's Tera filters registered.
pub fn fairing() -> impl Fairing {
    Template::custom(|engines| {
        engines.tera.register_filter("truncatewords", truncatewords_filter);
    })
}

/// Keep the first `count` words of `text`, appending an ellipsis when
/// anything was cut. A count of zero leaves the text untouched.
pub fn truncate_words(text: &str, count: usize) -> String {
    if count == 0 {
        return text.to_string();
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= count {
        return words.join(" ");
    }
    format!("{} …", words[..count].join(" "))
}

fn truncatewords_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = tera::try_get_value!("truncatewords", "value", String, value);
    let count = match args.get("count") {
        Some(c) => tera::try_get_value!("truncatewords", "count", usize, c),
        None => return Err(tera::Error::msg("Filter `truncatewords` expected an arg called `count`")),
    };
    Ok(Value::String(truncate_words(&text, count)))
}
