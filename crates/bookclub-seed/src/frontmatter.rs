use serde_yaml::Value;
use tracing::warn;

/// Metadata read from a `description.md` front-matter block. Fields are
/// type-lenient: a missing or oddly typed value falls back to the default
/// instead of failing the whole import.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BookMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub is_bookclub: bool,
    pub writer: Option<String>,
    pub author: Option<String>,
    pub rating: Option<f64>,
}

impl BookMeta {
    fn from_value(value: Value) -> Self {
        let Value::Mapping(map) = value else {
            return BookMeta::default();
        };
        let mut meta = BookMeta::default();
        for (key, value) in map {
            let Value::String(key) = key else { continue };
            match key.as_str() {
                "title" => meta.title = string_value(value),
                "description" => meta.description = string_value(value),
                "genres" => {
                    if let Value::Sequence(items) = value {
                        meta.genres = items.into_iter().filter_map(string_value).collect();
                    }
                }
                // anything but a literal boolean true does not count
                "is_bookclub" => meta.is_bookclub = matches!(value, Value::Bool(true)),
                "writer" => meta.writer = string_value(value),
                "author" => meta.author = string_value(value),
                "rating" => meta.rating = number_value(value),
                _ => {}
            }
        }
        meta
    }
}

fn string_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number_value(value: Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Splits a text into its front-matter metadata and body. Pure function,
/// no filesystem involved. A document without a leading `---` fence (or
/// with an unterminated one) has empty metadata and the whole text as body.
pub fn parse_metadata(text: &str) -> (BookMeta, String) {
    match split_front_matter(text) {
        Some((header, body)) => {
            let meta = match serde_yaml::from_str::<Value>(header) {
                Ok(value) => BookMeta::from_value(value),
                Err(e) => {
                    warn!("Ignoring malformed front-matter: {e}");
                    BookMeta::default()
                }
            };
            (meta, body.to_string())
        }
        None => (BookMeta::default(), text.to_string()),
    }
}

fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }
    let header_start = first.len();
    let mut pos = header_start;
    for line in lines {
        if line.trim_end() == "---" {
            let header = &text[header_start..pos];
            let body = &text[pos + line.len()..];
            return Some((header, body));
        }
        pos += line.len();
    }
    None
}
