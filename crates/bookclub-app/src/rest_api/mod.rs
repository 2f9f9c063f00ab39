pub mod book;
pub mod comment;
pub mod genre;
pub mod system;

/// Form and query flags arrive as strings; only these spellings count as true.
pub(crate) fn flag(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true") | Some("1") | Some("on"))
}
