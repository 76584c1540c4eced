//! String helpers shared by the parsers and the rule engine.

/// Split `name[index]` into its name and index.
///
/// Whitespace is allowed around the index. Anything else, including a
/// missing or non-numeric index, is `None`.
#[must_use]
pub fn parse_array_string(text: Option<&str>) -> Option<(String, usize)> {
    let body = text?.strip_suffix(']')?;
    let open = body.rfind('[')?;
    let index = body[open + 1..].trim_matches(|c: char| c.is_ascii_whitespace());
    if index.is_empty() || !index.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let index = index.parse().ok()?;
    Some((body[..open].to_string(), index))
}

/// Join the `_`-separated words of `text` in camelCase.
///
/// `start` and `end` select a range of words before joining. Returns `None`
/// when the range is empty.
#[must_use]
pub fn snake_case_to_camel_case(text: &str, start: usize, end: Option<usize>) -> Option<String> {
    let words: Vec<&str> = text.split('_').collect();
    let end = end.unwrap_or(words.len()).min(words.len());
    let selected = words.get(start..end)?;
    let (first, rest) = selected.split_first()?;
    let mut out = (*first).to_string();
    for word in rest {
        let mut chars = word.chars();
        if let Some(head) = chars.next() {
            out.extend(head.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    Some(out)
}

#[must_use]
pub fn is_fully_qualified_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Join a directory prefix and a relative path with a single `/`.
#[must_use]
pub fn build_url(prefix: &str, path: &str) -> String {
    let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
    let path = path.strip_prefix("./").unwrap_or(path);
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{prefix}/{path}")
}

/// Directory part of a path or URL, without the trailing `/`.
#[must_use]
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |index| &path[..index])
}
