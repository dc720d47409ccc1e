use std::borrow::Cow;

use url::form_urlencoded;

/// Browser location split into the three parts the router reads.
///
/// `hash` is stored without the leading `#` and query pairs are already
/// percent-decoded. The search and fragment text are also kept as received so
/// [`Location::href`] writes back exactly what the address bar showed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub hash: String,
    raw_search: String,
    raw_hash: String,
}

impl Location {
    /// Parses either a root-relative reference (`/article/x?y=1#z`) or an
    /// absolute URL. Never fails; unparseable input becomes a bare path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.contains("://") {
            if let Ok(url) = url::Url::parse(trimmed) {
                return Self::from_parts(
                    url.path(),
                    url.query().unwrap_or_default(),
                    url.fragment().unwrap_or_default(),
                );
            }
        }

        let (before_hash, hash) = trimmed.split_once('#').unwrap_or((trimmed, ""));
        let (path, query) = before_hash.split_once('?').unwrap_or((before_hash, ""));
        Self::from_parts(path, query, hash)
    }

    /// Builds a location from `window.location` style parts. Leading `?` and
    /// `#` markers are accepted and stripped.
    pub fn from_parts(path: &str, search: &str, hash: &str) -> Self {
        let path = path.trim();
        let path = if path.is_empty() {
            "/".to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        let search = search.trim().trim_start_matches('?');
        let query = form_urlencoded::parse(search.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        let hash = hash.trim().trim_start_matches('#');

        Self {
            path,
            query,
            hash: decode_component(hash).into_owned(),
            raw_search: search.to_string(),
            raw_hash: hash.to_string(),
        }
    }

    /// True when `name` appears in the query, with or without a value.
    pub fn query_flag(&self, name: &str) -> bool {
        self.query.iter().any(|(key, _)| key == name)
    }

    /// First non-blank value for `name`.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.trim())
            .find(|value| !value.is_empty())
    }

    /// Path, search and fragment as received; bare flags and escapes are not
    /// re-serialized.
    pub fn href(&self) -> String {
        let mut href = self.path.clone();
        if !self.raw_search.is_empty() {
            href.push('?');
            href.push_str(&self.raw_search);
        }
        if !self.raw_hash.is_empty() {
            href.push('#');
            href.push_str(&self.raw_hash);
        }
        href
    }
}

/// Percent-decodes one path segment or fragment, keeping the raw text when the
/// escape sequence is invalid.
pub fn decode_component(raw: &str) -> Cow<'_, str> {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(raw),
    }
}

pub fn encode_component(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}
