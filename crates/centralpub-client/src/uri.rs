//! Request URI construction relative to the publisher base URI.

use url::Url;

use crate::error::ClientError;

/// Join `key=value` pairs with `&`, in the given order.
///
/// Values are not escaped here; [`join`] hands the string to the URL parser,
/// which percent-encodes characters that are not valid in a query.
pub fn to_query_string(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Resolve `segment` against `base` and attach `query`.
///
/// Scheme, authority and the base sub-path are kept. `base` must end in `/`
/// for its last path segment to survive resolution.
pub fn join(base: &Url, segment: &str, query: Option<&str>) -> Result<Url, ClientError> {
    let mut resolved = base.join(segment).map_err(|e| ClientError::InvalidUri {
        message: format!("cannot resolve `{segment}` against {base}: {e}"),
    })?;
    resolved.set_query(query.filter(|q| !q.is_empty()));
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_keeps_insertion_order() {
        let query = to_query_string(&[("name", "demo"), ("publishingType", "AUTOMATIC")]);
        assert_eq!(query, "name=demo&publishingType=AUTOMATIC");
        assert_eq!(to_query_string(&[]), "");
    }

    #[test]
    fn join_preserves_base_sub_path() {
        let base = Url::parse("https://central.sonatype.com/api/v1/").unwrap();
        let uri = join(&base, "publisher/status", Some("id=abc")).unwrap();
        assert_eq!(
            uri.as_str(),
            "https://central.sonatype.com/api/v1/publisher/status?id=abc"
        );
    }

    #[test]
    fn join_without_query() {
        let base = Url::parse("http://localhost:8080/api/v1/").unwrap();
        let uri = join(&base, "publisher/deployment/abc", None).unwrap();
        assert_eq!(uri.as_str(), "http://localhost:8080/api/v1/publisher/deployment/abc");
        assert_eq!(uri.query(), None);
    }

    #[test]
    fn join_keeps_fragment_of_segment() {
        let base = Url::parse("https://example.com/api/").unwrap();
        let uri = join(&base, "publisher/status#top", Some("id=1")).unwrap();
        assert_eq!(uri.as_str(), "https://example.com/api/publisher/status?id=1#top");
    }

    #[test]
    fn base_without_trailing_slash_loses_last_segment() {
        let base = Url::parse("https://example.com/api/v1").unwrap();
        let uri = join(&base, "publisher/status", None).unwrap();
        assert_eq!(uri.path(), "/api/publisher/status");
    }

    #[test]
    fn query_with_space_is_encoded() {
        let base = Url::parse("https://example.com/").unwrap();
        let uri = join(&base, "publisher/upload", Some("name=my lib")).unwrap();
        assert_eq!(uri.query(), Some("name=my%20lib"));
    }
}
