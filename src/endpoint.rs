//! Builders for the remote-configuration API endpoints.
//!
//! The controller itself treats URLs as opaque strings; these helpers exist
//! for callers assembling the combine-content and catalog endpoints from
//! content identifiers.

use url::Url;
use url::form_urlencoded;

use crate::ConfetchResult;
use crate::error::Error;

/// Builds the combine-content URL for the given content identifiers.
///
/// Each identifier is percent-encoded, quoted, and comma-joined inside the
/// `c=[...]` query parameter; `dynamic=true` is always requested and
/// `responseType=serialized` is appended when `serialized` is set.
pub fn combine_content_url(
    api_base: &str,
    content_ids: &[&str],
    serialized: bool,
) -> ConfetchResult<String> {
    let mut id_list = String::from("[");
    for (index, content_id) in content_ids.iter().enumerate() {
        if index > 0 {
            id_list.push(',');
        }
        id_list.push('"');
        id_list.extend(form_urlencoded::byte_serialize(content_id.as_bytes()));
        id_list.push('"');
    }
    id_list.push(']');

    let mut url = parse_base(api_base, "api/v1/combine/")?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("c", &id_list);
        query.append_pair("dynamic", "true");
        if serialized {
            query.append_pair("responseType", "serialized");
        }
    }
    Ok(url.into())
}

/// Builds the environment catalog URL.
pub fn catalog_url(api_base: &str) -> ConfetchResult<String> {
    parse_base(api_base, "api/v1/env/catalog").map(Into::into)
}

fn parse_base(api_base: &str, path: &str) -> ConfetchResult<Url> {
    let base = api_base.trim_end_matches('/');
    Url::parse(&format!("{base}/{path}")).map_err(|_| Error::InvalidUrl {
        url: api_base.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::{catalog_url, combine_content_url};
    use crate::error::ErrorCode;

    const BASE: &str = "https://api.example.com";

    #[test]
    fn combine_url_quotes_and_joins_content_ids() {
        let url = combine_content_url(BASE, &["config.one", "config.two"], false)
            .expect("base should parse");
        assert_eq!(
            url,
            "https://api.example.com/api/v1/combine/?c=%5B%22config.one%22%2C%22config.two%22%5D&dynamic=true"
        );
    }

    #[test]
    fn combine_url_appends_the_serialized_flag() {
        let url = combine_content_url(BASE, &["cfg"], true).expect("base should parse");
        assert!(url.ends_with("&dynamic=true&responseType=serialized"));
    }

    #[test]
    fn combine_url_percent_encodes_each_identifier() {
        let url = combine_content_url(BASE, &["a b/c"], false).expect("base should parse");
        // Identifier encoding happens before the list itself is encoded as a
        // query value, so the separators arrive double-escaped.
        assert!(url.contains("c=%5B%22a%2Bb%252Fc%22%5D"));
    }

    #[test]
    fn catalog_url_targets_the_env_catalog() {
        assert_eq!(
            catalog_url("https://api.example.com/").expect("base should parse"),
            "https://api.example.com/api/v1/env/catalog"
        );
    }

    #[test]
    fn invalid_base_is_rejected() {
        let error = combine_content_url("not a base", &["cfg"], false)
            .expect_err("bad base should fail");
        assert_eq!(error.code(), ErrorCode::InvalidUrl);
    }
}
