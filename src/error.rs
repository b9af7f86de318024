use http::Method;
use thiserror::Error;

/// Stable machine-readable codes for [`Error`] variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCode {
    InvalidUrl,
    InvalidHeaderName,
    InvalidHeaderValue,
    UnsupportedRequestType,
    MissingPostField,
    Issue,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::InvalidHeaderName => "invalid_header_name",
            Self::InvalidHeaderValue => "invalid_header_value",
            Self::UnsupportedRequestType => "unsupported_request_type",
            Self::MissingPostField => "missing_post_field",
            Self::Issue => "issue",
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid request url: {url}")]
    InvalidUrl { url: String },
    #[error("invalid header name {name}: {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },
    #[error("invalid header value for {name}: {source}")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },
    #[error("unsupported request type: {requested}")]
    UnsupportedRequestType { requested: String },
    #[error("post request options are missing {field}")]
    MissingPostField { field: &'static str },
    #[error("transport failed to issue {method} {url}: {message}")]
    Issue {
        method: Method,
        url: String,
        message: String,
    },
}

impl Error {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidUrl { .. } => ErrorCode::InvalidUrl,
            Self::InvalidHeaderName { .. } => ErrorCode::InvalidHeaderName,
            Self::InvalidHeaderValue { .. } => ErrorCode::InvalidHeaderValue,
            Self::UnsupportedRequestType { .. } => ErrorCode::UnsupportedRequestType,
            Self::MissingPostField { .. } => ErrorCode::MissingPostField,
            Self::Issue { .. } => ErrorCode::Issue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorCode};

    #[test]
    fn codes_map_to_stable_strings() {
        let error = Error::InvalidUrl {
            url: "not a url".to_owned(),
        };
        assert_eq!(error.code(), ErrorCode::InvalidUrl);
        assert_eq!(error.code().as_str(), "invalid_url");
    }

    #[test]
    fn display_includes_the_offending_url() {
        let error = Error::InvalidUrl {
            url: "::bad::".to_owned(),
        };
        assert_eq!(error.to_string(), "invalid request url: ::bad::");
    }
}
