use std::collections::BTreeMap;

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, Uri};
use serde::Deserialize;

use crate::ConfetchResult;
use crate::error::Error;
use crate::transport::{PreparedRequest, RequestBody};

/// Attempts permitted per request unless the caller raises the limit.
pub const DEFAULT_ATTEMPT_LIMIT: u32 = 1;

/// The request shapes the controller understands.
///
/// GET carries no body; POST carries a UTF-8 body with a caller-supplied
/// content type attached to the upload payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post { body: String, content_type: String },
}

impl RequestMethod {
    pub fn http_method(&self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post { .. } => Method::POST,
        }
    }
}

/// Immutable description of one desired HTTP call.
///
/// Built either through the constructors below or by converting a
/// deserialized [`RequestOptions`] map. The executor validates it into a
/// [`PreparedRequest`] before any exchange starts.
#[derive(Clone, Debug)]
pub struct RequestConfig {
    url: String,
    method: RequestMethod,
    headers: BTreeMap<String, String>,
    auto_start: bool,
    attempt_limit: u32,
}

impl RequestConfig {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, RequestMethod::Get)
    }

    pub fn post(
        url: impl Into<String>,
        body: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self::new(
            url,
            RequestMethod::Post {
                body: body.into(),
                content_type: content_type.into(),
            },
        )
    }

    fn new(url: impl Into<String>, method: RequestMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: BTreeMap::new(),
            auto_start: false,
            attempt_limit: DEFAULT_ATTEMPT_LIMIT,
        }
    }

    /// Adds one header; a repeated name replaces the earlier value so the
    /// mapping keeps unique keys.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Begin polling immediately on construction instead of waiting for an
    /// explicit `start`.
    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    pub fn attempt_limit(mut self, attempt_limit: u32) -> Self {
        self.attempt_limit = attempt_limit.max(1);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &RequestMethod {
        &self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn is_auto_start(&self) -> bool {
        self.auto_start
    }

    pub fn attempt_limit_value(&self) -> u32 {
        self.attempt_limit
    }

    /// Validates the configuration into a ready-to-send request.
    ///
    /// The URL must parse as an absolute http/https URI and every configured
    /// header must be a well-formed name/value pair; any failure aborts
    /// configuration and no exchange is ever created.
    pub(crate) fn prepare(&self) -> ConfetchResult<PreparedRequest> {
        let uri: Uri = self.url.parse().map_err(|_| Error::InvalidUrl {
            url: self.url.clone(),
        })?;
        if uri.scheme_str().is_none() || uri.host().is_none() {
            return Err(Error::InvalidUrl {
                url: self.url.clone(),
            });
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name: HeaderName = name.parse().map_err(|source| Error::InvalidHeaderName {
                name: name.clone(),
                source,
            })?;
            let value: HeaderValue =
                value.parse().map_err(|source| Error::InvalidHeaderValue {
                    name: name.as_str().to_owned(),
                    source,
                })?;
            headers.insert(name, value);
        }

        let body = match &self.method {
            RequestMethod::Get => None,
            RequestMethod::Post { body, content_type } => Some(RequestBody {
                bytes: Bytes::from(body.clone().into_bytes()),
                content_type: content_type.clone(),
            }),
        };

        Ok(PreparedRequest {
            method: self.method.http_method(),
            uri,
            url: self.url.clone(),
            headers,
            body,
        })
    }
}

fn default_attempt_limit() -> u32 {
    DEFAULT_ATTEMPT_LIMIT
}

/// The recognized option map, as accepted from serialized caller input.
///
/// ```json
/// {
///   "url": "https://api.example.com/v1/combine",
///   "requestType": "POST",
///   "headers": {"x-api-key": "secret"},
///   "autoStart": true,
///   "requestBody": "{\"k\":\"v\"}",
///   "contentType": "application/json",
///   "attemptLimit": 3
/// }
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    pub url: String,
    pub request_type: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub auto_start: bool,
    #[serde(default)]
    pub request_body: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default = "default_attempt_limit")]
    pub attempt_limit: u32,
}

impl TryFrom<RequestOptions> for RequestConfig {
    type Error = Error;

    fn try_from(options: RequestOptions) -> ConfetchResult<Self> {
        let method = match options.request_type.to_ascii_uppercase().as_str() {
            "GET" => RequestMethod::Get,
            "POST" => RequestMethod::Post {
                body: options
                    .request_body
                    .ok_or(Error::MissingPostField {
                        field: "requestBody",
                    })?,
                content_type: options.content_type.ok_or(Error::MissingPostField {
                    field: "contentType",
                })?,
            },
            other => {
                return Err(Error::UnsupportedRequestType {
                    requested: other.to_owned(),
                });
            }
        };

        Ok(Self {
            url: options.url,
            method,
            headers: options.headers,
            auto_start: options.auto_start,
            attempt_limit: options.attempt_limit.max(1),
        })
    }
}
