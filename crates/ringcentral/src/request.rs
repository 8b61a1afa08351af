//! Outbound request description
//!
//! A `Request` names an endpoint, its query parameters and an optional body.
//! It carries no HTTP verb and no credentials: the platform method it is
//! passed to decides the verb and attaches the authorization header.

use reqwest::Method;
use url::Url;

use crate::error::{Error, Result};

/// How the request body is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `application/x-www-form-urlencoded`
    Form,
    /// `application/json`
    Json,
    /// `multipart/form-data`, encoded by the transport
    Multipart,
}

/// One field of a multipart body.
#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Part {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_name: None,
            content_type: None,
            data: value.into().into_bytes(),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            file_name: Some(file_name.into()),
            content_type: Some(content_type.into()),
            data,
        }
    }
}

#[derive(Debug, Clone)]
enum Body {
    Empty,
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
    Multipart(Vec<Part>),
}

/// Serialized body ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// A REST call against one endpoint.
#[derive(Debug, Clone)]
pub struct Request {
    endpoint: String,
    query: Vec<(String, String)>,
    body: Body,
    method_override: Option<Method>,
}

impl Request {
    /// `endpoint` is a path such as `/restapi/v1.0/account/~`, resolved
    /// against the API base URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: Body::Empty,
            method_override: None,
        }
    }

    /// Append a query parameter. Order is preserved.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Use a form-encoded body made of `pairs`, in order.
    pub fn form<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Body::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Body::Json(value);
        self
    }

    /// Use a JSON body given as text. The text must parse as JSON.
    pub fn json_str(self, text: &str) -> Result<Self> {
        let value = serde_json::from_str(text)
            .map_err(|e| Error::InvalidRequest(format!("request body is not JSON: {e}")))?;
        Ok(self.json(value))
    }

    /// Add a multipart field, switching the body to multipart if needed.
    pub fn part(mut self, part: Part) -> Self {
        match &mut self.body {
            Body::Multipart(parts) => parts.push(part),
            body => *body = Body::Multipart(vec![part]),
        }
        self
    }

    /// Ask the server to treat a POST or PUT as `method`
    /// (`X-HTTP-Method-Override`).
    pub fn method_override(mut self, method: Method) -> Self {
        self.method_override = Some(method);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn override_method(&self) -> Option<&Method> {
        self.method_override.as_ref()
    }

    pub fn content_kind(&self) -> Option<ContentKind> {
        match self.body {
            Body::Empty => None,
            Body::Form(_) => Some(ContentKind::Form),
            Body::Json(_) => Some(ContentKind::Json),
            Body::Multipart(_) => Some(ContentKind::Multipart),
        }
    }

    /// Absolute URL of this request under `base`, query pairs appended.
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.join(&self.endpoint).map_err(|e| {
            Error::InvalidRequest(format!("invalid endpoint {:?}: {e}", self.endpoint))
        })?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }

    /// Form and JSON bodies serialized to bytes.
    ///
    /// Returns `None` for an empty body and for multipart bodies, which are
    /// encoded by the transport (see `multipart_form`).
    pub fn encoded_body(&self) -> Result<Option<EncodedBody>> {
        match &self.body {
            Body::Empty | Body::Multipart(_) => Ok(None),
            Body::Form(pairs) => Ok(Some(EncodedBody {
                content_type: "application/x-www-form-urlencoded",
                bytes: encode_form(pairs).into_bytes(),
            })),
            Body::Json(value) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|e| Error::InvalidRequest(format!("serializing JSON body: {e}")))?;
                Ok(Some(EncodedBody {
                    content_type: "application/json",
                    bytes,
                }))
            }
        }
    }

    /// Multipart body, if this request has one.
    pub(crate) fn multipart_form(&self) -> Result<Option<reqwest::multipart::Form>> {
        let Body::Multipart(parts) = &self.body else {
            return Ok(None);
        };
        let mut form = reqwest::multipart::Form::new();
        for part in parts {
            let mut field = reqwest::multipart::Part::bytes(part.data.clone());
            if let Some(file_name) = &part.file_name {
                field = field.file_name(file_name.clone());
            }
            if let Some(content_type) = &part.content_type {
                field = field.mime_str(content_type).map_err(|e| {
                    Error::InvalidRequest(format!(
                        "invalid content type {content_type:?} for part {}: {e}",
                        part.name
                    ))
                })?;
            }
            form = form.part(part.name.clone(), field);
        }
        Ok(Some(form))
    }
}

/// `application/x-www-form-urlencoded` serialization of `pairs`, in order.
pub fn encode_form(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
