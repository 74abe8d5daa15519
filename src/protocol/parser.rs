//! Request parsing
//!
//! Turns loosely typed request input (query strings, multipart text fields,
//! headers) into the typed values the storage layer works with.

use axum::http::HeaderMap;
use axum::http::header::HOST;
use serde::Deserialize;

use crate::transfer::UploadTarget;

/// Query string accepted by the upload route.
#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    pub directory: Option<String>,
    pub folder: Option<String>,
    pub filename: Option<String>,
    pub name: Option<String>,
}

/// Query string of the list route.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub directory: Option<String>,
    pub folder: Option<String>,
}

impl ListQuery {
    pub fn directory(&self) -> &str {
        first_present([self.directory.as_deref(), self.folder.as_deref()]).unwrap_or("")
    }
}

/// Query string of the info and delete routes.
#[derive(Debug, Default, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

/// Optional upload fields from one source (body or query).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UploadFields {
    pub directory: Option<String>,
    pub desired_name: Option<String>,
}

impl UploadFields {
    pub fn from_query(query: &UploadQuery) -> Self {
        Self {
            directory: first_present([query.directory.as_deref(), query.folder.as_deref()])
                .map(str::to_string),
            desired_name: first_present([query.filename.as_deref(), query.name.as_deref()])
                .map(str::to_string),
        }
    }

    /// Records a multipart text field. Returns false for unknown fields.
    pub fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "directory" | "folder" => &mut self.directory,
            "filename" | "name" => &mut self.desired_name,
            _ => return false,
        };
        if slot.is_none() && is_present(&value) {
            *slot = Some(value);
        }
        true
    }

    /// Combines body and query fields; a body field wins over the query
    /// field of the same meaning.
    pub fn resolve(body: &UploadFields, query: &UploadFields, original_name: &str) -> UploadTarget {
        UploadTarget {
            directory: first_present([body.directory.as_deref(), query.directory.as_deref()])
                .unwrap_or("")
                .to_string(),
            desired_name: first_present([
                body.desired_name.as_deref(),
                query.desired_name.as_deref(),
            ])
            .map(str::to_string),
            original_name: original_name.to_string(),
        }
    }
}

fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

fn first_present<'a, const N: usize>(values: [Option<&'a str>; N]) -> Option<&'a str> {
    values.into_iter().flatten().find(|v| is_present(v))
}

/// Base URL objects are reachable under, `scheme://host` without a trailing
/// slash.
///
/// A configured public URL wins; otherwise the scheme and host the request
/// was observed with are used, honouring `X-Forwarded-*` from a proxy.
pub fn request_base_url(headers: &HeaderMap, public_url: Option<&str>, fallback_host: &str) -> String {
    if let Some(url) = public_url {
        return url.trim_end_matches('/').to_string();
    }

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let scheme = header("x-forwarded-proto").unwrap_or("http");
    let host = header("x-forwarded-host")
        .or_else(|| header(HOST.as_str()))
        .unwrap_or(fallback_host);

    format!("{scheme}://{host}")
}
