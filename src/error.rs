// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Error taxonomy shared by the API client, the dispatchers and the binaries.

use thiserror::Error;

use crate::mcp::INVALID_PARAMS;
use crate::xml::XmlError;

/// Fatal configuration problems detected before any request is served.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No service key was supplied through the environment or a config file.
    #[error(
        "missing service key: set YOUTH_API_SERVICE_KEY or `service_key` in the config file"
    )]
    MissingServiceKey,

    /// The configured base URL is not an absolute http(s) URL.
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The per-call timeout must be at least one second.
    #[error("timeout must be at least 1 second")]
    InvalidTimeout,

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Failures raised while talking to the upstream public-data API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure, timeout or a non-success HTTP status.
    #[error("API request failed: {message}{}", body_suffix(.body))]
    Transport {
        /// Description of the underlying failure.
        message: String,
        /// Raw response body, when the server answered at all.
        body: Option<String>,
    },

    /// The response body was not well-formed XML.
    #[error("failed to parse XML response: {0}")]
    Parse(#[from] XmlError),

    /// The envelope carried a result code other than `"00"`.
    #[error("API error: {0}")]
    Upstream(String),

    /// The document parsed but did not have the expected envelope shape.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref()
        .filter(|b| !b.is_empty())
        .map(|b| format!(" - {b}"))
        .unwrap_or_default()
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            format!("request timed out ({e})")
        } else {
            e.to_string()
        };
        Self::Transport {
            message,
            body: None,
        }
    }
}

/// A tool argument was missing, mistyped or semantically invalid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Arguments did not match the tool's declared shape.
    #[error("invalid arguments for `{tool}`: {reason}")]
    InvalidArguments {
        /// Tool name.
        tool: String,
        /// Deserializer message.
        reason: String,
    },

    /// A required string argument was present but blank.
    #[error("`{0}` must not be empty")]
    EmptyField(&'static str),

    /// Arithmetic operator outside the supported set.
    #[error("Unknown operation: {0}")]
    UnknownOperator(String),

    /// Division with a zero divisor.
    #[error("Division by zero is not allowed")]
    DivisionByZero,

    /// Pagination values must be at least 1.
    #[error("`{0}` must be at least 1")]
    NotPositive(&'static str),

    /// A date filter was not a valid `YYYYMMDD` calendar date.
    #[error("`{field}` must be a date in YYYYMMDD form, got `{value}`")]
    InvalidDate {
        /// Argument name.
        field: &'static str,
        /// Rejected value.
        value: String,
    },

    /// `startDate` falls after `endDate`.
    #[error("startDate `{start}` is after endDate `{end}`")]
    InvertedDateRange {
        /// Start of the range.
        start: String,
        /// End of the range.
        end: String,
    },
}

/// Any failure inside a tool invocation. Rendered as a soft failure.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Bad input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Upstream call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Unknown tool, resource or prompt. Propagated as a protocol-level error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// No tool with this name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// No resource with this URI.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// No prompt with this name.
    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),
}

impl DispatchError {
    /// JSON-RPC error code used when this error reaches the transport.
    #[must_use]
    pub const fn code(&self) -> i64 {
        INVALID_PARAMS
    }
}
