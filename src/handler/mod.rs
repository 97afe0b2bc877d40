// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Request dispatchers for the two servers.
//!
//! Each dispatcher parses the tool name into a request type first, so an
//! unknown name is a [`DispatchError`] while bad arguments and upstream
//! failures become soft failures (`isError: true`).

/// Echo, calculator and clock.
pub mod test_server;
/// Youth activity information tools.
pub mod youth;

pub use test_server::{Operation, TestServerHandler, TestToolRequest};
pub use youth::{YouthHandler, YouthToolRequest};

use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::{DispatchError, ToolError, ValidationError};
use crate::mcp::{CallToolResult, Prompt, PromptArgument, ReadResourceResult, Resource};

/// A fixed plain-text document.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StaticResource {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

impl StaticResource {
    fn to_resource(self) -> Resource {
        Resource {
            uri: self.uri.to_string(),
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            mime_type: Some("text/plain".to_string()),
        }
    }
}

pub(crate) fn list_resources(resources: &[StaticResource]) -> Vec<Resource> {
    resources.iter().map(|r| r.to_resource()).collect()
}

/// Looks up `uri` and renders its body with `body`.
pub(crate) fn read_resource(
    resources: &[StaticResource],
    uri: &str,
    body: impl FnOnce(&str) -> String,
) -> Result<ReadResourceResult, DispatchError> {
    resources
        .iter()
        .find(|r| r.uri == uri)
        .map(|r| ReadResourceResult::plain_text(r.uri, body(r.uri)))
        .ok_or_else(|| DispatchError::UnknownResource(uri.to_string()))
}

/// Prompt with at most one optional argument.
pub(crate) fn prompt(name: &str, description: &str, argument: Option<(&str, &str)>) -> Prompt {
    Prompt {
        name: name.to_string(),
        description: Some(description.to_string()),
        arguments: argument
            .map(|(name, description)| PromptArgument {
                name: name.to_string(),
                description: Some(description.to_string()),
                required: false,
            })
            .into_iter()
            .collect(),
    }
}

/// Reads a prompt argument, treating blank values as absent.
pub(crate) fn prompt_argument<'a>(
    arguments: &'a HashMap<String, String>,
    name: &str,
    default: &'a str,
) -> &'a str {
    arguments
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

/// Deserializes tool arguments; a missing object is treated as `{}`.
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    tool: &str,
    arguments: Option<serde_json::Value>,
) -> Result<T, ValidationError> {
    let value = arguments.unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
    serde_json::from_value(value).map_err(|e| ValidationError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

/// Turns a tool outcome into the soft-failure envelope.
pub(crate) fn into_call_result(outcome: Result<String, ToolError>) -> CallToolResult {
    match outcome {
        Ok(text) => CallToolResult::text(text),
        Err(e) => CallToolResult::error(format!("Error: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_prompt_argument_defaults_when_blank() {
        let mut args = HashMap::new();
        assert_eq!(prompt_argument(&args, "name", "user"), "user");

        args.insert("name".to_string(), "  ".to_string());
        assert_eq!(prompt_argument(&args, "name", "user"), "user");

        args.insert("name".to_string(), "Alice".to_string());
        assert_eq!(prompt_argument(&args, "name", "user"), "Alice");
    }

    #[test]
    fn test_into_call_result_marks_errors() {
        let ok = into_call_result(Ok("fine".to_string()));
        assert_eq!(ok.is_error, None);
        assert_eq!(ok.text_content(), "fine");

        let err = into_call_result(Err(ApiError::Upstream("NO_DATA".to_string()).into()));
        assert_eq!(err.is_error, Some(true));
        assert_eq!(err.text_content(), "Error: API error: NO_DATA");
    }

    #[test]
    fn test_parse_arguments_reports_tool() {
        #[derive(Debug, serde::Deserialize)]
        struct Args {
            #[expect(dead_code, reason = "only the shape matters here")]
            message: String,
        }

        let err = parse_arguments::<Args>("echo", None);
        assert!(matches!(
            err,
            Err(ValidationError::InvalidArguments { ref tool, ref reason })
                if tool == "echo" && reason.contains("message")
        ));
    }
}
