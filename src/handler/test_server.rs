// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Echo, calculator and clock tools for exercising MCP clients.

use chrono::{Local, SecondsFormat, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::{StaticResource, into_call_result, parse_arguments, prompt, prompt_argument};
use crate::error::{DispatchError, ToolError, ValidationError};
use crate::mcp::{
    CallToolResult, GetPromptResult, Prompt, ReadResourceResult, Resource, ServerHandler,
    ServerInfo, Tool,
};

const SERVER_NAME: &str = "mcp-test-server";

const RESOURCES: &[StaticResource] = &[
    StaticResource {
        uri: "test://info",
        name: "Server info",
        description: "Basic information about the MCP test server",
    },
    StaticResource {
        uri: "test://greeting",
        name: "Greeting",
        description: "Welcome message",
    },
];

/// Arithmetic operators supported by `calculate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`, rejected when `b` is zero.
    Divide,
}

impl Operation {
    /// Name as accepted in the `operation` argument.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }

    /// Applies the operator.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DivisionByZero`] for a zero divisor.
    pub fn apply(self, a: f64, b: f64) -> Result<f64, ValidationError> {
        match self {
            Self::Add => Ok(a + b),
            Self::Subtract => Ok(a - b),
            Self::Multiply => Ok(a * b),
            Self::Divide if b == 0.0 => Err(ValidationError::DivisionByZero),
            Self::Divide => Ok(a / b),
        }
    }
}

impl FromStr for Operation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "subtract" => Ok(Self::Subtract),
            "multiply" => Ok(Self::Multiply),
            "divide" => Ok(Self::Divide),
            other => Err(ValidationError::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct EchoArgs {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CalculateArgs {
    operation: String,
    a: f64,
    b: f64,
}

/// A validated test server tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum TestToolRequest {
    /// Return the message.
    Echo {
        /// Text to echo.
        message: String,
    },
    /// Apply an arithmetic operator.
    Calculate {
        /// Operator.
        operation: Operation,
        /// Left operand.
        a: f64,
        /// Right operand.
        b: f64,
    },
    /// Report the current time.
    GetTime,
}

impl TestToolRequest {
    /// Parses a `tools/call` into a request.
    ///
    /// The outer error means the tool does not exist; the inner one means
    /// its arguments were rejected.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownTool`] if no tool has this name.
    pub fn from_call(
        name: &str,
        arguments: Option<serde_json::Value>,
    ) -> Result<Result<Self, ValidationError>, DispatchError> {
        let request = match name {
            "echo" => parse_arguments::<EchoArgs>(name, arguments)
                .map(|args| Self::Echo { message: args.message }),
            "calculate" => parse_arguments::<CalculateArgs>(name, arguments).and_then(|args| {
                Ok(Self::Calculate {
                    operation: args.operation.parse()?,
                    a: args.a,
                    b: args.b,
                })
            }),
            "get_time" => Ok(Self::GetTime),
            _ => return Err(DispatchError::UnknownTool(name.to_string())),
        };
        Ok(request)
    }
}

/// Handler for the test server: echo, calculator and clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestServerHandler;

impl TestServerHandler {
    /// Creates the handler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn run(request: TestToolRequest) -> Result<String, ToolError> {
        match request {
            TestToolRequest::Echo { message } => Ok(format!("Echo: {message}")),
            TestToolRequest::Calculate { operation, a, b } => {
                let result = operation.apply(a, b)?;
                Ok(format!("{a} {operation} {b} = {result}"))
            }
            TestToolRequest::GetTime => {
                let utc = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
                let local = Local::now().format("%Y-%m-%d %H:%M:%S");
                Ok(format!("Current time (UTC): {utc}\nLocal time: {local}"))
            }
        }
    }
}

impl ServerHandler for TestServerHandler {
    fn server_info(&self) -> ServerInfo {
        ServerInfo {
            name: SERVER_NAME.to_string(),
            version: Some(env!("YOUTH_MCP_VERSION").to_string()),
        }
    }

    fn list_tools(&self) -> Vec<Tool> {
        vec![
            Tool {
                name: "echo".to_string(),
                description: Some("Return the given message unchanged.".to_string()),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "message": { "type": "string", "description": "Message to echo back" }
                    },
                    "required": ["message"]
                }),
            },
            Tool {
                name: "calculate".to_string(),
                description: Some(
                    "Perform simple arithmetic (add, subtract, multiply, divide).".to_string(),
                ),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "operation": {
                            "type": "string",
                            "enum": ["add", "subtract", "multiply", "divide"],
                            "description": "Operation to perform"
                        },
                        "a": { "type": "number", "description": "First operand" },
                        "b": { "type": "number", "description": "Second operand" }
                    },
                    "required": ["operation", "a", "b"]
                }),
            },
            Tool {
                name: "get_time".to_string(),
                description: Some("Return the current time.".to_string()),
                input_schema: serde_json::json!({ "type": "object", "properties": {} }),
            },
        ]
    }

    fn call_tool(
        &self,
        name: &str,
        arguments: Option<serde_json::Value>,
    ) -> Result<CallToolResult, DispatchError> {
        let request = TestToolRequest::from_call(name, arguments)?;
        debug!("Test tool request: {:?}", request);
        Ok(into_call_result(
            request.map_err(ToolError::from).and_then(Self::run),
        ))
    }

    fn list_resources(&self) -> Vec<Resource> {
        super::list_resources(RESOURCES)
    }

    fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, DispatchError> {
        super::read_resource(RESOURCES, uri, |uri| match uri {
            "test://info" => format!(
                "MCP test server {}\n\n\
                 This server exercises the basic features of the Model Context Protocol.\n\n\
                 Features:\n\
                 - Tools: echo, calculate, get_time\n\
                 - Resources: info, greeting\n\
                 - Prompts: welcome, help",
                env!("YOUTH_MCP_VERSION")
            ),
            _ => "Hello! Welcome to the MCP test server. \
                  This server demonstrates the basic features of the MCP protocol."
                .to_string(),
        })
    }

    fn list_prompts(&self) -> Vec<Prompt> {
        vec![
            prompt("welcome", "Greets the user", Some(("name", "User name"))),
            prompt("help", "Explains how to use this server", None),
        ]
    }

    fn get_prompt(
        &self,
        name: &str,
        arguments: &HashMap<String, String>,
    ) -> Result<GetPromptResult, DispatchError> {
        match name {
            "welcome" => {
                let user = prompt_argument(arguments, "name", "user");
                Ok(GetPromptResult::user_text(
                    "Greets the user",
                    format!(
                        "Welcome to the MCP test server, {user}!\n\n\
                         This server provides:\n\
                         - Message echo\n\
                         - A simple calculator\n\
                         - The current time\n\
                         - Server info and greeting resources\n\n\
                         How can I help you?"
                    ),
                ))
            }
            "help" => Ok(GetPromptResult::user_text(
                "Explains how to use this server",
                "MCP test server guide\n\n\
                 Tools:\n\
                 1. echo - return a message unchanged\n\
                 2. calculate - arithmetic (add, subtract, multiply, divide)\n\
                 3. get_time - current time\n\n\
                 Resources:\n\
                 1. test://info - server information\n\
                 2. test://greeting - welcome message\n\n\
                 Prompts:\n\
                 1. welcome - welcome message\n\
                 2. help - this guide",
            )),
            _ => Err(DispatchError::UnknownPrompt(name.to_string())),
        }
    }
}
