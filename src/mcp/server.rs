// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! MCP server implementation.

use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::io::{BufRead, Write};
use tracing::{debug, error, info, trace, warn};

use super::types::{
    CallToolParams, CallToolResult, GetPromptParams, GetPromptResult, INTERNAL_ERROR,
    InitializeParams, InitializeResult, ListChangedCapability, ListPromptsResult,
    ListResourcesResult, ListToolsResult, METHOD_NOT_FOUND, Notification, PROTOCOL_VERSION,
    Prompt, ReadResourceParams, ReadResourceResult, Request, Resource, Response,
    ServerCapabilities, ServerInfo, Tool,
};
use crate::error::DispatchError;

/// Trait for answering MCP tool, resource and prompt requests.
///
/// Errors returned from these methods are protocol-level failures. Tool
/// failures that the caller should see as content belong in a
/// [`CallToolResult::error`] instead.
pub trait ServerHandler: Send + Sync {
    /// Name and version reported during `initialize`.
    fn server_info(&self) -> ServerInfo;

    /// Usage hints sent to the client during `initialize`.
    fn instructions(&self) -> Option<String> {
        None
    }

    /// Returns the list of available tools.
    fn list_tools(&self) -> Vec<Tool>;

    /// Handles a tool call and returns the result.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownTool`] if no tool has this name.
    fn call_tool(
        &self,
        name: &str,
        arguments: Option<serde_json::Value>,
    ) -> Result<CallToolResult, DispatchError>;

    /// Returns the list of readable resources.
    fn list_resources(&self) -> Vec<Resource> {
        Vec::new()
    }

    /// Reads one resource.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownResource`] if no resource has this URI.
    fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, DispatchError> {
        Err(DispatchError::UnknownResource(uri.to_string()))
    }

    /// Returns the list of prompt templates.
    fn list_prompts(&self) -> Vec<Prompt> {
        Vec::new()
    }

    /// Renders one prompt.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownPrompt`] if no prompt has this name.
    fn get_prompt(
        &self,
        name: &str,
        _arguments: &HashMap<String, String>,
    ) -> Result<GetPromptResult, DispatchError> {
        Err(DispatchError::UnknownPrompt(name.to_string()))
    }
}

/// MCP server that communicates over newline-delimited JSON-RPC.
pub struct McpServer<H: ServerHandler> {
    handler: H,
    initialized: bool,
}

impl<H: ServerHandler> McpServer<H> {
    /// Wraps a handler.
    pub const fn new(handler: H) -> Self {
        Self {
            handler,
            initialized: false,
        }
    }

    /// Runs the MCP server, reading from stdin and writing to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin cannot be read or stdout cannot be written.
    pub fn run(&mut self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Serves requests from `input` until it is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        info!("MCP server starting, waiting for requests on stdin");

        for line in input.lines() {
            let line = line.context("Failed to read from stdin")?;

            if line.trim().is_empty() {
                continue;
            }

            trace!("Received: {}", line);

            match self.handle_message(&line) {
                Ok(Some(response)) => {
                    write_response(&mut output, &response)?;
                }
                Ok(None) => {
                    // Notification, no response needed
                }
                Err(e) => {
                    error!("Error handling message: {:#}", e);
                    if let Ok(req) = serde_json::from_str::<Request>(&line) {
                        let response = Response::error(req.id, INTERNAL_ERROR, e.to_string());
                        write_response(&mut output, &response)?;
                    }
                }
            }
        }

        info!("MCP server shutting down (stdin closed)");
        Ok(())
    }

    fn handle_message(&mut self, line: &str) -> Result<Option<Response>> {
        if let Ok(request) = serde_json::from_str::<Request>(line) {
            let response = self.handle_request(request)?;
            return Ok(Some(response));
        }

        if let Ok(notification) = serde_json::from_str::<Notification>(line) {
            self.handle_notification(&notification);
            return Ok(None);
        }

        Err(anyhow!(
            "Failed to parse message as request or notification"
        ))
    }

    fn handle_request(&self, request: Request) -> Result<Response> {
        debug!("Handling request: {} (id={:?})", request.method, request.id);

        if !self.initialized && !matches!(request.method.as_str(), "initialize" | "ping") {
            debug!("{} received before notifications/initialized", request.method);
        }

        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => Ok(Response::success(request.id, serde_json::json!({}))?),
            "tools/list" => {
                let tools = self.handler.list_tools();
                debug!("Listing {} tools", tools.len());
                Ok(Response::success(request.id, ListToolsResult { tools })?)
            }
            "tools/call" => self.handle_tools_call(request),
            "resources/list" => {
                let resources = self.handler.list_resources();
                debug!("Listing {} resources", resources.len());
                Ok(Response::success(
                    request.id,
                    ListResourcesResult { resources },
                )?)
            }
            "resources/read" => self.handle_resources_read(request),
            "prompts/list" => {
                let prompts = self.handler.list_prompts();
                debug!("Listing {} prompts", prompts.len());
                Ok(Response::success(request.id, ListPromptsResult { prompts })?)
            }
            "prompts/get" => self.handle_prompts_get(request),
            _ => {
                warn!("Unknown method: {}", request.method);
                Ok(Response::error(
                    request.id,
                    METHOD_NOT_FOUND,
                    format!("Unknown method: {}", request.method),
                ))
            }
        }
    }

    fn handle_notification(&mut self, notification: &Notification) {
        debug!("Handling notification: {}", notification.method);

        match notification.method.as_str() {
            "notifications/initialized" => {
                info!("MCP client initialized");
                self.initialized = true;
            }
            "notifications/cancelled" => {
                debug!("Request cancelled");
            }
            _ => {
                debug!("Ignoring unknown notification: {}", notification.method);
            }
        }
    }

    fn handle_initialize(&self, request: Request) -> Result<Response> {
        let params: InitializeParams = parse_params(request.params, "initialize")?;

        info!(
            "MCP client connecting: {} v{}",
            params.client_info.name,
            params.client_info.version.as_deref().unwrap_or("unknown")
        );
        info!("Protocol version: {}", params.protocol_version);

        let has_resources = !self.handler.list_resources().is_empty();
        let has_prompts = !self.handler.list_prompts().is_empty();

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ListChangedCapability::default()),
                resources: has_resources.then(ListChangedCapability::default),
                prompts: has_prompts.then(ListChangedCapability::default),
            },
            server_info: self.handler.server_info(),
            instructions: self.handler.instructions(),
        };

        Ok(Response::success(request.id, result)?)
    }

    fn handle_tools_call(&self, request: Request) -> Result<Response> {
        let params: CallToolParams = parse_params(request.params, "tools/call")?;

        debug!("Calling tool: {}", params.name);

        match self.handler.call_tool(&params.name, params.arguments) {
            Ok(result) => {
                if result.is_error == Some(true) {
                    warn!("Tool {} failed: {}", params.name, result.text_content());
                }
                Ok(Response::success(request.id, result)?)
            }
            Err(e) => {
                warn!("Rejected tool call: {}", e);
                Ok(Response::error(request.id, e.code(), e.to_string()))
            }
        }
    }

    fn handle_resources_read(&self, request: Request) -> Result<Response> {
        let params: ReadResourceParams = parse_params(request.params, "resources/read")?;

        debug!("Reading resource: {}", params.uri);

        match self.handler.read_resource(&params.uri) {
            Ok(result) => Ok(Response::success(request.id, result)?),
            Err(e) => {
                warn!("Rejected resource read: {}", e);
                Ok(Response::error(request.id, e.code(), e.to_string()))
            }
        }
    }

    fn handle_prompts_get(&self, request: Request) -> Result<Response> {
        let params: GetPromptParams = parse_params(request.params, "prompts/get")?;
        let arguments = params.arguments.unwrap_or_default();

        debug!("Getting prompt: {}", params.name);

        match self.handler.get_prompt(&params.name, &arguments) {
            Ok(result) => Ok(Response::success(request.id, result)?),
            Err(e) => {
                warn!("Rejected prompt request: {}", e);
                Ok(Response::error(request.id, e.code(), e.to_string()))
            }
        }
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(
    params: Option<serde_json::Value>,
    method: &str,
) -> Result<T> {
    params
        .map(serde_json::from_value)
        .transpose()
        .with_context(|| format!("Invalid {method} params"))?
        .ok_or_else(|| anyhow!("Missing {method} params"))
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> Result<()> {
    let response_json = serde_json::to_string(response)?;
    trace!("Sending: {}", response_json);
    writeln!(output, "{response_json}").context("Failed to write to stdout")?;
    output.flush().context("Failed to flush stdout")?;
    Ok(())
}
