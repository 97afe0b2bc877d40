// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! MCP stdio servers for the Korean youth activity information API.
//!
//! Two servers share one JSON-RPC loop: a small test server (echo,
//! calculator, clock) and a wrapper around the public-data portal's youth
//! activity service that turns its XML responses into readable reports.

/// Configuration loading and validation.
pub mod config;
/// Error types for configuration, upstream calls and dispatch.
pub mod error;
/// Tool, resource and prompt dispatchers.
pub mod handler;
/// MCP server implementation and type definitions.
pub mod mcp;
/// Minimal XML to tree parser for API responses.
pub mod xml;
/// Youth activity API client and report formatting.
pub mod youth;
