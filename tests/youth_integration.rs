// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! End-to-end tests for the youth server against a mock upstream API.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACTIVITIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
  <header><resultCode>00</resultCode><resultMsg>NORMAL SERVICE.</resultMsg></header>
  <body>
    <items>
      <item>
        <actTitle>여름 과학 캠프</actTitle>
        <organNm>서울청소년센터</organNm>
        <actBeginDt>20250701</actBeginDt>
        <actEndDt>20250705</actEndDt>
      </item>
    </items>
    <numOfRows>10</numOfRows>
    <pageNo>1</pageNo>
    <totalCount>1</totalCount>
  </body>
</response>"#;

struct YouthProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    _config_home: tempfile::TempDir,
}

impl YouthProcess {
    fn spawn(base_url: &str) -> Result<Self> {
        let config_home = tempfile::tempdir()?;
        let mut child = Command::new(env!("CARGO_BIN_EXE_youth-activity-mcp"))
            .env("XDG_CONFIG_HOME", config_home.path())
            .env("YOUTH_API_SERVICE_KEY", "integration-key")
            .env("YOUTH_API_BASE_URL", base_url)
            .env_remove("YOUTH_API_TIMEOUT_SECS")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .context("Failed to spawn youth-activity-mcp")?;

        let stdin = child.stdin.take().context("Failed to get stdin")?;
        let stdout = BufReader::new(child.stdout.take().context("Failed to get stdout")?);

        let mut process = Self {
            child,
            stdin,
            stdout,
            _config_home: config_home,
        };
        let init = process.request(
            0,
            "initialize",
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "integration-test", "version": "1.0.0" }
            }),
        )?;
        assert!(init.get("result").is_some(), "Initialize failed: {init:?}");
        Ok(process)
    }

    fn request(&mut self, id: i64, method: &str, params: Value) -> Result<Value> {
        let message = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        writeln!(self.stdin, "{message}").context("Failed to write to stdin")?;
        self.stdin.flush().context("Failed to flush stdin")?;

        let mut line = String::new();
        self.stdout
            .read_line(&mut line)
            .context("Failed to read from stdout")?;
        serde_json::from_str(&line).context("Failed to parse JSON response")
    }

    fn call(&mut self, id: i64, name: &str, arguments: Value) -> Result<Value> {
        self.request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
    }
}

impl Drop for YouthProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn text_of(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_default()
}

#[test]
fn test_search_activities_end_to_end() -> Result<()> {
    let rt = Runtime::new()?;
    let upstream = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/getJtvtsProgrmList"))
            .and(query_param("serviceKey", "integration-key"))
            .and(query_param("sido", "서울"))
            .and(query_param("numOfRows", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ACTIVITIES))
            .expect(1)
            .mount(&upstream),
    );

    let mut server = YouthProcess::spawn(&upstream.uri())?;
    let response = server.call(1, "search_activities", json!({ "sido": "서울" }))?;

    assert!(response["result"].get("isError").is_none(), "{response:?}");
    let text = text_of(&response);
    assert!(text.starts_with("Youth activities: 1 total (page 1, 10 per page)"));
    assert!(text.contains("1. 여름 과학 캠프"));
    assert!(text.contains("Period: 2025-07-01 ~ 2025-07-05"));

    drop(server);
    rt.block_on(upstream.verify());
    Ok(())
}

#[test]
fn test_upstream_failure_is_soft() -> Result<()> {
    let rt = Runtime::new()?;
    let upstream = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&upstream),
    );

    let mut server = YouthProcess::spawn(&upstream.uri())?;
    let response = server.call(1, "get_sido_list", json!({}))?;

    assert!(response.get("error").is_none(), "{response:?}");
    assert_eq!(response["result"]["isError"], true);
    assert!(text_of(&response).starts_with("Error: API request failed: HTTP status 503"));
    assert!(text_of(&response).ends_with(" - Service Unavailable"));
    Ok(())
}

#[test]
fn test_validation_happens_before_upstream_call() -> Result<()> {
    let rt = Runtime::new()?;
    let upstream = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&upstream),
    );

    let mut server = YouthProcess::spawn(&upstream.uri())?;
    let response = server.call(
        1,
        "search_activities",
        json!({ "startDate": "20250301", "endDate": "20250101" }),
    )?;
    assert_eq!(response["result"]["isError"], true);
    assert!(text_of(&response).contains("is after endDate"));

    let response = server.call(2, "get_sigungu_list", json!({}))?;
    assert_eq!(response["result"]["isError"], true);

    drop(server);
    rt.block_on(upstream.verify());
    Ok(())
}

#[test]
fn test_region_codes_resource() -> Result<()> {
    let mut server = YouthProcess::spawn("http://127.0.0.1:9")?;
    let response = server.request(1, "resources/read", json!({ "uri": "youth://region-codes" }))?;
    let text = response["result"]["contents"][0]["text"]
        .as_str()
        .context("missing resource text")?;
    assert!(text.contains("서울특별시"));
    assert!(text.contains("제주특별자치도"));

    let response = server.request(2, "tools/call", json!({ "name": "get_weather" }))?;
    assert_eq!(response["error"]["code"], -32602);
    Ok(())
}
