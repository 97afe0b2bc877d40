// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Youth activity tools, resources and prompts.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::runtime::Handle;
use tracing::debug;

use super::{StaticResource, into_call_result, parse_arguments, prompt, prompt_argument};
use crate::error::{DispatchError, ToolError, ValidationError};
use crate::mcp::{
    CallToolResult, GetPromptResult, Prompt, ReadResourceResult, Resource, ServerHandler,
    ServerInfo, Tool,
};
use crate::youth::format::{
    format_activities, format_facility_groups, format_sido_list, format_sigungu_list,
};
use crate::youth::{ActivityQuery, FacilityGroupQuery, Pagination, YouthApiClient};

const SERVER_NAME: &str = "youth-activity-mcp";

/// Region used by the prompts when the caller names none.
const NATIONWIDE: &str = "전국";

/// First-level regions and their administrative codes.
pub const REGION_CODES: [(&str, &str); 17] = [
    ("11", "서울특별시"),
    ("26", "부산광역시"),
    ("27", "대구광역시"),
    ("28", "인천광역시"),
    ("29", "광주광역시"),
    ("30", "대전광역시"),
    ("31", "울산광역시"),
    ("36", "세종특별자치시"),
    ("41", "경기도"),
    ("43", "충청북도"),
    ("44", "충청남도"),
    ("46", "전라남도"),
    ("47", "경상북도"),
    ("48", "경상남도"),
    ("50", "제주특별자치도"),
    ("51", "강원특별자치도"),
    ("52", "전북특별자치도"),
];

const RESOURCES: &[StaticResource] = &[
    StaticResource {
        uri: "youth://info",
        name: "Server info",
        description: "What the youth activity server offers",
    },
    StaticResource {
        uri: "youth://guide",
        name: "Usage guide",
        description: "How to combine the youth activity tools",
    },
    StaticResource {
        uri: "youth://region-codes",
        name: "Region codes",
        description: "Codes of the 17 first-level regions (시도)",
    },
];

const INFO: &str = "\
Youth activity information server (청소년활동정보서비스)

Wraps the Korean public-data portal API for youth activities.

Tools:
- get_sido_list: first-level regions (시도)
- get_sigungu_list: second-level regions (시군구) of one region
- search_activities: youth activity programs
- get_facility_groups: youth facilities

Resources: youth://info, youth://guide, youth://region-codes
Prompts: find_activities, plan_program";

const GUIDE: &str = "\
Youth activity tools guide

1. Call get_sido_list to see region names.
2. Pass a region name as `sido` to get_sigungu_list for its sub-regions.
3. search_activities accepts any mix of:
   - atName: program name
   - orgName: organizer
   - sido: region name
   - startDate / endDate: activity period, YYYYMMDD
4. get_facility_groups accepts sido, stName (facility name) and gName
   (facility type, e.g. 청소년수련관).

Every list tool takes pageNo (default 1) and numOfRows (default 100 for
regions, 10 otherwise). Results report the total count so you can page.";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageArgs {
    page_no: Option<i64>,
    num_of_rows: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SigunguArgs {
    sido: String,
    #[serde(flatten)]
    page: PageArgs,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityArgs {
    at_name: Option<String>,
    org_name: Option<String>,
    sido: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    #[serde(flatten)]
    page: PageArgs,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FacilityArgs {
    sido: Option<String>,
    st_name: Option<String>,
    g_name: Option<String>,
    #[serde(flatten)]
    page: PageArgs,
}

/// A validated youth tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YouthToolRequest {
    /// `get_sido_list`
    SidoList(Pagination),
    /// `get_sigungu_list`
    SigunguList {
        /// Parent region name.
        sido: String,
        /// Requested page.
        page: Pagination,
    },
    /// `search_activities`
    SearchActivities(ActivityQuery, Pagination),
    /// `get_facility_groups`
    FacilityGroups(FacilityGroupQuery, Pagination),
}

impl YouthToolRequest {
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
            "get_sido_list" => parse_arguments::<PageArgs>(name, arguments)
                .and_then(|args| pagination(name, &args, Pagination::regions()))
                .map(Self::SidoList),
            "get_sigungu_list" => parse_arguments::<SigunguArgs>(name, arguments).and_then(|args| {
                let sido = filter(Some(args.sido)).ok_or(ValidationError::EmptyField("sido"))?;
                Ok(Self::SigunguList {
                    sido,
                    page: pagination(name, &args.page, Pagination::regions())?,
                })
            }),
            "search_activities" => {
                parse_arguments::<ActivityArgs>(name, arguments).and_then(|args| {
                    let page = pagination(name, &args.page, Pagination::search())?;
                    let start_date = date("startDate", args.start_date)?;
                    let end_date = date("endDate", args.end_date)?;
                    if let (Some((start, start_day)), Some((end, end_day))) = (&start_date, &end_date)
                        && start_day > end_day
                    {
                        return Err(ValidationError::InvertedDateRange {
                            start: start.clone(),
                            end: end.clone(),
                        });
                    }
                    let query = ActivityQuery {
                        program_name: filter(args.at_name),
                        organization: filter(args.org_name),
                        sido: filter(args.sido),
                        start_date: start_date.map(|(raw, _)| raw),
                        end_date: end_date.map(|(raw, _)| raw),
                    };
                    Ok(Self::SearchActivities(query, page))
                })
            }
            "get_facility_groups" => {
                parse_arguments::<FacilityArgs>(name, arguments).and_then(|args| {
                    let page = pagination(name, &args.page, Pagination::search())?;
                    let query = FacilityGroupQuery {
                        sido: filter(args.sido),
                        facility_name: filter(args.st_name),
                        group_name: filter(args.g_name),
                    };
                    Ok(Self::FacilityGroups(query, page))
                })
            }
            _ => return Err(DispatchError::UnknownTool(name.to_string())),
        };
        Ok(request)
    }
}

/// Trims a free-text filter; blank means absent.
fn filter(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn positive(tool: &str, field: &'static str, value: Option<i64>) -> Result<Option<u32>, ValidationError> {
    match value {
        None => Ok(None),
        Some(v) if v < 1 => Err(ValidationError::NotPositive(field)),
        Some(v) => u32::try_from(v).map(Some).map_err(|_| ValidationError::InvalidArguments {
            tool: tool.to_string(),
            reason: format!("`{field}` is too large"),
        }),
    }
}

fn pagination(tool: &str, args: &PageArgs, defaults: Pagination) -> Result<Pagination, ValidationError> {
    Ok(defaults.with(
        positive(tool, "pageNo", args.page_no)?,
        positive(tool, "numOfRows", args.num_of_rows)?,
    ))
}

/// Validates an optional `YYYYMMDD` date, keeping the raw text for the query.
fn date(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<(String, NaiveDate)>, ValidationError> {
    let Some(raw) = filter(value) else {
        return Ok(None);
    };
    let invalid = || ValidationError::InvalidDate {
        field,
        value: raw.clone(),
    };
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let day = NaiveDate::parse_from_str(&raw, "%Y%m%d").map_err(|_| invalid())?;
    Ok(Some((raw, day)))
}

fn page_properties() -> serde_json::Value {
    serde_json::json!({
        "pageNo": { "type": "integer", "minimum": 1, "description": "Page number (default: 1)" },
        "numOfRows": { "type": "integer", "minimum": 1, "description": "Rows per page" }
    })
}

fn object_schema(
    properties: serde_json::Value,
    required: &[&str],
) -> serde_json::Value {
    let mut merged = page_properties();
    if let (Some(merged), serde_json::Value::Object(extra)) = (merged.as_object_mut(), properties) {
        merged.extend(extra);
    }
    let mut schema = serde_json::json!({ "type": "object", "properties": merged });
    if !required.is_empty() {
        schema["required"] = serde_json::json!(required);
    }
    schema
}

/// Handler for the youth activity server.
///
/// Tool calls run on the MCP server's blocking thread and drive the async
/// client through `runtime`.
pub struct YouthHandler {
    client: YouthApiClient,
    runtime: Handle,
}

impl YouthHandler {
    /// Creates a handler around an API client.
    #[must_use]
    pub const fn new(client: YouthApiClient, runtime: Handle) -> Self {
        Self { client, runtime }
    }

    fn run(&self, request: YouthToolRequest) -> Result<String, ToolError> {
        let report = match request {
            YouthToolRequest::SidoList(page) => {
                format_sido_list(&self.runtime.block_on(self.client.get_sido_list(page))?)
            }
            YouthToolRequest::SigunguList { sido, page } => format_sigungu_list(
                &self
                    .runtime
                    .block_on(self.client.get_sigungu_list(&sido, page))?,
            ),
            YouthToolRequest::SearchActivities(query, page) => format_activities(
                &self
                    .runtime
                    .block_on(self.client.search_activities(&query, page))?,
            ),
            YouthToolRequest::FacilityGroups(query, page) => format_facility_groups(
                &self
                    .runtime
                    .block_on(self.client.get_facility_groups(&query, page))?,
            ),
        };
        Ok(report)
    }
}

fn region_codes() -> String {
    let mut text = String::from("Region codes (시도 코드)\n\nCode  Region\n");
    for (code, name) in REGION_CODES {
        text.push_str(code);
        text.push_str("    ");
        text.push_str(name);
        text.push('\n');
    }
    text.push_str("\nUse the region name as the `sido` argument.");
    text
}

impl ServerHandler for YouthHandler {
    fn server_info(&self) -> ServerInfo {
        ServerInfo {
            name: SERVER_NAME.to_string(),
            version: Some(env!("YOUTH_MCP_VERSION").to_string()),
        }
    }

    fn instructions(&self) -> Option<String> {
        Some(
            "Look up Korean youth activity programs and facilities. \
             Start with get_sido_list to learn region names, then filter the other tools by `sido`."
                .to_string(),
        )
    }

    fn list_tools(&self) -> Vec<Tool> {
        vec![
            Tool {
                name: "get_sido_list".to_string(),
                description: Some("List first-level regions (시도).".to_string()),
                input_schema: object_schema(serde_json::json!({}), &[]),
            },
            Tool {
                name: "get_sigungu_list".to_string(),
                description: Some("List the second-level regions (시군구) of one region.".to_string()),
                input_schema: object_schema(
                    serde_json::json!({
                        "sido": { "type": "string", "description": "Region name, e.g. 서울특별시" }
                    }),
                    &["sido"],
                ),
            },
            Tool {
                name: "search_activities".to_string(),
                description: Some("Search youth activity programs.".to_string()),
                input_schema: object_schema(
                    serde_json::json!({
                        "atName": { "type": "string", "description": "Program name" },
                        "orgName": { "type": "string", "description": "Organizer name" },
                        "sido": { "type": "string", "description": "Region name" },
                        "startDate": { "type": "string", "description": "Period start, YYYYMMDD" },
                        "endDate": { "type": "string", "description": "Period end, YYYYMMDD" }
                    }),
                    &[],
                ),
            },
            Tool {
                name: "get_facility_groups".to_string(),
                description: Some("List youth facilities.".to_string()),
                input_schema: object_schema(
                    serde_json::json!({
                        "sido": { "type": "string", "description": "Region name" },
                        "stName": { "type": "string", "description": "Facility name" },
                        "gName": { "type": "string", "description": "Facility type, e.g. 청소년수련관" }
                    }),
                    &[],
                ),
            },
        ]
    }

    fn call_tool(
        &self,
        name: &str,
        arguments: Option<serde_json::Value>,
    ) -> Result<CallToolResult, DispatchError> {
        let request = YouthToolRequest::from_call(name, arguments)?;
        debug!("Youth tool request: {:?}", request);
        Ok(into_call_result(
            request
                .map_err(ToolError::from)
                .and_then(|request| self.run(request)),
        ))
    }

    fn list_resources(&self) -> Vec<Resource> {
        super::list_resources(RESOURCES)
    }

    fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, DispatchError> {
        super::read_resource(RESOURCES, uri, |uri| match uri {
            "youth://info" => INFO.to_string(),
            "youth://guide" => GUIDE.to_string(),
            _ => region_codes(),
        })
    }

    fn list_prompts(&self) -> Vec<Prompt> {
        vec![
            prompt(
                "find_activities",
                "Find youth activities in a region",
                Some(("region", "Region name (default: 전국)")),
            ),
            prompt(
                "plan_program",
                "Plan a youth program around local activities and facilities",
                Some(("region", "Region name (default: 전국)")),
            ),
        ]
    }

    fn get_prompt(
        &self,
        name: &str,
        arguments: &HashMap<String, String>,
    ) -> Result<GetPromptResult, DispatchError> {
        let region = prompt_argument(arguments, "region", NATIONWIDE);
        match name {
            "find_activities" => Ok(GetPromptResult::user_text(
                "Find youth activities in a region",
                format!(
                    "Find youth activity programs in {region}.\n\n\
                     1. Use get_sido_list to confirm the region name.\n\
                     2. Use search_activities with `sido` set to that name.\n\
                     3. Summarize each program's title, organizer, period and place.\n\
                     4. Suggest which programs suit different age groups."
                ),
            )),
            "plan_program" => Ok(GetPromptResult::user_text(
                "Plan a youth program around local activities and facilities",
                format!(
                    "Help me plan a youth program in {region}.\n\n\
                     1. Use get_facility_groups to find youth facilities there.\n\
                     2. Use search_activities to see what programs already run.\n\
                     3. Propose a program that fills a gap, naming a suitable facility,\n\
                        a target age group and a schedule."
                ),
            )),
            _ => Err(DispatchError::UnknownPrompt(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiSettings;
    use anyhow::Result;
    use serde_json::json;
    use std::time::Duration;
    use tokio::runtime::Runtime;
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn handler_for(rt: &Runtime, base_url: &str) -> Result<YouthHandler> {
        let client = YouthApiClient::new(ApiSettings {
            service_key: "test-key".to_string(),
            base_url: Url::parse(base_url)?,
            timeout: Duration::from_secs(5),
        })?;
        Ok(YouthHandler::new(client, rt.handle().clone()))
    }

    fn offline(rt: &Runtime) -> Result<YouthHandler> {
        handler_for(rt, "http://127.0.0.1:9")
    }

    fn parse(name: &str, arguments: serde_json::Value) -> Result<Result<YouthToolRequest, ValidationError>> {
        Ok(YouthToolRequest::from_call(name, Some(arguments))?)
    }

    #[test]
    fn test_defaults_per_tool() -> Result<()> {
        assert_eq!(
            parse("get_sido_list", json!({}))?,
            Ok(YouthToolRequest::SidoList(Pagination::regions()))
        );
        assert_eq!(
            parse("get_facility_groups", json!({ "pageNo": 3 }))?,
            Ok(YouthToolRequest::FacilityGroups(
                FacilityGroupQuery::default(),
                Pagination { page_no: 3, num_of_rows: 10 }
            ))
        );
        Ok(())
    }

    #[test]
    fn test_sigungu_requires_sido() -> Result<()> {
        assert_eq!(
            parse("get_sigungu_list", json!({ "sido": "  " }))?,
            Err(ValidationError::EmptyField("sido"))
        );
        assert!(matches!(
            parse("get_sigungu_list", json!({}))?,
            Err(ValidationError::InvalidArguments { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_pagination_must_be_positive() -> Result<()> {
        assert_eq!(
            parse("get_sido_list", json!({ "pageNo": 0 }))?,
            Err(ValidationError::NotPositive("pageNo"))
        );
        assert_eq!(
            parse("search_activities", json!({ "numOfRows": -5 }))?,
            Err(ValidationError::NotPositive("numOfRows"))
        );
        Ok(())
    }

    #[test]
    fn test_search_dates() -> Result<()> {
        let Ok(YouthToolRequest::SearchActivities(query, _)) = parse(
            "search_activities",
            json!({ "atName": " 캠프 ", "startDate": "20250101", "endDate": "20250131" }),
        )?
        else {
            anyhow::bail!("expected a search request");
        };
        assert_eq!(query.program_name.as_deref(), Some("캠프"));
        assert_eq!(query.start_date.as_deref(), Some("20250101"));

        assert!(matches!(
            parse("search_activities", json!({ "startDate": "2025-01-01" }))?,
            Err(ValidationError::InvalidDate { field: "startDate", .. })
        ));
        assert!(matches!(
            parse("search_activities", json!({ "endDate": "20250230" }))?,
            Err(ValidationError::InvalidDate { field: "endDate", .. })
        ));
        assert!(matches!(
            parse("search_activities", json!({ "startDate": "20250201", "endDate": "20250101" }))?,
            Err(ValidationError::InvertedDateRange { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_unknown_tool() -> Result<()> {
        let rt = Runtime::new()?;
        let handler = offline(&rt)?;
        assert!(matches!(
            handler.call_tool("get_weather", None),
            Err(DispatchError::UnknownTool(ref name)) if name == "get_weather"
        ));
        Ok(())
    }

    #[test]
    fn test_validation_failure_is_soft() -> Result<()> {
        let rt = Runtime::new()?;
        let handler = offline(&rt)?;
        let result = handler.call_tool("get_sido_list", Some(json!({ "pageNo": 0 })))?;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.text_content(), "Error: `pageNo` must be at least 1");
        Ok(())
    }

    #[test]
    fn test_transport_failure_is_soft() -> Result<()> {
        let rt = Runtime::new()?;
        let handler = offline(&rt)?;
        let result = handler.call_tool("get_sido_list", None)?;
        assert_eq!(result.is_error, Some(true));
        assert!(result.text_content().starts_with("Error: API request failed:"));
        Ok(())
    }

    #[test]
    fn test_sido_list_through_mock_server() -> Result<()> {
        let rt = Runtime::new()?;
        let server = rt.block_on(MockServer::start());
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/getSidoList"))
                .and(query_param("serviceKey", "test-key"))
                .respond_with(ResponseTemplate::new(200).set_body_string(
                    "<response><header><resultCode>00</resultCode><resultMsg>OK</resultMsg></header>\
                     <body><items><item><ctpvNm>서울특별시</ctpvNm><ctpvCode>11</ctpvCode></item>\
                     <item><ctpvNm>부산광역시</ctpvNm><ctpvCode>26</ctpvCode></item></items>\
                     <totalCount>17</totalCount></body></response>",
                ))
                .mount(&server),
        );

        let handler = handler_for(&rt, &server.uri())?;
        let result = handler.call_tool("get_sido_list", None)?;
        assert_eq!(result.is_error, None);
        let text = result.text_content();
        assert!(text.starts_with("Regions (시도): 17 total (page 1, 100 per page)"));
        assert!(text.contains("2. 부산광역시\n   Code: 26"));
        Ok(())
    }

    #[test]
    fn test_upstream_error_is_soft() -> Result<()> {
        let rt = Runtime::new()?;
        let server = rt.block_on(MockServer::start());
        rt.block_on(
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_string(
                    "<response><header><resultCode>03</resultCode><resultMsg>NODATA_ERROR</resultMsg></header></response>",
                ))
                .mount(&server),
        );

        let handler = handler_for(&rt, &server.uri())?;
        let result =
            handler.call_tool("get_sigungu_list", Some(json!({ "sido": "서울특별시" })))?;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.text_content(), "Error: API error: NODATA_ERROR");
        Ok(())
    }

    #[test]
    fn test_resources() -> Result<()> {
        let rt = Runtime::new()?;
        let handler = offline(&rt)?;
        assert_eq!(handler.list_resources().len(), 3);

        let codes = handler.read_resource("youth://region-codes")?;
        let text = &codes.contents[0].text;
        assert_eq!(text.lines().filter(|l| l.starts_with(char::is_numeric)).count(), 17);
        assert!(text.contains("11    서울특별시"));

        assert!(handler.read_resource("youth://guide")?.contents[0].text.contains("YYYYMMDD"));
        assert!(matches!(
            handler.read_resource("youth://nothing"),
            Err(DispatchError::UnknownResource(_))
        ));
        Ok(())
    }

    #[test]
    fn test_prompts_default_region() -> Result<()> {
        let rt = Runtime::new()?;
        let handler = offline(&rt)?;

        let result = handler.get_prompt("find_activities", &HashMap::new())?;
        let crate::mcp::ToolContent::Text { text } = &result.messages[0].content;
        assert!(text.starts_with("Find youth activity programs in 전국."));

        let args = HashMap::from([("region".to_string(), "부산광역시".to_string())]);
        let result = handler.get_prompt("plan_program", &args)?;
        let crate::mcp::ToolContent::Text { text } = &result.messages[0].content;
        assert!(text.starts_with("Help me plan a youth program in 부산광역시."));

        assert!(matches!(
            handler.get_prompt("nope", &HashMap::new()),
            Err(DispatchError::UnknownPrompt(_))
        ));
        Ok(())
    }
}
