// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! HTTP client for the youth activity information service.
//!
//! Every operation issues one GET request, parses the XML envelope and
//! returns a [`PagedResult`]. There are no retries; a call that exceeds the
//! configured timeout fails with [`ApiError::Transport`].

use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use super::types::{
    ActivityItem, ActivityQuery, FacilityGroupItem, FacilityGroupQuery, Items, PagedResult,
    Pagination, SidoItem, SigunguItem,
};
use crate::config::ApiSettings;
use crate::error::{ApiError, ConfigError};
use crate::xml::{self, XmlValue};

/// Result code the envelope header carries on success.
pub const SUCCESS_CODE: &str = "00";

/// Message used when a failed envelope has no `resultMsg`.
pub const FALLBACK_ERROR_MESSAGE: &str = "unknown error";

const USER_AGENT: &str = concat!("youth-activity-mcp/", env!("YOUTH_MCP_VERSION"));

/// Characters of the response body logged at trace level.
const PREVIEW_CHARS: usize = 100;

/// Upstream operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// First-level regions.
    SidoList,
    /// Second-level regions of one sido.
    SigunguList,
    /// Youth activity programs.
    ActivityList,
    /// Youth facility groups.
    FacilityGroupList,
}

impl Endpoint {
    /// Path segment appended to the base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SidoList => "getSidoList",
            Self::SigunguList => "getSigunguList",
            Self::ActivityList => "getJtvtsProgrmList",
            Self::FacilityGroupList => "getJltlsGrpList",
        }
    }
}

/// Client for the youth activity information service.
#[derive(Debug, Clone)]
pub struct YouthApiClient {
    http: reqwest::Client,
    base_url: Url,
    service_key: String,
}

impl YouthApiClient {
    /// Builds a client from validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the TLS backend cannot be
    /// initialized.
    pub fn new(settings: ApiSettings) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url,
            service_key: settings.service_key,
        })
    }

    /// Lists first-level regions (시도).
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn get_sido_list(&self, page: Pagination) -> Result<PagedResult<SidoItem>, ApiError> {
        self.fetch(Endpoint::SidoList, Vec::new(), page).await
    }

    /// Lists second-level regions (시군구) of one region.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn get_sigungu_list(
        &self,
        sido: &str,
        page: Pagination,
    ) -> Result<PagedResult<SigunguItem>, ApiError> {
        self.fetch(Endpoint::SigunguList, vec![("sido", Some(sido))], page)
            .await
    }

    /// Searches youth activity programs.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn search_activities(
        &self,
        query: &ActivityQuery,
        page: Pagination,
    ) -> Result<PagedResult<ActivityItem>, ApiError> {
        let filters = vec![
            ("atName", query.program_name.as_deref()),
            ("orgName", query.organization.as_deref()),
            ("sido", query.sido.as_deref()),
            ("startDate", query.start_date.as_deref()),
            ("endDate", query.end_date.as_deref()),
        ];
        self.fetch(Endpoint::ActivityList, filters, page).await
    }

    /// Lists youth facility groups.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn get_facility_groups(
        &self,
        query: &FacilityGroupQuery,
        page: Pagination,
    ) -> Result<PagedResult<FacilityGroupItem>, ApiError> {
        let filters = vec![
            ("sido", query.sido.as_deref()),
            ("stName", query.facility_name.as_deref()),
            ("gName", query.group_name.as_deref()),
        ];
        self.fetch(Endpoint::FacilityGroupList, filters, page).await
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint.path()
        )
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        filters: Vec<(&str, Option<&str>)>,
        page: Pagination,
    ) -> Result<PagedResult<T>, ApiError> {
        let mut query: Vec<(&str, String)> = vec![
            ("serviceKey", self.service_key.clone()),
            ("pageNo", page.page_no.to_string()),
            ("numOfRows", page.num_of_rows.to_string()),
        ];
        query.extend(filters.into_iter().filter_map(|(name, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (name, v.to_string()))
        }));

        debug!(
            "Calling {} (pageNo={}, numOfRows={})",
            endpoint.path(),
            page.page_no,
            page.num_of_rows
        );

        let result = self.request(endpoint, &query).await.and_then(|body| {
            trace!(
                "{} response preview: {}",
                endpoint.path(),
                body.chars().take(PREVIEW_CHARS).collect::<String>()
            );
            decode_envelope(&body, page)
        });

        result.inspect_err(|e| warn!("{} failed: {}", endpoint.path(), e))
    }

    async fn request(&self, endpoint: Endpoint, query: &[(&str, String)]) -> Result<String, ApiError> {
        let response = self
            .http
            .get(self.endpoint_url(endpoint))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Transport {
                message: format!("HTTP status {status}"),
                body: Some(body),
            });
        }

        Ok(body)
    }
}

/// Parses a response body into a [`PagedResult`].
///
/// `pageNo` and `numOfRows` echo the request; everything else comes from the
/// envelope.
///
/// # Errors
///
/// - [`ApiError::Parse`] if the body is not well-formed XML
/// - [`ApiError::Upstream`] if `header.resultCode` is not `"00"`
/// - [`ApiError::UnexpectedFormat`] if there is no `response` root or the
///   body fields have the wrong shape
pub fn decode_envelope<T: DeserializeOwned>(
    body: &str,
    page: Pagination,
) -> Result<PagedResult<T>, ApiError> {
    let document = xml::parse(body)?;

    let response = match document.get("response") {
        Some(response @ XmlValue::Map(_)) => response,
        Some(_) => {
            return Err(ApiError::UnexpectedFormat(
                "`response` element is empty".to_string(),
            ));
        }
        None => return Err(ApiError::UnexpectedFormat(describe_foreign_root(&document))),
    };

    let header = response.get("header");
    let result_code = header
        .and_then(|h| h.get("resultCode"))
        .and_then(XmlValue::as_text);
    if result_code != Some(SUCCESS_CODE) {
        let message = header
            .and_then(|h| h.get("resultMsg"))
            .and_then(XmlValue::as_text)
            .filter(|m| !m.is_empty())
            .unwrap_or(FALLBACK_ERROR_MESSAGE);
        return Err(ApiError::Upstream(message.to_string()));
    }

    let body = response.get("body");
    let total_count = parse_total_count(body.and_then(|b| b.get("totalCount")))?;
    let items = decode_items(body.and_then(|b| b.path(&["items", "item"])))?;

    Ok(PagedResult {
        total_count,
        items,
        page_no: page.page_no,
        num_of_rows: page.num_of_rows,
    })
}

/// Explains a document whose root is not `response`.
///
/// The data.go.kr gateway answers authentication and quota problems with an
/// `OpenAPI_ServiceResponse` document instead of the service envelope.
fn describe_foreign_root(document: &XmlValue) -> String {
    if let Some(header) = document.path(&["OpenAPI_ServiceResponse", "cmmMsgHeader"]) {
        let field = |name: &str| {
            header
                .get(name)
                .and_then(XmlValue::as_text)
                .filter(|s| !s.is_empty())
        };
        let detail = [field("errMsg"), field("returnAuthMsg")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" / ");
        if !detail.is_empty() {
            return format!("gateway error: {detail}");
        }
    }

    let root = document
        .as_map()
        .and_then(|m| m.keys().next())
        .map_or("?", String::as_str);
    format!("missing `response` root element (found <{root}>)")
}

fn parse_total_count(node: Option<&XmlValue>) -> Result<u64, ApiError> {
    match node {
        None => Ok(0),
        Some(XmlValue::Text(text)) if text.trim().is_empty() => Ok(0),
        Some(XmlValue::Text(text)) => text.trim().parse().map_err(|_| {
            ApiError::UnexpectedFormat(format!(
                "totalCount is not a non-negative integer: `{text}`"
            ))
        }),
        Some(_) => Err(ApiError::UnexpectedFormat(
            "totalCount is not a single value".to_string(),
        )),
    }
}

fn decode_items<T: DeserializeOwned>(node: Option<&XmlValue>) -> Result<Items<T>, ApiError> {
    match node {
        None => Ok(Items::Empty),
        Some(XmlValue::Text(text)) if text.is_empty() => Ok(Items::Empty),
        Some(XmlValue::List(list)) => list.iter().map(decode_item).collect::<Result<_, _>>().map(Items::Many),
        Some(single) => decode_item(single).map(Items::One),
    }
}

fn decode_item<T: DeserializeOwned>(node: &XmlValue) -> Result<T, ApiError> {
    let value = match node {
        XmlValue::Map(_) => serde_json::Value::from(node.clone()),
        XmlValue::Text(text) if text.is_empty() => serde_json::Value::Object(serde_json::Map::new()),
        XmlValue::Text(text) => {
            return Err(ApiError::UnexpectedFormat(format!(
                "item is plain text: `{text}`"
            )));
        }
        XmlValue::List(_) => {
            return Err(ApiError::UnexpectedFormat("nested item list".to_string()));
        }
    };

    serde_json::from_value(value)
        .map_err(|e| ApiError::UnexpectedFormat(format!("malformed item: {e}")))
}
