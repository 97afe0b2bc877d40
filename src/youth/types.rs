// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Item shapes, query parameters and the paged result envelope.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::xml::TEXT_KEY;

/// Default page size for region lookups (sido, sigungu).
pub const REGION_PAGE_SIZE: u32 = 100;
/// Default page size for search lookups (activities, facility groups).
pub const SEARCH_PAGE_SIZE: u32 = 10;

/// Page number and page size sent as `pageNo` / `numOfRows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number.
    pub page_no: u32,
    /// Rows per page.
    pub num_of_rows: u32,
}

impl Pagination {
    /// First page with the region-lookup page size.
    #[must_use]
    pub const fn regions() -> Self {
        Self {
            page_no: 1,
            num_of_rows: REGION_PAGE_SIZE,
        }
    }

    /// First page with the search page size.
    #[must_use]
    pub const fn search() -> Self {
        Self {
            page_no: 1,
            num_of_rows: SEARCH_PAGE_SIZE,
        }
    }

    /// Overrides the defaults with caller-supplied values.
    ///
    /// Values are expected to be validated (≥ 1) already.
    #[must_use]
    pub fn with(self, page_no: Option<u32>, num_of_rows: Option<u32>) -> Self {
        Self {
            page_no: page_no.unwrap_or(self.page_no),
            num_of_rows: num_of_rows.unwrap_or(self.num_of_rows),
        }
    }
}

/// Filters for the youth activity program search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityQuery {
    /// Program name (`atName`).
    pub program_name: Option<String>,
    /// Organizer name (`orgName`).
    pub organization: Option<String>,
    /// Region name (`sido`).
    pub sido: Option<String>,
    /// First day of the activity period, `YYYYMMDD` (`startDate`).
    pub start_date: Option<String>,
    /// Last day of the activity period, `YYYYMMDD` (`endDate`).
    pub end_date: Option<String>,
}

/// Filters for the youth facility group lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacilityGroupQuery {
    /// Region name (`sido`).
    pub sido: Option<String>,
    /// Facility name (`stName`).
    pub facility_name: Option<String>,
    /// Facility type name (`gName`).
    pub group_name: Option<String>,
}

/// Fields the upstream returned that have no dedicated slot.
pub type ExtraFields = BTreeMap<String, serde_json::Value>;

/// First-level administrative region (시도).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SidoItem {
    /// Region name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub ctpv_nm: Option<String>,
    /// Region code.
    #[serde(default, deserialize_with = "lenient_text")]
    pub ctpv_code: Option<String>,
    /// Anything else.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Second-level administrative region (시군구).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SigunguItem {
    /// Parent region name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub ctpv_nm: Option<String>,
    /// Sub-region name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub sigungu_nm: Option<String>,
    /// Sub-region code.
    #[serde(default, deserialize_with = "lenient_text")]
    pub sigungu_code: Option<String>,
    /// Anything else.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A youth activity program.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    /// Program title.
    #[serde(default, deserialize_with = "lenient_text")]
    pub act_title: Option<String>,
    /// Organizer.
    #[serde(default, deserialize_with = "lenient_text")]
    pub organ_nm: Option<String>,
    /// First day, `YYYYMMDD`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub act_begin_dt: Option<String>,
    /// Last day, `YYYYMMDD`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub act_end_dt: Option<String>,
    /// Venue.
    #[serde(default, deserialize_with = "lenient_text")]
    pub act_place: Option<String>,
    /// Short introduction.
    #[serde(default, deserialize_with = "lenient_text")]
    pub youth_policy_short_intro: Option<String>,
    /// Target participants.
    #[serde(default, deserialize_with = "lenient_text")]
    pub act_target: Option<String>,
    /// Activity field.
    #[serde(default, deserialize_with = "lenient_text")]
    pub act_part: Option<String>,
    /// Anything else.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A youth facility group.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FacilityGroupItem {
    /// Facility name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub st_name: Option<String>,
    /// Facility type name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub g_name: Option<String>,
    /// Region name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub sido: Option<String>,
    /// Street address.
    #[serde(default, deserialize_with = "lenient_text")]
    pub adres: Option<String>,
    /// Phone number.
    #[serde(default, deserialize_with = "lenient_text")]
    pub tel_no: Option<String>,
    /// Anything else.
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Reads a text field, flattening whatever shape the XML gave it.
///
/// Repeated tags are joined with `, ` and inline markup is reduced to its
/// text, so one odd field never rejects the whole item.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|value| text_of(&value)))
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(values) => joined(values.iter(), ", "),
        Value::Object(map) => {
            let inline = map.get(TEXT_KEY).into_iter().chain(
                map.iter()
                    .filter(|(key, _)| key.as_str() != TEXT_KEY)
                    .map(|(_, child)| child),
            );
            joined(inline, " ")
        }
    }
}

fn joined<'a>(values: impl Iterator<Item = &'a Value>, separator: &str) -> Option<String> {
    let parts: Vec<String> = values
        .filter_map(text_of)
        .filter(|text| !text.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(separator))
}

/// The `items` payload, with the upstream's cardinality preserved.
///
/// The API returns a bare `<item>` when there is exactly one result and a
/// sequence otherwise, so callers see which one they got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Items<T> {
    /// No `item` elements.
    Empty,
    /// Exactly one `item` element.
    One(T),
    /// Two or more `item` elements.
    Many(Vec<T>),
}

impl<T> Items<T> {
    /// Number of items regardless of shape.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Many(items) => items.len(),
        }
    }

    /// Whether there are no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Borrowing iterator over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::Empty => <&[T]>::default().iter(),
            Self::One(item) => std::slice::from_ref(item).iter(),
            Self::Many(items) => items.iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Items<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Uniform result of every list operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedResult<T> {
    /// Total matches across all pages.
    pub total_count: u64,
    /// This page's items.
    pub items: Items<T>,
    /// Requested page.
    pub page_no: u32,
    /// Requested page size.
    pub num_of_rows: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_overrides() {
        assert_eq!(Pagination::regions().num_of_rows, 100);
        assert_eq!(Pagination::search().num_of_rows, 10);

        let page = Pagination::search().with(Some(3), None);
        assert_eq!(page, Pagination { page_no: 3, num_of_rows: 10 });
    }

    #[test]
    fn test_items_iterate_in_every_shape() {
        let empty: Items<u8> = Items::Empty;
        assert_eq!(empty.iter().count(), 0);
        assert!(empty.is_empty());

        let one = Items::One(7);
        assert_eq!(one.iter().copied().collect::<Vec<_>>(), [7]);
        assert_eq!(one.len(), 1);

        let many = Items::Many(vec![1, 2, 3]);
        assert_eq!((&many).into_iter().sum::<i32>(), 6);
        assert_eq!(many.len(), 3);
    }

    #[test]
    fn test_item_keeps_unknown_fields() -> Result<(), serde_json::Error> {
        let item: SidoItem = serde_json::from_value(serde_json::json!({
            "ctpvNm": "서울특별시",
            "ctpvCode": "11",
            "useYn": "Y"
        }))?;
        assert_eq!(item.ctpv_nm.as_deref(), Some("서울특별시"));
        assert_eq!(item.extra.get("useYn"), Some(&serde_json::json!("Y")));
        Ok(())
    }

    #[test]
    fn test_item_fields_accept_odd_shapes() -> Result<(), serde_json::Error> {
        let item: ActivityItem = serde_json::from_value(serde_json::json!({
            "actTitle": { "_": "A", "b": "bold" },
            "actPart": ["x", "y"],
            "actPlace": "",
            "actTarget": []
        }))?;
        assert_eq!(item.act_title.as_deref(), Some("A bold"));
        assert_eq!(item.act_part.as_deref(), Some("x, y"));
        assert_eq!(item.act_place.as_deref(), Some(""));
        assert_eq!(item.act_target, None);
        assert_eq!(item.organ_nm, None);
        assert!(item.extra.is_empty());
        Ok(())
    }
}
