// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Plain-text reports for the youth tools.

use std::fmt::Write as _;

use super::types::{
    ActivityItem, ExtraFields, FacilityGroupItem, Items, PagedResult, SidoItem, SigunguItem,
};

/// One numbered block of a report.
struct Entry<'a> {
    title: Option<&'a str>,
    fields: Vec<(&'static str, String)>,
    extra: &'a ExtraFields,
}

impl<'a> Entry<'a> {
    fn new(title: Option<&'a str>, extra: &'a ExtraFields) -> Self {
        Self {
            title,
            fields: Vec::new(),
            extra,
        }
    }

    fn field(mut self, label: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = present(value) {
            self.fields.push((label, value.to_string()));
        }
        self
    }

    fn render(&self, number: usize, out: &mut String) {
        let _ = writeln!(out, "{number}. {}", present(self.title).unwrap_or("(untitled)"));
        for (label, value) in &self.fields {
            let _ = writeln!(out, "   {label}: {value}");
        }
        for (key, value) in self.extra {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if !value.is_empty() {
                let _ = writeln!(out, "   {key}: {value}");
            }
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn report<T>(
    heading: &str,
    empty: &str,
    result: &PagedResult<T>,
    entry: impl Fn(&T) -> Entry<'_>,
) -> String {
    let items = match &result.items {
        Items::Empty => return format!("{empty} (page {})", result.page_no),
        Items::One(item) => std::slice::from_ref(item),
        Items::Many(items) => items.as_slice(),
    };

    let mut out = format!(
        "{heading}: {} total (page {}, {} per page)\n",
        result.total_count, result.page_no, result.num_of_rows
    );
    for (index, item) in items.iter().enumerate() {
        out.push('\n');
        entry(item).render(index + 1, &mut out);
    }
    out.truncate(out.trim_end().len());
    out
}

/// Renders `YYYYMMDD` as `YYYY-MM-DD`; anything else is returned as is.
fn display_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &raw[..4], &raw[4..6], &raw[6..])
    } else {
        raw.to_string()
    }
}

fn period(begin: Option<&str>, end: Option<&str>) -> Option<String> {
    match (present(begin), present(end)) {
        (None, None) => None,
        (Some(begin), None) => Some(format!("{} ~", display_date(begin))),
        (None, Some(end)) => Some(format!("~ {}", display_date(end))),
        (Some(begin), Some(end)) => Some(format!(
            "{} ~ {}",
            display_date(begin),
            display_date(end)
        )),
    }
}

/// Report for `get_sido_list`.
#[must_use]
pub fn format_sido_list(result: &PagedResult<SidoItem>) -> String {
    report("Regions (시도)", "No regions found", result, |item| {
        Entry::new(item.ctpv_nm.as_deref(), &item.extra).field("Code", item.ctpv_code.as_deref())
    })
}

/// Report for `get_sigungu_list`.
#[must_use]
pub fn format_sigungu_list(result: &PagedResult<SigunguItem>) -> String {
    report("Sub-regions (시군구)", "No sub-regions found", result, |item| {
        Entry::new(item.sigungu_nm.as_deref(), &item.extra)
            .field("Region", item.ctpv_nm.as_deref())
            .field("Code", item.sigungu_code.as_deref())
    })
}

/// Report for `search_activities`.
#[must_use]
pub fn format_activities(result: &PagedResult<ActivityItem>) -> String {
    report("Youth activities", "No activities found", result, |item| {
        let dates = period(item.act_begin_dt.as_deref(), item.act_end_dt.as_deref());
        Entry::new(item.act_title.as_deref(), &item.extra)
            .field("Organizer", item.organ_nm.as_deref())
            .field("Period", dates.as_deref())
            .field("Place", item.act_place.as_deref())
            .field("Target", item.act_target.as_deref())
            .field("Field", item.act_part.as_deref())
            .field("Summary", item.youth_policy_short_intro.as_deref())
    })
}

/// Report for `get_facility_groups`.
#[must_use]
pub fn format_facility_groups(result: &PagedResult<FacilityGroupItem>) -> String {
    report("Youth facilities", "No facilities found", result, |item| {
        Entry::new(item.st_name.as_deref(), &item.extra)
            .field("Type", item.g_name.as_deref())
            .field("Region", item.sido.as_deref())
            .field("Address", item.adres.as_deref())
            .field("Phone", item.tel_no.as_deref())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paged<T>(items: Items<T>, total_count: u64) -> PagedResult<T> {
        PagedResult {
            total_count,
            items,
            page_no: 1,
            num_of_rows: 10,
        }
    }

    #[test]
    fn test_empty_result_is_one_line() {
        let result: PagedResult<SidoItem> = paged(Items::Empty, 0);
        assert_eq!(format_sido_list(&result), "No regions found (page 1)");

        let result: PagedResult<ActivityItem> = paged(Items::Empty, 0);
        assert_eq!(format_activities(&result), "No activities found (page 1)");
    }

    #[test]
    fn test_sido_list_numbers_entries() {
        let result = paged(
            Items::Many(vec![
                SidoItem {
                    ctpv_nm: Some("서울특별시".to_string()),
                    ctpv_code: Some("11".to_string()),
                    ..SidoItem::default()
                },
                SidoItem {
                    ctpv_nm: Some("부산광역시".to_string()),
                    ctpv_code: None,
                    ..SidoItem::default()
                },
            ]),
            17,
        );
        assert_eq!(
            format_sido_list(&result),
            "Regions (시도): 17 total (page 1, 10 per page)\n\
             \n\
             1. 서울특별시\n   Code: 11\n\
             \n\
             2. 부산광역시"
        );
    }

    #[test]
    fn test_single_activity_with_extras() {
        let mut extra = ExtraFields::new();
        extra.insert("actFee".to_string(), json!("무료"));
        extra.insert("blank".to_string(), json!(""));

        let result = paged(
            Items::One(ActivityItem {
                act_title: Some("여름 과학 캠프".to_string()),
                organ_nm: Some("서울청소년센터".to_string()),
                act_begin_dt: Some("20250701".to_string()),
                act_end_dt: Some("20250705".to_string()),
                act_place: Some("  ".to_string()),
                extra,
                ..ActivityItem::default()
            }),
            1,
        );
        assert_eq!(
            format_activities(&result),
            "Youth activities: 1 total (page 1, 10 per page)\n\
             \n\
             1. 여름 과학 캠프\n\
             \x20  Organizer: 서울청소년센터\n\
             \x20  Period: 2025-07-01 ~ 2025-07-05\n\
             \x20  actFee: 무료"
        );
    }

    #[test]
    fn test_untitled_facility() {
        let result = paged(
            Items::One(FacilityGroupItem {
                g_name: Some("청소년수련관".to_string()),
                tel_no: Some("02-123-4567".to_string()),
                ..FacilityGroupItem::default()
            }),
            1,
        );
        let report = format_facility_groups(&result);
        assert!(report.contains("1. (untitled)\n   Type: 청소년수련관\n   Phone: 02-123-4567"));
        assert!(!report.contains("Address"));
    }

    #[test]
    fn test_sigungu_fields() {
        let result = paged(
            Items::One(SigunguItem {
                ctpv_nm: Some("부산광역시".to_string()),
                sigungu_nm: Some("해운대구".to_string()),
                sigungu_code: Some("26350".to_string()),
                ..SigunguItem::default()
            }),
            16,
        );
        assert!(
            format_sigungu_list(&result)
                .ends_with("1. 해운대구\n   Region: 부산광역시\n   Code: 26350")
        );
    }

    #[test]
    fn test_period_variants() {
        assert_eq!(period(None, None), None);
        assert_eq!(period(Some("20250101"), None).as_deref(), Some("2025-01-01 ~"));
        assert_eq!(period(None, Some("2025.1.2")).as_deref(), Some("~ 2025.1.2"));
    }
}
