// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Client for the youth activity information service (청소년활동정보서비스).

/// HTTP client and envelope decoding.
pub mod client;
/// Plain-text reports.
pub mod format;
/// Items, queries and paged results.
pub mod types;

pub use client::{Endpoint, YouthApiClient, decode_envelope};
pub use types::{
    ActivityItem, ActivityQuery, FacilityGroupItem, FacilityGroupQuery, Items, PagedResult,
    Pagination, SidoItem, SigunguItem,
};
