//! Reports about a calendar before it is generated.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    calendar::{expand, selected, Occurrence},
    catalog::Catalog,
};

/// Event counts of one waste type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteTypeSummary {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub count: usize,
    /// First date in catalog order, not necessarily the earliest.
    pub first_date: NaiveDate,
    /// Last date in catalog order, not necessarily the latest.
    pub last_date: NaiveDate,
}

/// Event counts of a whole calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarSummary {
    pub total: usize,
    pub types: Vec<WasteTypeSummary>,
}

/// Summarize the calendar [`crate::calendar::generate`] would build.
///
/// Returns `None` if the route is unknown.
pub fn summarize(
    catalog: &Catalog,
    route_id: u32,
    waste_type_ids: &BTreeSet<String>,
) -> Option<CalendarSummary> {
    let route = catalog.route(route_id)?;
    let types: Vec<WasteTypeSummary> = selected(catalog, route, waste_type_ids)
        .into_iter()
        .filter_map(|(waste_type, dates)| {
            Some(WasteTypeSummary {
                id: waste_type.id.clone(),
                name: waste_type.name.clone(),
                icon: waste_type.icon.clone(),
                count: dates.len(),
                first_date: *dates.first()?,
                last_date: *dates.last()?,
            })
        })
        .collect();
    Some(CalendarSummary {
        total: types.iter().map(|summary| summary.count).sum(),
        types,
    })
}

/// Occurrences split around a reference day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview<'a> {
    /// Occurrences on or after the reference day, in calendar order.
    pub upcoming: Vec<Occurrence<'a>>,
    /// Number of occurrences before the reference day.
    pub past: usize,
}

/// Preview the occurrences of a calendar relative to `today`.
///
/// Returns `None` if the route is unknown.
pub fn preview<'a>(
    catalog: &'a Catalog,
    route_id: u32,
    waste_type_ids: &BTreeSet<String>,
    today: NaiveDate,
) -> Option<Preview<'a>> {
    let route = catalog.route(route_id)?;
    let (past, upcoming): (Vec<Occurrence>, Vec<Occurrence>) =
        expand(catalog, route, waste_type_ids)
            .into_iter()
            .partition(|occurrence| occurrence.date < today);
    Some(Preview {
        upcoming,
        past: past.len(),
    })
}
