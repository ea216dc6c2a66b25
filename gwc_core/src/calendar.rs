//! This module builds the iCalendar document for one route.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use ical::{
    generator::{Emitter, Property},
    ical_param, ical_property,
};
use log::{debug, info};

use crate::{
    catalog::{uid_token, AlertPreset, Catalog, Route, WasteType},
    component::Component,
    format::{escape_text, format_date_time, format_utc},
};

/// Media type of the generated file.
pub static MEDIA_TYPE: &str = "text/calendar; charset=utf-8";
pub static FILE_EXTENSION: &str = "ics";
static TIMEZONE: &str = "Europe/Oslo";
static UID_PREFIX: &str = "gjesdal";
static UID_DOMAIN: &str = "calendar";
static LANGUAGE: &str = "NO";
static START_HOUR: u32 = 7;
static EVENT_DURATION: &str = "PT1H";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Route {0} not found")]
    UnknownRoute(u32),
}

/// Everything needed to generate one calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub route_id: u32,
    pub waste_type_ids: BTreeSet<String>,
    /// Alarms attached to every event, in this order.
    pub alerts: Vec<AlertPreset>,
}

impl GenerationRequest {
    pub fn new<I, S>(route_id: u32, waste_type_ids: I, alerts: Vec<AlertPreset>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GenerationRequest {
            route_id,
            waste_type_ids: waste_type_ids.into_iter().map(Into::into).collect(),
            alerts,
        }
    }
}

/// One collection of one waste type on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    pub date: NaiveDate,
    pub waste_type: &'a WasteType,
}

/// A generated calendar file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDocument {
    pub calendar_name: String,
    /// Suggested name for the downloaded file.
    pub file_name: String,
    pub content: String,
    pub event_count: usize,
}

/// Generate the calendar for a request, stamped with the current time.
pub fn generate(
    catalog: &Catalog,
    request: &GenerationRequest,
) -> Result<CalendarDocument, CalendarError> {
    generate_at(catalog, request, Utc::now())
}

/// Generate the calendar for a request with a fixed generation stamp.
pub fn generate_at(
    catalog: &Catalog,
    request: &GenerationRequest,
    generated: DateTime<Utc>,
) -> Result<CalendarDocument, CalendarError> {
    let route = catalog
        .route(request.route_id)
        .ok_or(CalendarError::UnknownRoute(request.route_id))?;
    let stamp = format_utc(generated);
    let occurrences = expand(catalog, route, &request.waste_type_ids);
    let name = calendar_name(catalog, route);
    let mut calendar = Component::new("VCALENDAR")
        .set(ical_property!("VERSION", "2.0"))
        .set(ical_property!("PRODID", prod_id(&name)))
        .set(ical_property!("CALSCALE", "GREGORIAN"))
        .set(ical_property!("METHOD", "PUBLISH"))
        .set(ical_property!("X-WR-CALNAME", escape_text(&name)))
        .set(ical_property!("X-WR-TIMEZONE", TIMEZONE))
        .with(time_zone());
    for occurrence in &occurrences {
        calendar = calendar.with(build_event(route.id, occurrence, &stamp, &request.alerts));
    }
    info!(
        "generated calendar for route {} with {} events",
        route.id,
        occurrences.len()
    );
    Ok(CalendarDocument {
        file_name: file_name(catalog, route),
        calendar_name: name,
        content: calendar.generate(),
        event_count: occurrences.len(),
    })
}

/// The requested waste types with dates on this route, in catalog order.
///
/// Unknown waste type ids and waste types without dates are skipped.
pub(crate) fn selected<'a>(
    catalog: &'a Catalog,
    route: &'a Route,
    waste_type_ids: &BTreeSet<String>,
) -> Vec<(&'a WasteType, &'a [NaiveDate])> {
    for id in waste_type_ids {
        if catalog.waste_type(id).is_none() {
            debug!("skipping unknown waste type {id:?} for route {}", route.id);
        }
    }
    catalog
        .waste_types
        .iter()
        .filter(|waste_type| waste_type_ids.contains(&waste_type.id))
        .filter_map(|waste_type| {
            let dates = route.dates(&waste_type.id);
            if dates.is_empty() {
                debug!(
                    "skipping waste type {:?} for route {}: no dates",
                    waste_type.id, route.id
                );
                return None;
            }
            Some((waste_type, dates))
        })
        .collect()
}

/// Expand the selection into occurrences sorted by date, then waste type id.
pub(crate) fn expand<'a>(
    catalog: &'a Catalog,
    route: &'a Route,
    waste_type_ids: &BTreeSet<String>,
) -> Vec<Occurrence<'a>> {
    let mut occurrences: Vec<Occurrence> = selected(catalog, route, waste_type_ids)
        .into_iter()
        .flat_map(|(waste_type, dates)| {
            dates
                .iter()
                .map(move |&date| Occurrence { date, waste_type })
        })
        .collect();
    occurrences.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.waste_type.id.cmp(&b.waste_type.id))
    });
    occurrences
}

/// Build one `VALARM` per preset, in preset order.
pub fn build_alarms(label: &str, alerts: &[AlertPreset]) -> Vec<Component> {
    alerts
        .iter()
        .map(|alert| {
            Component::new("VALARM")
                .set(ical_property!("ACTION", "DISPLAY"))
                .set(ical_property!("TRIGGER", format!("-{}", alert.duration)))
                .set(ical_property!("DESCRIPTION", escape_text(label)))
        })
        .collect()
}

/// Build the `VEVENT` of one occurrence.
pub fn build_event(
    route_id: u32,
    occurrence: &Occurrence,
    stamp: &str,
    alerts: &[AlertPreset],
) -> Component {
    let waste_type = occurrence.waste_type;
    let start = NaiveTime::from_hms_opt(START_HOUR, 0, 0).unwrap_or_default();
    let mut event = Component::new("VEVENT")
        .set(ical_property!(
            "UID",
            uid(route_id, &waste_type.id, occurrence.date)
        ))
        .set(ical_property!("DTSTAMP", stamp))
        .set(ical_property!(
            "DTSTART",
            format_date_time(occurrence.date, start),
            ical_param!("TZID", TIMEZONE)
        ))
        .set(ical_property!("DURATION", EVENT_DURATION))
        .set(ical_property!("SUMMARY", escape_text(&waste_type.summary())))
        .set(ical_property!(
            "DESCRIPTION",
            escape_text(&waste_type.event_description())
        ))
        .set(ical_property!("TRANSP", "TRANSPARENT"));
    for alarm in build_alarms(&format!("{} henting", waste_type.name), alerts) {
        event = event.with(alarm);
    }
    event
}

/// Get a unique id for a waste type collection on a route and day.
///
/// Changing this function is a breaking change!
/// Catalog validation keeps the result unique per waste type.
pub fn uid(route_id: u32, waste_type_id: &str, date: NaiveDate) -> String {
    let waste_type_id = uid_token(waste_type_id);
    format!("{UID_PREFIX}-r{route_id}-{waste_type_id}-{date}@{UID_DOMAIN}")
}

/// Human readable calendar name, e.g. `Gjesdal Tømmekalender 2026 - Rute 3`.
pub fn calendar_name(catalog: &Catalog, route: &Route) -> String {
    format!("{} {} - {}", catalog.product, route.year, route.name)
}

pub fn file_name(catalog: &Catalog, route: &Route) -> String {
    format!("{}.{FILE_EXTENSION}", calendar_name(catalog, route))
}

fn prod_id(name: &str) -> String {
    ["-", name, LANGUAGE].join("//")
}

/// Static definition of the local time zone.
///
/// Daylight saving time starts on the last Sunday of March and ends on the last
/// Sunday of October.
fn time_zone() -> Component {
    Component::new("VTIMEZONE")
        .set(ical_property!("TZID", TIMEZONE))
        .with(
            Component::new("DAYLIGHT")
                .set(ical_property!("TZOFFSETFROM", "+0100"))
                .set(ical_property!("TZOFFSETTO", "+0200"))
                .set(ical_property!("TZNAME", "CEST"))
                .set(ical_property!("DTSTART", "19700329T020000"))
                .set(ical_property!("RRULE", "FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU")),
        )
        .with(
            Component::new("STANDARD")
                .set(ical_property!("TZOFFSETFROM", "+0200"))
                .set(ical_property!("TZOFFSETTO", "+0100"))
                .set(ical_property!("TZNAME", "CET"))
                .set(ical_property!("DTSTART", "19701025T030000"))
                .set(ical_property!("RRULE", "FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU")),
        )
}
