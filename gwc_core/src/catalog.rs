//! The static catalog of routes, waste types and alert presets.
//!
//! The catalog is plain JSON. A copy for the current year is bundled with the crate.

use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
    fs::read_to_string,
    path::Path,
    str::FromStr,
    sync::OnceLock,
};

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

static BUNDLED: &str = include_str!("../data/catalog.json");
static LEAD_TIME_PATTERN: &str = r"^PT(?:(\d+)H)?(?:(\d+)M)?$";

/// A waste stream that can be collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasteType {
    pub id: String,
    pub name: String,
    /// Display glyph, usually an emoji.
    pub icon: String,
    pub description: String,
    /// Display color token.
    pub color: String,
    /// Guidance text for the calendar event, falls back to a generic sentence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_description: Option<String>,
}

impl WasteType {
    /// Description written into every event of this waste type.
    pub fn event_description(&self) -> Cow<'_, str> {
        match &self.event_description {
            Some(description) => Cow::Borrowed(description),
            None => Cow::Owned(format!("{} tømmedag", self.name)),
        }
    }

    /// Title of every event of this waste type.
    pub fn summary(&self) -> String {
        format!("{} {}", self.icon, self.name)
    }
}

/// A collection route and its schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: u32,
    pub name: String,
    pub year: i32,
    #[serde(default)]
    pub areas: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Collection dates per waste type id.
    pub schedule: BTreeMap<String, Vec<NaiveDate>>,
}

impl Route {
    /// The scheduled dates of a waste type, empty if there are none.
    pub fn dates(&self, waste_type_id: &str) -> &[NaiveDate] {
        self.schedule
            .get(waste_type_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn total_events(&self) -> usize {
        self.schedule.values().map(Vec::len).sum()
    }

    /// Whether any dates have been published for this route.
    pub fn has_schedule(&self) -> bool {
        self.schedule.values().any(|dates| !dates.is_empty())
    }
}

/// How long before the collection an alarm fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LeadTime {
    minutes: u32,
}

impl LeadTime {
    /// Returns `None` if the minute count does not fit.
    pub fn from_hours(hours: u32) -> Option<Self> {
        Self::from_parts(hours, 0)
    }

    fn from_parts(hours: u32, minutes: u32) -> Option<Self> {
        let minutes = hours.checked_mul(60)?.checked_add(minutes)?;
        Some(LeadTime { minutes })
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }
}

impl FromStr for LeadTime {
    type Err = anyhow::Error;

    /// Parse the duration form `PT<N>H`, `PT<N>M` or `PT<N>H<M>M`.
    fn from_str(value: &str) -> Result<Self> {
        let captures = lead_time_pattern()?
            .captures(value)
            .ok_or_else(|| anyhow!("invalid lead time {value:?}, expected PT<N>H"))?;
        let (hours, minutes) = (captures.get(1), captures.get(2));
        if hours.is_none() && minutes.is_none() {
            bail!("invalid lead time {value:?}, expected PT<N>H");
        }
        let hours: u32 = hours.map_or(Ok(0), |hours| hours.as_str().parse())?;
        let minutes: u32 = minutes.map_or(Ok(0), |minutes| minutes.as_str().parse())?;
        Self::from_parts(hours, minutes)
            .ok_or_else(|| anyhow!("lead time {value:?} is too long"))
    }
}

fn lead_time_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    if let Some(pattern) = PATTERN.get() {
        return Ok(pattern);
    }
    let pattern = Regex::new(LEAD_TIME_PATTERN)?;
    Ok(PATTERN.get_or_init(|| pattern))
}

/// The form a waste type id takes inside event UIDs.
///
/// Whitespace runs collapse to `-`, leading and trailing whitespace is dropped.
pub fn uid_token(waste_type_id: &str) -> String {
    waste_type_id
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

impl TryFrom<String> for LeadTime {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LeadTime> for String {
    fn from(value: LeadTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for LeadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hours, minutes) = (self.minutes / 60, self.minutes % 60);
        match (hours, minutes) {
            (hours, 0) => write!(f, "PT{hours}H"),
            (0, minutes) => write!(f, "PT{minutes}M"),
            (hours, minutes) => write!(f, "PT{hours}H{minutes}M"),
        }
    }
}

/// A reminder the resident can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPreset {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Lead time before the event start.
    pub duration: LeadTime,
}

/// Routes, waste types and alert presets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Product name used in calendar names and file names.
    pub product: String,
    pub waste_types: Vec<WasteType>,
    pub alert_presets: Vec<AlertPreset>,
    pub routes: Vec<Route>,
}

impl Catalog {
    /// The catalog shipped with this crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED).context("bundled catalog is invalid")
    }

    /// Read a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = read_to_string(path)
            .with_context(|| format!("could not read catalog {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid catalog {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let mut route_ids = HashSet::new();
        for route in &self.routes {
            if !route_ids.insert(route.id) {
                bail!("duplicate route id {}", route.id);
            }
        }
        let mut uid_tokens = HashMap::new();
        for waste_type in &self.waste_types {
            let token = uid_token(&waste_type.id);
            if token.is_empty() {
                bail!("waste type id {:?} is blank", waste_type.id);
            }
            if let Some(other) = uid_tokens.insert(token, waste_type.id.as_str()) {
                if other == waste_type.id {
                    bail!("duplicate waste type id {:?}", waste_type.id);
                }
                bail!(
                    "waste type ids {:?} and {:?} give the same event uid",
                    other,
                    waste_type.id
                );
            }
        }
        let mut alert_preset_ids = HashSet::new();
        for alert_preset in &self.alert_presets {
            if !alert_preset_ids.insert(alert_preset.id.as_str()) {
                bail!("duplicate alert preset id {:?}", alert_preset.id);
            }
        }
        Ok(())
    }

    pub fn route(&self, id: u32) -> Option<&Route> {
        self.routes.iter().find(|route| route.id == id)
    }

    pub fn waste_type(&self, id: &str) -> Option<&WasteType> {
        self.waste_types
            .iter()
            .find(|waste_type| waste_type.id == id)
    }

    pub fn alert_preset(&self, id: &str) -> Option<&AlertPreset> {
        self.alert_presets.iter().find(|preset| preset.id == id)
    }

    /// Resolve alert preset ids in the given order.
    pub fn alert_presets<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Result<Vec<AlertPreset>> {
        ids.into_iter()
            .map(|id| {
                self.alert_preset(id)
                    .cloned()
                    .ok_or_else(|| anyhow!("unknown alert preset {id:?}"))
            })
            .collect()
    }

    /// All waste type ids in catalog order.
    pub fn waste_type_ids(&self) -> Vec<String> {
        self.waste_types
            .iter()
            .map(|waste_type| waste_type.id.clone())
            .collect()
    }
}
