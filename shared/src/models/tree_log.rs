//! Horticultural log models for individual trees

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{ActionDetail, UnknownTag};

/// Log header: one event on one tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeLog {
    pub id: Uuid,
    pub tree_id: Uuid,
    pub date: NaiveDate,
    pub action_type: TreeActionType,
    pub created_at: DateTime<Utc>,
}

/// Kinds of tree events
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TreeActionType {
    Pruning,
    Irrigation,
    Harvesting,
    Fertilizing,
    Treatment,
    Flowering,
    Weather,
}

impl TreeActionType {
    pub const ALL: [TreeActionType; 7] = [
        TreeActionType::Pruning,
        TreeActionType::Irrigation,
        TreeActionType::Harvesting,
        TreeActionType::Fertilizing,
        TreeActionType::Treatment,
        TreeActionType::Flowering,
        TreeActionType::Weather,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TreeActionType::Pruning => "pruning",
            TreeActionType::Irrigation => "irrigation",
            TreeActionType::Harvesting => "harvesting",
            TreeActionType::Fertilizing => "fertilizing",
            TreeActionType::Treatment => "treatment",
            TreeActionType::Flowering => "flowering",
            TreeActionType::Weather => "weather",
        }
    }
}

impl std::fmt::Display for TreeActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TreeActionType {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TreeActionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

/// Pruning work carried out
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PruningDetail {
    #[serde(default)]
    pub vase_shape: bool,
    #[serde(default)]
    pub bushy_shape: bool,
    #[serde(default)]
    pub clear_trunk: bool,
    #[serde(default)]
    pub skirt: bool,
    #[serde(default)]
    pub high_growing_ends: bool,
    #[serde(default)]
    pub wild_shoots: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IrrigationDetail {
    pub number_of_drippers: Option<i32>,
    pub number_of_hours: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HarvestingDetail {
    pub amount_kgs: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvesting_profile_id: Option<Uuid>,
}

/// Fertilizer components applied
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FertilizingDetail {
    #[serde(default)]
    pub nitrogen: bool,
    #[serde(default)]
    pub potassium: bool,
    #[serde(default)]
    pub phosphore: bool,
    #[serde(default)]
    pub borron: bool,
    #[serde(default)]
    pub chicken_manure: bool,
    #[serde(default)]
    pub lime: bool,
    #[serde(default)]
    pub gypsum: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TreatmentDetail {
    #[serde(default)]
    pub white_oil: bool,
    pub other: Option<String>,
}

/// Flowering coverage, both values in percent (0-100)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FloweringDetail {
    pub percentage_initial: Option<Decimal>,
    pub percentage_remaining: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeatherDetail {
    #[serde(default)]
    pub frost: bool,
    #[serde(default)]
    pub rain: bool,
    /// Degrees Celsius
    pub temperature: Option<Decimal>,
}

/// Detail record of a tree log, one variant per action type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum TreeAction {
    Pruning(PruningDetail),
    Irrigation(IrrigationDetail),
    Harvesting(HarvestingDetail),
    Fertilizing(FertilizingDetail),
    Treatment(TreatmentDetail),
    Flowering(FloweringDetail),
    Weather(WeatherDetail),
}

impl ActionDetail for TreeAction {
    type Kind = TreeActionType;

    fn kind(&self) -> TreeActionType {
        match self {
            TreeAction::Pruning(_) => TreeActionType::Pruning,
            TreeAction::Irrigation(_) => TreeActionType::Irrigation,
            TreeAction::Harvesting(_) => TreeActionType::Harvesting,
            TreeAction::Fertilizing(_) => TreeActionType::Fertilizing,
            TreeAction::Treatment(_) => TreeActionType::Treatment,
            TreeAction::Flowering(_) => TreeActionType::Flowering,
            TreeAction::Weather(_) => TreeActionType::Weather,
        }
    }

    fn fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let value = match self {
            TreeAction::Pruning(d) => serde_json::to_value(d)?,
            TreeAction::Irrigation(d) => serde_json::to_value(d)?,
            TreeAction::Harvesting(d) => serde_json::to_value(d)?,
            TreeAction::Fertilizing(d) => serde_json::to_value(d)?,
            TreeAction::Treatment(d) => serde_json::to_value(d)?,
            TreeAction::Flowering(d) => serde_json::to_value(d)?,
            TreeAction::Weather(d) => serde_json::to_value(d)?,
        };
        Ok(super::into_object(value))
    }

    fn from_fields(kind: TreeActionType, row: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            TreeActionType::Pruning => TreeAction::Pruning(serde_json::from_value(row)?),
            TreeActionType::Irrigation => TreeAction::Irrigation(serde_json::from_value(row)?),
            TreeActionType::Harvesting => TreeAction::Harvesting(serde_json::from_value(row)?),
            TreeActionType::Fertilizing => TreeAction::Fertilizing(serde_json::from_value(row)?),
            TreeActionType::Treatment => TreeAction::Treatment(serde_json::from_value(row)?),
            TreeActionType::Flowering => TreeAction::Flowering(serde_json::from_value(row)?),
            TreeActionType::Weather => TreeAction::Weather(serde_json::from_value(row)?),
        })
    }
}

/// A tree log together with its detail record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeLogEntry {
    #[serde(flatten)]
    pub log: TreeLog,
    pub detail: Option<TreeAction>,
}
