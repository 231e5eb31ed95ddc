//! Oil batch processing log models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{ActionDetail, UnknownTag};

/// Log header: one step in the life of an oil batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchLog {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub date: NaiveDate,
    pub action_type: BatchActionType,
    pub created_at: DateTime<Utc>,
}

/// Steps an oil batch goes through
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BatchActionType {
    TransportationGroveToPlant,
    Processing,
    Filtering,
    TransportationPlantToHome,
    Bottling,
}

impl BatchActionType {
    pub const ALL: [BatchActionType; 5] = [
        BatchActionType::TransportationGroveToPlant,
        BatchActionType::Processing,
        BatchActionType::Filtering,
        BatchActionType::TransportationPlantToHome,
        BatchActionType::Bottling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BatchActionType::TransportationGroveToPlant => "transportation_grove_to_plant",
            BatchActionType::Processing => "processing",
            BatchActionType::Filtering => "filtering",
            BatchActionType::TransportationPlantToHome => "transportation_plant_to_home",
            BatchActionType::Bottling => "bottling",
        }
    }
}

impl std::fmt::Display for BatchActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BatchActionType {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BatchActionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

/// Transport leg (grove to plant, or plant to home)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransportationDetail {
    pub driver_name: Option<String>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProcessingDetail {
    pub plant_name: Option<String>,
    pub notes: Option<String>,
    pub price: Option<Decimal>,
    pub weight_kgs: Option<Decimal>,
    pub yield_liters: Option<Decimal>,
    /// Oil yield in percent (0-100)
    pub percentage: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilteringDetail {
    pub plant_name: Option<String>,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BottlingDetail {
    pub container_volume_liters: Option<Decimal>,
}

/// Detail record of a batch log, one variant per action type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum BatchAction {
    TransportationGroveToPlant(TransportationDetail),
    Processing(ProcessingDetail),
    Filtering(FilteringDetail),
    TransportationPlantToHome(TransportationDetail),
    Bottling(BottlingDetail),
}

impl ActionDetail for BatchAction {
    type Kind = BatchActionType;

    fn kind(&self) -> BatchActionType {
        match self {
            BatchAction::TransportationGroveToPlant(_) => BatchActionType::TransportationGroveToPlant,
            BatchAction::Processing(_) => BatchActionType::Processing,
            BatchAction::Filtering(_) => BatchActionType::Filtering,
            BatchAction::TransportationPlantToHome(_) => BatchActionType::TransportationPlantToHome,
            BatchAction::Bottling(_) => BatchActionType::Bottling,
        }
    }

    fn fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let value = match self {
            BatchAction::TransportationGroveToPlant(d) => serde_json::to_value(d)?,
            BatchAction::Processing(d) => serde_json::to_value(d)?,
            BatchAction::Filtering(d) => serde_json::to_value(d)?,
            BatchAction::TransportationPlantToHome(d) => serde_json::to_value(d)?,
            BatchAction::Bottling(d) => serde_json::to_value(d)?,
        };
        Ok(super::into_object(value))
    }

    fn from_fields(kind: BatchActionType, row: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            BatchActionType::TransportationGroveToPlant => {
                BatchAction::TransportationGroveToPlant(serde_json::from_value(row)?)
            }
            BatchActionType::Processing => BatchAction::Processing(serde_json::from_value(row)?),
            BatchActionType::Filtering => BatchAction::Filtering(serde_json::from_value(row)?),
            BatchActionType::TransportationPlantToHome => {
                BatchAction::TransportationPlantToHome(serde_json::from_value(row)?)
            }
            BatchActionType::Bottling => BatchAction::Bottling(serde_json::from_value(row)?),
        })
    }
}

/// A batch log together with its detail record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchLogEntry {
    #[serde(flatten)]
    pub log: BatchLog,
    pub detail: Option<BatchAction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_legs_share_fields_but_not_kind() {
        let detail = TransportationDetail {
            driver_name: Some("Nikos".to_string()),
            price: Some(Decimal::new(4500, 2)),
        };
        let out = BatchAction::TransportationGroveToPlant(detail.clone());
        let back = BatchAction::TransportationPlantToHome(detail);

        assert_eq!(out.kind(), BatchActionType::TransportationGroveToPlant);
        assert_eq!(back.kind(), BatchActionType::TransportationPlantToHome);
        assert_eq!(out.fields().unwrap(), back.fields().unwrap());
    }

    #[test]
    fn test_tag_names_match_store_tokens() {
        let body = serde_json::json!({
            "action_type": "transportation_plant_to_home",
            "driver_name": "Eleni"
        });
        let action: BatchAction = serde_json::from_value(body).unwrap();
        assert_eq!(action.kind().as_str(), "transportation_plant_to_home");
    }
}
