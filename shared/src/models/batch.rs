//! Processing batch models (oil and pickling)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Tree;

/// Trees sent together to an oil press
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OilProcessingBatch {
    pub id: Uuid,
    pub date: NaiveDate,
    pub tree_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Trees whose fruit is pickled together
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PicklingBatch {
    pub id: Uuid,
    pub date: NaiveDate,
    pub tree_ids: Vec<Uuid>,
    pub variety: Option<String>,
    pub ripeness: Option<String>,
    pub notes: Option<String>,
    pub supplier: Option<String>,
    /// Brine salt content in percent (0-100)
    pub salt_percentage: Option<Decimal>,
    #[serde(default)]
    pub bruised: bool,
    pub recipe_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row inserted for a new oil batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOilProcessingBatch {
    pub date: NaiveDate,
    pub tree_ids: Vec<Uuid>,
}

/// Descriptive pickling fields, shared by creation and update
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PicklingDetails {
    pub variety: Option<String>,
    pub ripeness: Option<String>,
    pub notes: Option<String>,
    pub supplier: Option<String>,
    pub salt_percentage: Option<Decimal>,
    #[serde(default)]
    pub bruised: bool,
    pub recipe_notes: Option<String>,
}

impl PicklingDetails {
    /// Blank text fields are stored as null
    pub fn normalized(self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value.filter(|s| !s.trim().is_empty())
        }

        Self {
            variety: blank_to_none(self.variety),
            ripeness: blank_to_none(self.ripeness),
            notes: blank_to_none(self.notes),
            supplier: blank_to_none(self.supplier),
            salt_percentage: self.salt_percentage,
            bruised: self.bruised,
            recipe_notes: blank_to_none(self.recipe_notes),
        }
    }
}

/// Row inserted for a new pickling batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPicklingBatch {
    pub date: NaiveDate,
    pub tree_ids: Vec<Uuid>,
    #[serde(flatten)]
    pub details: PicklingDetails,
}

/// A batch together with the trees it references
#[derive(Debug, Clone, Serialize)]
pub struct BatchWithTrees<B> {
    #[serde(flatten)]
    pub batch: B,
    pub trees: Vec<Tree>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_pickling_fields_become_null() {
        let details = PicklingDetails {
            variety: Some("  ".to_string()),
            ripeness: Some("green".to_string()),
            notes: Some(String::new()),
            ..Default::default()
        }
        .normalized();

        assert_eq!(details.variety, None);
        assert_eq!(details.ripeness.as_deref(), Some("green"));
        assert_eq!(details.notes, None);
    }

    #[test]
    fn test_new_pickling_batch_is_flat() {
        let row = NewPicklingBatch {
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            tree_ids: vec![Uuid::nil()],
            details: PicklingDetails {
                bruised: true,
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["bruised"], serde_json::json!(true));
        assert_eq!(value["date"], serde_json::json!("2024-05-02"));
        assert!(value.get("details").is_none());
    }
}
