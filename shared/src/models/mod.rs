//! Domain models for the olive grove records

mod batch;
mod batch_log;
mod tree;
mod tree_log;

pub use batch::*;
pub use batch_log::*;
pub use tree::*;
pub use tree_log::*;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

/// Tag that does not name a known enumeration member
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tag: {0}")]
pub struct UnknownTag(pub String);

/// Typed detail record attached to a log header.
///
/// Every implementor is a closed enum with one variant per action type; the
/// variant decides which detail table the fields belong to.
pub trait ActionDetail: Serialize + DeserializeOwned + Send + Sync + Sized {
    /// The plain action tag stored on the log header
    type Kind: Copy + Serialize + DeserializeOwned + std::fmt::Display + Send + Sync;

    fn kind(&self) -> Self::Kind;

    /// Field set stored in the detail table, without the tag or parent key
    fn fields(&self) -> Result<Map<String, Value>, serde_json::Error>;

    /// Rebuild the detail from a stored row of the table for `kind`
    fn from_fields(kind: Self::Kind, row: Value) -> Result<Self, serde_json::Error>;
}

pub(crate) fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
