//! HTTP handlers for the olive grove records API

pub mod batch;
pub mod grid;
pub mod health;
pub mod tree;

pub use batch::*;
pub use grid::*;
pub use health::*;
pub use tree::*;

use std::str::FromStr;

use shared::UnknownTag;

use crate::error::{AppError, AppResult};

/// Parse the optional `?action_type=` filter of a detail lookup
pub(crate) fn parse_action_type<T>(raw: Option<&str>) -> AppResult<Option<T>>
where
    T: FromStr<Err = UnknownTag>,
{
    raw.map(str::parse)
        .transpose()
        .map_err(|e: UnknownTag| {
            AppError::validation("action_type", format!("Unknown action type: {}", e.0))
        })
}
