//! Adding a product to an existing order
//!
//! The store reads the order's current rows, asks [`plan_line_item_write`]
//! what to do, and applies the answer inside the same transaction.

use crate::core::error::{ShopError, ShopResult, ValidationError};
use crate::core::model::OrderLineItem;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How an add-product request treats a product already on the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemMode {
    /// Update the existing row to the summed quantity
    #[default]
    Merge,
    /// Insert a second row carrying the summed quantity, leaving the old row
    /// in place. Kept for clients that depend on the duplicate rows.
    LegacyAppend,
}

impl FromStr for LineItemMode {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" => Ok(LineItemMode::Merge),
            "legacy_append" | "legacy-append" => Ok(LineItemMode::LegacyAppend),
            other => Err(ValidationError::FieldError {
                field: "line_item_mode".to_string(),
                message: format!("expected merge or legacy_append, got '{}'", other),
            }
            .into()),
        }
    }
}

/// The single write an add-product request turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemWrite {
    Insert { quantity: i32 },
    Update { line_id: i64, quantity: i32 },
}

impl LineItemWrite {
    pub fn quantity(&self) -> i32 {
        match self {
            LineItemWrite::Insert { quantity } | LineItemWrite::Update { quantity, .. } => {
                *quantity
            }
        }
    }
}

/// Decide how to record `requested` units of `product_id`.
///
/// `existing` holds rows of the order in insertion order, at least the
/// product's first row when it has one; that first row wins.
pub fn plan_line_item_write(
    existing: &[OrderLineItem],
    product_id: i64,
    requested: i32,
    mode: LineItemMode,
) -> ShopResult<LineItemWrite> {
    let Some(current) = existing.iter().find(|row| row.product_id == product_id) else {
        return Ok(LineItemWrite::Insert {
            quantity: requested,
        });
    };

    let quantity = current.quantity.checked_add(requested).ok_or_else(|| {
        ShopError::from(ValidationError::FieldError {
            field: "quantity".to_string(),
            message: format!(
                "{} + {} overflows the line item quantity",
                current.quantity, requested
            ),
        })
    })?;

    Ok(match mode {
        LineItemMode::Merge => LineItemWrite::Update {
            line_id: current.id,
            quantity,
        },
        LineItemMode::LegacyAppend => LineItemWrite::Insert { quantity },
    })
}
