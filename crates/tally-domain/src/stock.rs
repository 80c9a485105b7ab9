//! Domain models for the append-only stock movement ledger.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Identifiable;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Enumerates the direction of a stock movement.
pub enum StockMovementKind {
    In,
    Out,
    Adjustment,
}

impl fmt::Display for StockMovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StockMovementKind::In => "IN",
            StockMovementKind::Out => "OUT",
            StockMovementKind::Adjustment => "ADJUSTMENT",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Enumerates the document families a stock movement can originate from.
pub enum SourceKind {
    Invoice,
    Purchase,
    Adjustment,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceKind::Invoice => "invoice",
            SourceKind::Purchase => "purchase",
            SourceKind::Adjustment => "adjustment",
        };
        f.write_str(label)
    }
}

/// Reference from a stock movement back to the document that caused it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceRef {
    pub kind: SourceKind,
    pub id: Uuid,
}

impl SourceRef {
    pub fn invoice(id: Uuid) -> Self {
        Self {
            kind: SourceKind::Invoice,
            id,
        }
    }

    pub fn purchase(id: Uuid) -> Self {
        Self {
            kind: SourceKind::Purchase,
            id,
        }
    }

    pub fn adjustment(id: Uuid) -> Self {
        Self {
            kind: SourceKind::Adjustment,
            id,
        }
    }
}

/// One immutable entry of the stock ledger. Entries are never updated or
/// deleted; they are the sole audit trail for stock changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTransaction {
    pub id: Uuid,
    pub product_id: Uuid,
    pub kind: StockMovementKind,
    /// Positive magnitude of the movement; direction lives in `kind`.
    pub quantity: i64,
    pub before_stock: i64,
    pub after_stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
    pub operator: String,
    pub created_at: DateTime<Utc>,
}

impl StockTransaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        product_id: Uuid,
        kind: StockMovementKind,
        quantity: i64,
        before_stock: i64,
        after_stock: i64,
        source: Option<SourceRef>,
        operator: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            kind,
            quantity,
            before_stock,
            after_stock,
            source,
            operator: operator.into(),
            created_at,
        }
    }

    /// Signed effect of this movement on the product counter.
    pub fn signed_delta(&self) -> i64 {
        self.after_stock - self.before_stock
    }
}

impl Identifiable for StockTransaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_delta_follows_counter_snapshots() {
        let now = Utc::now();
        let out = StockTransaction::new(
            Uuid::new_v4(),
            StockMovementKind::Out,
            4,
            10,
            6,
            None,
            "op",
            now,
        );
        assert_eq!(out.signed_delta(), -4);

        let adjustment = StockTransaction::new(
            Uuid::new_v4(),
            StockMovementKind::Adjustment,
            3,
            6,
            9,
            None,
            "op",
            now,
        );
        assert_eq!(adjustment.signed_delta(), 3);
    }
}
