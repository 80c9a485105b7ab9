//! Domain model for sellable products and their stock counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{Displayable, Identifiable};

/// A sellable product. `current_stock` is the running counter maintained by
/// the stock ledger; it may go negative as a soft-warning state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub unit_price: f64,
    #[serde(default)]
    pub current_stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product with an empty stock counter. Stock arrives through
    /// ledger movements, never by constructing a non-zero counter.
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        unit_price: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sku: sku.into(),
            name: name.into(),
            category: None,
            unit_price,
            current_stock: 0,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl Identifiable for Product {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Product {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.sku)
    }
}
