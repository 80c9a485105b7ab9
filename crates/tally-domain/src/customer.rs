//! Domain model for customers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{Displayable, Identifiable};

/// A customer record. The engine reads customers as immutable snapshots at
/// the moment an invoice is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            phone: None,
            email: None,
            created_at,
        }
    }
}

impl Identifiable for Customer {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Customer {
    fn display_label(&self) -> String {
        self.name.clone()
    }
}
