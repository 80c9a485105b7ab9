//! Domain model for accounts-receivable records.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Identifiable;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Settlement state of a receivable.
pub enum ReceivableStatus {
    Pending,
    Settled,
}

impl fmt::Display for ReceivableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReceivableStatus::Pending => "Pending",
            ReceivableStatus::Settled => "Settled",
        };
        f.write_str(label)
    }
}

/// Outstanding balance opened for an invoice that was not fully paid at
/// creation time. Created once; later payments against the invoice do not
/// update this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountReceivable {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub customer_id: Uuid,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub remaining_amount: f64,
    pub due_date: NaiveDate,
    pub status: ReceivableStatus,
    pub created_at: DateTime<Utc>,
}

impl AccountReceivable {
    pub fn new(
        invoice_id: Uuid,
        customer_id: Uuid,
        total_amount: f64,
        paid_amount: f64,
        remaining_amount: f64,
        due_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            invoice_id,
            customer_id,
            total_amount,
            paid_amount,
            remaining_amount,
            due_date,
            status: ReceivableStatus::Pending,
            created_at,
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        matches!(self.status, ReceivableStatus::Pending) && self.due_date < today
    }
}

impl Identifiable for AccountReceivable {
    fn id(&self) -> Uuid {
        self.id
    }
}
