//! Opens accounts-receivable records for invoices left partly unpaid.

use chrono::Duration;

use tally_domain::{round_money, AccountReceivable, Invoice};

use crate::{store::BackOfficeStore, CoreError};

/// Default payment term applied when opening a receivable.
pub const DEFAULT_DUE_DAYS: i64 = 30;

pub struct ReceivableLedger;

impl ReceivableLedger {
    /// Creates one receivable for the invoice's unpaid remainder, due
    /// `due_days` after the invoice creation date. No-op when the invoice is
    /// fully paid. The record is not revisited by later payments against the
    /// invoice, nor reversed on cancellation.
    pub fn open_if_needed(
        store: &dyn BackOfficeStore,
        invoice: &Invoice,
        due_days: i64,
    ) -> Result<Option<AccountReceivable>, CoreError> {
        let remaining = round_money(invoice.total_amount - invoice.paid_amount);
        if remaining <= 0.0 {
            return Ok(None);
        }
        let due_date = invoice.created_at.date_naive() + Duration::days(due_days);
        let receivable = AccountReceivable::new(
            invoice.id,
            invoice.customer.customer_id,
            invoice.total_amount,
            invoice.paid_amount,
            remaining,
            due_date,
            invoice.created_at,
        );
        store.insert_receivable(&receivable)?;
        Ok(Some(receivable))
    }
}
