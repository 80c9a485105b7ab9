//! Read-only invariant sweep over the persisted dataset.

use std::collections::HashSet;

use tally_domain::{Identifiable, PaymentStatus};

use crate::{store::BackOfficeStore, CoreError};

/// Detects counter drift, payment inconsistencies, and dangling references
/// across the dataset. Reporting only; nothing is repaired.
pub fn integrity_warnings(store: &dyn BackOfficeStore) -> Result<Vec<String>, CoreError> {
    let mut warnings = Vec::new();

    for product in store.products()? {
        let ledger_sum: i64 = store
            .stock_transactions_for_product(product.id)?
            .iter()
            .map(|entry| entry.signed_delta())
            .sum();
        if ledger_sum != product.current_stock {
            warnings.push(format!(
                "product {} counter is {} but its movement ledger sums to {}",
                product.sku, product.current_stock, ledger_sum
            ));
        }
    }

    let invoices = store.invoices()?;
    for invoice in &invoices {
        if invoice.paid_amount > invoice.total_amount {
            warnings.push(format!(
                "invoice {} paid {} exceeds total {}",
                invoice.number, invoice.paid_amount, invoice.total_amount
            ));
        }
        let derived = PaymentStatus::derive(invoice.paid_amount, invoice.total_amount);
        if derived != invoice.payment_status {
            warnings.push(format!(
                "invoice {} carries payment status {} but amounts derive {}",
                invoice.number, invoice.payment_status, derived
            ));
        }
    }

    let invoice_ids: HashSet<_> = invoices.iter().map(|invoice| invoice.id()).collect();
    for receivable in store.receivables()? {
        if !invoice_ids.contains(&receivable.invoice_id) {
            warnings.push(format!(
                "receivable {} references unknown invoice {}",
                receivable.id, receivable.invoice_id
            ));
        }
    }

    for member in store.members()? {
        let events = store.point_transactions_for_member(member.id)?;
        for event in &events {
            if event.after_points - event.before_points != event.points {
                warnings.push(format!(
                    "point event {} snapshots do not match its point delta",
                    event.id
                ));
            }
        }
        let earned: i64 = events.iter().map(|event| event.points).sum();
        if earned != member.points {
            warnings.push(format!(
                "member {} holds {} points but the point ledger sums to {}",
                member.member_no, member.points, earned
            ));
        }
    }

    Ok(warnings)
}
