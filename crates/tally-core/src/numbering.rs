//! Sequential invoice numbering per calendar month.

use chrono::{Datelike, NaiveDate};

use tally_domain::Invoice;

const NUMBER_PREFIX: &str = "INV";

/// Derives the next `INV<yyyy><mm>-<seq>` number from the invoices already
/// recorded. Only non-cancelled invoices count toward the sequence, so a
/// cancelled invoice's number text becomes reachable again only through a
/// manually entered duplicate, never through the allocator.
pub struct InvoiceNumberAllocator;

impl InvoiceNumberAllocator {
    /// Always succeeds; an empty period starts at sequence 1. Calling twice
    /// without persisting an invoice in between yields the same candidate.
    pub fn next_number(invoices: &[Invoice], today: NaiveDate) -> String {
        let prefix = Self::period_prefix(today);
        let max_seq = invoices
            .iter()
            .filter(|invoice| invoice.is_active())
            .filter_map(|invoice| parse_sequence(&invoice.number, &prefix))
            .max()
            .unwrap_or(0);
        format!("{}{:03}", prefix, max_seq + 1)
    }

    fn period_prefix(date: NaiveDate) -> String {
        format!("{}{:04}{:02}-", NUMBER_PREFIX, date.year(), date.month())
    }
}

fn parse_sequence(number: &str, prefix: &str) -> Option<u32> {
    let suffix = number.strip_prefix(prefix)?;
    if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}
