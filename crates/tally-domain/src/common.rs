//! Shared traits and value helpers for back-office records.

use uuid::Uuid;

/// Exposes a stable identifier for persisted records.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Converts a record into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Rounds a monetary amount to two decimal places.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
