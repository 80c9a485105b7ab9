//! Domain models for invoices and their line items.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{round_money, Displayable, Identifiable};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Enumerates the lifecycle state of an invoice.
pub enum InvoiceStatus {
    Active,
    Cancelled,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvoiceStatus::Active => "Active",
            InvoiceStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Payment progress, always derived from `paid_amount` vs `total_amount`.
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    /// Pure derivation: 0 is unpaid, anything below the total is partial,
    /// the total or beyond is paid.
    pub fn derive(paid_amount: f64, total_amount: f64) -> Self {
        if paid_amount <= 0.0 {
            PaymentStatus::Unpaid
        } else if paid_amount < total_amount {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Paid
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Partial => "Partial",
            PaymentStatus::Paid => "Paid",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Enumerates accepted settlement channels.
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Other,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Transfer => "Transfer",
            PaymentMethod::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Customer identity captured at invoice creation time. The name is a
/// denormalized copy; the customer record may change later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerSnapshot {
    pub customer_id: Uuid,
    pub name: String,
}

/// One product/quantity/price entry within an invoice. Immutable once the
/// invoice is created; `product_id` is a weak reference and `product_name`
/// a snapshot taken at the time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount_percent: f64,
    pub line_amount: f64,
}

impl InvoiceItem {
    pub fn new(
        product_id: Uuid,
        product_name: impl Into<String>,
        quantity: i64,
        unit_price: f64,
        discount_percent: f64,
    ) -> Self {
        let line_amount =
            round_money(unit_price * quantity as f64 * (1.0 - discount_percent / 100.0));
        Self {
            product_id,
            product_name: product_name.into(),
            quantity,
            unit_price,
            discount_percent,
            line_amount,
        }
    }
}

/// Charges and rates applied on top of the line items when pricing an
/// invoice.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingInputs {
    pub discount: f64,
    pub member_discount: f64,
    pub shipping_fee: f64,
    pub other_fees: f64,
    pub tax_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    /// Human-facing number, unique among non-cancelled invoices per month.
    pub number: String,
    pub status: InvoiceStatus,
    pub customer: CustomerSnapshot,
    pub items: Vec<InvoiceItem>,
    pub subtotal: f64,
    pub discount: f64,
    pub member_discount: f64,
    pub shipping_fee: f64,
    pub other_fees: f64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
}

impl Invoice {
    /// Prices and assembles a new active, unpaid invoice.
    ///
    /// `total = (subtotal - discount - member_discount + shipping + other)
    /// * (1 + tax_rate)`, with every monetary field rounded to cents.
    pub fn new(
        number: impl Into<String>,
        customer: CustomerSnapshot,
        items: Vec<InvoiceItem>,
        pricing: PricingInputs,
        created_by: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let subtotal = round_money(items.iter().map(|item| item.line_amount).sum());
        let taxable = round_money(
            subtotal - pricing.discount - pricing.member_discount
                + pricing.shipping_fee
                + pricing.other_fees,
        );
        let tax_amount = round_money(taxable * pricing.tax_rate);
        let total_amount = round_money(taxable + tax_amount);
        Self {
            id: Uuid::new_v4(),
            number: number.into(),
            status: InvoiceStatus::Active,
            customer,
            items,
            subtotal,
            discount: pricing.discount,
            member_discount: pricing.member_discount,
            shipping_fee: pricing.shipping_fee,
            other_fees: pricing.other_fees,
            tax_rate: pricing.tax_rate,
            tax_amount,
            total_amount,
            paid_amount: 0.0,
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
            notes: None,
            created_by: created_by.into(),
            created_at,
            cancelled_by: None,
            cancelled_at: None,
            cancel_reason: None,
        }
    }

    /// Adds a payment, clamping the cumulative paid amount to the total, and
    /// re-derives the payment status.
    pub fn apply_payment(&mut self, amount: f64, method: Option<PaymentMethod>) {
        self.paid_amount = round_money((self.paid_amount + amount).min(self.total_amount));
        self.payment_status = PaymentStatus::derive(self.paid_amount, self.total_amount);
        if method.is_some() {
            self.payment_method = method;
        }
    }

    pub fn mark_cancelled(
        &mut self,
        by: impl Into<String>,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) {
        self.status = InvoiceStatus::Cancelled;
        self.cancelled_by = Some(by.into());
        self.cancelled_at = Some(at);
        self.cancel_reason = Some(reason.into());
    }

    pub fn remaining_amount(&self) -> f64 {
        round_money(self.total_amount - self.paid_amount)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, InvoiceStatus::Active)
    }
}

impl Identifiable for Invoice {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Invoice {
    fn display_label(&self) -> String {
        format!("{} [{}]", self.number, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CustomerSnapshot {
        CustomerSnapshot {
            customer_id: Uuid::new_v4(),
            name: "Acme Retail".into(),
        }
    }

    #[test]
    fn line_amount_applies_item_discount() {
        let item = InvoiceItem::new(Uuid::new_v4(), "Widget", 4, 25.0, 10.0);
        assert_eq!(item.line_amount, 90.0);
    }

    #[test]
    fn totals_follow_the_pricing_formula() {
        let items = vec![InvoiceItem::new(Uuid::new_v4(), "Widget", 5, 10.0, 0.0)];
        let invoice = Invoice::new(
            "INV202501-001",
            snapshot(),
            items,
            PricingInputs {
                tax_rate: 0.06,
                ..PricingInputs::default()
            },
            "sam",
            Utc::now(),
        );
        assert_eq!(invoice.subtotal, 50.0);
        assert_eq!(invoice.tax_amount, 3.0);
        assert_eq!(invoice.total_amount, 53.0);
        assert_eq!(invoice.payment_status, PaymentStatus::Unpaid);
        assert_eq!(invoice.display_label(), "INV202501-001 [Active]");
    }

    #[test]
    fn fees_and_discounts_shift_the_taxable_base() {
        let items = vec![InvoiceItem::new(Uuid::new_v4(), "Widget", 2, 100.0, 0.0)];
        let invoice = Invoice::new(
            "INV202501-002",
            snapshot(),
            items,
            PricingInputs {
                discount: 20.0,
                member_discount: 10.0,
                shipping_fee: 15.0,
                other_fees: 5.0,
                tax_rate: 0.1,
            },
            "sam",
            Utc::now(),
        );
        // taxable = 200 - 20 - 10 + 15 + 5 = 190
        assert_eq!(invoice.tax_amount, 19.0);
        assert_eq!(invoice.total_amount, 209.0);
    }

    #[test]
    fn payment_status_is_a_pure_function_of_amounts() {
        assert_eq!(PaymentStatus::derive(0.0, 53.0), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::derive(20.0, 53.0), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::derive(53.0, 53.0), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::derive(60.0, 53.0), PaymentStatus::Paid);
    }

    #[test]
    fn apply_payment_clamps_to_total() {
        let items = vec![InvoiceItem::new(Uuid::new_v4(), "Widget", 1, 53.0, 0.0)];
        let mut invoice = Invoice::new(
            "INV202501-003",
            snapshot(),
            items,
            PricingInputs::default(),
            "sam",
            Utc::now(),
        );
        invoice.apply_payment(20.0, Some(PaymentMethod::Cash));
        assert_eq!(invoice.paid_amount, 20.0);
        assert_eq!(invoice.payment_status, PaymentStatus::Partial);

        invoice.apply_payment(100.0, None);
        assert_eq!(invoice.paid_amount, 53.0);
        assert_eq!(invoice.payment_status, PaymentStatus::Paid);
        assert_eq!(invoice.payment_method, Some(PaymentMethod::Cash));
    }
}
