//! tally-core
//!
//! Business logic and services for the back-office engine: stock ledger,
//! invoice numbering, receivables, membership accrual, and the invoice
//! lifecycle controller. Depends on tally-domain. No CLI, no terminal I/O,
//! no direct storage implementation — persistence goes through the
//! [`store::BackOfficeStore`] contract.

pub mod audit;
pub mod error;
pub mod invoice_service;
pub mod logging;
pub mod membership;
pub mod numbering;
pub mod receivable_ledger;
pub mod saga;
pub mod stock_ledger;
pub mod store;
pub mod time;

pub use audit::integrity_warnings;
pub use error::{CoreError, StockShortfall};
pub use invoice_service::{
    BillingPolicy, DraftItem, InvoiceDraft, InvoiceService, PaymentIntent,
};
pub use membership::MembershipAccrualEngine;
pub use numbering::InvoiceNumberAllocator;
pub use receivable_ledger::{ReceivableLedger, DEFAULT_DUE_DAYS};
pub use saga::{Compensation, SagaLog};
pub use stock_ledger::StockLedger;
pub use store::BackOfficeStore;
pub use time::{Clock, SystemClock};
