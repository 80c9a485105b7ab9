//! tally-domain
//!
//! Pure domain models for the back-office engine (Product, Invoice,
//! StockTransaction, AccountReceivable, Member, etc.).
//! No I/O, no storage. Only data types and core enums.

pub mod common;
pub mod customer;
pub mod invoice;
pub mod member;
pub mod product;
pub mod receivable;
pub mod stock;

pub use common::*;
pub use customer::*;
pub use invoice::*;
pub use member::*;
pub use product::*;
pub use receivable::*;
pub use stock::*;
