use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use tally_domain::{
    AccountReceivable, Customer, Invoice, Member, PaymentStatus, PointTransaction, Product,
    ReceivableStatus, StockTransaction,
};

use crate::CoreError;

/// Abstraction over persistence backends for the back-office record
/// families. Every record is keyed by an opaque unique id; the query methods
/// mirror the secondary indexes the engine and its read paths rely on.
///
/// Each call commits independently — the contract offers no multi-record
/// transaction. The lifecycle controller compensates around that.
pub trait BackOfficeStore: Send + Sync {
    // products
    fn product(&self, id: Uuid) -> Result<Option<Product>, CoreError>;
    fn product_by_sku(&self, sku: &str) -> Result<Option<Product>, CoreError>;
    fn products(&self) -> Result<Vec<Product>, CoreError>;
    fn products_in_category(&self, category: &str) -> Result<Vec<Product>, CoreError>;
    fn save_product(&self, product: &Product) -> Result<(), CoreError>;

    // customers (read-only snapshot source for the engine)
    fn customer(&self, id: Uuid) -> Result<Option<Customer>, CoreError>;
    fn save_customer(&self, customer: &Customer) -> Result<(), CoreError>;

    // invoices
    fn invoice(&self, id: Uuid) -> Result<Option<Invoice>, CoreError>;
    fn invoices(&self) -> Result<Vec<Invoice>, CoreError>;
    fn invoices_for_customer(&self, customer_id: Uuid) -> Result<Vec<Invoice>, CoreError>;
    fn invoices_with_payment_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<Invoice>, CoreError>;
    fn invoices_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Invoice>, CoreError>;
    fn insert_invoice(&self, invoice: &Invoice) -> Result<(), CoreError>;
    fn update_invoice(&self, invoice: &Invoice) -> Result<(), CoreError>;
    fn delete_invoice(&self, id: Uuid) -> Result<(), CoreError>;

    // stock ledger (append-only)
    fn append_stock_transaction(&self, entry: &StockTransaction) -> Result<(), CoreError>;
    fn stock_transactions_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<StockTransaction>, CoreError>;

    // receivables
    fn insert_receivable(&self, receivable: &AccountReceivable) -> Result<(), CoreError>;
    /// Removal exists only for compensation of a failed create sequence.
    fn delete_receivable(&self, id: Uuid) -> Result<(), CoreError>;
    fn receivables(&self) -> Result<Vec<AccountReceivable>, CoreError>;
    fn receivables_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<AccountReceivable>, CoreError>;
    fn receivables_with_status(
        &self,
        status: ReceivableStatus,
    ) -> Result<Vec<AccountReceivable>, CoreError>;
    fn receivables_due_before(&self, date: NaiveDate)
        -> Result<Vec<AccountReceivable>, CoreError>;

    // members
    fn member(&self, id: Uuid) -> Result<Option<Member>, CoreError>;
    fn member_for_customer(&self, customer_id: Uuid) -> Result<Option<Member>, CoreError>;
    fn member_by_number(&self, member_no: &str) -> Result<Option<Member>, CoreError>;
    fn members(&self) -> Result<Vec<Member>, CoreError>;
    fn save_member(&self, member: &Member) -> Result<(), CoreError>;

    // point ledger (append-only)
    fn append_point_transaction(&self, entry: &PointTransaction) -> Result<(), CoreError>;
    fn point_transactions_for_member(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<PointTransaction>, CoreError>;
}
