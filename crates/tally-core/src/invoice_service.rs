//! Invoice lifecycle: creation, payment recording, cancellation, deletion.

use std::collections::HashMap;

use uuid::Uuid;

use tally_domain::{
    round_money, CustomerSnapshot, Invoice, InvoiceItem, Member, PaymentMethod, PricingInputs,
    Product, SourceRef, TierRateTable,
};

use crate::{
    error::StockShortfall,
    membership::MembershipAccrualEngine,
    numbering::InvoiceNumberAllocator,
    receivable_ledger::{ReceivableLedger, DEFAULT_DUE_DAYS},
    saga::{Compensation, SagaLog},
    stock_ledger::StockLedger,
    store::BackOfficeStore,
    time::Clock,
    CoreError,
};

/// Billing knobs the controller applies to every invoice.
#[derive(Debug, Clone)]
pub struct BillingPolicy {
    /// Payment term for receivables opened at creation time.
    pub due_days: i64,
    pub tier_rates: TierRateTable,
}

impl BillingPolicy {
    pub fn new(due_days: i64, tier_rates: TierRateTable) -> Self {
        Self {
            due_days,
            tier_rates,
        }
    }
}

impl Default for BillingPolicy {
    fn default() -> Self {
        Self {
            due_days: DEFAULT_DUE_DAYS,
            tier_rates: TierRateTable::default(),
        }
    }
}

/// Payment tendered together with the draft. Carrying the method in the same
/// struct makes "payment requested without a method" unrepresentable.
#[derive(Debug, Clone, Copy)]
pub struct PaymentIntent {
    pub amount: f64,
    pub method: PaymentMethod,
}

/// One cart line of a draft. `unit_price` overrides the product's listed
/// price when set (counter discounts, price locks).
#[derive(Debug, Clone)]
pub struct DraftItem {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price: Option<f64>,
    pub discount_percent: f64,
}

impl DraftItem {
    pub fn new(product_id: Uuid, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
            unit_price: None,
            discount_percent: 0.0,
        }
    }
}

/// Cart submitted by the operator. The member the customer resolves to is
/// looked up explicitly by the controller; nothing ambient is consulted.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub customer_id: Option<Uuid>,
    pub items: Vec<DraftItem>,
    pub discount: f64,
    pub shipping_fee: f64,
    pub other_fees: f64,
    pub tax_rate: f64,
    /// Operator-supplied number; bypasses the allocator when present.
    pub custom_number: Option<String>,
    pub payment: Option<PaymentIntent>,
    pub operator: String,
    pub notes: Option<String>,
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        Self {
            customer_id: None,
            items: Vec::new(),
            discount: 0.0,
            shipping_fee: 0.0,
            other_fees: 0.0,
            tax_rate: 0.0,
            custom_number: None,
            payment: None,
            operator: String::new(),
            notes: None,
        }
    }
}

/// Facade that coordinates invoice state across stock, receivables, and
/// membership. Owns the storage handle and the clock; every mutation of an
/// invoice record goes through here.
pub struct InvoiceService {
    store: Box<dyn BackOfficeStore>,
    clock: Box<dyn Clock>,
    policy: BillingPolicy,
}

impl InvoiceService {
    pub fn new(store: Box<dyn BackOfficeStore>, clock: Box<dyn Clock>, policy: BillingPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub fn store(&self) -> &dyn BackOfficeStore {
        self.store.as_ref()
    }

    pub fn policy(&self) -> &BillingPolicy {
        &self.policy
    }

    /// Creates an invoice from a draft: validate, number, persist, deduct
    /// stock per line item, apply immediate payment, open a receivable for
    /// the remainder, accrue member points.
    ///
    /// Validation rejects before any write. From the first write on, every
    /// committed step records its compensation; a failure unwinds them in
    /// reverse order before the error is returned.
    ///
    /// Stock shortfalls are a soft condition: the call fails with the
    /// per-product detail unless `allow_negative_stock` carries the
    /// operator's explicit confirmation.
    pub fn create_invoice(
        &self,
        draft: InvoiceDraft,
        allow_negative_stock: bool,
    ) -> Result<Invoice, CoreError> {
        let customer_id = draft
            .customer_id
            .ok_or_else(|| CoreError::Validation("no customer selected".into()))?;
        if draft.items.is_empty() {
            return Err(CoreError::Validation(
                "an invoice needs at least one line item".into(),
            ));
        }
        if draft.operator.trim().is_empty() {
            return Err(CoreError::Validation("operator name is required".into()));
        }
        for item in &draft.items {
            if item.quantity <= 0 {
                return Err(CoreError::Validation(
                    "line item quantities must be positive".into(),
                ));
            }
            if !(0.0..=100.0).contains(&item.discount_percent) {
                return Err(CoreError::Validation(
                    "line item discount must be between 0 and 100 percent".into(),
                ));
            }
        }
        if let Some(payment) = &draft.payment {
            if payment.amount < 0.0 {
                return Err(CoreError::Validation(
                    "payment amount cannot be negative".into(),
                ));
            }
        }
        let customer = self
            .store
            .customer(customer_id)?
            .ok_or_else(|| CoreError::Validation("selected customer does not exist".into()))?;

        // Snapshot products and aggregate the requested deduction per
        // product before touching anything.
        let mut products: HashMap<Uuid, Product> = HashMap::new();
        let mut requested: HashMap<Uuid, i64> = HashMap::new();
        let mut items = Vec::with_capacity(draft.items.len());
        for draft_item in &draft.items {
            let product = match products.get(&draft_item.product_id) {
                Some(existing) => existing.clone(),
                None => {
                    let loaded = self
                        .store
                        .product(draft_item.product_id)?
                        .ok_or(CoreError::ProductNotFound(draft_item.product_id))?;
                    products.insert(loaded.id, loaded.clone());
                    loaded
                }
            };
            let unit_price = draft_item.unit_price.unwrap_or(product.unit_price);
            items.push(InvoiceItem::new(
                product.id,
                product.name.clone(),
                draft_item.quantity,
                unit_price,
                draft_item.discount_percent,
            ));
            *requested.entry(product.id).or_insert(0) += draft_item.quantity;
        }

        let mut shortfalls: Vec<StockShortfall> = requested
            .iter()
            .filter_map(|(product_id, quantity)| {
                let product = &products[product_id];
                (product.current_stock < *quantity).then(|| StockShortfall {
                    product_id: *product_id,
                    product_name: product.name.clone(),
                    requested: *quantity,
                    available: product.current_stock,
                })
            })
            .collect();
        if !shortfalls.is_empty() {
            if !allow_negative_stock {
                shortfalls.sort_by(|a, b| a.product_name.cmp(&b.product_name));
                return Err(CoreError::InsufficientStock(shortfalls));
            }
            tracing::warn!(
                products = shortfalls.len(),
                "proceeding into negative stock with operator confirmation"
            );
        }

        let member = self
            .store
            .member_for_customer(customer_id)?
            .filter(Member::is_active);

        let subtotal = round_money(items.iter().map(|item| item.line_amount).sum());
        let member_discount = member
            .as_ref()
            .map(|m| round_money(subtotal * self.policy.tier_rates.rate_for(m.tier).discount_rate))
            .unwrap_or(0.0);

        let existing = self.store.invoices()?;
        let number = match draft
            .custom_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            Some(custom) => {
                if existing
                    .iter()
                    .any(|invoice| invoice.is_active() && invoice.number == custom)
                {
                    tracing::warn!(number = custom, "custom invoice number already in use");
                }
                custom.to_string()
            }
            None => InvoiceNumberAllocator::next_number(&existing, self.clock.today()),
        };

        let mut invoice = Invoice::new(
            number,
            CustomerSnapshot {
                customer_id,
                name: customer.name.clone(),
            },
            items,
            PricingInputs {
                discount: draft.discount,
                member_discount,
                shipping_fee: draft.shipping_fee,
                other_fees: draft.other_fees,
                tax_rate: draft.tax_rate,
            },
            draft.operator.clone(),
            self.clock.now(),
        );
        invoice.notes = draft.notes.clone();

        // Committed steps from here on.
        let mut saga = SagaLog::new();
        self.store.insert_invoice(&invoice)?;
        saga.record(Compensation::RemoveInvoice(invoice.id));

        for item in &invoice.items {
            match StockLedger::apply_out(
                self.store.as_ref(),
                self.clock.as_ref(),
                item.product_id,
                item.quantity,
                Some(SourceRef::invoice(invoice.id)),
                &draft.operator,
            ) {
                Ok(_) => saga.record(Compensation::RestoreStock {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    invoice_id: invoice.id,
                }),
                Err(err) => return Err(self.abort(saga, &draft.operator, err)),
            }
        }

        if let Some(payment) = &draft.payment {
            invoice.apply_payment(payment.amount, Some(payment.method));
            if let Err(err) = self.store.update_invoice(&invoice) {
                return Err(self.abort(saga, &draft.operator, err));
            }
        }

        match ReceivableLedger::open_if_needed(self.store.as_ref(), &invoice, self.policy.due_days)
        {
            Ok(Some(receivable)) => saga.record(Compensation::RemoveReceivable(receivable.id)),
            Ok(None) => {}
            Err(err) => return Err(self.abort(saga, &draft.operator, err)),
        }

        if invoice.paid_amount > 0.0 {
            if let Some(mut member) = member {
                let rate = self.policy.tier_rates.rate_for(member.tier);
                match MembershipAccrualEngine::accrue(
                    self.store.as_ref(),
                    self.clock.as_ref(),
                    &mut member,
                    rate,
                    invoice.paid_amount,
                    invoice.id,
                ) {
                    Ok(Some(entry)) => saga.record(Compensation::ReverseAccrual {
                        member_id: member.id,
                        invoice_id: invoice.id,
                        points: entry.points,
                        amount: invoice.paid_amount,
                    }),
                    Ok(None) => {}
                    Err(err) => return Err(self.abort(saga, &draft.operator, err)),
                }
            }
        }

        tracing::info!(
            number = %invoice.number,
            total = invoice.total_amount,
            paid = invoice.paid_amount,
            "invoice committed"
        );
        Ok(invoice)
    }

    /// Adds a payment to an active invoice, clamping the cumulative paid
    /// amount to the total. Receivables and accrual are left untouched.
    pub fn record_payment(
        &self,
        invoice_id: Uuid,
        amount: f64,
        method: Option<PaymentMethod>,
    ) -> Result<Invoice, CoreError> {
        if amount <= 0.0 {
            return Err(CoreError::Validation(
                "payment amount must be positive".into(),
            ));
        }
        let mut invoice = self
            .store
            .invoice(invoice_id)?
            .ok_or(CoreError::InvoiceNotFound(invoice_id))?;
        if !invoice.is_active() {
            return Err(CoreError::InvalidOperation(
                "cannot record a payment on a cancelled invoice".into(),
            ));
        }
        invoice.apply_payment(amount, method);
        self.store.update_invoice(&invoice)?;
        tracing::info!(
            number = %invoice.number,
            paid = invoice.paid_amount,
            status = %invoice.payment_status,
            "payment recorded"
        );
        Ok(invoice)
    }

    /// Cancels an active invoice: restores stock for every line item, then
    /// marks the record cancelled with operator, reason, and timestamp. The
    /// invoice is retained; its number stops counting toward the allocator's
    /// sequence. Receivables and accrued points are not reversed.
    pub fn cancel_invoice(
        &self,
        invoice_id: Uuid,
        operator: &str,
        reason: &str,
    ) -> Result<Invoice, CoreError> {
        if operator.trim().is_empty() {
            return Err(CoreError::Validation("operator name is required".into()));
        }
        let mut invoice = self
            .store
            .invoice(invoice_id)?
            .ok_or(CoreError::InvoiceNotFound(invoice_id))?;
        if !invoice.is_active() {
            return Err(CoreError::InvalidOperation(
                "invoice is already cancelled".into(),
            ));
        }

        let mut saga = SagaLog::new();
        for item in &invoice.items {
            match StockLedger::apply_in(
                self.store.as_ref(),
                self.clock.as_ref(),
                item.product_id,
                item.quantity,
                Some(SourceRef::invoice(invoice.id)),
                operator,
            ) {
                Ok(_) => saga.record(Compensation::DeductStock {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    invoice_id: invoice.id,
                }),
                Err(err) => return Err(self.abort(saga, operator, err)),
            }
        }
        invoice.mark_cancelled(operator, reason, self.clock.now());
        if let Err(err) = self.store.update_invoice(&invoice) {
            return Err(self.abort(saga, operator, err));
        }
        tracing::info!(number = %invoice.number, "invoice cancelled");
        Ok(invoice)
    }

    /// Permanently removes an invoice. Stock is restored the same way as
    /// cancellation, but only when the invoice is still active — a cancelled
    /// invoice already gave its stock back. Irreversible; receivables and
    /// accrued points are not reversed.
    pub fn delete_invoice(&self, invoice_id: Uuid, operator: &str) -> Result<(), CoreError> {
        if operator.trim().is_empty() {
            return Err(CoreError::Validation("operator name is required".into()));
        }
        let invoice = self
            .store
            .invoice(invoice_id)?
            .ok_or(CoreError::InvoiceNotFound(invoice_id))?;

        let mut saga = SagaLog::new();
        if invoice.is_active() {
            for item in &invoice.items {
                match StockLedger::apply_in(
                    self.store.as_ref(),
                    self.clock.as_ref(),
                    item.product_id,
                    item.quantity,
                    Some(SourceRef::invoice(invoice.id)),
                    operator,
                ) {
                    Ok(_) => saga.record(Compensation::DeductStock {
                        product_id: item.product_id,
                        quantity: item.quantity,
                        invoice_id: invoice.id,
                    }),
                    Err(err) => return Err(self.abort(saga, operator, err)),
                }
            }
        }
        if let Err(err) = self.store.delete_invoice(invoice.id) {
            return Err(self.abort(saga, operator, err));
        }
        tracing::info!(number = %invoice.number, "invoice deleted");
        Ok(())
    }

    fn abort(&self, saga: SagaLog, operator: &str, err: CoreError) -> CoreError {
        let failures = saga.unwind(self.store.as_ref(), self.clock.as_ref(), operator);
        if !failures.is_empty() {
            tracing::warn!(
                failed = failures.len(),
                "unwind left partial state behind"
            );
        }
        err
    }
}
