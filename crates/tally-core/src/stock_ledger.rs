//! Stock movements: counter updates plus their immutable ledger entries.

use uuid::Uuid;

use tally_domain::{SourceRef, StockMovementKind, StockTransaction};

use crate::{store::BackOfficeStore, time::Clock, CoreError};

/// Applies and reverses stock movements against a product's counter,
/// appending one immutable movement record per call.
///
/// Each call is an independent commit: the ledger entry is appended, then the
/// product counter is persisted. Callers iterating several line items own the
/// partial-state handling.
pub struct StockLedger;

impl StockLedger {
    /// Deducts `quantity` from the product counter. The counter may go
    /// negative; obtaining confirmation for that is the caller's concern.
    pub fn apply_out(
        store: &dyn BackOfficeStore,
        clock: &dyn Clock,
        product_id: Uuid,
        quantity: i64,
        source: Option<SourceRef>,
        operator: &str,
    ) -> Result<StockTransaction, CoreError> {
        Self::apply(
            store,
            clock,
            product_id,
            StockMovementKind::Out,
            quantity,
            source,
            operator,
        )
    }

    /// Adds `quantity` to the product counter. Used for purchase receipts and
    /// for restoring stock when an invoice is cancelled or deleted —
    /// reversal is additive, not a structural undo of the original entry.
    pub fn apply_in(
        store: &dyn BackOfficeStore,
        clock: &dyn Clock,
        product_id: Uuid,
        quantity: i64,
        source: Option<SourceRef>,
        operator: &str,
    ) -> Result<StockTransaction, CoreError> {
        Self::apply(
            store,
            clock,
            product_id,
            StockMovementKind::In,
            quantity,
            source,
            operator,
        )
    }

    /// Sets the counter to an absolute value, recording the difference as an
    /// adjustment movement (stocktake corrections).
    pub fn apply_adjustment(
        store: &dyn BackOfficeStore,
        clock: &dyn Clock,
        product_id: Uuid,
        new_stock: i64,
        source: Option<SourceRef>,
        operator: &str,
    ) -> Result<StockTransaction, CoreError> {
        let mut product = store
            .product(product_id)?
            .ok_or(CoreError::ProductNotFound(product_id))?;
        let before = product.current_stock;
        if new_stock == before {
            return Err(CoreError::Validation(
                "adjustment does not change the stock counter".into(),
            ));
        }
        let entry = StockTransaction::new(
            product_id,
            StockMovementKind::Adjustment,
            (new_stock - before).abs(),
            before,
            new_stock,
            source,
            operator,
            clock.now(),
        );
        store.append_stock_transaction(&entry)?;
        product.current_stock = new_stock;
        product.touch(clock.now());
        store.save_product(&product)?;
        Ok(entry)
    }

    /// The append-only movement history for one product.
    pub fn history(
        store: &dyn BackOfficeStore,
        product_id: Uuid,
    ) -> Result<Vec<StockTransaction>, CoreError> {
        store.stock_transactions_for_product(product_id)
    }

    fn apply(
        store: &dyn BackOfficeStore,
        clock: &dyn Clock,
        product_id: Uuid,
        kind: StockMovementKind,
        quantity: i64,
        source: Option<SourceRef>,
        operator: &str,
    ) -> Result<StockTransaction, CoreError> {
        if quantity <= 0 {
            return Err(CoreError::Validation(
                "stock movement quantity must be positive".into(),
            ));
        }
        let mut product = store
            .product(product_id)?
            .ok_or(CoreError::ProductNotFound(product_id))?;
        let before = product.current_stock;
        let delta = match kind {
            StockMovementKind::In => quantity,
            StockMovementKind::Out => -quantity,
            StockMovementKind::Adjustment => {
                return Err(CoreError::InvalidOperation(
                    "adjustments go through apply_adjustment".into(),
                ))
            }
        };
        let after = before + delta;
        let entry = StockTransaction::new(
            product_id, kind, quantity, before, after, source, operator,
            clock.now(),
        );
        store.append_stock_transaction(&entry)?;
        product.current_stock = after;
        product.touch(clock.now());
        store.save_product(&product)?;
        Ok(entry)
    }
}
