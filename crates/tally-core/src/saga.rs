//! Compensation log for multi-record lifecycle operations.
//!
//! Every lifecycle operation commits a sequence of independent writes. After
//! each committed step the controller records the matching undo action here;
//! when a later step fails, the log unwinds in reverse order so the dataset
//! returns to its pre-operation shape.

use uuid::Uuid;

use tally_domain::{round_money, PointTransaction, SourceRef};

use crate::{stock_ledger::StockLedger, store::BackOfficeStore, time::Clock, CoreError};

/// One recorded undo action for a committed step.
#[derive(Debug, Clone)]
pub enum Compensation {
    RemoveInvoice(Uuid),
    RestoreStock {
        product_id: Uuid,
        quantity: i64,
        invoice_id: Uuid,
    },
    DeductStock {
        product_id: Uuid,
        quantity: i64,
        invoice_id: Uuid,
    },
    RemoveReceivable(Uuid),
    ReverseAccrual {
        member_id: Uuid,
        invoice_id: Uuid,
        points: i64,
        amount: f64,
    },
}

/// Ordered list of compensations for the steps committed so far.
#[derive(Debug, Default)]
pub struct SagaLog {
    steps: Vec<Compensation>,
}

impl SagaLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: Compensation) {
        self.steps.push(step);
    }

    /// Applies the recorded compensations in reverse order. Best-effort: a
    /// failing compensation is reported and the unwind continues, since
    /// stopping midway would strand even more partial state.
    pub fn unwind(
        self,
        store: &dyn BackOfficeStore,
        clock: &dyn Clock,
        operator: &str,
    ) -> Vec<String> {
        let mut failures = Vec::new();
        for step in self.steps.iter().rev() {
            if let Err(err) = apply_compensation(step, store, clock, operator) {
                tracing::error!(step = ?step, error = %err, "compensation failed");
                failures.push(format!("{:?}: {}", step, err));
            }
        }
        failures
    }
}

fn apply_compensation(
    step: &Compensation,
    store: &dyn BackOfficeStore,
    clock: &dyn Clock,
    operator: &str,
) -> Result<(), CoreError> {
    match step {
        Compensation::RemoveInvoice(id) => store.delete_invoice(*id),
        Compensation::RestoreStock {
            product_id,
            quantity,
            invoice_id,
        } => StockLedger::apply_in(
            store,
            clock,
            *product_id,
            *quantity,
            Some(SourceRef::invoice(*invoice_id)),
            operator,
        )
        .map(|_| ()),
        Compensation::DeductStock {
            product_id,
            quantity,
            invoice_id,
        } => StockLedger::apply_out(
            store,
            clock,
            *product_id,
            *quantity,
            Some(SourceRef::invoice(*invoice_id)),
            operator,
        )
        .map(|_| ()),
        Compensation::RemoveReceivable(id) => store.delete_receivable(*id),
        Compensation::ReverseAccrual {
            member_id,
            invoice_id,
            points,
            amount,
        } => {
            let mut member = store
                .member(*member_id)?
                .ok_or(CoreError::MemberNotFound(*member_id))?;
            let before = member.points;
            let after = before - points;
            // The point ledger stays append-only: the reversal is a new
            // negative event, not a deletion of the original one.
            let entry = PointTransaction::new(
                member.id,
                *invoice_id,
                -amount,
                -points,
                before,
                after,
                clock.now(),
            );
            store.append_point_transaction(&entry)?;
            member.points = after;
            member.total_spent = round_money(member.total_spent - amount);
            member.touch(clock.now());
            store.save_member(&member)
        }
    }
}
