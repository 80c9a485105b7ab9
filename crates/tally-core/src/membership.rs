//! Loyalty accrual: points and cumulative spend for member customers.

use uuid::Uuid;

use tally_domain::{round_money, Member, PointTransaction, TierRate};

use crate::{store::BackOfficeStore, time::Clock, CoreError};

/// Computes and posts loyalty points for a member, mirroring the stock
/// ledger's append-plus-counter pattern: one immutable point event with
/// before/after snapshots, then the running totals on the member record.
pub struct MembershipAccrualEngine;

impl MembershipAccrualEngine {
    /// Accrues `floor(paid_amount * points_rate)` points and adds the paid
    /// amount to the member's cumulative spend. Runs only for an active
    /// member and a positive payment; returns `None` otherwise.
    ///
    /// Accrual happens once, at invoice creation, for whatever was paid
    /// immediately; later payments recorded against the same invoice do not
    /// re-invoke it.
    pub fn accrue(
        store: &dyn BackOfficeStore,
        clock: &dyn Clock,
        member: &mut Member,
        rate: TierRate,
        paid_amount: f64,
        invoice_id: Uuid,
    ) -> Result<Option<PointTransaction>, CoreError> {
        if !member.is_active() || paid_amount <= 0.0 {
            return Ok(None);
        }
        let earned = (paid_amount * rate.points_rate).floor() as i64;
        let before = member.points;
        let after = before + earned;
        let entry = PointTransaction::new(
            member.id,
            invoice_id,
            paid_amount,
            earned,
            before,
            after,
            clock.now(),
        );
        store.append_point_transaction(&entry)?;
        member.points = after;
        member.total_spent = round_money(member.total_spent + paid_amount);
        member.touch(clock.now());
        store.save_member(member)?;
        Ok(Some(entry))
    }
}
