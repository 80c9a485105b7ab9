//! Domain models for membership, loyalty points, and tier rates.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Identifiable;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Membership tiers, lowest to highest.
pub enum MemberTier {
    Standard,
    Silver,
    Gold,
    Platinum,
}

impl fmt::Display for MemberTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MemberTier::Standard => "Standard",
            MemberTier::Silver => "Silver",
            MemberTier::Gold => "Gold",
            MemberTier::Platinum => "Platinum",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MemberStatus {
    Active,
    Suspended,
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MemberStatus::Active => "Active",
            MemberStatus::Suspended => "Suspended",
        };
        f.write_str(label)
    }
}

/// Discount and accrual multipliers attached to a tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TierRate {
    /// Fraction of the subtotal granted as member discount (0.05 = 5%).
    pub discount_rate: f64,
    /// Points earned per currency unit paid.
    pub points_rate: f64,
}

/// Mapping from membership tier to its rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierRateTable {
    pub rates: HashMap<MemberTier, TierRate>,
}

impl TierRateTable {
    /// Rate for a tier, falling back to no discount and 1 point per unit.
    pub fn rate_for(&self, tier: MemberTier) -> TierRate {
        self.rates.get(&tier).copied().unwrap_or(TierRate {
            discount_rate: 0.0,
            points_rate: 1.0,
        })
    }

    pub fn set(&mut self, tier: MemberTier, rate: TierRate) {
        self.rates.insert(tier, rate);
    }
}

impl Default for TierRateTable {
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert(
            MemberTier::Standard,
            TierRate {
                discount_rate: 0.0,
                points_rate: 1.0,
            },
        );
        rates.insert(
            MemberTier::Silver,
            TierRate {
                discount_rate: 0.02,
                points_rate: 1.2,
            },
        );
        rates.insert(
            MemberTier::Gold,
            TierRate {
                discount_rate: 0.05,
                points_rate: 1.5,
            },
        );
        rates.insert(
            MemberTier::Platinum,
            TierRate {
                discount_rate: 0.08,
                points_rate: 2.0,
            },
        );
        Self { rates }
    }
}

/// A loyalty-program member linked to a customer. `points` and `total_spent`
/// are running totals maintained by the accrual engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub member_no: String,
    pub tier: MemberTier,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub total_spent: f64,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn new(
        customer_id: Uuid,
        member_no: impl Into<String>,
        tier: MemberTier,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            member_no: member_no.into(),
            tier,
            points: 0,
            total_spent: 0.0,
            status: MemberStatus::Active,
            joined_at,
            updated_at: joined_at,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, MemberStatus::Active)
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl Identifiable for Member {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// One immutable entry of the point ledger, mirroring the stock ledger's
/// before/after snapshot style. Negative `points` records a reversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointTransaction {
    pub id: Uuid,
    pub member_id: Uuid,
    pub invoice_id: Uuid,
    pub paid_amount: f64,
    pub points: i64,
    pub before_points: i64,
    pub after_points: i64,
    pub created_at: DateTime<Utc>,
}

impl PointTransaction {
    pub fn new(
        member_id: Uuid,
        invoice_id: Uuid,
        paid_amount: f64,
        points: i64,
        before_points: i64,
        after_points: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id,
            invoice_id,
            paid_amount,
            points,
            before_points,
            after_points,
            created_at,
        }
    }
}

impl Identifiable for PointTransaction {
    fn id(&self) -> Uuid {
        self.id
    }
}
