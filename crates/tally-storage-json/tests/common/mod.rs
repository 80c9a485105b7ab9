use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use tally_core::{BackOfficeStore, Clock, StockLedger};
use tally_domain::{Customer, Member, MemberTier, Product, SourceRef};

/// Deterministic clock for date-sensitive assertions.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        Self(Utc.with_ymd_and_hms(year, month, day, 9, 30, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn seed_customer(store: &dyn BackOfficeStore, clock: &FixedClock, name: &str) -> Customer {
    let customer = Customer::new(name, clock.now());
    store.save_customer(&customer).expect("save customer");
    customer
}

pub fn seed_product(
    store: &dyn BackOfficeStore,
    clock: &FixedClock,
    sku: &str,
    unit_price: f64,
    stock: i64,
) -> Product {
    let product = Product::new(sku, format!("Product {sku}"), unit_price, clock.now());
    store.save_product(&product).expect("save product");
    if stock > 0 {
        StockLedger::apply_in(
            store,
            clock,
            product.id,
            stock,
            Some(SourceRef::purchase(Uuid::new_v4())),
            "seed",
        )
        .expect("seed stock");
    }
    store
        .product(product.id)
        .expect("load product")
        .expect("product exists")
}

pub fn seed_member(
    store: &dyn BackOfficeStore,
    clock: &FixedClock,
    customer_id: Uuid,
    tier: MemberTier,
) -> Member {
    let member = Member::new(
        customer_id,
        format!("M-{}", customer_id.simple()),
        tier,
        clock.now(),
    );
    store.save_member(&member).expect("save member");
    member
}
