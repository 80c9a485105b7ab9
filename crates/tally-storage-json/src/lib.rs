//! tally-storage-json
//!
//! Filesystem-backed JSON persistence for the back-office dataset. One data
//! directory holds one pretty-printed document; every store call re-reads,
//! mutates, and atomically rewrites it, so each write commits independently.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally_core::{BackOfficeStore, CoreError};
use tally_domain::{
    AccountReceivable, Customer, Invoice, Member, PaymentStatus, PointTransaction, Product,
    ReceivableStatus, StockTransaction,
};

const DATA_FILE_NAME: &str = "backoffice.json";
const TMP_SUFFIX: &str = "tmp";

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// On-disk shape of the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DataFile {
    #[serde(default = "schema_version_default")]
    schema_version: u8,
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    customers: Vec<Customer>,
    #[serde(default)]
    invoices: Vec<Invoice>,
    #[serde(default)]
    stock_transactions: Vec<StockTransaction>,
    #[serde(default)]
    receivables: Vec<AccountReceivable>,
    #[serde(default)]
    members: Vec<Member>,
    #[serde(default)]
    point_transactions: Vec<PointTransaction>,
}

impl Default for DataFile {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            products: Vec::new(),
            customers: Vec::new(),
            invoices: Vec::new(),
            stock_transactions: Vec::new(),
            receivables: Vec::new(),
            members: Vec::new(),
            point_transactions: Vec::new(),
        }
    }
}

fn schema_version_default() -> u8 {
    CURRENT_SCHEMA_VERSION
}

/// Filesystem JSON implementation of the back-office store. Cloned handles
/// share the same file and serialize their access through a common lock.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    data_path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = data_dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            data_path: dir.join(DATA_FILE_NAME),
            lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    fn with_read<T>(&self, f: impl FnOnce(&DataFile) -> T) -> Result<T, CoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| CoreError::Storage("storage lock poisoned".into()))?;
        Ok(f(&self.read()?))
    }

    fn with_write(
        &self,
        f: impl FnOnce(&mut DataFile) -> Result<(), CoreError>,
    ) -> Result<(), CoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| CoreError::Storage("storage lock poisoned".into()))?;
        let mut data = self.read()?;
        f(&mut data)?;
        self.write(&data)
    }

    fn read(&self) -> Result<DataFile, CoreError> {
        if !self.data_path.exists() {
            return Ok(DataFile::default());
        }
        let raw = fs::read_to_string(&self.data_path)?;
        let data: DataFile =
            serde_json::from_str(&raw).map_err(|err| CoreError::Serde(err.to_string()))?;
        if data.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(CoreError::Storage(format!(
                "data file schema v{} is newer than supported v{}",
                data.schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        Ok(data)
    }

    fn write(&self, data: &DataFile) -> Result<(), CoreError> {
        let json =
            serde_json::to_string_pretty(data).map_err(|err| CoreError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.data_path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.data_path)?;
        Ok(())
    }
}

impl BackOfficeStore for JsonStorage {
    fn product(&self, id: Uuid) -> Result<Option<Product>, CoreError> {
        self.with_read(|data| data.products.iter().find(|p| p.id == id).cloned())
    }

    fn product_by_sku(&self, sku: &str) -> Result<Option<Product>, CoreError> {
        self.with_read(|data| data.products.iter().find(|p| p.sku == sku).cloned())
    }

    fn products(&self) -> Result<Vec<Product>, CoreError> {
        self.with_read(|data| data.products.clone())
    }

    fn products_in_category(&self, category: &str) -> Result<Vec<Product>, CoreError> {
        self.with_read(|data| {
            data.products
                .iter()
                .filter(|p| p.category.as_deref() == Some(category))
                .cloned()
                .collect()
        })
    }

    fn save_product(&self, product: &Product) -> Result<(), CoreError> {
        self.with_write(|data| {
            match data.products.iter_mut().find(|p| p.id == product.id) {
                Some(existing) => *existing = product.clone(),
                None => data.products.push(product.clone()),
            }
            Ok(())
        })
    }

    fn customer(&self, id: Uuid) -> Result<Option<Customer>, CoreError> {
        self.with_read(|data| data.customers.iter().find(|c| c.id == id).cloned())
    }

    fn save_customer(&self, customer: &Customer) -> Result<(), CoreError> {
        self.with_write(|data| {
            match data.customers.iter_mut().find(|c| c.id == customer.id) {
                Some(existing) => *existing = customer.clone(),
                None => data.customers.push(customer.clone()),
            }
            Ok(())
        })
    }

    fn invoice(&self, id: Uuid) -> Result<Option<Invoice>, CoreError> {
        self.with_read(|data| data.invoices.iter().find(|i| i.id == id).cloned())
    }

    fn invoices(&self) -> Result<Vec<Invoice>, CoreError> {
        self.with_read(|data| data.invoices.clone())
    }

    fn invoices_for_customer(&self, customer_id: Uuid) -> Result<Vec<Invoice>, CoreError> {
        self.with_read(|data| {
            data.invoices
                .iter()
                .filter(|i| i.customer.customer_id == customer_id)
                .cloned()
                .collect()
        })
    }

    fn invoices_with_payment_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<Invoice>, CoreError> {
        self.with_read(|data| {
            data.invoices
                .iter()
                .filter(|i| i.payment_status == status)
                .cloned()
                .collect()
        })
    }

    fn invoices_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Invoice>, CoreError> {
        self.with_read(|data| {
            data.invoices
                .iter()
                .filter(|i| i.created_at >= from && i.created_at < to)
                .cloned()
                .collect()
        })
    }

    fn insert_invoice(&self, invoice: &Invoice) -> Result<(), CoreError> {
        self.with_write(|data| {
            data.invoices.push(invoice.clone());
            Ok(())
        })
    }

    fn update_invoice(&self, invoice: &Invoice) -> Result<(), CoreError> {
        self.with_write(|data| {
            match data.invoices.iter_mut().find(|i| i.id == invoice.id) {
                Some(existing) => {
                    *existing = invoice.clone();
                    Ok(())
                }
                None => Err(CoreError::InvoiceNotFound(invoice.id)),
            }
        })
    }

    fn delete_invoice(&self, id: Uuid) -> Result<(), CoreError> {
        self.with_write(|data| {
            data.invoices.retain(|i| i.id != id);
            Ok(())
        })
    }

    fn append_stock_transaction(&self, entry: &StockTransaction) -> Result<(), CoreError> {
        self.with_write(|data| {
            data.stock_transactions.push(entry.clone());
            Ok(())
        })
    }

    fn stock_transactions_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<StockTransaction>, CoreError> {
        self.with_read(|data| {
            data.stock_transactions
                .iter()
                .filter(|t| t.product_id == product_id)
                .cloned()
                .collect()
        })
    }

    fn insert_receivable(&self, receivable: &AccountReceivable) -> Result<(), CoreError> {
        self.with_write(|data| {
            data.receivables.push(receivable.clone());
            Ok(())
        })
    }

    fn delete_receivable(&self, id: Uuid) -> Result<(), CoreError> {
        self.with_write(|data| {
            data.receivables.retain(|r| r.id != id);
            Ok(())
        })
    }

    fn receivables(&self) -> Result<Vec<AccountReceivable>, CoreError> {
        self.with_read(|data| data.receivables.clone())
    }

    fn receivables_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<AccountReceivable>, CoreError> {
        self.with_read(|data| {
            data.receivables
                .iter()
                .filter(|r| r.customer_id == customer_id)
                .cloned()
                .collect()
        })
    }

    fn receivables_with_status(
        &self,
        status: ReceivableStatus,
    ) -> Result<Vec<AccountReceivable>, CoreError> {
        self.with_read(|data| {
            data.receivables
                .iter()
                .filter(|r| r.status == status)
                .cloned()
                .collect()
        })
    }

    fn receivables_due_before(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<AccountReceivable>, CoreError> {
        self.with_read(|data| {
            data.receivables
                .iter()
                .filter(|r| r.due_date < date)
                .cloned()
                .collect()
        })
    }

    fn member(&self, id: Uuid) -> Result<Option<Member>, CoreError> {
        self.with_read(|data| data.members.iter().find(|m| m.id == id).cloned())
    }

    fn member_for_customer(&self, customer_id: Uuid) -> Result<Option<Member>, CoreError> {
        self.with_read(|data| {
            data.members
                .iter()
                .find(|m| m.customer_id == customer_id)
                .cloned()
        })
    }

    fn member_by_number(&self, member_no: &str) -> Result<Option<Member>, CoreError> {
        self.with_read(|data| data.members.iter().find(|m| m.member_no == member_no).cloned())
    }

    fn members(&self) -> Result<Vec<Member>, CoreError> {
        self.with_read(|data| data.members.clone())
    }

    fn save_member(&self, member: &Member) -> Result<(), CoreError> {
        self.with_write(|data| {
            match data.members.iter_mut().find(|m| m.id == member.id) {
                Some(existing) => *existing = member.clone(),
                None => data.members.push(member.clone()),
            }
            Ok(())
        })
    }

    fn append_point_transaction(&self, entry: &PointTransaction) -> Result<(), CoreError> {
        self.with_write(|data| {
            data.point_transactions.push(entry.clone());
            Ok(())
        })
    }

    fn point_transactions_for_member(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<PointTransaction>, CoreError> {
        self.with_read(|data| {
            data.point_transactions
                .iter()
                .filter(|t| t.member_id == member_id)
                .cloned()
                .collect()
        })
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
