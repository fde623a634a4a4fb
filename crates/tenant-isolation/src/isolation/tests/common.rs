use std::sync::Arc;

use chrono::NaiveDate;

use crate::isolation::{
    Connection, MemoryStore, RecordId, RowKey, RowStore, StorageError, StoredRow, TenantId,
    WriteBatch,
};
use crate::suite::{Employee, LineKind, PayrollRun, Payslip, PayslipLine};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

pub(super) fn connection_as(store: &Arc<MemoryStore>, tenant: TenantId) -> Connection<MemoryStore> {
    let mut connection = Connection::new(0, Arc::clone(store));
    connection.set_current_tenant(tenant);
    connection
}

pub(super) fn employee(name: &str) -> Employee {
    let handle = name.to_ascii_lowercase().replace(' ', ".");
    Employee::new(
        name,
        format!("{handle}@example.com"),
        "Engineering",
        date(2024, 2, 1),
    )
}

/// A payroll run with one payslip carrying a single line, inserted under the connection's
/// tenant.
pub(super) struct PayrollFixture {
    pub run: PayrollRun,
    pub payslip: Payslip,
    pub line: PayslipLine,
}

pub(super) fn seed_payroll(connection: &Connection<MemoryStore>) -> PayrollFixture {
    connection
        .transaction(|tx| -> Result<PayrollFixture, crate::isolation::IsolationError> {
            let employee = tx.insert(employee("Avery Chen"))?;
            let run = tx.insert(PayrollRun::draft(
                date(2024, 3, 1),
                date(2024, 3, 14),
                date(2024, 3, 19),
            ))?;
            let payslip = tx.insert(Payslip::new(run.id, employee.id, 520_000))?;
            let line = tx.insert(PayslipLine::new(
                payslip.id,
                LineKind::Earning,
                "Base salary",
                520_000,
            ))?;
            Ok(PayrollFixture { run, payslip, line })
        })
        .expect("payroll fixture inserts")
}

/// Backend whose every call fails, for checking error propagation.
#[derive(Default)]
pub(super) struct UnavailableStore;

impl RowStore for UnavailableStore {
    fn fetch(&self, _key: &RowKey) -> Result<Option<StoredRow>, StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }

    fn scan(&self, _table: &'static str) -> Result<Vec<(RecordId, StoredRow)>, StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }

    fn children(&self, _parent: &RowKey) -> Result<Vec<RowKey>, StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }

    fn apply(&self, _batch: WriteBatch) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("backend offline".to_string()))
    }
}
