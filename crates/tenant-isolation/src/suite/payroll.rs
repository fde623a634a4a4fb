use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::isolation::{Ownership, RecordId, TenantId, TenantScoped};

use super::hr::Employee;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    Draft,
    Approved,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRun {
    pub id: RecordId,
    #[serde(default)]
    pub organization_id: Option<TenantId>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub pay_date: NaiveDate,
    pub status: PayrollStatus,
}

impl PayrollRun {
    pub fn draft(period_start: NaiveDate, period_end: NaiveDate, pay_date: NaiveDate) -> Self {
        Self {
            id: RecordId::random(),
            organization_id: None,
            period_start,
            period_end,
            pay_date,
            status: PayrollStatus::Draft,
        }
    }
}

impl TenantScoped for PayrollRun {
    const TABLE: &'static str = "payroll_runs";

    fn record_id(&self) -> RecordId {
        self.id
    }

    fn ownership(&self) -> Ownership {
        Ownership::Organization(self.organization_id)
    }

    fn assign_organization(&mut self, tenant: TenantId) {
        self.organization_id = Some(tenant);
    }
}

/// One employee's pay for a run. Scoped through the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    pub id: RecordId,
    pub payroll_run_id: RecordId,
    pub employee_id: RecordId,
    pub gross_cents: i64,
    pub net_cents: i64,
}

impl Payslip {
    pub fn new(payroll_run_id: RecordId, employee_id: RecordId, gross_cents: i64) -> Self {
        Self {
            id: RecordId::random(),
            payroll_run_id,
            employee_id,
            gross_cents,
            net_cents: gross_cents,
        }
    }
}

impl TenantScoped for Payslip {
    const TABLE: &'static str = "payslips";

    fn record_id(&self) -> RecordId {
        self.id
    }

    fn ownership(&self) -> Ownership {
        Ownership::Parent {
            table: PayrollRun::TABLE,
            id: self.payroll_run_id,
        }
    }

    fn references(&self) -> Vec<(&'static str, RecordId)> {
        vec![(Employee::TABLE, self.employee_id)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Earning,
    Deduction,
    Tax,
}

/// Line item on a payslip; two hops from its organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipLine {
    pub id: RecordId,
    pub payslip_id: RecordId,
    pub kind: LineKind,
    pub description: String,
    pub amount_cents: i64,
}

impl PayslipLine {
    pub fn new(
        payslip_id: RecordId,
        kind: LineKind,
        description: impl Into<String>,
        amount_cents: i64,
    ) -> Self {
        Self {
            id: RecordId::random(),
            payslip_id,
            kind,
            description: description.into(),
            amount_cents,
        }
    }
}

impl TenantScoped for PayslipLine {
    const TABLE: &'static str = "payslip_lines";

    fn record_id(&self) -> RecordId {
        self.id
    }

    fn ownership(&self) -> Ownership {
        Ownership::Parent {
            table: Payslip::TABLE,
            id: self.payslip_id,
        }
    }
}
