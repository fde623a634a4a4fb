use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::isolation::{Ownership, RecordId, TenantId, TenantScoped};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Active,
    OnLeave,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: RecordId,
    #[serde(default)]
    pub organization_id: Option<TenantId>,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub hired_on: NaiveDate,
    pub status: EmploymentStatus,
}

impl Employee {
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        department: impl Into<String>,
        hired_on: NaiveDate,
    ) -> Self {
        Self {
            id: RecordId::random(),
            organization_id: None,
            full_name: full_name.into(),
            email: email.into(),
            department: department.into(),
            hired_on,
            status: EmploymentStatus::Active,
        }
    }
}

impl TenantScoped for Employee {
    const TABLE: &'static str = "employees";

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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOffStatus {
    Requested,
    Approved,
    Declined,
}

/// Leave request; scoped through the requesting employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffRequest {
    pub id: RecordId,
    pub employee_id: RecordId,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub status: TimeOffStatus,
}

impl TimeOffRequest {
    pub fn new(employee_id: RecordId, starts_on: NaiveDate, ends_on: NaiveDate) -> Self {
        Self {
            id: RecordId::random(),
            employee_id,
            starts_on,
            ends_on,
            status: TimeOffStatus::Requested,
        }
    }
}

impl TenantScoped for TimeOffRequest {
    const TABLE: &'static str = "time_off_requests";

    fn record_id(&self) -> RecordId {
        self.id
    }

    fn ownership(&self) -> Ownership {
        Ownership::Parent {
            table: Employee::TABLE,
            id: self.employee_id,
        }
    }
}
