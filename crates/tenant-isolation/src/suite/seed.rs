//! One-off data seeding.
//!
//! Each organization is seeded by a linear insert script inside one transaction. Ids are
//! derived from the tenant and a natural key and every insert skips existing keys, so
//! re-running a seed only fills in what is missing.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::info;

use crate::isolation::{Connection, IsolationError, RecordId, RowStore, TenantId, Transaction};

use super::ats::{
    ApplicationStage, Candidate, Interview, InterviewFeedback, JobApplication, JobPosting,
    PostingStatus, Recommendation,
};
use super::hr::{Employee, EmploymentStatus, TimeOffRequest, TimeOffStatus};
use super::organization::Organization;
use super::payroll::{LineKind, PayrollRun, PayrollStatus, Payslip, PayslipLine};

const ROSTER: [(&str, &str); 6] = [
    ("Avery Chen", "Engineering"),
    ("Jordan Patel", "Finance"),
    ("Morgan Alvarez", "People"),
    ("Riley Okafor", "Engineering"),
    ("Sam Lindqvist", "Sales"),
    ("Taylor Brooks", "Operations"),
];

const POSTINGS: [(&str, &str, PostingStatus); 2] = [
    ("Backend Engineer", "Engineering", PostingStatus::Open),
    ("Account Executive", "Sales", PostingStatus::Draft),
];

const CANDIDATES: [(&str, &str); 2] = [
    ("Casey Nguyen", "casey.nguyen@example.com"),
    ("Drew Kowalski", "drew.kowalski@example.com"),
];

const HIRE_SPACING_DAYS: u64 = 30;
const LEAVE_START_DAYS: u64 = 180;
const LEAVE_LENGTH_DAYS: u64 = 4;
const BASE_SALARY_CENTS: i64 = 520_000;
const TAX_RATE_PERCENT: i64 = 22;

/// Input for seeding one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationSeed {
    pub tenant: TenantId,
    pub name: String,
    pub founded_on: NaiveDate,
    pub headcount: usize,
}

impl OrganizationSeed {
    pub fn named(name: impl Into<String>, founded_on: NaiveDate, headcount: usize) -> Self {
        let name = name.into();
        Self {
            tenant: TenantId::derived(&name),
            name,
            founded_on,
            headcount,
        }
    }

    fn id(&self, natural_key: &str) -> RecordId {
        RecordId::derived(self.tenant.as_uuid(), natural_key)
    }
}

/// Outcome of a seed run for one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub organization: String,
    pub tenant: TenantId,
    pub inserted: usize,
    pub skipped: usize,
}

impl SeedReport {
    fn record<T>(&mut self, outcome: Option<T>) {
        match outcome {
            Some(_) => self.inserted += 1,
            None => self.skipped += 1,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Isolation(#[from] IsolationError),
    #[error("organization '{0}' must seed at least one employee")]
    EmptyRoster(String),
    #[error("seed date {base} + {days} days is out of range")]
    DateOutOfRange { base: NaiveDate, days: u64 },
}

fn offset(base: NaiveDate, days: u64) -> Result<NaiveDate, SeedError> {
    base.checked_add_days(Days::new(days))
        .ok_or(SeedError::DateOutOfRange { base, days })
}

fn hire_date(founded_on: NaiveDate, index: usize) -> Result<NaiveDate, SeedError> {
    let days = u64::try_from(index)
        .ok()
        .and_then(|index| index.checked_mul(HIRE_SPACING_DAYS))
        .ok_or(SeedError::DateOutOfRange {
            base: founded_on,
            days: u64::MAX,
        })?;
    offset(founded_on, days)
}

/// Demo tenants used by the CLI and local development.
pub fn demo_organizations(founded_on: NaiveDate) -> Vec<OrganizationSeed> {
    vec![
        OrganizationSeed::named("Acme Robotics", founded_on, 4),
        OrganizationSeed::named("Globex Logistics", founded_on, 2),
    ]
}

/// Seed one organization. The seed runs under its own tenant via a transaction-local
/// context; the connection's context is left as it was.
pub fn seed_organization<S: RowStore>(
    connection: &Connection<S>,
    seed: &OrganizationSeed,
) -> Result<SeedReport, SeedError> {
    if seed.headcount == 0 {
        return Err(SeedError::EmptyRoster(seed.name.clone()));
    }
    // The last hire and the end of the seeded leave are the latest dates written.
    hire_date(seed.founded_on, seed.headcount - 1)?;
    offset(seed.founded_on, LEAVE_START_DAYS + LEAVE_LENGTH_DAYS)?;

    let mut report = SeedReport {
        organization: seed.name.clone(),
        tenant: seed.tenant,
        inserted: 0,
        skipped: 0,
    };

    connection.transaction(|tx| -> Result<(), SeedError> {
        tx.set_local_tenant(seed.tenant);
        seed_core(tx, seed, &mut report)?;
        let employees = seed_people(tx, seed, &mut report)?;
        seed_recruiting(tx, seed, &mut report)?;
        seed_payroll(tx, seed, &employees, &mut report)?;
        Ok(())
    })?;

    info!(
        organization = %report.organization,
        tenant = %report.tenant,
        inserted = report.inserted,
        skipped = report.skipped,
        "organization seeded"
    );
    Ok(report)
}

fn seed_core<S: RowStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    seed: &OrganizationSeed,
    report: &mut SeedReport,
) -> Result<(), SeedError> {
    let organization = Organization::new(seed.tenant, seed.name.clone(), seed.founded_on);
    report.record(tx.insert_or_ignore(organization)?);
    Ok(())
}

fn seed_people<S: RowStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    seed: &OrganizationSeed,
    report: &mut SeedReport,
) -> Result<Vec<RecordId>, SeedError> {
    let domain = super::organization::slugify(&seed.name);
    let mut employees = Vec::new();

    for index in 0..seed.headcount {
        let (name, department) = ROSTER[index % ROSTER.len()];
        let handle = name.to_ascii_lowercase().replace(' ', ".");
        let employee = Employee {
            id: seed.id(&format!("employee:{index}")),
            organization_id: None,
            full_name: name.to_string(),
            email: format!("{handle}@{domain}.example"),
            department: department.to_string(),
            hired_on: hire_date(seed.founded_on, index)?,
            status: EmploymentStatus::Active,
        };
        employees.push(employee.id);
        report.record(tx.insert_or_ignore(employee)?);
    }

    if let Some(first) = employees.first() {
        let starts_on = offset(seed.founded_on, LEAVE_START_DAYS)?;
        report.record(tx.insert_or_ignore(TimeOffRequest {
            id: seed.id("time-off:0"),
            employee_id: *first,
            starts_on,
            ends_on: offset(starts_on, LEAVE_LENGTH_DAYS)?,
            status: TimeOffStatus::Approved,
        })?);
    }

    Ok(employees)
}

fn seed_recruiting<S: RowStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    seed: &OrganizationSeed,
    report: &mut SeedReport,
) -> Result<(), SeedError> {
    let mut postings = Vec::with_capacity(POSTINGS.len());
    for (index, (title, department, status)) in POSTINGS.iter().enumerate() {
        let posting = JobPosting {
            id: seed.id(&format!("posting:{index}")),
            organization_id: None,
            title: title.to_string(),
            department: department.to_string(),
            status: *status,
            opened_on: (*status == PostingStatus::Open).then_some(seed.founded_on),
        };
        postings.push(posting.id);
        report.record(tx.insert_or_ignore(posting)?);
    }

    for (index, (name, email)) in CANDIDATES.iter().enumerate() {
        let candidate = Candidate {
            id: seed.id(&format!("candidate:{index}")),
            organization_id: None,
            full_name: name.to_string(),
            email: email.to_string(),
            source: Some("referral".to_string()),
        };
        let candidate_id = candidate.id;
        report.record(tx.insert_or_ignore(candidate)?);

        let application = JobApplication {
            id: seed.id(&format!("application:{index}")),
            organization_id: None,
            job_posting_id: postings[0],
            candidate_id,
            stage: if index == 0 {
                ApplicationStage::Interviewing
            } else {
                ApplicationStage::Applied
            },
        };
        let application_id = application.id;
        report.record(tx.insert_or_ignore(application)?);

        if index == 0 {
            let interview = Interview {
                id: seed.id("interview:0"),
                application_id,
                scheduled_on: offset(seed.founded_on, 14)?,
                interviewer: ROSTER[0].0.to_string(),
            };
            let interview_id = interview.id;
            report.record(tx.insert_or_ignore(interview)?);
            report.record(tx.insert_or_ignore(InterviewFeedback {
                id: seed.id("feedback:0"),
                interview_id,
                rating: 4,
                recommendation: Recommendation::Yes,
                notes: "Solid systems design discussion.".to_string(),
            })?);
        }
    }

    Ok(())
}

fn seed_payroll<S: RowStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    seed: &OrganizationSeed,
    employees: &[RecordId],
    report: &mut SeedReport,
) -> Result<(), SeedError> {
    let period_start = seed.founded_on;
    let period_end = offset(period_start, 13)?;
    let run = PayrollRun {
        id: seed.id("payroll-run:0"),
        organization_id: None,
        period_start,
        period_end,
        pay_date: offset(period_end, 5)?,
        status: PayrollStatus::Paid,
    };
    let run_id = run.id;
    report.record(tx.insert_or_ignore(run)?);

    for (index, employee_id) in employees.iter().enumerate() {
        let tax = BASE_SALARY_CENTS * TAX_RATE_PERCENT / 100;
        let payslip = Payslip {
            id: seed.id(&format!("payslip:0:{index}")),
            payroll_run_id: run_id,
            employee_id: *employee_id,
            gross_cents: BASE_SALARY_CENTS,
            net_cents: BASE_SALARY_CENTS - tax,
        };
        let payslip_id = payslip.id;
        report.record(tx.insert_or_ignore(payslip)?);

        let lines = [
            (LineKind::Earning, "Base salary", BASE_SALARY_CENTS),
            (LineKind::Tax, "Income tax withholding", -tax),
        ];
        for (line, (kind, description, amount_cents)) in lines.into_iter().enumerate() {
            report.record(tx.insert_or_ignore(PayslipLine {
                id: seed.id(&format!("payslip-line:0:{index}:{line}")),
                payslip_id,
                kind,
                description: description.to_string(),
                amount_cents,
            })?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isolation::MemoryStore;
    use std::sync::Arc;

    fn founded_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 8).expect("valid date")
    }

    #[test]
    fn reseeding_skips_every_existing_row() {
        let connection = Connection::new(0, Arc::new(MemoryStore::new()));
        let seed = OrganizationSeed::named("Initech", founded_on(), 2);

        let first = seed_organization(&connection, &seed).expect("first seed");
        assert!(first.inserted > 0);
        assert_eq!(first.skipped, 0);

        let second = seed_organization(&connection, &seed).expect("second seed");
        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, first.inserted);
    }

    #[test]
    fn seeding_leaves_connection_context_untouched() {
        let connection = Connection::new(0, Arc::new(MemoryStore::new()));
        let seed = OrganizationSeed::named("Initech", founded_on(), 1);

        seed_organization(&connection, &seed).expect("seeded");
        assert!(!connection.context().is_set());
    }

    #[test]
    fn empty_roster_is_rejected_before_writing() {
        let store = Arc::new(MemoryStore::new());
        let connection = Connection::new(0, store.clone());
        let seed = OrganizationSeed::named("Hooli", founded_on(), 0);

        assert!(matches!(
            seed_organization(&connection, &seed),
            Err(SeedError::EmptyRoster(name)) if name == "Hooli"
        ));
        assert_eq!(store.row_count().expect("count"), 0);
    }

    #[test]
    fn rows_squatted_by_another_tenant_fail_the_seed() {
        let store = Arc::new(MemoryStore::new());
        let seeder = Connection::new(0, store.clone());
        let seed = OrganizationSeed::named("Initech", founded_on(), 1);

        let mut squatter = Connection::new(1, store.clone());
        squatter.set_current_tenant(TenantId::random());
        let mut decoy = Employee::new("Mallory Quinn", "m@example.com", "Sales", founded_on());
        decoy.id = seed.id("employee:0");
        squatter.insert(decoy).expect("squatter insert");

        match seed_organization(&seeder, &seed) {
            Err(SeedError::Isolation(IsolationError::Conflict { id, .. })) => {
                assert_eq!(id, seed.id("employee:0"));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(store.row_count().expect("count"), 1);
    }

    #[test]
    fn founding_date_near_the_calendar_end_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let connection = Connection::new(0, store.clone());
        let seed = OrganizationSeed::named("Late Co", NaiveDate::MAX, 1);

        assert!(matches!(
            seed_organization(&connection, &seed),
            Err(SeedError::DateOutOfRange { .. })
        ));
        assert_eq!(store.row_count().expect("count"), 0);
    }

    #[test]
    fn oversized_headcount_is_rejected_before_writing() {
        let store = Arc::new(MemoryStore::new());
        let connection = Connection::new(0, store.clone());
        let seed = OrganizationSeed::named("Sprawl Inc", founded_on(), usize::MAX);

        assert!(matches!(
            seed_organization(&connection, &seed),
            Err(SeedError::DateOutOfRange { .. })
        ));
        assert_eq!(store.row_count().expect("count"), 0);
    }
}
