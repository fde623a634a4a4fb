//! Tenant-scoped tables of the recruiting, payroll, and HR modules.

pub mod ats;
pub mod hr;
pub mod organization;
pub mod payroll;
pub mod router;
pub mod seed;

pub use ats::{
    ApplicationStage, Candidate, Interview, InterviewFeedback, JobApplication, JobPosting,
    PostingStatus, Recommendation,
};
pub use hr::{Employee, EmploymentStatus, TimeOffRequest, TimeOffStatus};
pub use organization::Organization;
pub use payroll::{LineKind, PayrollRun, PayrollStatus, Payslip, PayslipLine};
pub use router::{suite_router, TenantResolver};
pub use seed::{demo_organizations, seed_organization, OrganizationSeed, SeedError, SeedReport};
