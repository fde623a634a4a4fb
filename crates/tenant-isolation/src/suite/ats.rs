use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::isolation::{Ownership, RecordId, TenantId, TenantScoped};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingStatus {
    Draft,
    Open,
    Closed,
}

/// Requisition advertised by an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: RecordId,
    #[serde(default)]
    pub organization_id: Option<TenantId>,
    pub title: String,
    pub department: String,
    pub status: PostingStatus,
    #[serde(default)]
    pub opened_on: Option<NaiveDate>,
}

impl JobPosting {
    pub fn draft(title: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            id: RecordId::random(),
            organization_id: None,
            title: title.into(),
            department: department.into(),
            status: PostingStatus::Draft,
            opened_on: None,
        }
    }
}

impl TenantScoped for JobPosting {
    const TABLE: &'static str = "job_postings";

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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: RecordId,
    #[serde(default)]
    pub organization_id: Option<TenantId>,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub source: Option<String>,
}

impl Candidate {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: RecordId::random(),
            organization_id: None,
            full_name: full_name.into(),
            email: email.into(),
            source: None,
        }
    }
}

impl TenantScoped for Candidate {
    const TABLE: &'static str = "candidates";

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
pub enum ApplicationStage {
    Applied,
    Screening,
    Interviewing,
    Offer,
    Hired,
    Rejected,
}

/// A candidate's application against a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: RecordId,
    #[serde(default)]
    pub organization_id: Option<TenantId>,
    pub job_posting_id: RecordId,
    pub candidate_id: RecordId,
    pub stage: ApplicationStage,
}

impl JobApplication {
    pub fn new(job_posting_id: RecordId, candidate_id: RecordId) -> Self {
        Self {
            id: RecordId::random(),
            organization_id: None,
            job_posting_id,
            candidate_id,
            stage: ApplicationStage::Applied,
        }
    }
}

impl TenantScoped for JobApplication {
    const TABLE: &'static str = "job_applications";

    fn record_id(&self) -> RecordId {
        self.id
    }

    fn ownership(&self) -> Ownership {
        Ownership::Organization(self.organization_id)
    }

    fn assign_organization(&mut self, tenant: TenantId) {
        self.organization_id = Some(tenant);
    }

    fn references(&self) -> Vec<(&'static str, RecordId)> {
        vec![
            (JobPosting::TABLE, self.job_posting_id),
            (Candidate::TABLE, self.candidate_id),
        ]
    }
}

/// Interview slot. Carries no tenant column; scoped through its application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub id: RecordId,
    pub application_id: RecordId,
    pub scheduled_on: NaiveDate,
    pub interviewer: String,
}

impl Interview {
    pub fn new(
        application_id: RecordId,
        scheduled_on: NaiveDate,
        interviewer: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::random(),
            application_id,
            scheduled_on,
            interviewer: interviewer.into(),
        }
    }
}

impl TenantScoped for Interview {
    const TABLE: &'static str = "interviews";

    fn record_id(&self) -> RecordId {
        self.id
    }

    fn ownership(&self) -> Ownership {
        Ownership::Parent {
            table: JobApplication::TABLE,
            id: self.application_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongYes,
    Yes,
    No,
    StrongNo,
}

/// Scorecard for an interview; resolves its tenant through interview, then application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewFeedback {
    pub id: RecordId,
    pub interview_id: RecordId,
    pub rating: u8,
    pub recommendation: Recommendation,
    #[serde(default)]
    pub notes: String,
}

impl InterviewFeedback {
    pub fn new(interview_id: RecordId, rating: u8, recommendation: Recommendation) -> Self {
        Self {
            id: RecordId::random(),
            interview_id,
            rating,
            recommendation,
            notes: String::new(),
        }
    }
}

impl TenantScoped for InterviewFeedback {
    const TABLE: &'static str = "interview_feedback";

    fn record_id(&self) -> RecordId {
        self.id
    }

    fn ownership(&self) -> Ownership {
        Ownership::Parent {
            table: Interview::TABLE,
            id: self.interview_id,
        }
    }
}
