use std::sync::Arc;

use chrono::NaiveDate;
use tenant_isolation::isolation::{
    ConnectionPool, IsolationError, MemoryStore, PooledConnection, RecordId, TenantId,
};
use tenant_isolation::suite::{
    ApplicationStage, Candidate, Interview, InterviewFeedback, JobApplication, JobPosting,
    Recommendation,
};

fn interview_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 12).expect("valid interview date")
}

fn session(pool: &ConnectionPool<MemoryStore>, tenant: TenantId) -> PooledConnection<MemoryStore> {
    let mut connection = pool.acquire().expect("pool has capacity");
    connection.set_current_tenant(tenant);
    connection
}

struct Pipeline {
    posting: JobPosting,
    application: JobApplication,
    interview: Interview,
    feedback: InterviewFeedback,
}

fn recruiting_pipeline(connection: &PooledConnection<MemoryStore>) -> Pipeline {
    connection
        .transaction(|tx| -> Result<Pipeline, IsolationError> {
            let posting = tx.insert(JobPosting::draft("Backend Engineer", "Engineering"))?;
            let candidate = tx.insert(Candidate::new("Casey Nguyen", "casey@example.com"))?;
            let application = tx.insert(JobApplication::new(posting.id, candidate.id))?;
            let interview = tx.insert(Interview::new(
                application.id,
                interview_date(),
                "Avery Chen",
            ))?;
            let feedback = tx.insert(InterviewFeedback::new(
                interview.id,
                4,
                Recommendation::StrongYes,
            ))?;
            Ok(Pipeline {
                posting,
                application,
                interview,
                feedback,
            })
        })
        .expect("pipeline inserts")
}

#[test]
fn feedback_is_scoped_through_interview_and_application() {
    let pool = ConnectionPool::new(Arc::new(MemoryStore::new()), 2);
    let acme = session(&pool, TenantId::random());
    let globex = session(&pool, TenantId::random());

    let pipeline = recruiting_pipeline(&acme);

    let visible = acme
        .get::<InterviewFeedback>(pipeline.feedback.id)
        .expect("owner sees feedback");
    assert_eq!(visible.interview_id, pipeline.interview.id);

    assert!(matches!(
        globex.get::<InterviewFeedback>(pipeline.feedback.id),
        Err(IsolationError::NotFoundOrForbidden { .. })
    ));
    assert_eq!(globex.count::<Interview>().expect("count"), 0);
}

#[test]
fn foreign_tenant_cannot_attach_feedback_to_an_interview() {
    let pool = ConnectionPool::new(Arc::new(MemoryStore::new()), 2);
    let acme = session(&pool, TenantId::random());
    let globex = session(&pool, TenantId::random());
    let pipeline = recruiting_pipeline(&acme);

    let smuggled = InterviewFeedback::new(pipeline.interview.id, 1, Recommendation::StrongNo);
    assert!(matches!(
        globex.insert(smuggled),
        Err(IsolationError::TenantMismatch { .. })
    ));
    assert_eq!(acme.count::<InterviewFeedback>().expect("count"), 1);
}

#[test]
fn advancing_an_application_keeps_its_owner() {
    let pool = ConnectionPool::new(Arc::new(MemoryStore::new()), 1);
    let tenant = TenantId::random();
    let acme = session(&pool, tenant);
    let pipeline = recruiting_pipeline(&acme);

    let mut application = pipeline.application.clone();
    application.stage = ApplicationStage::Offer;
    let updated = acme.update(application).expect("advance stage");

    assert_eq!(updated.organization_id, Some(tenant));
    assert_eq!(
        acme.get::<JobApplication>(updated.id)
            .expect("read back")
            .stage,
        ApplicationStage::Offer
    );
}

#[test]
fn withdrawing_an_application_removes_its_interviews() {
    let pool = ConnectionPool::new(Arc::new(MemoryStore::new()), 1);
    let acme = session(&pool, TenantId::random());
    let pipeline = recruiting_pipeline(&acme);

    let removed = acme
        .delete::<JobApplication>(pipeline.application.id)
        .expect("delete application");
    assert_eq!(removed, 3);
    assert!(acme
        .find::<Interview>(pipeline.interview.id)
        .expect("lookup")
        .is_none());
    assert!(acme
        .find::<JobPosting>(pipeline.posting.id)
        .expect("lookup")
        .is_some());
}

#[test]
fn unknown_ids_and_foreign_ids_are_indistinguishable() {
    let pool = ConnectionPool::new(Arc::new(MemoryStore::new()), 2);
    let acme = session(&pool, TenantId::random());
    let globex = session(&pool, TenantId::random());
    let pipeline = recruiting_pipeline(&acme);

    let foreign = globex
        .get::<JobPosting>(pipeline.posting.id)
        .expect_err("foreign posting hidden");
    let unknown = globex
        .get::<JobPosting>(RecordId::random())
        .expect_err("unknown posting");

    assert!(matches!(foreign, IsolationError::NotFoundOrForbidden { .. }));
    assert!(matches!(unknown, IsolationError::NotFoundOrForbidden { .. }));
}
