//! Storage seams used by the services.
//!
//! Every trait is backend-agnostic: `PgStore` persists to PostgreSQL and
//! `MemoryStore` keeps everything in process for tests and local runs.
//! Uniqueness violations surface as `Error::Conflict` from both backends.

use crate::dto::pagination::Page;
use crate::error::Result;
use crate::models::{
    candidate::Candidate,
    result::AssessmentResult,
    session::{Answer, SessionStatus, TestSession},
    test::{Test, TestType},
    user::User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestStore: Send + Sync {
    async fn insert_test(&self, test: &Test) -> Result<Test>;

    /// Returns soft-deleted tests too.
    async fn find_test(&self, id: Uuid) -> Result<Option<Test>>;

    /// `None` when no test has this id.
    async fn update_test(&self, test: &Test) -> Result<Option<Test>>;

    /// Sets `is_active = false`. `false` when the id is unknown.
    async fn deactivate_test(&self, id: Uuid) -> Result<bool>;

    async fn list_active_tests(&self, page: Page) -> Result<(Vec<Test>, i64)>;

    async fn list_published_by_type(&self, test_type: TestType) -> Result<Vec<Test>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, session: &TestSession) -> Result<TestSession>;

    async fn find_session(&self, id: Uuid) -> Result<Option<TestSession>>;

    async fn session_code_exists(&self, code: &str) -> Result<bool>;

    async fn list_sessions(&self, page: Page) -> Result<(Vec<TestSession>, i64)>;

    async fn count_sessions(&self, status: Option<SessionStatus>) -> Result<i64>;

    /// Writes status, timestamps and score of `session`, but only while the
    /// stored status still equals `expected` and the stored answers still
    /// number `session.answers.len()`. `None` when either moved on (or the
    /// session is gone).
    async fn save_transition(
        &self,
        session: &TestSession,
        expected: SessionStatus,
    ) -> Result<Option<TestSession>>;

    /// Appends one answer atomically while the stored status equals `required`.
    async fn append_answer(
        &self,
        session_id: Uuid,
        answer: &Answer,
        required: SessionStatus,
    ) -> Result<Option<TestSession>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Fails with `Conflict` when a result already exists for the session.
    async fn insert_result(&self, result: &AssessmentResult) -> Result<AssessmentResult>;

    async fn find_result(&self, id: Uuid) -> Result<Option<AssessmentResult>>;

    async fn list_results(&self, page: Page) -> Result<(Vec<AssessmentResult>, i64)>;

    /// Newest first.
    async fn list_results_by_candidate(&self, candidate_id: Uuid)
        -> Result<Vec<AssessmentResult>>;

    async fn list_results_by_type(
        &self,
        test_type: Option<TestType>,
    ) -> Result<Vec<AssessmentResult>>;

    async fn count_results(&self, passed: Option<bool>) -> Result<i64>;

    async fn mark_verified(&self, id: Uuid) -> Result<Option<AssessmentResult>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Fails with `Conflict` on a duplicate user id or application number.
    async fn insert_candidate(&self, candidate: &Candidate) -> Result<Candidate>;

    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>>;

    async fn update_candidate(&self, candidate: &Candidate) -> Result<Option<Candidate>>;

    async fn delete_candidate(&self, id: Uuid) -> Result<bool>;

    async fn list_candidates(&self, page: Page) -> Result<(Vec<Candidate>, i64)>;

    async fn count_candidates(&self) -> Result<i64>;

    async fn application_number_exists(&self, number: &str) -> Result<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` on a duplicate email or username.
    async fn insert_user(&self, user: &User) -> Result<User>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn user_exists(&self, email: &str, username: &str) -> Result<bool>;

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()>;
}

/// Everything the application needs from a backend.
pub trait Store: TestStore + SessionStore + ResultStore + CandidateStore + UserStore {}

impl<T> Store for T where T: TestStore + SessionStore + ResultStore + CandidateStore + UserStore {}
