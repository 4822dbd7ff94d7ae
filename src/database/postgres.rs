use super::store::{CandidateStore, ResultStore, SessionStore, TestStore, UserStore};
use crate::dto::pagination::Page;
use crate::error::{Error, Result};
use crate::models::{
    candidate::{Candidate, ContactInfo, PersonalInfo},
    question::Question,
    result::{AssessmentResult, ResultScore},
    session::{Answer, Score, SessionStatus, TestSession},
    test::{Test, TestType},
    user::User,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// Enum columns are stored as their serde labels.
fn to_text<T: Serialize>(value: &T) -> Result<String> {
    match serde_json::to_value(value)? {
        JsonValue::String(s) => Ok(s),
        other => Err(Error::Internal(format!(
            "expected a string label, got {}",
            other
        ))),
    }
}

fn from_text<T: DeserializeOwned>(label: String) -> Result<T> {
    serde_json::from_value(JsonValue::String(label.clone()))
        .map_err(|e| Error::Internal(format!("unreadable stored label '{}': {}", label, e)))
}

#[derive(FromRow)]
struct TestRow {
    id: Uuid,
    title: String,
    description: String,
    test_type: String,
    difficulty: String,
    duration: i32,
    passing_score: f64,
    total_marks: i32,
    questions: Json<Vec<Question>>,
    is_active: bool,
    is_published: bool,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TestRow> for Test {
    type Error = Error;

    fn try_from(row: TestRow) -> Result<Self> {
        Ok(Test {
            id: row.id,
            title: row.title,
            description: row.description,
            test_type: from_text(row.test_type)?,
            difficulty: from_text(row.difficulty)?,
            duration: row.duration,
            passing_score: row.passing_score,
            total_marks: row.total_marks,
            questions: row.questions.0,
            is_active: row.is_active,
            is_published: row.is_published,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct SessionRow {
    id: Uuid,
    session_code: String,
    candidate_id: Uuid,
    test_id: Uuid,
    status: String,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    answers: Json<Vec<Answer>>,
    score_total_questions: Option<i32>,
    score_attempted: Option<i32>,
    score_correct: Option<i32>,
    score_incorrect: Option<i32>,
    score_total_marks: Option<i32>,
    score_obtained_marks: Option<i32>,
    score_percentage: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for TestSession {
    type Error = Error;

    fn try_from(row: SessionRow) -> Result<Self> {
        let score = match (
            row.score_total_questions,
            row.score_attempted,
            row.score_correct,
            row.score_incorrect,
            row.score_total_marks,
            row.score_obtained_marks,
            row.score_percentage,
        ) {
            (None, None, None, None, None, None, None) => None,
            (
                Some(total_questions),
                Some(attempted),
                Some(correct),
                Some(incorrect),
                Some(total_marks),
                Some(obtained_marks),
                Some(percentage),
            ) => Some(Score {
                total_questions,
                attempted,
                correct,
                incorrect,
                total_marks,
                obtained_marks,
                percentage,
            }),
            _ => {
                return Err(Error::Internal(format!(
                    "session {} has a partially stored score",
                    row.id
                )))
            }
        };
        Ok(TestSession {
            id: row.id,
            session_code: row.session_code,
            candidate_id: row.candidate_id,
            test_id: row.test_id,
            status: row.status.parse().map_err(Error::Internal)?,
            started_at: row.started_at,
            completed_at: row.completed_at,
            answers: row.answers.0,
            score,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ResultRow {
    id: Uuid,
    session_id: Uuid,
    candidate_id: Uuid,
    test_id: Uuid,
    test_type: String,
    total_marks: i32,
    obtained_marks: i32,
    percentage: f64,
    grade: String,
    passed: bool,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ResultRow> for AssessmentResult {
    type Error = Error;

    fn try_from(row: ResultRow) -> Result<Self> {
        Ok(AssessmentResult {
            id: row.id,
            session_id: row.session_id,
            candidate_id: row.candidate_id,
            test_id: row.test_id,
            test_type: from_text(row.test_type)?,
            score: ResultScore {
                total_marks: row.total_marks,
                obtained_marks: row.obtained_marks,
                percentage: row.percentage,
                grade: row.grade.parse().map_err(Error::Internal)?,
                passed: row.passed,
            },
            is_verified: row.is_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct CandidateRow {
    id: Uuid,
    user_id: Uuid,
    application_number: String,
    date_of_birth: NaiveDate,
    gender: String,
    nationality: Option<String>,
    primary_phone: String,
    secondary_phone: Option<String>,
    application_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CandidateRow> for Candidate {
    type Error = Error;

    fn try_from(row: CandidateRow) -> Result<Self> {
        Ok(Candidate {
            id: row.id,
            user_id: row.user_id,
            application_number: row.application_number,
            personal_info: PersonalInfo {
                date_of_birth: row.date_of_birth,
                gender: from_text(row.gender)?,
                nationality: row.nationality,
            },
            contact_info: ContactInfo {
                primary_phone: row.primary_phone,
                secondary_phone: row.secondary_phone,
            },
            application_status: from_text(row.application_status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    username: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    role: String,
    phone: Option<String>,
    is_active: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            role: from_text(row.role)?,
            phone: row.phone,
            is_active: row.is_active,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = Error>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl TestStore for PgStore {
    async fn insert_test(&self, test: &Test) -> Result<Test> {
        let row = sqlx::query_as::<_, TestRow>(
            r#"
            INSERT INTO tests (
                id, title, description, test_type, difficulty, duration, passing_score,
                total_marks, questions, is_active, is_published, created_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(test.id)
        .bind(&test.title)
        .bind(&test.description)
        .bind(to_text(&test.test_type)?)
        .bind(to_text(&test.difficulty)?)
        .bind(test.duration)
        .bind(test.passing_score)
        .bind(test.total_marks)
        .bind(Json(&test.questions))
        .bind(test.is_active)
        .bind(test.is_published)
        .bind(test.created_by)
        .bind(test.created_at)
        .bind(test.updated_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_test(&self, id: Uuid) -> Result<Option<Test>> {
        let row = sqlx::query_as::<_, TestRow>(r#"SELECT * FROM tests WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Test::try_from).transpose()
    }

    async fn update_test(&self, test: &Test) -> Result<Option<Test>> {
        let row = sqlx::query_as::<_, TestRow>(
            r#"
            UPDATE tests
            SET title = $2, description = $3, test_type = $4, difficulty = $5, duration = $6,
                passing_score = $7, total_marks = $8, questions = $9, is_active = $10,
                is_published = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(test.id)
        .bind(&test.title)
        .bind(&test.description)
        .bind(to_text(&test.test_type)?)
        .bind(to_text(&test.difficulty)?)
        .bind(test.duration)
        .bind(test.passing_score)
        .bind(test.total_marks)
        .bind(Json(&test.questions))
        .bind(test.is_active)
        .bind(test.is_published)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Test::try_from).transpose()
    }

    async fn deactivate_test(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query(
            r#"UPDATE tests SET is_active = FALSE, updated_at = NOW() WHERE id = $1"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn list_active_tests(&self, page: Page) -> Result<(Vec<Test>, i64)> {
        let rows = sqlx::query_as::<_, TestRow>(
            r#"
            SELECT * FROM tests
            WHERE is_active = TRUE
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM tests WHERE is_active = TRUE"#)
                .fetch_one(&self.pool)
                .await?;

        Ok((convert_all(rows)?, total))
    }

    async fn list_published_by_type(&self, test_type: TestType) -> Result<Vec<Test>> {
        let rows = sqlx::query_as::<_, TestRow>(
            r#"
            SELECT * FROM tests
            WHERE test_type = $1 AND is_active = TRUE AND is_published = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .bind(to_text(&test_type)?)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn insert_session(&self, session: &TestSession) -> Result<TestSession> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO test_sessions (
                id, session_code, candidate_id, test_id, status, started_at, completed_at,
                answers, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(session.id)
        .bind(&session.session_code)
        .bind(session.candidate_id)
        .bind(session.test_id)
        .bind(session.status.as_str())
        .bind(session.started_at)
        .bind(session.completed_at)
        .bind(Json(&session.answers))
        .bind(session.created_at)
        .bind(session.updated_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<TestSession>> {
        let row =
            sqlx::query_as::<_, SessionRow>(r#"SELECT * FROM test_sessions WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(TestSession::try_from).transpose()
    }

    async fn session_code_exists(&self, code: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM test_sessions WHERE session_code = $1)"#,
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn list_sessions(&self, page: Page) -> Result<(Vec<TestSession>, i64)> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"SELECT * FROM test_sessions ORDER BY created_at DESC LIMIT $1 OFFSET $2"#,
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM test_sessions"#)
            .fetch_one(&self.pool)
            .await?;

        Ok((convert_all(rows)?, total))
    }

    async fn count_sessions(&self, status: Option<SessionStatus>) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM test_sessions WHERE ($1::text IS NULL OR status = $1)"#,
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn save_transition(
        &self,
        session: &TestSession,
        expected: SessionStatus,
    ) -> Result<Option<TestSession>> {
        let score = session.score.as_ref();
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            UPDATE test_sessions
            SET status = $2, started_at = $3, completed_at = $4,
                score_total_questions = $5, score_attempted = $6, score_correct = $7,
                score_incorrect = $8, score_total_marks = $9, score_obtained_marks = $10,
                score_percentage = $11, updated_at = NOW()
            WHERE id = $1 AND status = $12 AND jsonb_array_length(answers) = $13
            RETURNING *
            "#,
        )
        .bind(session.id)
        .bind(session.status.as_str())
        .bind(session.started_at)
        .bind(session.completed_at)
        .bind(score.map(|s| s.total_questions))
        .bind(score.map(|s| s.attempted))
        .bind(score.map(|s| s.correct))
        .bind(score.map(|s| s.incorrect))
        .bind(score.map(|s| s.total_marks))
        .bind(score.map(|s| s.obtained_marks))
        .bind(score.map(|s| s.percentage))
        .bind(expected.as_str())
        .bind(session.answers.len() as i32)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TestSession::try_from).transpose()
    }

    async fn append_answer(
        &self,
        session_id: Uuid,
        answer: &Answer,
        required: SessionStatus,
    ) -> Result<Option<TestSession>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            UPDATE test_sessions
            SET answers = answers || $2::jsonb, updated_at = NOW()
            WHERE id = $1 AND status = $3
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(Json(vec![answer]))
        .bind(required.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(TestSession::try_from).transpose()
    }
}

#[async_trait]
impl ResultStore for PgStore {
    async fn insert_result(&self, result: &AssessmentResult) -> Result<AssessmentResult> {
        let row = sqlx::query_as::<_, ResultRow>(
            r#"
            INSERT INTO results (
                id, session_id, candidate_id, test_id, test_type, total_marks, obtained_marks,
                percentage, grade, passed, is_verified, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(result.id)
        .bind(result.session_id)
        .bind(result.candidate_id)
        .bind(result.test_id)
        .bind(to_text(&result.test_type)?)
        .bind(result.score.total_marks)
        .bind(result.score.obtained_marks)
        .bind(result.score.percentage)
        .bind(result.score.grade.as_str())
        .bind(result.score.passed)
        .bind(result.is_verified)
        .bind(result.created_at)
        .bind(result.updated_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_result(&self, id: Uuid) -> Result<Option<AssessmentResult>> {
        let row = sqlx::query_as::<_, ResultRow>(r#"SELECT * FROM results WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(AssessmentResult::try_from).transpose()
    }

    async fn list_results(&self, page: Page) -> Result<(Vec<AssessmentResult>, i64)> {
        let rows = sqlx::query_as::<_, ResultRow>(
            r#"SELECT * FROM results ORDER BY created_at DESC LIMIT $1 OFFSET $2"#,
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM results"#)
            .fetch_one(&self.pool)
            .await?;

        Ok((convert_all(rows)?, total))
    }

    async fn list_results_by_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<AssessmentResult>> {
        let rows = sqlx::query_as::<_, ResultRow>(
            r#"SELECT * FROM results WHERE candidate_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn list_results_by_type(
        &self,
        test_type: Option<TestType>,
    ) -> Result<Vec<AssessmentResult>> {
        let label = test_type.as_ref().map(to_text).transpose()?;
        let rows = sqlx::query_as::<_, ResultRow>(
            r#"SELECT * FROM results WHERE ($1::text IS NULL OR test_type = $1)"#,
        )
        .bind(label)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn count_results(&self, passed: Option<bool>) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM results WHERE ($1::bool IS NULL OR passed = $1)"#,
        )
        .bind(passed)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn mark_verified(&self, id: Uuid) -> Result<Option<AssessmentResult>> {
        let row = sqlx::query_as::<_, ResultRow>(
            r#"
            UPDATE results SET is_verified = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(AssessmentResult::try_from).transpose()
    }
}

#[async_trait]
impl CandidateStore for PgStore {
    async fn insert_candidate(&self, candidate: &Candidate) -> Result<Candidate> {
        let row = sqlx::query_as::<_, CandidateRow>(
            r#"
            INSERT INTO candidates (
                id, user_id, application_number, date_of_birth, gender, nationality,
                primary_phone, secondary_phone, application_status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(candidate.id)
        .bind(candidate.user_id)
        .bind(&candidate.application_number)
        .bind(candidate.personal_info.date_of_birth)
        .bind(to_text(&candidate.personal_info.gender)?)
        .bind(&candidate.personal_info.nationality)
        .bind(&candidate.contact_info.primary_phone)
        .bind(&candidate.contact_info.secondary_phone)
        .bind(to_text(&candidate.application_status)?)
        .bind(candidate.created_at)
        .bind(candidate.updated_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        let row =
            sqlx::query_as::<_, CandidateRow>(r#"SELECT * FROM candidates WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Candidate::try_from).transpose()
    }

    async fn update_candidate(&self, candidate: &Candidate) -> Result<Option<Candidate>> {
        let row = sqlx::query_as::<_, CandidateRow>(
            r#"
            UPDATE candidates
            SET date_of_birth = $2, gender = $3, nationality = $4, primary_phone = $5,
                secondary_phone = $6, application_status = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(candidate.id)
        .bind(candidate.personal_info.date_of_birth)
        .bind(to_text(&candidate.personal_info.gender)?)
        .bind(&candidate.personal_info.nationality)
        .bind(&candidate.contact_info.primary_phone)
        .bind(&candidate.contact_info.secondary_phone)
        .bind(to_text(&candidate.application_status)?)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Candidate::try_from).transpose()
    }

    async fn delete_candidate(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query(r#"DELETE FROM candidates WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn list_candidates(&self, page: Page) -> Result<(Vec<Candidate>, i64)> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"SELECT * FROM candidates ORDER BY created_at DESC LIMIT $1 OFFSET $2"#,
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = self.count_candidates().await?;
        Ok((convert_all(rows)?, total))
    }

    async fn count_candidates(&self) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM candidates"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn application_number_exists(&self, number: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM candidates WHERE application_number = $1)"#,
        )
        .bind(number)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (
                id, email, username, password_hash, first_name, last_name, role, phone,
                is_active, last_login_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(&user.phone)
        .bind(user.is_active)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(r#"SELECT * FROM users WHERE email = $1"#)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn user_exists(&self, email: &str, username: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 OR username = $2)"#,
        )
        .bind(email)
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(r#"UPDATE users SET last_login_at = $2, updated_at = NOW() WHERE id = $1"#)
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
