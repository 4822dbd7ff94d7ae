use crate::database::store::{ResultStore, SessionStore};
use crate::dto::pagination::{Page, Paginated};
use crate::error::{Error, Result};
use crate::models::result::{AssessmentResult, ResultScore};
use crate::services::grading_service::GradingService;
use crate::services::test_service::TestService;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct ResultService {
    results: Arc<dyn ResultStore>,
    sessions: Arc<dyn SessionStore>,
    tests: TestService,
}

impl ResultService {
    pub fn new(
        results: Arc<dyn ResultStore>,
        sessions: Arc<dyn SessionStore>,
        tests: TestService,
    ) -> Self {
        Self {
            results,
            sessions,
            tests,
        }
    }

    /// Grades a session into a persisted result.
    ///
    /// An unsubmitted session has no score and is graded as zero. A second
    /// result for the same session is rejected by the store as a conflict.
    pub async fn generate_from_session(&self, session_id: Uuid) -> Result<AssessmentResult> {
        let session = self
            .sessions
            .find_session(session_id)
            .await?
            .ok_or_else(|| Error::NotFound("Session not found".to_string()))?;
        let test = self.tests.get_test(session.test_id).await?;

        let score = session.score.unwrap_or_default();
        let percentage = score.percentage;
        let now = Utc::now();
        let result = AssessmentResult {
            id: Uuid::new_v4(),
            session_id: session.id,
            candidate_id: session.candidate_id,
            test_id: test.id,
            test_type: test.test_type,
            score: ResultScore {
                total_marks: score.total_marks,
                obtained_marks: score.obtained_marks,
                percentage,
                grade: GradingService::grade_for(percentage),
                passed: GradingService::passed(percentage, test.passing_score),
            },
            is_verified: false,
            created_at: now,
            updated_at: now,
        };

        let saved = self.results.insert_result(&result).await?;
        tracing::info!(
            result_id = %saved.id,
            session_id = %saved.session_id,
            grade = saved.score.grade.as_str(),
            passed = saved.score.passed,
            "result generated"
        );
        Ok(saved)
    }

    pub async fn list(&self, page: Page) -> Result<Paginated<AssessmentResult>> {
        let (items, total) = self.results.list_results(page).await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn get(&self, result_id: Uuid) -> Result<AssessmentResult> {
        self.results
            .find_result(result_id)
            .await?
            .ok_or_else(|| Error::NotFound("Result not found".to_string()))
    }

    pub async fn find_by_candidate(&self, candidate_id: Uuid) -> Result<Vec<AssessmentResult>> {
        self.results.list_results_by_candidate(candidate_id).await
    }

    pub async fn verify(&self, result_id: Uuid) -> Result<AssessmentResult> {
        let verified = self
            .results
            .mark_verified(result_id)
            .await?
            .ok_or_else(|| Error::NotFound("Result not found".to_string()))?;
        tracing::info!(result_id = %verified.id, "result verified");
        Ok(verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::dto::session_dto::{CreateSessionRequest, SubmitAnswerRequest};
    use crate::dto::test_dto::{CreateQuestion, CreateTestPayload};
    use crate::models::question::{QuestionOption, QuestionType};
    use crate::models::result::Grade;
    use crate::models::test::{Test, TestType};
    use crate::services::session_service::SessionService;
    use serde_json::json;

    struct Fixture {
        sessions: SessionService,
        results: ResultService,
        test: Test,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let tests = TestService::new(store.clone());
        let test = tests
            .create_test(
                CreateTestPayload {
                    title: "Field independence".into(),
                    description: "Embedded figures".into(),
                    test_type: TestType::FieldIndependence,
                    difficulty: None,
                    duration: 15,
                    passing_score: 60.0,
                    total_marks: 100,
                    questions: vec![CreateQuestion {
                        question_id: None,
                        question_text: "Find the triangle".into(),
                        question_type: QuestionType::Mcq,
                        options: vec![
                            QuestionOption { option_text: "left".into(), is_correct: true },
                            QuestionOption { option_text: "right".into(), is_correct: false },
                        ],
                        marks: 100,
                    }],
                    is_published: Some(true),
                },
                None,
            )
            .await
            .unwrap();
        Fixture {
            sessions: SessionService::new(store.clone(), tests.clone()),
            results: ResultService::new(store.clone(), store, tests),
            test,
        }
    }

    async fn completed_session(f: &Fixture, candidate_id: Uuid, choice: &str) -> Uuid {
        let session = f
            .sessions
            .create(CreateSessionRequest { candidate_id, test_id: f.test.id })
            .await
            .unwrap();
        f.sessions.start(session.id).await.unwrap();
        f.sessions
            .submit_answer(
                session.id,
                SubmitAnswerRequest {
                    question_id: f.test.questions[0].question_id,
                    answer: json!(choice),
                    time_taken: Some(3),
                },
            )
            .await
            .unwrap();
        f.sessions.submit(session.id).await.unwrap();
        session.id
    }

    #[tokio::test]
    async fn generate_grades_and_denormalizes() {
        let f = fixture().await;
        let candidate_id = Uuid::new_v4();
        let session_id = completed_session(&f, candidate_id, "left").await;

        let result = f.results.generate_from_session(session_id).await.unwrap();
        assert_eq!(result.candidate_id, candidate_id);
        assert_eq!(result.test_type, TestType::FieldIndependence);
        assert_eq!(result.score.obtained_marks, 100);
        assert_eq!(result.score.grade, Grade::APlus);
        assert!(result.score.passed);
        assert!(!result.is_verified);
    }

    #[tokio::test]
    async fn second_generate_conflicts() {
        let f = fixture().await;
        let session_id = completed_session(&f, Uuid::new_v4(), "right").await;
        f.results.generate_from_session(session_id).await.unwrap();
        let err = f.results.generate_from_session(session_id).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn unsubmitted_session_grades_as_zero() {
        let f = fixture().await;
        let session = f
            .sessions
            .create(CreateSessionRequest {
                candidate_id: Uuid::new_v4(),
                test_id: f.test.id,
            })
            .await
            .unwrap();
        let result = f.results.generate_from_session(session.id).await.unwrap();
        assert_eq!(result.score.percentage, 0.0);
        assert_eq!(result.score.total_marks, 0);
        assert_eq!(result.score.grade, Grade::F);
        assert!(!result.score.passed);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let f = fixture().await;
        let err = f.results.generate_from_session(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn verify_flips_flag_once_found() {
        let f = fixture().await;
        let session_id = completed_session(&f, Uuid::new_v4(), "left").await;
        let result = f.results.generate_from_session(session_id).await.unwrap();

        let verified = f.results.verify(result.id).await.unwrap();
        assert!(verified.is_verified);
        assert_eq!(verified.score, result.score);

        let err = f.results.verify(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(msg) if msg == "Result not found"));
    }

    #[tokio::test]
    async fn candidate_lookup_only_returns_own_results() {
        let f = fixture().await;
        let mine = Uuid::new_v4();
        let a = completed_session(&f, mine, "left").await;
        let b = completed_session(&f, mine, "right").await;
        let other = completed_session(&f, Uuid::new_v4(), "left").await;
        for id in [a, b, other] {
            f.results.generate_from_session(id).await.unwrap();
        }

        let found = f.results.find_by_candidate(mine).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.candidate_id == mine));
        assert!(found[0].created_at >= found[1].created_at);

        let page = f.results.list(Page::default()).await.unwrap();
        assert_eq!(page.total, 3);
    }
}
