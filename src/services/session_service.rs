use crate::database::store::SessionStore;
use crate::dto::pagination::{Page, Paginated};
use crate::dto::session_dto::{CreateSessionRequest, SubmitAnswerRequest};
use crate::error::{Error, Result};
use crate::models::session::{Answer, SessionStatus, TestSession};
use crate::services::grading_service::GradingService;
use crate::services::test_service::TestService;
use crate::utils::codes::generate_session_code;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const CODE_ATTEMPTS: usize = 5;

/// Session state machine: `scheduled -> in_progress -> completed`.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    tests: TestService,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, tests: TestService) -> Self {
        Self { store, tests }
    }

    pub async fn create(&self, req: CreateSessionRequest) -> Result<TestSession> {
        self.tests.get_test(req.test_id).await?;

        let session_code = self.unused_code().await?;
        let now = Utc::now();
        let session = TestSession {
            id: Uuid::new_v4(),
            session_code,
            candidate_id: req.candidate_id,
            test_id: req.test_id,
            status: SessionStatus::Scheduled,
            started_at: None,
            completed_at: None,
            answers: Vec::new(),
            score: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert_session(&session).await?;
        tracing::info!(
            session_id = %created.id,
            session_code = %created.session_code,
            candidate_id = %created.candidate_id,
            test_id = %created.test_id,
            "session scheduled"
        );
        Ok(created)
    }

    // The insert's unique constraint still decides if two callers draw the same code.
    async fn unused_code(&self) -> Result<String> {
        let mut code = generate_session_code();
        for _ in 1..CODE_ATTEMPTS {
            if !self.store.session_code_exists(&code).await? {
                return Ok(code);
            }
            tracing::debug!(code = %code, "session code taken, regenerating");
            code = generate_session_code();
        }
        Ok(code)
    }

    pub async fn list(&self, page: Page) -> Result<Paginated<TestSession>> {
        let (items, total) = self.store.list_sessions(page).await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn get(&self, session_id: Uuid) -> Result<TestSession> {
        self.store
            .find_session(session_id)
            .await?
            .ok_or_else(|| Error::NotFound("Session not found".to_string()))
    }

    pub async fn start(&self, session_id: Uuid) -> Result<TestSession> {
        let mut session = self.get(session_id).await?;
        if session.status != SessionStatus::Scheduled {
            return Err(cannot_start());
        }

        session.status = SessionStatus::InProgress;
        session.started_at = Some(Utc::now());

        let started = self
            .store
            .save_transition(&session, SessionStatus::Scheduled)
            .await?
            .ok_or_else(cannot_start)?;
        tracing::info!(session_id = %started.id, "session started");
        Ok(started)
    }

    pub async fn submit_answer(
        &self,
        session_id: Uuid,
        req: SubmitAnswerRequest,
    ) -> Result<TestSession> {
        let session = self.get(session_id).await?;
        if session.status != SessionStatus::InProgress {
            return Err(not_in_progress());
        }

        let test = self.tests.get_test(session.test_id).await?;
        let question = test
            .find_question(req.question_id)
            .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;

        let (is_correct, score) = GradingService::evaluate_answer(question, &req.answer);
        let answer = Answer {
            question_id: req.question_id,
            selected_answer: req.answer,
            is_correct,
            time_taken: req.time_taken.unwrap_or(0),
            score,
        };

        let updated = self
            .store
            .append_answer(session_id, &answer, SessionStatus::InProgress)
            .await?
            .ok_or_else(not_in_progress)?;
        tracing::debug!(
            session_id = %session_id,
            question_id = %answer.question_id,
            is_correct,
            score,
            "answer recorded"
        );
        Ok(updated)
    }

    /// Only a completed session is refused; scheduled, paused and abandoned
    /// sessions are scored with whatever answers they hold.
    pub async fn submit(&self, session_id: Uuid) -> Result<TestSession> {
        let mut session = self.get(session_id).await?;
        if session.status == SessionStatus::Completed {
            return Err(already_completed());
        }

        let test = self.tests.get_test(session.test_id).await?;
        let score = GradingService::compute_score(&test, &session.answers);

        let previous = session.status;
        session.status = SessionStatus::Completed;
        session.completed_at = Some(Utc::now());
        session.score = Some(score);

        match self.store.save_transition(&session, previous).await? {
            Some(completed) => {
                if let Some(score) = &completed.score {
                    tracing::info!(
                        session_id = %completed.id,
                        obtained_marks = score.obtained_marks,
                        total_marks = score.total_marks,
                        percentage = score.percentage,
                        "session submitted"
                    );
                }
                Ok(completed)
            }
            None => {
                // Lost the race: report against whatever state won.
                let current = self.get(session_id).await?;
                tracing::warn!(
                    session_id = %session_id,
                    status = %current.status,
                    "concurrent transition while submitting"
                );
                if current.status == SessionStatus::Completed {
                    Err(already_completed())
                } else if current.status == previous {
                    Err(Error::InvalidTransition(
                        "Session answers changed during submission".to_string(),
                    ))
                } else {
                    Err(Error::InvalidTransition(format!(
                        "Session changed to {} during submission",
                        current.status
                    )))
                }
            }
        }
    }
}

fn cannot_start() -> Error {
    Error::InvalidTransition("Session cannot be started".to_string())
}

fn not_in_progress() -> Error {
    Error::InvalidTransition("Session not in progress".to_string())
}

fn already_completed() -> Error {
    Error::AlreadyCompleted("Session already completed".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::MockSessionStore;
    use crate::database::MemoryStore;
    use crate::dto::test_dto::{CreateQuestion, CreateTestPayload};
    use crate::models::question::{QuestionOption, QuestionType};
    use crate::models::result::Grade;
    use crate::models::test::{Test, TestType};
    use serde_json::json;

    struct Fixture {
        sessions: SessionService,
        test: Test,
    }

    async fn fixture(total_marks: i32) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let tests = TestService::new(store.clone());
        let test = tests
            .create_test(two_question_test(total_marks), None)
            .await
            .unwrap();
        Fixture {
            sessions: SessionService::new(store, tests),
            test,
        }
    }

    fn two_question_test(total_marks: i32) -> CreateTestPayload {
        let q = |text: &str, right: &str, wrong: &str| CreateQuestion {
            question_id: None,
            question_text: text.to_string(),
            question_type: QuestionType::Mcq,
            options: vec![
                QuestionOption { option_text: right.into(), is_correct: true },
                QuestionOption { option_text: wrong.into(), is_correct: false },
            ],
            marks: 50,
        };
        CreateTestPayload {
            title: "Concentration".into(),
            description: "Two item check".into(),
            test_type: TestType::Concentration,
            difficulty: None,
            duration: 5,
            passing_score: 60.0,
            total_marks,
            questions: vec![q("q1", "A", "B"), q("q2", "Y", "X")],
            is_published: Some(true),
        }
    }

    async fn started(f: &Fixture) -> TestSession {
        let session = f
            .sessions
            .create(CreateSessionRequest {
                candidate_id: Uuid::new_v4(),
                test_id: f.test.id,
            })
            .await
            .unwrap();
        f.sessions.start(session.id).await.unwrap()
    }

    fn answer(question_id: Uuid, value: &str) -> SubmitAnswerRequest {
        SubmitAnswerRequest {
            question_id,
            answer: json!(value),
            time_taken: None,
        }
    }

    #[tokio::test]
    async fn create_schedules_with_code() {
        let f = fixture(100).await;
        let session = f
            .sessions
            .create(CreateSessionRequest {
                candidate_id: Uuid::new_v4(),
                test_id: f.test.id,
            })
            .await
            .unwrap();
        assert_eq!(session.status, SessionStatus::Scheduled);
        assert!(session.session_code.starts_with("SES-"));
        assert!(session.answers.is_empty());
        assert!(session.score.is_none());
    }

    #[tokio::test]
    async fn create_for_unknown_test_is_not_found() {
        let f = fixture(100).await;
        let err = f
            .sessions
            .create(CreateSessionRequest {
                candidate_id: Uuid::new_v4(),
                test_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn start_twice_is_invalid_transition() {
        let f = fixture(100).await;
        let session = started(&f).await;
        assert_eq!(session.status, SessionStatus::InProgress);
        assert!(session.started_at.is_some());

        let err = f.sessions.start(session.id).await.unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(msg) if msg == "Session cannot be started"));
    }

    #[tokio::test]
    async fn answer_before_start_is_refused() {
        let f = fixture(100).await;
        let session = f
            .sessions
            .create(CreateSessionRequest {
                candidate_id: Uuid::new_v4(),
                test_id: f.test.id,
            })
            .await
            .unwrap();
        let qid = f.test.questions[0].question_id;
        let err = f.sessions.submit_answer(session.id, answer(qid, "A")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(msg) if msg == "Session not in progress"));
    }

    #[tokio::test]
    async fn unknown_question_is_not_found() {
        let f = fixture(100).await;
        let session = started(&f).await;
        let err = f
            .sessions
            .submit_answer(session.id, answer(Uuid::new_v4(), "A"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(msg) if msg == "Question not found"));
    }

    #[tokio::test]
    async fn one_right_one_wrong_scores_half() {
        let f = fixture(100).await;
        let session = started(&f).await;
        let (q1, q2) = (f.test.questions[0].question_id, f.test.questions[1].question_id);

        f.sessions.submit_answer(session.id, answer(q1, "A")).await.unwrap();
        let mut req = answer(q2, "X");
        req.time_taken = Some(12);
        let after = f.sessions.submit_answer(session.id, req).await.unwrap();
        assert_eq!(after.answers[1].time_taken, 12);
        assert_eq!(after.answers[0].time_taken, 0);

        let done = f.sessions.submit(session.id).await.unwrap();
        assert_eq!(done.status, SessionStatus::Completed);
        assert!(done.completed_at.is_some());
        let score = done.score.unwrap();
        assert_eq!(score.correct, 1);
        assert_eq!(score.incorrect, 1);
        assert_eq!(score.obtained_marks, 50);
        assert_eq!(score.percentage, 50.0);
        assert_eq!(GradingService::grade_for(score.percentage), Grade::D);
        assert!(!GradingService::passed(score.percentage, f.test.passing_score));
    }

    #[tokio::test]
    async fn all_right_scores_full() {
        let f = fixture(100).await;
        let session = started(&f).await;
        let (q1, q2) = (f.test.questions[0].question_id, f.test.questions[1].question_id);
        f.sessions.submit_answer(session.id, answer(q1, "A")).await.unwrap();
        f.sessions.submit_answer(session.id, answer(q2, "Y")).await.unwrap();

        let score = f.sessions.submit(session.id).await.unwrap().score.unwrap();
        assert_eq!(score.obtained_marks, 100);
        assert_eq!(score.percentage, 100.0);
        assert_eq!(GradingService::grade_for(score.percentage), Grade::APlus);
    }

    #[tokio::test]
    async fn resubmitted_answers_are_appended() {
        let f = fixture(100).await;
        let session = started(&f).await;
        let q1 = f.test.questions[0].question_id;
        f.sessions.submit_answer(session.id, answer(q1, "A")).await.unwrap();
        f.sessions.submit_answer(session.id, answer(q1, "A")).await.unwrap();

        let score = f.sessions.submit(session.id).await.unwrap().score.unwrap();
        assert_eq!(score.attempted, 2);
        assert_eq!(score.obtained_marks, 100);
    }

    #[tokio::test]
    async fn submit_twice_is_already_completed() {
        let f = fixture(100).await;
        let session = started(&f).await;
        f.sessions.submit(session.id).await.unwrap();
        let err = f.sessions.submit(session.id).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyCompleted(_)));

        let qid = f.test.questions[0].question_id;
        let err = f.sessions.submit_answer(session.id, answer(qid, "A")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn never_started_session_can_be_submitted() {
        let f = fixture(100).await;
        let session = f
            .sessions
            .create(CreateSessionRequest {
                candidate_id: Uuid::new_v4(),
                test_id: f.test.id,
            })
            .await
            .unwrap();
        let done = f.sessions.submit(session.id).await.unwrap();
        assert_eq!(done.status, SessionStatus::Completed);
        assert!(done.started_at.is_none());
        let score = done.score.unwrap();
        assert_eq!(score.attempted, 0);
        assert_eq!(score.percentage, 0.0);
    }

    #[tokio::test]
    async fn zero_total_marks_gives_non_finite_percentage() {
        let f = fixture(0).await;
        let session = started(&f).await;
        let nan = f.sessions.submit(session.id).await.unwrap().score.unwrap();
        assert!(nan.percentage.is_nan());

        let other = started(&f).await;
        let q1 = f.test.questions[0].question_id;
        f.sessions.submit_answer(other.id, answer(q1, "A")).await.unwrap();
        let inf = f.sessions.submit(other.id).await.unwrap().score.unwrap();
        assert_eq!(inf.percentage, f64::INFINITY);
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let f = fixture(100).await;
        for err in [
            f.sessions.get(Uuid::new_v4()).await.unwrap_err(),
            f.sessions.start(Uuid::new_v4()).await.unwrap_err(),
            f.sessions.submit(Uuid::new_v4()).await.unwrap_err(),
        ] {
            assert!(matches!(err, Error::NotFound(msg) if msg == "Session not found"));
        }
    }

    #[tokio::test]
    async fn lost_submit_race_reports_already_completed() {
        let f = fixture(100).await;
        let test_id = f.test.id;
        let session_id = Uuid::new_v4();
        let now = Utc::now();
        let in_progress = TestSession {
            id: session_id,
            session_code: "SES-TEST-AAAAAA".into(),
            candidate_id: Uuid::new_v4(),
            test_id,
            status: SessionStatus::InProgress,
            started_at: Some(now),
            completed_at: None,
            answers: Vec::new(),
            score: None,
            created_at: now,
            updated_at: now,
        };
        let mut completed = in_progress.clone();
        completed.status = SessionStatus::Completed;

        let mut mock = MockSessionStore::new();
        let mut reads = vec![completed, in_progress];
        mock.expect_find_session()
            .times(2)
            .returning(move |_| Ok(reads.pop()));
        mock.expect_save_transition()
            .withf(|_, expected| *expected == SessionStatus::InProgress)
            .times(1)
            .returning(|_, _| Ok(None));

        let sessions = SessionService::new(Arc::new(mock), f.sessions.tests.clone());
        let err = sessions.submit(session_id).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyCompleted(_)));
    }

    #[tokio::test]
    async fn answer_landing_mid_submit_is_not_overwritten() {
        let f = fixture(100).await;
        let now = Utc::now();
        let stale = TestSession {
            id: Uuid::new_v4(),
            session_code: "SES-TEST-CCCCCC".into(),
            candidate_id: Uuid::new_v4(),
            test_id: f.test.id,
            status: SessionStatus::InProgress,
            started_at: Some(now),
            completed_at: None,
            answers: Vec::new(),
            score: None,
            created_at: now,
            updated_at: now,
        };
        let mut grown = stale.clone();
        grown.answers.push(Answer {
            question_id: f.test.questions[0].question_id,
            selected_answer: json!("A"),
            is_correct: true,
            time_taken: 0,
            score: 50,
        });

        let mut mock = MockSessionStore::new();
        let mut reads = vec![grown, stale];
        mock.expect_find_session()
            .times(2)
            .returning(move |_| Ok(reads.pop()));
        mock.expect_save_transition()
            .withf(|s, expected| *expected == SessionStatus::InProgress && s.answers.is_empty())
            .times(1)
            .returning(|_, _| Ok(None));

        let sessions = SessionService::new(Arc::new(mock), f.sessions.tests.clone());
        let err = sessions.submit(Uuid::new_v4()).await.unwrap_err();
        assert!(
            matches!(err, Error::InvalidTransition(msg) if msg == "Session answers changed during submission")
        );
    }

    #[tokio::test]
    async fn lost_start_race_is_invalid_transition() {
        let f = fixture(100).await;
        let now = Utc::now();
        let scheduled = TestSession {
            id: Uuid::new_v4(),
            session_code: "SES-TEST-BBBBBB".into(),
            candidate_id: Uuid::new_v4(),
            test_id: f.test.id,
            status: SessionStatus::Scheduled,
            started_at: None,
            completed_at: None,
            answers: Vec::new(),
            score: None,
            created_at: now,
            updated_at: now,
        };

        let mut mock = MockSessionStore::new();
        mock.expect_find_session()
            .returning(move |_| Ok(Some(scheduled.clone())));
        mock.expect_save_transition().returning(|_, _| Ok(None));

        let sessions = SessionService::new(Arc::new(mock), f.sessions.tests.clone());
        let err = sessions.start(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn taken_codes_are_regenerated() {
        let f = fixture(100).await;
        let mut mock = MockSessionStore::new();
        let mut taken = 2;
        mock.expect_session_code_exists().times(3).returning(move |_| {
            taken -= 1;
            Ok(taken >= 0)
        });
        mock.expect_insert_session().returning(|s| Ok(s.clone()));

        let sessions = SessionService::new(Arc::new(mock), f.sessions.tests.clone());
        let session = sessions
            .create(CreateSessionRequest {
                candidate_id: Uuid::new_v4(),
                test_id: f.test.id,
            })
            .await
            .unwrap();
        assert!(session.session_code.starts_with("SES-"));
    }
}
