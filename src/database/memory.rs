//! In-process backend. Each call takes the lock once, so every store
//! operation is atomic with respect to the others.

use super::store::{CandidateStore, ResultStore, SessionStore, TestStore, UserStore};
use crate::dto::pagination::Page;
use crate::error::{Error, Result};
use crate::models::{
    candidate::Candidate,
    result::AssessmentResult,
    session::{Answer, SessionStatus, TestSession},
    test::{Test, TestType},
    user::User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    tests: Vec<Test>,
    sessions: Vec<TestSession>,
    results: Vec<AssessmentResult>,
    candidates: Vec<Candidate>,
    users: HashMap<Uuid, User>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn paginate<T: Clone>(rows: &[T], page: Page) -> (Vec<T>, i64) {
    let total = rows.len() as i64;
    let items = rows
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .cloned()
        .collect();
    (items, total)
}

#[async_trait]
impl TestStore for MemoryStore {
    async fn insert_test(&self, test: &Test) -> Result<Test> {
        let mut t = self.lock();
        if t.tests.iter().any(|x| x.id == test.id) {
            return Err(Error::Conflict(format!("Test {} already exists", test.id)));
        }
        t.tests.push(test.clone());
        Ok(test.clone())
    }

    async fn find_test(&self, id: Uuid) -> Result<Option<Test>> {
        Ok(self.lock().tests.iter().find(|x| x.id == id).cloned())
    }

    async fn update_test(&self, test: &Test) -> Result<Option<Test>> {
        let mut t = self.lock();
        match t.tests.iter_mut().find(|x| x.id == test.id) {
            Some(slot) => {
                *slot = test.clone();
                Ok(Some(slot.clone()))
            }
            None => Ok(None),
        }
    }

    async fn deactivate_test(&self, id: Uuid) -> Result<bool> {
        let mut t = self.lock();
        match t.tests.iter_mut().find(|x| x.id == id) {
            Some(slot) => {
                slot.is_active = false;
                slot.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_active_tests(&self, page: Page) -> Result<(Vec<Test>, i64)> {
        let t = self.lock();
        let active: Vec<Test> = t.tests.iter().filter(|x| x.is_active).cloned().collect();
        Ok(paginate(&active, page))
    }

    async fn list_published_by_type(&self, test_type: TestType) -> Result<Vec<Test>> {
        Ok(self
            .lock()
            .tests
            .iter()
            .filter(|x| x.test_type == test_type && x.is_active && x.is_published)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(&self, session: &TestSession) -> Result<TestSession> {
        let mut t = self.lock();
        if t.sessions.iter().any(|x| x.session_code == session.session_code) {
            return Err(Error::Conflict(format!(
                "Session code {} already in use",
                session.session_code
            )));
        }
        t.sessions.push(session.clone());
        Ok(session.clone())
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<TestSession>> {
        Ok(self.lock().sessions.iter().find(|x| x.id == id).cloned())
    }

    async fn session_code_exists(&self, code: &str) -> Result<bool> {
        Ok(self.lock().sessions.iter().any(|x| x.session_code == code))
    }

    async fn list_sessions(&self, page: Page) -> Result<(Vec<TestSession>, i64)> {
        Ok(paginate(&self.lock().sessions, page))
    }

    async fn count_sessions(&self, status: Option<SessionStatus>) -> Result<i64> {
        let t = self.lock();
        let n = t
            .sessions
            .iter()
            .filter(|x| status.map_or(true, |s| x.status == s))
            .count();
        Ok(n as i64)
    }

    async fn save_transition(
        &self,
        session: &TestSession,
        expected: SessionStatus,
    ) -> Result<Option<TestSession>> {
        let mut t = self.lock();
        let Some(slot) = t
            .sessions
            .iter_mut()
            .find(|x| {
                x.id == session.id
                    && x.status == expected
                    && x.answers.len() == session.answers.len()
            })
        else {
            return Ok(None);
        };
        slot.status = session.status;
        slot.started_at = session.started_at;
        slot.completed_at = session.completed_at;
        slot.score = session.score.clone();
        slot.updated_at = Utc::now();
        Ok(Some(slot.clone()))
    }

    async fn append_answer(
        &self,
        session_id: Uuid,
        answer: &Answer,
        required: SessionStatus,
    ) -> Result<Option<TestSession>> {
        let mut t = self.lock();
        let Some(slot) = t
            .sessions
            .iter_mut()
            .find(|x| x.id == session_id && x.status == required)
        else {
            return Ok(None);
        };
        slot.answers.push(answer.clone());
        slot.updated_at = Utc::now();
        Ok(Some(slot.clone()))
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn insert_result(&self, result: &AssessmentResult) -> Result<AssessmentResult> {
        let mut t = self.lock();
        if t.results.iter().any(|x| x.session_id == result.session_id) {
            return Err(Error::Conflict(format!(
                "Result already exists for session {}",
                result.session_id
            )));
        }
        t.results.push(result.clone());
        Ok(result.clone())
    }

    async fn find_result(&self, id: Uuid) -> Result<Option<AssessmentResult>> {
        Ok(self.lock().results.iter().find(|x| x.id == id).cloned())
    }

    async fn list_results(&self, page: Page) -> Result<(Vec<AssessmentResult>, i64)> {
        Ok(paginate(&self.lock().results, page))
    }

    async fn list_results_by_candidate(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<AssessmentResult>> {
        let t = self.lock();
        let mut rows: Vec<AssessmentResult> = t
            .results
            .iter()
            .filter(|x| x.candidate_id == candidate_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_results_by_type(
        &self,
        test_type: Option<TestType>,
    ) -> Result<Vec<AssessmentResult>> {
        Ok(self
            .lock()
            .results
            .iter()
            .filter(|x| test_type.map_or(true, |tt| x.test_type == tt))
            .cloned()
            .collect())
    }

    async fn count_results(&self, passed: Option<bool>) -> Result<i64> {
        let t = self.lock();
        let n = t
            .results
            .iter()
            .filter(|x| passed.map_or(true, |p| x.score.passed == p))
            .count();
        Ok(n as i64)
    }

    async fn mark_verified(&self, id: Uuid) -> Result<Option<AssessmentResult>> {
        let mut t = self.lock();
        Ok(t.results.iter_mut().find(|x| x.id == id).map(|slot| {
            slot.is_verified = true;
            slot.updated_at = Utc::now();
            slot.clone()
        }))
    }
}

#[async_trait]
impl CandidateStore for MemoryStore {
    async fn insert_candidate(&self, candidate: &Candidate) -> Result<Candidate> {
        let mut t = self.lock();
        if t.candidates.iter().any(|x| x.user_id == candidate.user_id) {
            return Err(Error::Conflict(format!(
                "Candidate profile already exists for user {}",
                candidate.user_id
            )));
        }
        if t
            .candidates
            .iter()
            .any(|x| x.application_number == candidate.application_number)
        {
            return Err(Error::Conflict(format!(
                "Application number {} already in use",
                candidate.application_number
            )));
        }
        t.candidates.push(candidate.clone());
        Ok(candidate.clone())
    }

    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        Ok(self.lock().candidates.iter().find(|x| x.id == id).cloned())
    }

    async fn update_candidate(&self, candidate: &Candidate) -> Result<Option<Candidate>> {
        let mut t = self.lock();
        Ok(t
            .candidates
            .iter_mut()
            .find(|x| x.id == candidate.id)
            .map(|slot| {
                *slot = candidate.clone();
                slot.clone()
            }))
    }

    async fn delete_candidate(&self, id: Uuid) -> Result<bool> {
        let mut t = self.lock();
        let before = t.candidates.len();
        t.candidates.retain(|x| x.id != id);
        Ok(t.candidates.len() != before)
    }

    async fn list_candidates(&self, page: Page) -> Result<(Vec<Candidate>, i64)> {
        Ok(paginate(&self.lock().candidates, page))
    }

    async fn count_candidates(&self) -> Result<i64> {
        Ok(self.lock().candidates.len() as i64)
    }

    async fn application_number_exists(&self, number: &str) -> Result<bool> {
        Ok(self
            .lock()
            .candidates
            .iter()
            .any(|x| x.application_number == number))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<User> {
        let mut t = self.lock();
        if t
            .users
            .values()
            .any(|x| x.email == user.email || x.username == user.username)
        {
            return Err(Error::Conflict("User already exists".to_string()));
        }
        t.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.lock().users.values().find(|x| x.email == email).cloned())
    }

    async fn user_exists(&self, email: &str, username: &str) -> Result<bool> {
        Ok(self
            .lock()
            .users
            .values()
            .any(|x| x.email == email || x.username == username))
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        if let Some(user) = self.lock().users.get_mut(&id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::Score;
    use serde_json::json;

    fn session(code: &str, status: SessionStatus) -> TestSession {
        let now = Utc::now();
        TestSession {
            id: Uuid::new_v4(),
            session_code: code.to_string(),
            candidate_id: Uuid::new_v4(),
            test_id: Uuid::new_v4(),
            status,
            started_at: None,
            completed_at: None,
            answers: Vec::new(),
            score: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn transition_is_refused_when_status_moved_on() {
        let store = MemoryStore::new();
        let stored = store
            .insert_session(&session("SES-1", SessionStatus::InProgress))
            .await
            .unwrap();

        let mut next = stored.clone();
        next.status = SessionStatus::Completed;
        let stale = store
            .save_transition(&next, SessionStatus::Scheduled)
            .await
            .unwrap();
        assert!(stale.is_none());

        let applied = store
            .save_transition(&next, SessionStatus::InProgress)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(applied.status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn transition_is_refused_when_answers_grew() {
        let store = MemoryStore::new();
        let stored = store
            .insert_session(&session("SES-3", SessionStatus::InProgress))
            .await
            .unwrap();

        let answer = Answer {
            question_id: Uuid::new_v4(),
            selected_answer: json!("A"),
            is_correct: true,
            time_taken: 0,
            score: 50,
        };
        store
            .append_answer(stored.id, &answer, SessionStatus::InProgress)
            .await
            .unwrap()
            .unwrap();

        let mut scored_from_stale = stored.clone();
        scored_from_stale.status = SessionStatus::Completed;
        scored_from_stale.score = Some(Score::default());
        let refused = store
            .save_transition(&scored_from_stale, SessionStatus::InProgress)
            .await
            .unwrap();
        assert!(refused.is_none());

        let current = store.find_session(stored.id).await.unwrap().unwrap();
        assert_eq!(current.status, SessionStatus::InProgress);
        assert_eq!(current.answers.len(), 1);
        assert!(current.score.is_none());

        let mut scored_from_fresh = current.clone();
        scored_from_fresh.status = SessionStatus::Completed;
        scored_from_fresh.score = Some(Score {
            attempted: 1,
            correct: 1,
            obtained_marks: 50,
            ..Score::default()
        });
        let applied = store
            .save_transition(&scored_from_fresh, SessionStatus::InProgress)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(applied.score.unwrap().attempted, applied.answers.len() as i32);
    }

    #[tokio::test]
    async fn append_requires_status() {
        let store = MemoryStore::new();
        let stored = store
            .insert_session(&session("SES-2", SessionStatus::Scheduled))
            .await
            .unwrap();
        let answer = Answer {
            question_id: Uuid::new_v4(),
            selected_answer: json!("A"),
            is_correct: true,
            time_taken: 0,
            score: 1,
        };
        let refused = store
            .append_answer(stored.id, &answer, SessionStatus::InProgress)
            .await
            .unwrap();
        assert!(refused.is_none());
        assert_eq!(store.count_sessions(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_session_code_conflicts() {
        let store = MemoryStore::new();
        store
            .insert_session(&session("SES-DUP", SessionStatus::Scheduled))
            .await
            .unwrap();
        let err = store
            .insert_session(&session("SES-DUP", SessionStatus::Scheduled))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(store.session_code_exists("SES-DUP").await.unwrap());
    }
}
