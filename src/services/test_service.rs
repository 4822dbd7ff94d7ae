use crate::database::store::TestStore;
use crate::dto::pagination::{Page, Paginated};
use crate::dto::test_dto::{CreateQuestion, CreateTestPayload, UpdateTestPayload};
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::test::{Test, TestType};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Test catalog. Sessions read tests through `get_test`.
#[derive(Clone)]
pub struct TestService {
    store: Arc<dyn TestStore>,
}

impl TestService {
    pub fn new(store: Arc<dyn TestStore>) -> Self {
        Self { store }
    }

    pub async fn create_test(
        &self,
        payload: CreateTestPayload,
        created_by: Option<Uuid>,
    ) -> Result<Test> {
        let now = Utc::now();
        let test = Test {
            id: Uuid::new_v4(),
            title: payload.title,
            description: payload.description,
            test_type: payload.test_type,
            difficulty: payload.difficulty.unwrap_or_default(),
            duration: payload.duration,
            passing_score: payload.passing_score,
            total_marks: payload.total_marks,
            questions: assign_question_ids(&payload.questions),
            is_active: true,
            is_published: payload.is_published.unwrap_or(false),
            created_by,
            created_at: now,
            updated_at: now,
        };

        if test.question_marks() != test.total_marks {
            tracing::warn!(
                test_id = %test.id,
                total_marks = test.total_marks,
                question_marks = test.question_marks(),
                "question marks do not add up to total marks"
            );
        }

        let created = self.store.insert_test(&test).await?;
        tracing::info!(test_id = %created.id, title = %created.title, "test created");
        Ok(created)
    }

    /// Also returns soft-deleted tests, which still back their sessions.
    pub async fn get_test(&self, test_id: Uuid) -> Result<Test> {
        self.store
            .find_test(test_id)
            .await?
            .ok_or_else(|| Error::NotFound("Test not found".to_string()))
    }

    pub async fn list_tests(&self, page: Page) -> Result<Paginated<Test>> {
        let (items, total) = self.store.list_active_tests(page).await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn list_by_type(&self, test_type: TestType) -> Result<Vec<Test>> {
        self.store.list_published_by_type(test_type).await
    }

    pub async fn update_test(&self, test_id: Uuid, payload: UpdateTestPayload) -> Result<Test> {
        let mut test = self.get_test(test_id).await?;

        if let Some(title) = payload.title {
            test.title = title;
        }
        if let Some(description) = payload.description {
            test.description = description;
        }
        if let Some(test_type) = payload.test_type {
            test.test_type = test_type;
        }
        if let Some(difficulty) = payload.difficulty {
            test.difficulty = difficulty;
        }
        if let Some(duration) = payload.duration {
            test.duration = duration;
        }
        if let Some(passing_score) = payload.passing_score {
            test.passing_score = passing_score;
        }
        if let Some(total_marks) = payload.total_marks {
            test.total_marks = total_marks;
        }
        if let Some(questions) = payload.questions {
            test.questions = assign_question_ids(&questions);
        }
        if let Some(is_active) = payload.is_active {
            test.is_active = is_active;
        }
        if let Some(is_published) = payload.is_published {
            test.is_published = is_published;
        }
        test.updated_at = Utc::now();

        let updated = self
            .store
            .update_test(&test)
            .await?
            .ok_or_else(|| Error::NotFound("Test not found".to_string()))?;
        tracing::info!(test_id = %updated.id, "test updated");
        Ok(updated)
    }

    /// Soft delete: the row stays, `is_active` goes false.
    pub async fn remove_test(&self, test_id: Uuid) -> Result<()> {
        if !self.store.deactivate_test(test_id).await? {
            return Err(Error::NotFound("Test not found".to_string()));
        }
        tracing::info!(test_id = %test_id, "test deactivated");
        Ok(())
    }
}

fn assign_question_ids(questions: &[CreateQuestion]) -> Vec<Question> {
    questions
        .iter()
        .map(|q| Question {
            question_id: q.question_id.unwrap_or_else(Uuid::new_v4),
            question_text: q.question_text.clone(),
            question_type: q.question_type.clone(),
            options: q.options.clone(),
            marks: q.marks,
        })
        .collect()
}
