use crate::database::store::CandidateStore;
use crate::dto::candidate_dto::{CreateCandidatePayload, UpdateCandidatePayload};
use crate::dto::pagination::{Page, Paginated};
use crate::error::{Error, Result};
use crate::models::candidate::{ApplicationStatus, Candidate};
use crate::utils::codes::generate_application_number;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const NUMBER_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct CandidateService {
    store: Arc<dyn CandidateStore>,
}

impl CandidateService {
    pub fn new(store: Arc<dyn CandidateStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, payload: CreateCandidatePayload) -> Result<Candidate> {
        let application_number = self.unused_application_number().await?;
        let now = Utc::now();
        let candidate = Candidate {
            id: Uuid::new_v4(),
            user_id: payload.user_id,
            application_number,
            personal_info: payload.personal_info.into(),
            contact_info: payload.contact_info.into(),
            application_status: ApplicationStatus::default(),
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert_candidate(&candidate).await?;
        tracing::info!(
            candidate_id = %created.id,
            application_number = %created.application_number,
            "candidate created"
        );
        Ok(created)
    }

    async fn unused_application_number(&self) -> Result<String> {
        let mut number = generate_application_number();
        for _ in 1..NUMBER_ATTEMPTS {
            if !self.store.application_number_exists(&number).await? {
                break;
            }
            number = generate_application_number();
        }
        Ok(number)
    }

    pub async fn list(&self, page: Page) -> Result<Paginated<Candidate>> {
        let (items, total) = self.store.list_candidates(page).await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn get(&self, candidate_id: Uuid) -> Result<Candidate> {
        self.store
            .find_candidate(candidate_id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))
    }

    pub async fn update(
        &self,
        candidate_id: Uuid,
        payload: UpdateCandidatePayload,
    ) -> Result<Candidate> {
        let mut candidate = self.get(candidate_id).await?;
        if let Some(status) = payload.application_status {
            candidate.application_status = status;
        }
        if let Some(info) = payload.personal_info {
            candidate.personal_info = info.into();
        }
        if let Some(info) = payload.contact_info {
            candidate.contact_info = info.into();
        }
        candidate.updated_at = Utc::now();

        self.store
            .update_candidate(&candidate)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))
    }

    pub async fn remove(&self, candidate_id: Uuid) -> Result<()> {
        if !self.store.delete_candidate(candidate_id).await? {
            return Err(Error::NotFound("Candidate not found".to_string()));
        }
        tracing::info!(candidate_id = %candidate_id, "candidate removed");
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        self.store.count_candidates().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::dto::candidate_dto::{ContactInfoPayload, PersonalInfoPayload};
    use crate::models::candidate::Gender;
    use chrono::NaiveDate;
    use tokio_test::{assert_err, assert_ok};

    fn payload(user_id: Uuid) -> CreateCandidatePayload {
        CreateCandidatePayload {
            user_id,
            personal_info: PersonalInfoPayload {
                date_of_birth: NaiveDate::from_ymd_opt(2001, 4, 12).unwrap(),
                gender: Gender::Female,
                nationality: None,
            },
            contact_info: ContactInfoPayload {
                primary_phone: "+992900000001".into(),
                secondary_phone: None,
            },
        }
    }

    #[tokio::test]
    async fn create_assigns_number_and_pending_status() {
        let svc = CandidateService::new(Arc::new(MemoryStore::new()));
        let c = svc.create(payload(Uuid::new_v4())).await.unwrap();
        assert!(c.application_number.starts_with("APP-"));
        assert_eq!(c.application_status, ApplicationStatus::Pending);
        assert_eq!(svc.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_user_conflicts() {
        let svc = CandidateService::new(Arc::new(MemoryStore::new()));
        let user_id = Uuid::new_v4();
        assert_ok!(svc.create(payload(user_id)).await);
        let err = assert_err!(svc.create(payload(user_id)).await);
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn update_then_remove() {
        let svc = CandidateService::new(Arc::new(MemoryStore::new()));
        let c = svc.create(payload(Uuid::new_v4())).await.unwrap();

        let updated = svc
            .update(
                c.id,
                UpdateCandidatePayload {
                    application_status: Some(ApplicationStatus::TestAssigned),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.application_status, ApplicationStatus::TestAssigned);
        assert_eq!(updated.contact_info, c.contact_info);

        assert_ok!(svc.remove(c.id).await);
        let err = assert_err!(svc.get(c.id).await);
        assert!(matches!(err, Error::NotFound(msg) if msg == "Candidate not found"));
        assert!(matches!(svc.remove(c.id).await, Err(Error::NotFound(_))));
    }
}
