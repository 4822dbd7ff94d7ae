use crate::models::candidate::{ApplicationStatus, ContactInfo, Gender, PersonalInfo};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoPayload {
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[validate(length(min = 1))]
    pub nationality: Option<String>,
}

impl From<PersonalInfoPayload> for PersonalInfo {
    fn from(p: PersonalInfoPayload) -> Self {
        PersonalInfo {
            date_of_birth: p.date_of_birth,
            gender: p.gender,
            nationality: p.nationality,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfoPayload {
    #[validate(length(min = 1, message = "Primary phone cannot be empty"))]
    pub primary_phone: String,
    pub secondary_phone: Option<String>,
}

impl From<ContactInfoPayload> for ContactInfo {
    fn from(c: ContactInfoPayload) -> Self {
        ContactInfo {
            primary_phone: c.primary_phone,
            secondary_phone: c.secondary_phone,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCandidatePayload {
    pub user_id: Uuid,
    #[validate(nested)]
    pub personal_info: PersonalInfoPayload,
    #[validate(nested)]
    pub contact_info: ContactInfoPayload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCandidatePayload {
    pub application_status: Option<ApplicationStatus>,
    #[validate(nested)]
    pub personal_info: Option<PersonalInfoPayload>,
    #[validate(nested)]
    pub contact_info: Option<ContactInfoPayload>,
}
