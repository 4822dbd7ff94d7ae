use crate::error::Result;
use crate::models::candidate::ApplicationStatus;
use crate::models::result::Grade;
use crate::models::test::TestType;
use crate::services::candidate_service::CandidateService;
use crate::services::grading_service::round2;
use crate::services::result_service::ResultService;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateReport {
    pub candidate: CandidateHeader,
    pub summary: ReportSummary,
    pub test_results: Vec<TestResultLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateHeader {
    pub application_number: String,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_tests: usize,
    pub passed_tests: usize,
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultLine {
    pub test_type: TestType,
    pub score: f64,
    pub passed: bool,
    pub grade: Grade,
}

#[derive(Clone)]
pub struct ReportService {
    candidates: CandidateService,
    results: ResultService,
}

impl ReportService {
    pub fn new(candidates: CandidateService, results: ResultService) -> Self {
        Self {
            candidates,
            results,
        }
    }

    /// Lines follow the result lookup order, newest first.
    pub async fn candidate_report(&self, candidate_id: Uuid) -> Result<CandidateReport> {
        let candidate = self.candidates.get(candidate_id).await?;
        let results = self.results.find_by_candidate(candidate_id).await?;

        let total_tests = results.len();
        let passed_tests = results.iter().filter(|r| r.score.passed).count();
        let average_score = if total_tests == 0 {
            0.0
        } else {
            let sum: f64 = results.iter().map(|r| r.score.percentage).sum();
            round2(sum / total_tests as f64)
        };

        Ok(CandidateReport {
            candidate: CandidateHeader {
                application_number: candidate.application_number,
                status: candidate.application_status,
            },
            summary: ReportSummary {
                total_tests,
                passed_tests,
                average_score,
            },
            test_results: results
                .into_iter()
                .map(|r| TestResultLine {
                    test_type: r.test_type,
                    score: r.score.percentage,
                    passed: r.score.passed,
                    grade: r.score.grade,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::dto::candidate_dto::{ContactInfoPayload, CreateCandidatePayload, PersonalInfoPayload};
    use crate::dto::session_dto::{CreateSessionRequest, SubmitAnswerRequest};
    use crate::dto::test_dto::{CreateQuestion, CreateTestPayload};
    use crate::error::Error;
    use crate::models::candidate::Gender;
    use crate::models::question::{QuestionOption, QuestionType};
    use crate::services::session_service::SessionService;
    use crate::services::test_service::TestService;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn report_summarises_candidate_results() {
        let store = Arc::new(MemoryStore::new());
        let tests = TestService::new(store.clone());
        let candidates = CandidateService::new(store.clone());
        let sessions = SessionService::new(store.clone(), tests.clone());
        let results = ResultService::new(store.clone(), store.clone(), tests.clone());
        let reports = ReportService::new(candidates.clone(), results.clone());

        let test = tests
            .create_test(
                CreateTestPayload {
                    title: "Visual search".into(),
                    description: "Spot the odd symbol".into(),
                    test_type: TestType::Visual,
                    difficulty: None,
                    duration: 10,
                    passing_score: 50.0,
                    total_marks: 10,
                    questions: vec![CreateQuestion {
                        question_id: None,
                        question_text: "Odd one out".into(),
                        question_type: QuestionType::Mcq,
                        options: vec![QuestionOption { option_text: "#".into(), is_correct: true }],
                        marks: 10,
                    }],
                    is_published: Some(true),
                },
                None,
            )
            .await
            .unwrap();
        let candidate = candidates
            .create(CreateCandidatePayload {
                user_id: Uuid::new_v4(),
                personal_info: PersonalInfoPayload {
                    date_of_birth: NaiveDate::from_ymd_opt(1999, 1, 1).unwrap(),
                    gender: Gender::Male,
                    nationality: Some("TJ".into()),
                },
                contact_info: ContactInfoPayload {
                    primary_phone: "+992900000002".into(),
                    secondary_phone: None,
                },
            })
            .await
            .unwrap();

        for choice in ["#", "@"] {
            let s = sessions
                .create(CreateSessionRequest { candidate_id: candidate.id, test_id: test.id })
                .await
                .unwrap();
            sessions.start(s.id).await.unwrap();
            sessions
                .submit_answer(
                    s.id,
                    SubmitAnswerRequest {
                        question_id: test.questions[0].question_id,
                        answer: json!(choice),
                        time_taken: None,
                    },
                )
                .await
                .unwrap();
            sessions.submit(s.id).await.unwrap();
            results.generate_from_session(s.id).await.unwrap();
        }

        let report = reports.candidate_report(candidate.id).await.unwrap();
        assert_eq!(report.candidate.application_number, candidate.application_number);
        assert_eq!(report.candidate.status, ApplicationStatus::Pending);
        assert_eq!(report.summary.total_tests, 2);
        assert_eq!(report.summary.passed_tests, 1);
        assert_eq!(report.summary.average_score, 50.0);
        assert_eq!(report.test_results.len(), 2);
        assert!(report.test_results.iter().all(|l| l.test_type == TestType::Visual));
    }

    #[tokio::test]
    async fn unknown_candidate_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let tests = TestService::new(store.clone());
        let reports = ReportService::new(
            CandidateService::new(store.clone()),
            ResultService::new(store.clone(), store, tests),
        );
        let err = reports.candidate_report(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
