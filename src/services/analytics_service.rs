//! Read-only rollups over candidates, sessions and results.

use crate::database::store::{CandidateStore, ResultStore, SessionStore};
use crate::error::Result;
use crate::models::session::SessionStatus;
use crate::models::test::TestType;
use crate::services::grading_service::round2;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_candidates: i64,
    pub total_sessions: i64,
    pub completed_sessions: i64,
    pub total_results: i64,
    pub pass_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPerformance {
    pub total_attempts: i64,
    pub average_score: f64,
    pub pass_rate: f64,
}

#[derive(Clone)]
pub struct AnalyticsService {
    candidates: Arc<dyn CandidateStore>,
    sessions: Arc<dyn SessionStore>,
    results: Arc<dyn ResultStore>,
}

impl AnalyticsService {
    pub fn new(
        candidates: Arc<dyn CandidateStore>,
        sessions: Arc<dyn SessionStore>,
        results: Arc<dyn ResultStore>,
    ) -> Self {
        Self {
            candidates,
            sessions,
            results,
        }
    }

    pub async fn dashboard(&self) -> Result<DashboardStats> {
        let total_candidates = self.candidates.count_candidates().await?;
        let total_sessions = self.sessions.count_sessions(None).await?;
        let completed_sessions = self
            .sessions
            .count_sessions(Some(SessionStatus::Completed))
            .await?;
        let total_results = self.results.count_results(None).await?;
        let passed = self.results.count_results(Some(true)).await?;

        Ok(DashboardStats {
            total_candidates,
            total_sessions,
            completed_sessions,
            total_results,
            pass_rate: rate(passed, total_results),
        })
    }

    pub async fn test_performance(&self, test_type: Option<TestType>) -> Result<TestPerformance> {
        let results = self.results.list_results_by_type(test_type).await?;
        if results.is_empty() {
            return Ok(TestPerformance {
                total_attempts: 0,
                average_score: 0.0,
                pass_rate: 0.0,
            });
        }

        let total = results.len() as i64;
        let sum: f64 = results.iter().map(|r| r.score.percentage).sum();
        let passed = results.iter().filter(|r| r.score.passed).count() as i64;

        Ok(TestPerformance {
            total_attempts: total,
            average_score: round2(sum / total as f64),
            pass_rate: rate(passed, total),
        })
    }
}

fn rate(part: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(part as f64 / total as f64 * 100.0)
    }
}
