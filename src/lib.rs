pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::database::Store;
use crate::services::{
    analytics_service::AnalyticsService,
    auth_service::{AuthService, AuthSettings},
    candidate_service::CandidateService,
    report_service::ReportService,
    result_service::ResultService,
    session_service::SessionService,
    test_service::TestService,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub test_service: TestService,
    pub session_service: SessionService,
    pub result_service: ResultService,
    pub candidate_service: CandidateService,
    pub analytics_service: AnalyticsService,
    pub report_service: ReportService,
}

impl AppState {
    pub fn new<S: Store + 'static>(store: Arc<S>, auth: AuthSettings) -> Self {
        let test_service = TestService::new(store.clone());
        let session_service = SessionService::new(store.clone(), test_service.clone());
        let result_service =
            ResultService::new(store.clone(), store.clone(), test_service.clone());
        let candidate_service = CandidateService::new(store.clone());
        let analytics_service =
            AnalyticsService::new(store.clone(), store.clone(), store.clone());
        let report_service = ReportService::new(candidate_service.clone(), result_service.clone());
        let auth_service = AuthService::new(store, auth);

        Self {
            auth_service,
            test_service,
            session_service,
            result_service,
            candidate_service,
            analytics_service,
            report_service,
        }
    }
}
