pub mod analytics_service;
pub mod auth_service;
pub mod candidate_service;
pub mod grading_service;
pub mod report_service;
pub mod result_service;
pub mod session_service;
pub mod test_service;
