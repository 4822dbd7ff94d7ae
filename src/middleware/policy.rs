//! Role capability table, checked by handlers before calling a service.

use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateTest,
    UpdateTest,
    DeleteTest,
    ListTests,
    ViewTest,
    CreateCandidate,
    UpdateCandidate,
    ListCandidates,
    ViewCandidate,
    DeleteCandidate,
    CreateSession,
    ListSessions,
    ViewSession,
    StartSession,
    AnswerSession,
    SubmitSession,
    GenerateResult,
    ListResults,
    ViewResult,
    ViewCandidateResults,
    VerifyResult,
    ViewAnalytics,
    ViewReports,
}

pub fn authorize(role: UserRole, op: Operation) -> bool {
    use Operation::*;
    use UserRole::*;

    match op {
        ListTests | ViewTest | ViewCandidate | ViewSession | StartSession | AnswerSession
        | SubmitSession | ViewResult | ViewCandidateResults => true,
        DeleteTest | DeleteCandidate | VerifyResult => role == Admin,
        CreateTest | UpdateTest | CreateCandidate | UpdateCandidate | CreateSession
        | GenerateResult => matches!(role, Admin | Evaluator),
        ListCandidates | ListSessions | ListResults | ViewAnalytics | ViewReports => {
            matches!(role, Admin | Evaluator | Supervisor)
        }
    }
}

pub fn ensure(claims: &Claims, op: Operation) -> Result<()> {
    if authorize(claims.role, op) {
        return Ok(());
    }
    tracing::warn!(user_id = %claims.sub, role = claims.role.as_str(), operation = ?op, "operation denied");
    Err(Error::Forbidden("Insufficient permissions".to_string()))
}
