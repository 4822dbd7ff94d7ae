pub mod auth_dto;
pub mod candidate_dto;
pub mod pagination;
pub mod session_dto;
pub mod test_dto;
