pub mod auth;
pub mod policy;
pub mod rate_limit;
