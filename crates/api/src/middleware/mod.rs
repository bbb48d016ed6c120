/// Password hashing, token issuance and the authenticated-user extractor
pub mod auth;
/// Mapping of domain errors to HTTP responses
pub mod error_handling;
