pub mod devices;
pub mod refresh_tokens;
pub mod roles;
pub mod users;
pub mod verification_codes;
