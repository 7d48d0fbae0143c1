pub mod google;
pub mod login;
pub mod otp;
pub mod password_reset;
pub mod register;
pub mod roles;
pub mod session;
pub mod token;
pub mod two_factor;
