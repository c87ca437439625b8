pub mod applicant;
pub mod notification;
pub mod user;
