pub mod applicant_service;
pub mod auth_service;
pub mod mail_service;
pub mod notification_service;
pub mod poll_service;
pub mod review_service;
