pub mod user_service;
pub mod property_service;
pub mod intake_service;
