pub mod repository_error;
pub mod mongo;
pub mod user_repo;
pub mod property_repo;
pub mod inquiry_repo;
pub mod contact_repo;
pub mod subscriber_repo;
