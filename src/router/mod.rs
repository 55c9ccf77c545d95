pub mod auth_router;
pub mod property_router;
pub mod intake_router;
