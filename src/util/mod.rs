pub mod jwt;
pub mod minio;
pub mod password;
pub mod logger;
pub mod error;
