pub mod cookie;
pub mod error;
pub mod flash;
pub mod jwt;
pub mod logger;
pub mod media;
pub mod minio;
pub mod password;
pub mod redis;
pub mod serde_fields;
pub mod session_store;
