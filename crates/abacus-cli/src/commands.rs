pub mod ask;
pub mod models;
pub mod session;
pub mod version;
