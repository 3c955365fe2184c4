pub mod config;
pub mod customers;
pub mod drivers;
pub mod error;
pub mod jobs;
pub mod storage;
pub mod utils;
