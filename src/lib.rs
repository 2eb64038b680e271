pub mod aggregate;
pub mod api;
pub mod config;
pub mod eth;
pub mod format;
pub mod merge;
pub mod models;
pub mod poller;
pub mod protocols;
pub mod rotator;
pub mod scan_stats;
pub mod scanner;
pub mod storage;
