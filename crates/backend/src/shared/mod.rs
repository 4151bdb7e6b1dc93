pub mod config;
pub mod data;
pub mod jobs;
pub mod kv;
pub mod progress;
pub mod realtime;
