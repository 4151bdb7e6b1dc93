pub mod common;

pub mod a101_sync_run;
