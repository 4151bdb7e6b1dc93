pub mod a101_sync_run;
pub mod a102_sync_stamp;
