pub mod u601_sync_to_winbooks;
pub mod u602_sync_to_farandsoft;
