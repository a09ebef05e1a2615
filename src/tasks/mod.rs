pub mod snapshot_refresher;
