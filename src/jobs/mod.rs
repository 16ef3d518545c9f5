//! Background snapshot loops, enabled with `ENABLE_SYNC_JOBS=true`.

pub mod snapshot_sync;
