//! JSON-file device store with atomic replace-on-write.
//!
//! The whole registry lives in one document. Writes stage the new state,
//! serialize it to a sibling temporary file, flush it to disk, and rename it
//! over the live file; in-memory state is swapped only after the rename
//! succeeds, so a failed write leaves both disk and memory unchanged.

mod models;
mod store;

pub use store::FileDeviceStore;
