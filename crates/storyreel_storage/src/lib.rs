//! Run metadata persistence for Storyreel.
//!
//! Every run attempt ends with its [`RunState`](storyreel_core::RunState)
//! written to `project_{run_id}.json` in the output directory. Records are
//! pretty-printed UTF-8 JSON with stages in execution order.
//!
//! # Example
//!
//! ```rust
//! use storyreel_core::{RunId, RunState};
//! use storyreel_interface::MetadataStore;
//! use storyreel_storage::FileSystemMetadataStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileSystemMetadataStore::new("/tmp/storyreel");
//! let state = RunState::new("A short film about tides", RunId::new("20261019_101500"));
//!
//! let path = store.persist(&state).await?;
//! assert!(path.ends_with("project_20261019_101500.json"));
//!
//! let restored = store.load(state.run_id()).await?;
//! assert_eq!(restored, state);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod directories;
mod filesystem;

pub use directories::ensure_directories;
pub use filesystem::FileSystemMetadataStore;
pub use storyreel_error::{StorageError, StorageErrorKind};
