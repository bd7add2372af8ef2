//! # Shredder - Multi-pass File Overwriting
//!
//! Shredder overwrites a file with random bytes several times to make its
//! previous contents hard to recover, stamps it with a marker banner, and can
//! then delete it.
//!
//! ## Features
//!
//! - **Validation**: extension whitelist, size bounds, writability and file-name checks
//! - **Concurrent passes**: overwrite passes spread over a pool of worker threads
//! - **Positional writes**: workers never share a file cursor and the file never grows
//! - **Marker banner**: a fixed text block at offset 0 identifies processed files
//! - **Injected confirmation**: deletion goes through [`confirm::ConfirmationProvider`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use shredder::{config::Config, confirm::AutoConfirm, shredder::Shredder, validator::Validator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = Config::default();
//!     let request = Validator::validate("./secret.txt", "3").await?;
//!
//!     let report = Shredder::new(&cfg)
//!         .shred(&request, &AutoConfirm(false))
//!         .await?;
//!     assert_eq!(report.passes, 3);
//!     Ok(())
//! }
//! ```
//!
//! ## Limitations
//!
//! Overwriting is best effort. Flash wear-leveling, copy-on-write filesystems
//! and journaling may keep old blocks around.

pub mod config;
pub mod confirm;
pub mod error;
pub mod finalizer;
pub mod header;
pub mod request;
pub mod scheduler;
pub mod shredder;
pub mod util;
pub mod validator;

// Re-export common types for convenience
pub use error::ShredError;
pub use request::{ShredReport, ShredRequest};
