//! Persistence of the Silver layer.
//!
//! - **fingerprint**: content identity of Source Table lines
//! - **ledger**: append-only set of fingerprints already processed
//! - **journal**: pending-commit record bridging table and ledger writes
//! - **writer**: Current Table appends and History Snapshots
//! - **atomic**: temp-file-and-rename helpers

pub mod atomic;
pub mod error;
pub mod fingerprint;
pub mod journal;
pub mod ledger;
pub mod writer;

pub use atomic::{copy_atomic, write_atomic};
pub use error::{Result, StoreError};
pub use fingerprint::{FINGERPRINT_BYTES, Fingerprint, canonical_line};
pub use journal::{Journal, PendingCommit, Recovery};
pub use ledger::Ledger;
pub use writer::{HistorizedWriter, OUTPUT_DELIMITER, PreparedAppend, WriteOutcome};
