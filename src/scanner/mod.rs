//! Scanner component: detection of sponsored account creations from a
//! node's transaction history.

pub mod scan;
pub mod types;

pub use scan::Scanner;
pub use types::{
    DetectionEvent, DetectionReason, EventKind, EventReason, ScanError, ScanResult, ScannerConfig,
};
