pub mod result;
pub mod types;

pub use result::ScanResult;
pub use types::{ScanRequest, ScanVerdict};
