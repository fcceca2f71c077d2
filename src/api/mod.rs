pub mod client;
pub mod wire;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ScanClient, ScanService};
