//! Shared runtime plumbing for the satledger binaries.

pub mod log;
