//! # claims-cli: Operator CLI for the claims stack
//!
//! The `claims` binary reads backend configuration from the environment
//! (`CLAIMS_STORE_URL`, `CLAIMS_STORE_KEY`, `CLAIMS_API_URL`,
//! `CLAIMS_TIMEOUT_SECS`, `CLAIMS_SAMPLE_FALLBACK`) and drives a
//! `ClaimsService`. This library holds the terminal rendering.

pub mod render;
