//! Verification and encoding algorithms.

pub mod apply;
pub mod commit_verifier;

pub use apply::{apply_light_block, encode_validation_result, VALIDATION_RESULT_METADATA_LENGTH};
pub use commit_verifier::{verify_commit_light, verify_commit_light_trusting};
