//! Integration test member for the provider registry workspace.
//!
//! All tests live under `tests/`; see `tests/main.rs`.
