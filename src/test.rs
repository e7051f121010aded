//! Shared helpers for quickcheck-based tests.

pub(crate) mod quick;
