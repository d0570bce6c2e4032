//! Library half of the `tinyvm` CLI: the conformance harness.

pub mod conformance;
