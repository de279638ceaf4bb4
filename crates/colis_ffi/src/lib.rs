//! Flutter-facing bindings for the colis core.
//!
//! Every exported function lives in [`api`] and returns a plain response
//! envelope; bindings are generated from there.

pub mod api;
