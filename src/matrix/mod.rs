//! Matrix views and the reference implementations.
//!
//! The views carry the leading-dimension bookkeeping every other module
//! relies on; the naive products and the comparison helpers are the
//! correctness baseline for the optimised paths.

pub mod naive;
pub mod verify;
pub mod view;

pub use view::{MatMut, MatRef};
