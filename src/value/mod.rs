//! Typed decoding of stored payloads.
//!
//! Everything here is stateless: decoding never touches a watch target or any
//! lock, so the same functions serve one-shot reads and running watches.

mod decode;
mod kind;
mod payload;
mod validate;

#[cfg(test)]
mod decode_test;

pub use decode::*;
pub use kind::*;
pub use payload::*;
pub use validate::validate_fn;
pub use validate::ValidateFn;
