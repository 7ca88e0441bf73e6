//! Bell–Kaiser BEEM model implementations.
//!
//! Models are implemented as small, pure functions so that fitting code (which
//! lives outside this crate) can call them with any buffer shape.

pub mod bell_kaiser;
pub mod legacy;
pub mod residual;

pub use bell_kaiser::*;
pub use legacy::*;
pub use residual::*;
