//! Grid position resolution pipeline.
//!
//! This module wires together per-axis bin accumulation, bin ranking, slot
//! calculation and rack table assembly.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::{PositionCalcError, ResolveError};
pub use params::ResolverParams;
pub use pipeline::GridResolver;
pub use result::{PlacedDetection, Resolution};
