//! CABAC entropy coding of H.264 macroblock syntax elements for the transcode library.
//!
//! This crate turns the syntax elements of a macroblock into context-coded bins: it picks
//! a binarization per element, derives the probability context from the causal
//! neighborhood (above and left macroblocks), and drives an arithmetic coder.
//!
//! # Features
//!
//! - **Context catalogues**: motion and texture contexts with trained or flat
//!   initialization, intra and inter table variants
//! - **Macroblock elements**: skip flag, macroblock and sub-macroblock types for I, P and B
//!   pictures, ABT intra block mode, field flag, reference indices, motion vector residuals,
//!   delta QP, intra prediction modes and coded block pattern
//! - **Residual coding**: coded-block flags, significance maps with frame and field scans,
//!   and level magnitudes for the eight block types
//! - **Slice encoding**: [`SliceEncoder`] dispatches elements and reports the bits each one
//!   produced; [`ParallelSliceEncoder`] encodes independent slices on a rayon pool
//!
//! # Example
//!
//! ```rust,ignore
//! use transcode_cabac::{CabacConfig, MacroblockStore, PictureStructure, PictureType, SliceEncoder, SyntaxElement};
//!
//! let store = MacroblockStore::new(120, 68);
//! let mut slice = SliceEncoder::new(CabacConfig::new(), PictureType::I, PictureStructure::Frame);
//!
//! let bits = slice.write(&store, 0, &SyntaxElement::MbType(0))?;
//! slice.end_of_slice(true)?;
//! let payload = slice.finish()?;
//! ```

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod binarization;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod neighbor;
pub mod parallel;
pub mod residual;
pub mod slice;
pub mod syntax;
mod tables;

#[cfg(test)]
mod readback;

pub use config::{AbtMode, CabacConfig, ContextInit};
pub use context::{ContextStore, MotionInfoContexts, PictureStructure, PictureType, TextureInfoContexts};
pub use engine::{ArithmeticEncoder, BinEncoder, ProbabilityContext};
pub use error::{CabacError, Result};
pub use neighbor::{MacroblockContext, MacroblockInfo, MacroblockStore, MbMode, MvComponent, RefList, SubBlock};
pub use parallel::{encode_slice, ParallelSliceEncoder, SliceJob, ThreadingConfig};
pub use residual::{
    BlockPosition, BlockType, CodedBlockBits, CodedBlockNeighborhood, CoefficientBlock, CoefficientBlockBuilder,
};
pub use slice::SliceEncoder;
pub use syntax::SyntaxElement;
