//! CABAC-specific error types.
//!
//! Every error in this crate is fatal for the slice being coded: the contexts have
//! already been adapted by the bins emitted before the failure, so the slice cannot be
//! resumed. [`SliceEncoder`](crate::slice::SliceEncoder) poisons itself on the first error.

use thiserror::Error;

use crate::context::PictureType;
use crate::residual::BlockType;

/// CABAC encoder error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CabacError {
    /// Macroblock type outside the binarization tree of the picture type.
    #[error("Unsupported macroblock type {value} in {picture:?} picture")]
    UnsupportedMbType {
        /// Picture type being coded.
        picture: PictureType,
        /// Offending macroblock type symbol.
        value: u32,
    },

    /// Syntax element value outside its legal range.
    #[error("Invalid {element} value: {value}")]
    InvalidValue {
        /// Syntax element name.
        element: &'static str,
        /// Offending value.
        value: i64,
    },

    /// Run-level pairs ran past the last coefficient of the block.
    #[error("Coefficient position {position} exceeds {block:?} block")]
    CoefficientOverflow {
        /// Block type being accumulated.
        block: BlockType,
        /// First position that did not fit.
        position: usize,
    },

    /// Significance map and level pass disagree with the nonzero count.
    #[error("Coefficient count mismatch: expected {expected}, coded {coded}")]
    CoefficientCountMismatch {
        /// Nonzero count carried by the block.
        expected: usize,
        /// Magnitudes actually coded.
        coded: usize,
    },

    /// Macroblock index outside the macroblock store.
    #[error("Macroblock {index} out of range (store holds {len})")]
    InvalidMacroblock {
        /// Requested index.
        index: usize,
        /// Number of macroblocks in the store.
        len: usize,
    },

    /// A previous fatal error left the slice encoder unusable.
    #[error("Slice encoder poisoned by an earlier error")]
    Poisoned,

    /// The final end-of-slice flag was already coded.
    #[error("Slice already terminated")]
    SliceTerminated,

    /// The slice worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

/// Result type for CABAC operations.
pub type Result<T> = std::result::Result<T, CabacError>;

impl CabacError {
    /// Shorthand for [`CabacError::InvalidValue`].
    pub(crate) fn invalid(element: &'static str, value: impl Into<i64>) -> Self {
        CabacError::InvalidValue {
            element,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CabacError::UnsupportedMbType {
            picture: PictureType::P,
            value: 31,
        };
        assert_eq!(err.to_string(), "Unsupported macroblock type 31 in P picture");

        let err = CabacError::invalid("coded_block_pattern", 48);
        assert_eq!(err.to_string(), "Invalid coded_block_pattern value: 48");
    }

    #[test]
    fn test_count_mismatch_display() {
        let err = CabacError::CoefficientCountMismatch {
            expected: 3,
            coded: 2,
        };
        assert!(err.to_string().contains("expected 3"));
    }
}
