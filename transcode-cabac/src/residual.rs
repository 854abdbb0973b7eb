//! Coefficient block coding.
//!
//! A block is coded as a coded-block bit, then (if any coefficient is nonzero) a
//! significance map with interleaved last flags, then the magnitudes and signs of the
//! nonzero coefficients in reverse scan order.

use crate::binarization::encode_level;
use crate::context::{PictureStructure, TextureInfoContexts};
use crate::engine::BinEncoder;
use crate::error::{CabacError, Result};

/// Largest number of coefficients in any block.
pub const MAX_COEFFICIENTS: usize = 64;

/// Transform block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// DC coefficients of an intra 16x16 macroblock.
    Luma16Dc,
    /// AC coefficients of one 4x4 block of an intra 16x16 macroblock.
    Luma16Ac,
    /// 8x8 luma transform.
    Luma8x8,
    /// 8x4 luma transform.
    Luma8x4,
    /// 4x8 luma transform.
    Luma4x8,
    /// 4x4 luma transform.
    Luma4x4,
    /// Chroma DC.
    ChromaDc,
    /// Chroma AC.
    ChromaAc,
}

impl BlockType {
    /// All block types in table order.
    pub const ALL: [BlockType; 8] = [
        BlockType::Luma16Dc,
        BlockType::Luma16Ac,
        BlockType::Luma8x8,
        BlockType::Luma8x4,
        BlockType::Luma4x8,
        BlockType::Luma4x4,
        BlockType::ChromaDc,
        BlockType::ChromaAc,
    ];

    /// Table index of the block type.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Number of coefficients in the block.
    pub fn max_coefficients(self) -> usize {
        MAX_POS[self.index()]
    }

    /// Whether position 0 is part of the significance scan.
    pub fn includes_dc(self) -> bool {
        C1_IS_DC[self.index()]
    }

    /// Largest legal `(x, y)` of the top-left 4x4 block.
    fn max_position(self) -> (usize, usize) {
        match self {
            BlockType::Luma16Dc | BlockType::ChromaDc => (0, 0),
            BlockType::Luma16Ac | BlockType::Luma4x4 => (3, 3),
            BlockType::Luma8x8 => (2, 2),
            BlockType::Luma8x4 => (2, 3),
            BlockType::Luma4x8 => (3, 2),
            BlockType::ChromaAc => (1, 1),
        }
    }
}

const MAX_POS: [usize; 8] = [16, 15, 64, 32, 32, 16, 4, 15];
const C1_IS_DC: [bool; 8] = [true, false, true, true, true, true, true, false];

const TYPE2CTX_BCBP: [usize; 8] = [0, 1, 2, 2, 3, 4, 5, 6];
const TYPE2CTX_MAP: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
const TYPE2CTX_LAST: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
const TYPE2CTX_ONE: [usize; 8] = [0, 1, 2, 3, 3, 4, 5, 6];
const TYPE2CTX_ABS: [usize; 8] = [0, 1, 2, 3, 3, 4, 5, 6];

// Position to context, zig-zag scan
#[rustfmt::skip]
static POS2CTX_MAP_8X8: [u8; 64] = [
     0,  1,  2,  3,  4,  5,  5,  4,  4,  3,  3,  4,  4,  4,  5,  5,
     4,  4,  4,  4,  3,  3,  6,  7,  7,  7,  8,  9, 10,  9,  8,  7,
     7,  6, 11, 12, 13, 11,  6,  7,  8,  9, 14, 10,  9,  8,  6, 11,
    12, 13, 11,  6,  9, 14, 10,  9, 11, 12, 13, 11, 14, 10, 12, 14,
];
#[rustfmt::skip]
static POS2CTX_MAP_8X4: [u8; 32] = [
     0,  1,  2,  3,  4,  5,  7,  8,  9, 10, 11,  9,  8,  6,  7,  8,
     9, 10, 11,  9,  8,  6, 12,  8,  9, 10, 11,  9, 13, 13, 14, 14,
];
static POS2CTX_MAP_4X4: [u8; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 14];

// Position to context, field scan
#[rustfmt::skip]
static POS2CTX_MAP_8X8_FIELD: [u8; 64] = [
     0,  1,  1,  2,  2,  3,  3,  4,  5,  6,  7,  7,  7,  8,  4,  5,
     6,  9, 10, 10,  8, 11, 12, 11,  9,  9, 10, 10,  8, 11, 12, 11,
     9,  9, 10, 10,  8, 11, 12, 11,  9,  9, 10, 10,  8, 13, 13,  9,
     9, 10, 10,  8, 13, 13,  9,  9, 10, 10, 14, 14, 14, 14, 14, 14,
];
#[rustfmt::skip]
static POS2CTX_MAP_8X4_FIELD: [u8; 32] = [
     0,  1,  2,  3,  4,  5,  6,  3,  4,  5,  6,  3,  4,  7,  6,  8,
     9,  7,  6,  8,  9, 10, 11, 12, 12, 10, 11, 13, 13, 14, 14, 14,
];
#[rustfmt::skip]
static POS2CTX_MAP_4X8_FIELD: [u8; 32] = [
     0,  1,  1,  1,  2,  3,  3,  4,  4,  4,  5,  6,  2,  7,  7,  8,
     8,  8,  5,  6,  9, 10, 10, 11, 11, 11, 12, 13, 13, 14, 14, 14,
];

// Position to context for the last flag
#[rustfmt::skip]
static POS2CTX_LAST_8X8: [u8; 64] = [
     0,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,  1,
     2,  2,  2,  2,  2,  2,  2,  2,  2,  2,  2,  2,  2,  2,  2,  2,
     3,  3,  3,  3,  3,  3,  3,  3,  4,  4,  4,  4,  4,  4,  4,  4,
     5,  5,  5,  5,  6,  6,  6,  6,  7,  7,  7,  7,  8,  8,  8,  8,
];
#[rustfmt::skip]
static POS2CTX_LAST_8X4: [u8; 32] = [
     0,  1,  1,  1,  1,  1,  1,  1,  2,  2,  2,  2,  2,  2,  2,  2,
     3,  3,  3,  3,  4,  4,  4,  4,  5,  5,  6,  6,  7,  7,  8,  8,
];
static POS2CTX_LAST_4X4: [u8; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

static POS2CTX_MAP: [&[u8]; 8] = [
    &POS2CTX_MAP_4X4,
    &POS2CTX_MAP_4X4,
    &POS2CTX_MAP_8X8,
    &POS2CTX_MAP_8X4,
    &POS2CTX_MAP_8X4,
    &POS2CTX_MAP_4X4,
    &POS2CTX_MAP_4X4,
    &POS2CTX_MAP_4X4,
];

static POS2CTX_MAP_FIELD: [&[u8]; 8] = [
    &POS2CTX_MAP_4X4,
    &POS2CTX_MAP_4X4,
    &POS2CTX_MAP_8X8_FIELD,
    &POS2CTX_MAP_8X4_FIELD,
    &POS2CTX_MAP_4X8_FIELD,
    &POS2CTX_MAP_4X4,
    &POS2CTX_MAP_4X4,
    &POS2CTX_MAP_4X4,
];

static POS2CTX_LAST: [&[u8]; 8] = [
    &POS2CTX_LAST_4X4,
    &POS2CTX_LAST_4X4,
    &POS2CTX_LAST_8X8,
    &POS2CTX_LAST_8X4,
    &POS2CTX_LAST_8X4,
    &POS2CTX_LAST_4X4,
    &POS2CTX_LAST_4X4,
    &POS2CTX_LAST_4X4,
];

/// Significance map context offsets for a block type and picture structure.
pub(crate) fn significance_table(block: BlockType, structure: PictureStructure) -> &'static [u8] {
    match structure {
        PictureStructure::Frame => POS2CTX_MAP[block.index()],
        PictureStructure::Field => POS2CTX_MAP_FIELD[block.index()],
    }
}

/// Last flag context offsets for a block type.
pub(crate) fn last_table(block: BlockType) -> &'static [u8] {
    POS2CTX_LAST[block.index()]
}

/// Context category indices `(bcbp, map, last, one, abs)` of a block type.
pub(crate) fn context_categories(block: BlockType) -> (usize, usize, usize, usize, usize) {
    let i = block.index();
    (TYPE2CTX_BCBP[i], TYPE2CTX_MAP[i], TYPE2CTX_LAST[i], TYPE2CTX_ONE[i], TYPE2CTX_ABS[i])
}

/// Per-macroblock coded-block bitmask.
///
/// Bit 0 is luma DC, bits 1-16 luma 4x4 blocks in raster order, 17/18 chroma U/V DC,
/// 19-22 chroma U AC and 23-26 chroma V AC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CodedBlockBits(u32);

impl CodedBlockBits {
    /// Create an empty bitmask.
    pub fn new() -> Self {
        Self(0)
    }

    /// Raw bitmask value.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Check a bit.
    pub fn is_set(self, bit: usize) -> bool {
        bit < 32 && self.0 & (1 << bit) != 0
    }

    /// Set a bit.
    pub fn set(&mut self, bit: usize) {
        if bit < 32 {
            self.0 |= 1 << bit;
        }
    }
}

/// Location of a block inside its macroblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct BlockPosition {
    /// Column in 4x4 units (luma 0-3, chroma 0-1).
    pub x: usize,
    /// Row in 4x4 units (luma 0-3, chroma 0-1).
    pub y: usize,
    /// Chroma V plane instead of U.
    pub v_plane: bool,
}

impl BlockPosition {
    /// Create a position in the luma or U plane.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y, v_plane: false }
    }

    /// Create a position in the V plane.
    pub fn v(x: usize, y: usize) -> Self {
        Self { x, y, v_plane: true }
    }
}

/// Coded-block state around the block being coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodedBlockNeighborhood {
    /// Bits of the current macroblock, updated as blocks are coded.
    pub current: CodedBlockBits,
    /// Bits of the macroblock above, if available.
    pub above: Option<CodedBlockBits>,
    /// Bits of the macroblock to the left, if available.
    pub left: Option<CodedBlockBits>,
    /// The current block is intra coded; unavailable neighbors count as coded.
    pub intra: bool,
}

/// Transform coefficients of one block in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoefficientBlock {
    block_type: BlockType,
    coefficients: [i32; MAX_COEFFICIENTS],
    nonzero_count: usize,
}

impl CoefficientBlock {
    /// Build a block from coefficients in scan order.
    pub fn from_coefficients(block_type: BlockType, coefficients: &[i32]) -> Result<Self> {
        let max = block_type.max_coefficients();
        if coefficients.len() > max {
            return Err(CabacError::CoefficientOverflow {
                block: block_type,
                position: max,
            });
        }
        let mut block = Self {
            block_type,
            coefficients: [0; MAX_COEFFICIENTS],
            nonzero_count: 0,
        };
        block.coefficients[..coefficients.len()].copy_from_slice(coefficients);
        block.nonzero_count = coefficients.iter().filter(|&&c| c != 0).count();
        Ok(block)
    }

    /// Build a block from `(run, level)` pairs, stopping at the first zero level.
    pub fn from_run_levels<I>(block_type: BlockType, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, i32)>,
    {
        let mut builder = CoefficientBlockBuilder::new(block_type);
        for (run, level) in pairs {
            if level == 0 {
                break;
            }
            builder.push(run, level)?;
        }
        Ok(builder.finish())
    }

    /// Block type.
    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    /// Coefficients in scan order, `max_coefficients()` long.
    pub fn coefficients(&self) -> &[i32] {
        &self.coefficients[..self.block_type.max_coefficients()]
    }

    /// Number of nonzero coefficients.
    pub fn nonzero_count(&self) -> usize {
        self.nonzero_count
    }

    /// Check if every coefficient is zero.
    pub fn is_empty(&self) -> bool {
        self.nonzero_count == 0
    }
}

/// Accumulates run-level pairs for one block.
///
/// Each pair places `run` zeros followed by `level` at the next scan positions.
#[derive(Debug, Clone)]
pub struct CoefficientBlockBuilder {
    block: CoefficientBlock,
    position: usize,
}

impl CoefficientBlockBuilder {
    /// Create an empty builder.
    pub fn new(block_type: BlockType) -> Self {
        Self {
            block: CoefficientBlock {
                block_type,
                coefficients: [0; MAX_COEFFICIENTS],
                nonzero_count: 0,
            },
            position: 0,
        }
    }

    /// Append one run-level pair. A zero level is rejected; call [`finish`](Self::finish).
    pub fn push(&mut self, run: usize, level: i32) -> Result<()> {
        if level == 0 {
            return Err(CabacError::invalid("coefficient level", 0));
        }
        let position = self.position.saturating_add(run);
        if position >= self.block.block_type.max_coefficients() {
            return Err(CabacError::CoefficientOverflow {
                block: self.block.block_type,
                position,
            });
        }
        self.block.coefficients[position] = level;
        self.block.nonzero_count += 1;
        self.position = position + 1;
        Ok(())
    }

    /// Number of pairs accumulated.
    pub fn len(&self) -> usize {
        self.block.nonzero_count
    }

    /// Check if no pair was accumulated.
    pub fn is_empty(&self) -> bool {
        self.block.nonzero_count == 0
    }

    /// Finalize the block; trailing positions are zero.
    pub fn finish(self) -> CoefficientBlock {
        self.block
    }
}

/// Bitmask index of a block and its neighbor steps `(ystep_back, xstep_back, ystep)`.
fn block_bit(block_type: BlockType, position: BlockPosition) -> Result<(usize, usize, usize, usize)> {
    let (max_x, max_y) = block_type.max_position();
    if position.x > max_x || position.y > max_y {
        return Err(CabacError::invalid("block position", (position.y * 4 + position.x) as i64));
    }
    let (x, y) = (position.x, position.y);
    Ok(match block_type {
        BlockType::Luma16Dc => (0, 0, 0, 0),
        BlockType::ChromaDc => (if position.v_plane { 18 } else { 17 }, 0, 0, 0),
        BlockType::ChromaAc => {
            let base = if position.v_plane { 23 } else { 19 };
            (base + 2 * y + x, 2, 1, 2)
        }
        _ => (1 + 4 * y + x, 12, 3, 4),
    })
}

/// Bitmask index of a block and the context offset of its coded-block bin.
///
/// Luma 8x8 blocks have no coded-block bin and return `None`.
pub(crate) fn coded_block_ctx(
    block_type: BlockType,
    position: BlockPosition,
    neighborhood: &CodedBlockNeighborhood,
) -> Result<(usize, Option<usize>)> {
    let (bit, ystep_back, xstep_back, ystep) = block_bit(block_type, position)?;
    if block_type == BlockType::Luma8x8 {
        return Ok((bit, None));
    }

    let default_bit = neighborhood.intra;
    let upper = if position.y == 0 {
        neighborhood
            .above
            .map_or(default_bit, |bits| bits.is_set(bit + ystep_back))
    } else {
        neighborhood.current.is_set(bit - ystep)
    };
    let left = if position.x == 0 {
        neighborhood
            .left
            .map_or(default_bit, |bits| bits.is_set(bit + xstep_back))
    } else {
        neighborhood.current.is_set(bit - 1)
    };
    Ok((bit, Some(2 * upper as usize + left as usize)))
}

/// Mark a coded block in the current macroblock's bitmask.
pub(crate) fn mark_coded(current: &mut CodedBlockBits, block_type: BlockType, bit: usize) {
    match block_type {
        BlockType::Luma8x8 => {
            for b in [bit, bit + 1, bit + 4, bit + 5] {
                current.set(b);
            }
        }
        BlockType::Luma8x4 => {
            current.set(bit);
            current.set(bit + 1);
        }
        BlockType::Luma4x8 => {
            current.set(bit);
            current.set(bit + 4);
        }
        _ => current.set(bit),
    }
}

/// Record the coded-block bit of a block and code it unless the block is luma 8x8.
pub fn write_coded_block_bit<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut TextureInfoContexts,
    block_type: BlockType,
    position: BlockPosition,
    coded: bool,
    neighborhood: &mut CodedBlockNeighborhood,
) -> Result<()> {
    let (bit, ctx) = coded_block_ctx(block_type, position, neighborhood)?;
    if coded {
        mark_coded(&mut neighborhood.current, block_type, bit);
    }
    if let Some(ctx) = ctx {
        let (bcbp, ..) = context_categories(block_type);
        encoder.encode_adaptive(coded, &mut contexts.bcbp[bcbp][ctx]);
    }
    Ok(())
}

/// Code significance and last flags; returns the number of significant positions.
pub fn encode_significance_map<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut TextureInfoContexts,
    block: &CoefficientBlock,
    structure: PictureStructure,
) -> usize {
    let block_type = block.block_type;
    let (_, map, last, ..) = context_categories(block_type);
    let map_table = significance_table(block_type, structure);
    let last_table = last_table(block_type);
    let coeffs = block.coefficients();

    // Scan positions k0..k1 map to coefficient k - shift; the final position is implied.
    let (k0, k1, shift) = if block_type.includes_dc() {
        (0, coeffs.len() - 1, 0)
    } else {
        (1, coeffs.len(), 1)
    };

    let mut remaining = block.nonzero_count;
    let mut significant = 0;
    for k in k0..k1 {
        let sig = coeffs[k - shift] != 0;
        encoder.encode_adaptive(sig, &mut contexts.map[map][map_table[k] as usize]);
        if sig {
            significant += 1;
            remaining = remaining.saturating_sub(1);
            let is_last = remaining == 0;
            encoder.encode_adaptive(is_last, &mut contexts.last[last][last_table[k] as usize]);
            if is_last {
                return significant;
            }
        }
    }
    if coeffs[coeffs.len() - 1] != 0 {
        significant += 1;
    }
    significant
}

/// Code magnitudes and signs in reverse scan order; returns the number of levels coded.
pub fn encode_levels<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut TextureInfoContexts,
    block: &CoefficientBlock,
) -> usize {
    let (.., one, abs) = context_categories(block.block_type);
    let mut c1: usize = 1;
    let mut c2: usize = 0;
    let mut coded = 0;

    for &level in block.coefficients().iter().rev() {
        if level == 0 {
            continue;
        }
        let magnitude = level.unsigned_abs();
        let greater_one = magnitude > 1;
        encoder.encode_adaptive(greater_one, &mut contexts.one[one][c1.min(4)]);
        if greater_one {
            encode_level(encoder, magnitude - 2, &mut contexts.abs[abs][c2.min(4)]);
            c1 = 0;
            c2 += 1;
        } else if c1 != 0 {
            c1 += 1;
        }
        encoder.encode_bypass(level < 0);
        coded += 1;
    }
    coded
}

/// Code a whole block: coded-block bit, significance map and levels.
pub fn encode_block<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut TextureInfoContexts,
    block: &CoefficientBlock,
    position: BlockPosition,
    structure: PictureStructure,
    neighborhood: &mut CodedBlockNeighborhood,
) -> Result<()> {
    write_coded_block_bit(
        encoder,
        contexts,
        block.block_type,
        position,
        !block.is_empty(),
        neighborhood,
    )?;
    if block.is_empty() {
        return Ok(());
    }

    let significant = encode_significance_map(encoder, contexts, block, structure);
    if significant != block.nonzero_count {
        return Err(CabacError::CoefficientCountMismatch {
            expected: block.nonzero_count,
            coded: significant,
        });
    }
    let coded = encode_levels(encoder, contexts, block);
    if coded != block.nonzero_count {
        return Err(CabacError::CoefficientCountMismatch {
            expected: block.nonzero_count,
            coded,
        });
    }
    Ok(())
}
