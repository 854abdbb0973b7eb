//! Syntax element encoders.
//!
//! One function per element kind. Each resolves its context offset from the macroblock
//! neighborhood, then binarizes the value through the bin encoder.

use crate::binarization::{encode_mv, encode_truncated_unary, encode_unary};
use crate::context::{MotionInfoContexts, PictureType, TextureInfoContexts};
use crate::engine::{BinEncoder, ProbabilityContext};
use crate::error::{CabacError, Result};
use crate::neighbor::{MacroblockContext, MvComponent, RefList, SubBlock};
use crate::residual::{BlockPosition, CoefficientBlock};

/// Largest macroblock type symbol per picture type.
pub const MAX_MB_TYPE_I: u32 = 24;
/// Largest P-picture macroblock type symbol (7 + 23 intra 16x16 modes).
pub const MAX_MB_TYPE_P: u32 = 30;
/// Largest B-picture macroblock type symbol (24 + 23 intra 16x16 modes).
pub const MAX_MB_TYPE_B: u32 = 47;

/// Delta quantizer range accepted by the encoder.
pub const DELTA_QP_RANGE: std::ops::RangeInclusive<i32> = -51..=51;

/// One syntax element with the values it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxElement<'a> {
    /// Skip flag. P pictures skip on `mb_type == 0`; B pictures on `mb_type == 0 && cbp == 0`.
    MbSkipFlag {
        /// Macroblock type symbol.
        mb_type: u32,
        /// Coded block pattern.
        cbp: u32,
    },
    /// Macroblock type symbol of the current picture type.
    MbType(u32),
    /// Sub-macroblock (8x8 partition) type.
    SubMbType(u32),
    /// ABT intra block mode: 0 = 4x4, 1 = 4x8, 2 = 8x4, 3 = 8x8.
    AbtIntraBlockMode(u32),
    /// Field (true) or frame coded macroblock.
    FieldMode(bool),
    /// Reference index.
    RefIdx {
        /// Reference list.
        list: RefList,
        /// Reference index, already normalized for the list.
        value: i32,
        /// Top-left 4x4 block of the partition.
        position: SubBlock,
        /// Partition is smaller than 8x8.
        small_partition: bool,
    },
    /// Motion vector residual component.
    Mvd {
        /// Reference list whose residual history drives the context.
        list: RefList,
        /// Vector component.
        component: MvComponent,
        /// Signed residual.
        value: i32,
        /// Top-left 4x4 block of the partition.
        position: SubBlock,
    },
    /// Delta quantizer.
    DeltaQp(i32),
    /// Intra 4x4 luma prediction mode, -1 for the predicted mode.
    IntraPredMode(i8),
    /// Intra chroma prediction mode.
    ChromaPredMode(u32),
    /// Coded block pattern (0-47).
    CodedBlockPattern(u32),
    /// Transform coefficients of one block.
    Residual {
        /// Coefficients.
        block: &'a CoefficientBlock,
        /// Location inside the macroblock.
        position: BlockPosition,
    },
}

impl SyntaxElement<'_> {
    /// Element name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            SyntaxElement::MbSkipFlag { .. } => "mb_skip_flag",
            SyntaxElement::MbType(_) => "mb_type",
            SyntaxElement::SubMbType(_) => "sub_mb_type",
            SyntaxElement::AbtIntraBlockMode(_) => "abt_intra_block_mode",
            SyntaxElement::FieldMode(_) => "mb_field_decoding_flag",
            SyntaxElement::RefIdx { .. } => "ref_idx",
            SyntaxElement::Mvd { .. } => "mvd",
            SyntaxElement::DeltaQp(_) => "mb_qp_delta",
            SyntaxElement::IntraPredMode(_) => "intra_pred_mode",
            SyntaxElement::ChromaPredMode(_) => "intra_chroma_pred_mode",
            SyntaxElement::CodedBlockPattern(_) => "coded_block_pattern",
            SyntaxElement::Residual { .. } => "residual",
        }
    }
}

/// Skip flag.
pub fn encode_mb_skip_flag<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut MotionInfoContexts,
    mb: &MacroblockContext<'_>,
    picture: PictureType,
    mb_type: u32,
    cbp: u32,
) {
    let ctx = mb.skip_ctx(picture);
    if picture.is_b() {
        let coded = !(mb_type == 0 && cbp == 0);
        encoder.encode_adaptive(coded, &mut contexts.mb_type[2][ctx]);
    } else {
        encoder.encode_adaptive(mb_type != 0, &mut contexts.mb_type[1][ctx]);
    }
}

/// Intra 16x16 subtree: AC flag, chroma CBP class, prediction mode.
///
/// `ctx` holds the contexts of the AC bin, the two CBP bins and the two mode bins.
fn encode_intra16x16<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    row: &mut [ProbabilityContext],
    mode: u32,
    ctx: [usize; 5],
) {
    encoder.encode_adaptive(mode / 12 != 0, &mut row[ctx[0]]);
    let rest = mode % 12;
    let cbp_class = rest / 4;
    if cbp_class == 0 {
        encoder.encode_adaptive(false, &mut row[ctx[1]]);
    } else {
        encoder.encode_adaptive(true, &mut row[ctx[1]]);
        encoder.encode_adaptive(cbp_class != 1, &mut row[ctx[2]]);
    }
    let pred = rest % 4;
    encoder.encode_adaptive(pred / 2 != 0, &mut row[ctx[3]]);
    encoder.encode_adaptive(pred % 2 != 0, &mut row[ctx[4]]);
}

/// Macroblock type.
pub fn encode_mb_type<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut MotionInfoContexts,
    mb: &MacroblockContext<'_>,
    picture: PictureType,
    use_abt: bool,
    value: u32,
) -> Result<()> {
    let unsupported = CabacError::UnsupportedMbType { picture, value };
    match picture {
        PictureType::I => {
            if value > MAX_MB_TYPE_I {
                return Err(unsupported);
            }
            let row = &mut contexts.mb_type[0];
            let act_ctx = mb.mb_type_intra_ctx();
            if value == 0 {
                encoder.encode_adaptive(false, &mut row[act_ctx]);
            } else {
                encoder.encode_adaptive(true, &mut row[act_ctx]);
                encode_intra16x16(encoder, row, value - 1, [4, 5, 6, 7, 8]);
            }
        }
        PictureType::P => {
            if value > MAX_MB_TYPE_P {
                return Err(unsupported);
            }
            let (sym, mode) = if value >= 7 { (7, value - 7) } else { (value, 0) };
            let row = &mut contexts.mb_type[1];
            let bins: &[(bool, usize)] = match sym {
                0 => &[],
                1 => &[(false, 4), (false, 5), (false, 6)],
                2 => &[(false, 4), (true, 5), (true, 7)],
                3 => &[(false, 4), (true, 5), (false, 7)],
                4 | 5 => &[(false, 4), (false, 5), (true, 6)],
                6 if use_abt => &[(true, 4)],
                6 => &[(true, 4), (false, 7)],
                _ => &[(true, 4), (true, 7)],
            };
            for &(bin, ctx) in bins {
                encoder.encode_adaptive(bin, &mut row[ctx]);
            }
            if sym == 7 {
                encode_intra16x16(encoder, row, mode, [8, 9, 9, 10, 10]);
            }
        }
        PictureType::B => {
            if value > MAX_MB_TYPE_B {
                return Err(unsupported);
            }
            let act_ctx = mb.mb_type_b_ctx();
            let (mut sym, mode) = if value >= 24 { (24, value - 24) } else { (value, 0) };
            let row = &mut contexts.mb_type[2];
            let mut put = |bin: bool, ctx: usize| encoder.encode_adaptive(bin, &mut row[ctx]);
            if sym == 0 {
                put(false, act_ctx);
            } else if sym <= 2 {
                put(true, act_ctx);
                put(false, 4);
                put(sym - 1 != 0, 6);
            } else if sym <= 10 {
                put(true, act_ctx);
                put(true, 4);
                put(false, 5);
                for shift in [2, 1, 0] {
                    put(((sym - 3) >> shift) & 1 != 0, 6);
                }
            } else if sym == 11 || sym == 22 {
                put(true, act_ctx);
                put(true, 4);
                put(true, 5);
                put(true, 6);
                put(true, 6);
                put(sym == 22, 6);
            } else {
                if sym > 22 {
                    sym -= 1;
                }
                put(true, act_ctx);
                put(true, 4);
                put(true, 5);
                for shift in [3, 2, 1] {
                    put(((sym - 12) >> shift) & 1 != 0, 6);
                }
                // With ABT the last bin of (shifted) symbol 22 is not sent.
                if !use_abt || sym != 22 {
                    put((sym - 12) & 1 != 0, 6);
                }
                if sym >= 22 {
                    sym += 1;
                }
            }
            if sym == 24 {
                encode_intra16x16(encoder, &mut contexts.mb_type[1], mode, [8, 9, 9, 10, 10]);
            }
        }
    }
    Ok(())
}

/// Sub-macroblock type.
pub fn encode_sub_mb_type<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut MotionInfoContexts,
    picture: PictureType,
    value: u32,
) -> Result<()> {
    if !picture.is_b() {
        let row = &mut contexts.b8_type[0];
        let bins: &[(bool, usize)] = match value {
            0 => &[(true, 1)],
            1 => &[(false, 1), (false, 2), (false, 3)],
            2 => &[(false, 1), (false, 2), (true, 3), (true, 4)],
            3 => &[(false, 1), (false, 2), (true, 3), (false, 4)],
            4 => &[(false, 1), (true, 2)],
            _ => return Err(CabacError::invalid("sub_mb_type", value)),
        };
        for &(bin, ctx) in bins {
            encoder.encode_adaptive(bin, &mut row[ctx]);
        }
        return Ok(());
    }

    if value > 13 {
        return Err(CabacError::invalid("sub_mb_type", value));
    }
    let row = &mut contexts.b8_type[1];
    if value == 0 {
        encoder.encode_adaptive(false, &mut row[0]);
        return Ok(());
    }
    encoder.encode_adaptive(true, &mut row[0]);
    let sym = value - 1;
    if sym < 2 {
        encoder.encode_adaptive(false, &mut row[1]);
        encoder.encode_adaptive(sym != 0, &mut row[3]);
    } else if sym < 6 {
        encoder.encode_adaptive(true, &mut row[1]);
        encoder.encode_adaptive(false, &mut row[2]);
        encoder.encode_adaptive(((sym - 2) >> 1) & 1 != 0, &mut row[3]);
        encoder.encode_adaptive((sym - 2) & 1 != 0, &mut row[3]);
    } else if sym == 12 {
        encoder.encode_adaptive(true, &mut row[1]);
        encoder.encode_adaptive(true, &mut row[2]);
        encoder.encode_adaptive(true, &mut row[3]);
        encoder.encode_adaptive(true, &mut row[3]);
    } else {
        encoder.encode_adaptive(true, &mut row[1]);
        encoder.encode_adaptive(true, &mut row[2]);
        for shift in [2, 1, 0] {
            encoder.encode_adaptive(((sym - 6) >> shift) & 1 != 0, &mut row[3]);
        }
    }
    Ok(())
}

/// ABT intra block mode.
pub fn encode_abt_intra_block_mode<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut MotionInfoContexts,
    picture: PictureType,
    value: u32,
) -> Result<()> {
    let row = &mut contexts.abt_mode[if picture.is_intra() { 0 } else { 1 }];
    let (first, second, ctx) = match value {
        0 => (true, false, 2),
        1 => (false, false, 1),
        2 => (false, true, 1),
        3 => (true, true, 2),
        _ => return Err(CabacError::invalid("abt_intra_block_mode", value)),
    };
    encoder.encode_adaptive(first, &mut row[0]);
    encoder.encode_adaptive(second, &mut row[ctx]);
    Ok(())
}

/// Frame/field decoding flag.
pub fn encode_field_mode<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut MotionInfoContexts,
    mb: &MacroblockContext<'_>,
    field: bool,
) {
    encoder.encode_adaptive(field, &mut contexts.mb_aff[mb.field_ctx()]);
}

/// Reference index for either list.
pub fn encode_ref_idx<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut MotionInfoContexts,
    mb: &MacroblockContext<'_>,
    list: RefList,
    value: i32,
    position: SubBlock,
    small_partition: bool,
) -> Result<()> {
    let value = u32::try_from(value).map_err(|_| CabacError::invalid("ref_idx", value))?;
    let catalogue = match list {
        RefList::Forward => &mut contexts.ref_no,
        RefList::Backward => &mut contexts.bwd_ref_no,
    };
    let row = &mut catalogue[small_partition as usize];
    let ctx = mb.ref_idx_ctx(list, position);
    if value == 0 {
        encoder.encode_adaptive(false, &mut row[ctx]);
    } else {
        encoder.encode_adaptive(true, &mut row[ctx]);
        encode_unary(encoder, value - 1, &mut row[4..], 1);
    }
    Ok(())
}

/// Motion vector residual component.
pub fn encode_mvd<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut MotionInfoContexts,
    mb: &MacroblockContext<'_>,
    list: RefList,
    component: MvComponent,
    value: i32,
    position: SubBlock,
) {
    let ctx = mb.mvd_ctx(list, component, position);
    let magnitude = value.unsigned_abs();
    if magnitude == 0 {
        encoder.encode_adaptive(false, &mut contexts.mv_res[0][ctx]);
        return;
    }
    encoder.encode_adaptive(true, &mut contexts.mv_res[0][ctx]);
    encoder.encode_bypass(value < 0);
    let base = 5 * component.index();
    encode_mv(encoder, magnitude - 1, &mut contexts.mv_res[1][base..]);
}

/// Delta quantizer.
pub fn encode_delta_qp<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut MotionInfoContexts,
    mb: &MacroblockContext<'_>,
    value: i32,
) -> Result<()> {
    if !DELTA_QP_RANGE.contains(&value) {
        return Err(CabacError::invalid("mb_qp_delta", value));
    }
    // 0, 1, -1, 2, -2, ... map to 0, 1, 2, 3, 4, ...
    let sym = value.unsigned_abs() * 2 + (value <= 0) as u32 - 1;
    let ctx = mb.delta_qp_ctx();
    if sym == 0 {
        encoder.encode_adaptive(false, &mut contexts.delta_qp[ctx]);
    } else {
        encoder.encode_adaptive(true, &mut contexts.delta_qp[ctx]);
        encode_unary(encoder, sym - 1, &mut contexts.delta_qp[2..], 1);
    }
    Ok(())
}

/// Intra 4x4 luma prediction mode.
pub fn encode_intra_pred_mode<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut TextureInfoContexts,
    value: i8,
) -> Result<()> {
    if !(-1..=7).contains(&value) {
        return Err(CabacError::invalid("intra_pred_mode", value));
    }
    encode_truncated_unary(encoder, (value + 1) as u32, &mut contexts.ipr[0], 1, 8);
    Ok(())
}

/// Intra chroma prediction mode.
pub fn encode_chroma_pred_mode<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut TextureInfoContexts,
    mb: &MacroblockContext<'_>,
    value: u32,
) -> Result<()> {
    if value > 3 {
        return Err(CabacError::invalid("intra_chroma_pred_mode", value));
    }
    let ctx = mb.chroma_pred_ctx();
    if value == 0 {
        encoder.encode_adaptive(false, &mut contexts.cipr[ctx]);
    } else {
        encoder.encode_adaptive(true, &mut contexts.cipr[ctx]);
        encode_truncated_unary(encoder, value - 1, &mut contexts.cipr[3..], 0, 2);
    }
    Ok(())
}

/// Coded block pattern: four luma bits then the chroma presence and level bins.
pub fn encode_cbp<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    contexts: &mut TextureInfoContexts,
    mb: &MacroblockContext<'_>,
    value: u32,
) -> Result<()> {
    if value > 47 {
        return Err(CabacError::invalid("coded_block_pattern", value));
    }
    for b8 in 0..4 {
        let ctx = mb.cbp_luma_ctx(b8, value);
        encoder.encode_adaptive(value & (1 << b8) != 0, &mut contexts.cbp[0][ctx]);
    }
    encoder.encode_adaptive(value > 15, &mut contexts.cbp[1][mb.cbp_chroma_ctx(0)]);
    if value > 15 {
        encoder.encode_adaptive(value >> 4 == 2, &mut contexts.cbp[2][mb.cbp_chroma_ctx(1)]);
    }
    Ok(())
}
