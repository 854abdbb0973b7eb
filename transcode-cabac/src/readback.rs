//! Test-only decoding side: an arithmetic decoder, a bin recorder and mirrors of every
//! binarization and syntax element, for round-trip checks.

use crate::binarization::{LEVEL_EXP_START, MV_EXP_ORDER, MV_EXP_START, MV_MAX_BIN};
use crate::context::{MotionInfoContexts, PictureStructure, PictureType, TextureInfoContexts};
use crate::engine::{BinEncoder, ProbabilityContext};
use crate::neighbor::{MacroblockContext, MvComponent, RefList, SubBlock};
use crate::residual::{
    coded_block_ctx, context_categories, last_table, mark_coded, significance_table, BlockPosition,
    BlockType, CodedBlockNeighborhood,
};

/// One recorded bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bin {
    /// Context coded bin with the address of its context.
    Adaptive(bool, usize),
    /// Bypass bin.
    Bypass(bool),
    /// Terminate bin.
    Terminate(bool),
}

/// Bin encoder that records bins instead of coding them.
#[derive(Debug, Default)]
pub struct BinRecorder {
    pub bins: Vec<Bin>,
}

impl BinRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values of every recorded bin.
    pub fn values(&self) -> Vec<bool> {
        self.bins
            .iter()
            .map(|bin| match *bin {
                Bin::Adaptive(v, _) | Bin::Bypass(v) | Bin::Terminate(v) => v,
            })
            .collect()
    }

    /// Adaptive bins whose context lies in `contexts`, with the context index.
    pub fn adaptive_in(&self, contexts: &[ProbabilityContext]) -> Vec<(bool, usize)> {
        let base = contexts.as_ptr() as usize;
        let size = std::mem::size_of::<ProbabilityContext>();
        let end = base + size * contexts.len();
        self.bins
            .iter()
            .filter_map(|bin| match *bin {
                Bin::Adaptive(v, addr) if addr >= base && addr < end => Some((v, (addr - base) / size)),
                _ => None,
            })
            .collect()
    }
}

impl BinEncoder for BinRecorder {
    fn encode_adaptive(&mut self, bin: bool, ctx: &mut ProbabilityContext) {
        self.bins.push(Bin::Adaptive(bin, ctx as *const ProbabilityContext as usize));
        ctx.update(bin);
    }

    fn encode_bypass(&mut self, bin: bool) {
        self.bins.push(Bin::Bypass(bin));
    }

    fn encode_terminate(&mut self, bin: bool) {
        self.bins.push(Bin::Terminate(bin));
    }

    fn bits_written(&self) -> u64 {
        self.bins.len() as u64
    }
}

/// H.264 arithmetic decoder (clause 9.3.3.2).
#[derive(Debug)]
pub struct ArithmeticDecoder<'a> {
    data: &'a [u8],
    bit_pos: usize,
    range: u32,
    offset: u32,
}

impl<'a> ArithmeticDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        let mut decoder = Self {
            data,
            bit_pos: 0,
            range: 510,
            offset: 0,
        };
        for _ in 0..9 {
            decoder.offset = (decoder.offset << 1) | decoder.read_bit();
        }
        decoder
    }

    fn read_bit(&mut self) -> u32 {
        let byte = self.bit_pos / 8;
        let bit = match self.data.get(byte) {
            Some(b) => ((b >> (7 - self.bit_pos % 8)) & 1) as u32,
            None => 0,
        };
        self.bit_pos += 1;
        bit
    }

    fn renormalize(&mut self) {
        while self.range < 256 {
            self.range <<= 1;
            self.offset = (self.offset << 1) | self.read_bit();
        }
    }

    pub fn decode_adaptive(&mut self, ctx: &mut ProbabilityContext) -> bool {
        let range_lps = ctx.range_lps(self.range);
        self.range -= range_lps;
        let bin = if self.offset >= self.range {
            self.offset -= self.range;
            self.range = range_lps;
            !ctx.mps()
        } else {
            ctx.mps()
        };
        ctx.update(bin);
        self.renormalize();
        bin
    }

    pub fn decode_bypass(&mut self) -> bool {
        self.offset = (self.offset << 1) | self.read_bit();
        if self.offset >= self.range {
            self.offset -= self.range;
            true
        } else {
            false
        }
    }

    pub fn decode_terminate(&mut self) -> bool {
        self.range -= 2;
        if self.offset >= self.range {
            true
        } else {
            self.renormalize();
            false
        }
    }
}

type Decoder<'a> = ArithmeticDecoder<'a>;

// ============================================================================
// Binarizations
// ============================================================================

pub fn decode_unary(d: &mut Decoder<'_>, ctx: &mut [ProbabilityContext], offset: usize) -> u32 {
    if !d.decode_adaptive(&mut ctx[0]) {
        return 0;
    }
    let mut symbol = 1;
    while d.decode_adaptive(&mut ctx[offset]) {
        symbol += 1;
    }
    symbol
}

pub fn decode_truncated_unary(
    d: &mut Decoder<'_>,
    ctx: &mut [ProbabilityContext],
    offset: usize,
    max: u32,
) -> u32 {
    if !d.decode_adaptive(&mut ctx[0]) {
        return 0;
    }
    let mut symbol = 1;
    while symbol < max && d.decode_adaptive(&mut ctx[offset]) {
        symbol += 1;
    }
    symbol
}

pub fn decode_exp_golomb(d: &mut Decoder<'_>, mut k: u32) -> u32 {
    let mut symbol = 0;
    while d.decode_bypass() {
        symbol += 1 << k;
        k += 1;
    }
    let mut suffix = 0;
    while k > 0 {
        k -= 1;
        suffix = (suffix << 1) | d.decode_bypass() as u32;
    }
    symbol + suffix
}

pub fn decode_level(d: &mut Decoder<'_>, ctx: &mut ProbabilityContext) -> u32 {
    if !d.decode_adaptive(ctx) {
        return 0;
    }
    let mut symbol = 1;
    while symbol < LEVEL_EXP_START {
        if !d.decode_adaptive(ctx) {
            return symbol;
        }
        symbol += 1;
    }
    symbol + decode_exp_golomb(d, 0)
}

pub fn decode_mv(d: &mut Decoder<'_>, ctx: &mut [ProbabilityContext]) -> u32 {
    if !d.decode_adaptive(&mut ctx[0]) {
        return 0;
    }
    let mut symbol = 1;
    while symbol < MV_EXP_START {
        if !d.decode_adaptive(&mut ctx[(symbol as usize).min(MV_MAX_BIN)]) {
            return symbol;
        }
        symbol += 1;
    }
    symbol + decode_exp_golomb(d, MV_EXP_ORDER)
}

// ============================================================================
// Syntax elements
// ============================================================================

pub fn decode_mb_skip_flag(
    d: &mut Decoder<'_>,
    contexts: &mut MotionInfoContexts,
    mb: &MacroblockContext<'_>,
    picture: PictureType,
) -> bool {
    let ctx = mb.skip_ctx(picture);
    let row = if picture.is_b() { 2 } else { 1 };
    d.decode_adaptive(&mut contexts.mb_type[row][ctx])
}

fn decode_intra16x16(d: &mut Decoder<'_>, row: &mut [ProbabilityContext], ctx: [usize; 5]) -> u32 {
    let ac = d.decode_adaptive(&mut row[ctx[0]]) as u32;
    let cbp_class = if !d.decode_adaptive(&mut row[ctx[1]]) {
        0
    } else if !d.decode_adaptive(&mut row[ctx[2]]) {
        1
    } else {
        2
    };
    let pred = 2 * d.decode_adaptive(&mut row[ctx[3]]) as u32 + d.decode_adaptive(&mut row[ctx[4]]) as u32;
    ac * 12 + cbp_class * 4 + pred
}

fn bit(d: &mut Decoder<'_>, row: &mut [ProbabilityContext], ctx: usize) -> u32 {
    d.decode_adaptive(&mut row[ctx]) as u32
}

/// P symbols 0 (no bins) and 5 (same code as 4) cannot be recovered.
pub fn decode_mb_type(
    d: &mut Decoder<'_>,
    contexts: &mut MotionInfoContexts,
    mb: &MacroblockContext<'_>,
    picture: PictureType,
    use_abt: bool,
) -> u32 {
    match picture {
        PictureType::I => {
            let row = &mut contexts.mb_type[0];
            if !d.decode_adaptive(&mut row[mb.mb_type_intra_ctx()]) {
                0
            } else {
                1 + decode_intra16x16(d, row, [4, 5, 6, 7, 8])
            }
        }
        PictureType::P => {
            let row = &mut contexts.mb_type[1];
            if !d.decode_adaptive(&mut row[4]) {
                if !d.decode_adaptive(&mut row[5]) {
                    if d.decode_adaptive(&mut row[6]) {
                        4
                    } else {
                        1
                    }
                } else if d.decode_adaptive(&mut row[7]) {
                    2
                } else {
                    3
                }
            } else if use_abt || !d.decode_adaptive(&mut row[7]) {
                6
            } else {
                7 + decode_intra16x16(d, row, [8, 9, 9, 10, 10])
            }
        }
        PictureType::B => {
            let act_ctx = mb.mb_type_b_ctx();
            let row = &mut contexts.mb_type[2];
            let sym = if bit(d, row, act_ctx) == 0 {
                0
            } else if bit(d, row, 4) == 0 {
                1 + bit(d, row, 6)
            } else if bit(d, row, 5) == 0 {
                let bits = (bit(d, row, 6) << 2) | (bit(d, row, 6) << 1);
                3 + (bits | bit(d, row, 6))
            } else {
                let b3 = bit(d, row, 6);
                let b2 = bit(d, row, 6);
                if b3 == 1 && b2 == 1 {
                    if bit(d, row, 6) == 0 {
                        11
                    } else {
                        22
                    }
                } else {
                    let b1 = bit(d, row, 6);
                    let prefix = (b3 << 3) | (b2 << 2) | (b1 << 1);
                    let shifted = if use_abt && prefix == 10 {
                        22
                    } else {
                        12 + (prefix | bit(d, row, 6))
                    };
                    if shifted >= 22 {
                        shifted + 1
                    } else {
                        shifted
                    }
                }
            };
            if sym == 24 {
                24 + decode_intra16x16(d, &mut contexts.mb_type[1], [8, 9, 9, 10, 10])
            } else {
                sym
            }
        }
    }
}

pub fn decode_sub_mb_type(d: &mut Decoder<'_>, contexts: &mut MotionInfoContexts, picture: PictureType) -> u32 {
    if !picture.is_b() {
        let row = &mut contexts.b8_type[0];
        return if d.decode_adaptive(&mut row[1]) {
            0
        } else if d.decode_adaptive(&mut row[2]) {
            4
        } else if !d.decode_adaptive(&mut row[3]) {
            1
        } else if d.decode_adaptive(&mut row[4]) {
            2
        } else {
            3
        };
    }
    let row = &mut contexts.b8_type[1];
    if !d.decode_adaptive(&mut row[0]) {
        return 0;
    }
    let sym = if !d.decode_adaptive(&mut row[1]) {
        d.decode_adaptive(&mut row[3]) as u32
    } else if !d.decode_adaptive(&mut row[2]) {
        let hi = d.decode_adaptive(&mut row[3]) as u32;
        2 + ((hi << 1) | d.decode_adaptive(&mut row[3]) as u32)
    } else {
        let b2 = d.decode_adaptive(&mut row[3]) as u32;
        let b1 = d.decode_adaptive(&mut row[3]) as u32;
        if b2 == 1 && b1 == 1 {
            12
        } else {
            6 + ((b2 << 2) | (b1 << 1) | d.decode_adaptive(&mut row[3]) as u32)
        }
    };
    sym + 1
}

pub fn decode_abt_intra_block_mode(
    d: &mut Decoder<'_>,
    contexts: &mut MotionInfoContexts,
    picture: PictureType,
) -> u32 {
    let row = &mut contexts.abt_mode[if picture.is_intra() { 0 } else { 1 }];
    if d.decode_adaptive(&mut row[0]) {
        if d.decode_adaptive(&mut row[2]) {
            3
        } else {
            0
        }
    } else if d.decode_adaptive(&mut row[1]) {
        2
    } else {
        1
    }
}

pub fn decode_field_mode(d: &mut Decoder<'_>, contexts: &mut MotionInfoContexts, mb: &MacroblockContext<'_>) -> bool {
    d.decode_adaptive(&mut contexts.mb_aff[mb.field_ctx()])
}

pub fn decode_ref_idx(
    d: &mut Decoder<'_>,
    contexts: &mut MotionInfoContexts,
    mb: &MacroblockContext<'_>,
    list: RefList,
    position: SubBlock,
    small_partition: bool,
) -> i32 {
    let catalogue = match list {
        RefList::Forward => &mut contexts.ref_no,
        RefList::Backward => &mut contexts.bwd_ref_no,
    };
    let row = &mut catalogue[small_partition as usize];
    if !d.decode_adaptive(&mut row[mb.ref_idx_ctx(list, position)]) {
        return 0;
    }
    1 + decode_unary(d, &mut row[4..], 1) as i32
}

pub fn decode_mvd(
    d: &mut Decoder<'_>,
    contexts: &mut MotionInfoContexts,
    mb: &MacroblockContext<'_>,
    list: RefList,
    component: MvComponent,
    position: SubBlock,
) -> i32 {
    let ctx = mb.mvd_ctx(list, component, position);
    if !d.decode_adaptive(&mut contexts.mv_res[0][ctx]) {
        return 0;
    }
    let negative = d.decode_bypass();
    let base = 5 * component.index();
    let magnitude = 1 + decode_mv(d, &mut contexts.mv_res[1][base..]) as i32;
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

pub fn decode_delta_qp(d: &mut Decoder<'_>, contexts: &mut MotionInfoContexts, mb: &MacroblockContext<'_>) -> i32 {
    let sym = if !d.decode_adaptive(&mut contexts.delta_qp[mb.delta_qp_ctx()]) {
        0
    } else {
        1 + decode_unary(d, &mut contexts.delta_qp[2..], 1)
    };
    if sym % 2 == 1 {
        ((sym + 1) / 2) as i32
    } else {
        -((sym / 2) as i32)
    }
}

pub fn decode_intra_pred_mode(d: &mut Decoder<'_>, contexts: &mut TextureInfoContexts) -> i8 {
    decode_truncated_unary(d, &mut contexts.ipr[0], 1, 8) as i8 - 1
}

pub fn decode_chroma_pred_mode(
    d: &mut Decoder<'_>,
    contexts: &mut TextureInfoContexts,
    mb: &MacroblockContext<'_>,
) -> u32 {
    if !d.decode_adaptive(&mut contexts.cipr[mb.chroma_pred_ctx()]) {
        return 0;
    }
    1 + decode_truncated_unary(d, &mut contexts.cipr[3..], 0, 2)
}

pub fn decode_cbp(d: &mut Decoder<'_>, contexts: &mut TextureInfoContexts, mb: &MacroblockContext<'_>) -> u32 {
    let mut cbp = 0;
    for b8 in 0..4 {
        let ctx = mb.cbp_luma_ctx(b8, cbp);
        if d.decode_adaptive(&mut contexts.cbp[0][ctx]) {
            cbp |= 1 << b8;
        }
    }
    if d.decode_adaptive(&mut contexts.cbp[1][mb.cbp_chroma_ctx(0)]) {
        cbp |= if d.decode_adaptive(&mut contexts.cbp[2][mb.cbp_chroma_ctx(1)]) {
            32
        } else {
            16
        };
    }
    cbp
}

// ============================================================================
// Coefficient blocks
// ============================================================================

/// Decode one block; luma 8x8 blocks carry no coded-block bin and are assumed coded.
pub fn decode_block(
    d: &mut Decoder<'_>,
    contexts: &mut TextureInfoContexts,
    block_type: BlockType,
    position: BlockPosition,
    structure: PictureStructure,
    neighborhood: &mut CodedBlockNeighborhood,
) -> Vec<i32> {
    let n = block_type.max_coefficients();
    let mut coeffs = vec![0i32; n];
    let (bcbp, map, last, one, abs) = context_categories(block_type);

    let (bit, ctx) = match coded_block_ctx(block_type, position, neighborhood) {
        Ok(v) => v,
        Err(_) => return coeffs,
    };
    let coded = match ctx {
        Some(ctx) => d.decode_adaptive(&mut contexts.bcbp[bcbp][ctx]),
        None => true,
    };
    if !coded {
        return coeffs;
    }
    mark_coded(&mut neighborhood.current, block_type, bit);

    let map_table = significance_table(block_type, structure);
    let last_table = last_table(block_type);
    let (k0, k1, shift) = if block_type.includes_dc() { (0, n - 1, 0) } else { (1, n, 1) };
    let mut found_last = false;
    for k in k0..k1 {
        if d.decode_adaptive(&mut contexts.map[map][map_table[k] as usize]) {
            coeffs[k - shift] = 1;
            if d.decode_adaptive(&mut contexts.last[last][last_table[k] as usize]) {
                found_last = true;
                break;
            }
        }
    }
    if !found_last {
        coeffs[n - 1] = 1;
    }

    let mut c1: usize = 1;
    let mut c2: usize = 0;
    for i in (0..n).rev() {
        if coeffs[i] == 0 {
            continue;
        }
        let magnitude = if d.decode_adaptive(&mut contexts.one[one][c1.min(4)]) {
            let m = 2 + decode_level(d, &mut contexts.abs[abs][c2.min(4)]);
            c1 = 0;
            c2 += 1;
            m
        } else {
            if c1 != 0 {
                c1 += 1;
            }
            1
        };
        coeffs[i] = if d.decode_bypass() {
            -(magnitude as i32)
        } else {
            magnitude as i32
        };
    }
    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binarization::{encode_exp_golomb, encode_level, encode_mv, encode_truncated_unary, encode_unary};
    use crate::engine::ArithmeticEncoder;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_binarization_roundtrip(
            unary in 0u32..40,
            truncated in 0u32..=8,
            eg in 0u32..100_000,
            k in 0u32..6,
            level in 0u32..5000,
            mv in 0u32..5000,
        ) {
            let mut encoder = ArithmeticEncoder::new();
            let mut ctx = [ProbabilityContext::default(); 6];
            encode_unary(&mut encoder, unary, &mut ctx[0..], 1);
            encode_truncated_unary(&mut encoder, truncated, &mut ctx[0..], 1, 8);
            encode_exp_golomb(&mut encoder, eg, k);
            encode_level(&mut encoder, level, &mut ctx[2]);
            encode_mv(&mut encoder, mv, &mut ctx[2..]);
            encoder.encode_terminate(true);
            let data = encoder.finish();

            let mut d = ArithmeticDecoder::new(&data);
            let mut ctx = [ProbabilityContext::default(); 6];
            prop_assert_eq!(decode_unary(&mut d, &mut ctx[0..], 1), unary);
            prop_assert_eq!(decode_truncated_unary(&mut d, &mut ctx[0..], 1, 8), truncated);
            prop_assert_eq!(decode_exp_golomb(&mut d, k), eg);
            prop_assert_eq!(decode_level(&mut d, &mut ctx[2]), level);
            prop_assert_eq!(decode_mv(&mut d, &mut ctx[2..]), mv);
            prop_assert!(d.decode_terminate());
        }
    }
}
