//! Binarization schemes shared by the syntax element encoders.
//!
//! Every function takes the context slice starting at its base context; bins that step
//! through contexts index into that slice.

use crate::engine::{BinEncoder, ProbabilityContext};

/// Unary prefix length after which coefficient levels switch to Exp-Golomb.
pub const LEVEL_EXP_START: u32 = 13;

/// Unary prefix length after which motion vector residuals switch to Exp-Golomb.
pub const MV_EXP_START: u32 = 8;

/// Highest context step of the motion vector residual prefix.
pub const MV_MAX_BIN: usize = 3;

/// Exp-Golomb order of the motion vector residual suffix.
pub const MV_EXP_ORDER: u32 = 3;

/// Unary code: `symbol` ones then a zero.
///
/// The first bin uses `ctx[0]`, every later bin `ctx[offset]`.
pub fn encode_unary<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    symbol: u32,
    ctx: &mut [ProbabilityContext],
    offset: usize,
) {
    if symbol == 0 {
        encoder.encode_adaptive(false, &mut ctx[0]);
        return;
    }
    encoder.encode_adaptive(true, &mut ctx[0]);
    for _ in 1..symbol {
        encoder.encode_adaptive(true, &mut ctx[offset]);
    }
    encoder.encode_adaptive(false, &mut ctx[offset]);
}

/// Truncated unary code over `0..=max`: the terminating zero is dropped for `max`.
pub fn encode_truncated_unary<E: BinEncoder + ?Sized>(
    encoder: &mut E,
    symbol: u32,
    ctx: &mut [ProbabilityContext],
    offset: usize,
    max: u32,
) {
    if symbol == 0 {
        encoder.encode_adaptive(false, &mut ctx[0]);
        return;
    }
    encoder.encode_adaptive(true, &mut ctx[0]);
    for _ in 1..symbol {
        encoder.encode_adaptive(true, &mut ctx[offset]);
    }
    if symbol < max {
        encoder.encode_adaptive(false, &mut ctx[offset]);
    }
}

/// k-th order Exp-Golomb code in bypass bins.
pub fn encode_exp_golomb<E: BinEncoder + ?Sized>(encoder: &mut E, mut symbol: u32, mut k: u32) {
    while k < 32 && symbol >= (1 << k) {
        encoder.encode_bypass(true);
        symbol -= 1 << k;
        k += 1;
    }
    encoder.encode_bypass(false);
    while k > 0 {
        k -= 1;
        encoder.encode_bypass((symbol >> k) & 1 != 0);
    }
}

/// Coefficient level magnitude: unary prefix on one shared context, EG0 tail from 13.
pub fn encode_level<E: BinEncoder + ?Sized>(encoder: &mut E, symbol: u32, ctx: &mut ProbabilityContext) {
    if symbol == 0 {
        encoder.encode_adaptive(false, ctx);
        return;
    }
    encoder.encode_adaptive(true, ctx);
    let ones = (symbol - 1).min(LEVEL_EXP_START - 1);
    for _ in 0..ones {
        encoder.encode_adaptive(true, ctx);
    }
    if symbol < LEVEL_EXP_START {
        encoder.encode_adaptive(false, ctx);
    } else {
        encode_exp_golomb(encoder, symbol - LEVEL_EXP_START, 0);
    }
}

/// Motion vector residual magnitude: unary prefix with bin `j` on `ctx[min(j, 3)]`,
/// EG3 tail from 8.
pub fn encode_mv<E: BinEncoder + ?Sized>(encoder: &mut E, symbol: u32, ctx: &mut [ProbabilityContext]) {
    if symbol == 0 {
        encoder.encode_adaptive(false, &mut ctx[0]);
        return;
    }
    encoder.encode_adaptive(true, &mut ctx[0]);
    let ones = (symbol - 1).min(MV_EXP_START - 1);
    for j in 1..=ones as usize {
        encoder.encode_adaptive(true, &mut ctx[j.min(MV_MAX_BIN)]);
    }
    if symbol < MV_EXP_START {
        let j = (ones as usize + 1).min(MV_MAX_BIN);
        encoder.encode_adaptive(false, &mut ctx[j]);
    } else {
        encode_exp_golomb(encoder, symbol - MV_EXP_START, MV_EXP_ORDER);
    }
}
