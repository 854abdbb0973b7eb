//! Binary arithmetic coding engine.
//!
//! [`ProbabilityContext`] holds the adaptive state of one context, [`BinEncoder`] is the
//! primitive every binarization writes through, and [`ArithmeticEncoder`] implements it
//! with the 9-bit range coder of H.264 (clause 9.3.4).

/// CABAC state for a single context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbabilityContext {
    /// Probability state index (0-63).
    state: u8,
    /// Most probable symbol.
    mps: bool,
}

impl ProbabilityContext {
    /// Create a context from a state index and MPS.
    pub const fn new(state: u8, mps: bool) -> Self {
        let state = if state > 62 { 62 } else { state };
        Self { state, mps }
    }

    /// Get the probability state.
    pub fn state(&self) -> u8 {
        self.state
    }

    /// Get the MPS.
    pub fn mps(&self) -> bool {
        self.mps
    }

    /// Update the state after coding `bin`.
    pub fn update(&mut self, bin: bool) {
        if bin == self.mps {
            self.state = NEXT_STATE_MPS[self.state as usize];
        } else {
            if self.state == 0 {
                self.mps = !self.mps;
            }
            self.state = NEXT_STATE_LPS[self.state as usize];
        }
    }

    /// Width of the LPS sub-interval for the current range.
    pub(crate) fn range_lps(&self, range: u32) -> u32 {
        let q_range_idx = ((range >> 6) & 3) as usize;
        RANGE_TAB_LPS[self.state as usize][q_range_idx] as u32
    }
}

// State transition tables
const NEXT_STATE_MPS: [u8; 64] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16,
    17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32,
    33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48,
    49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 62, 63,
];

const NEXT_STATE_LPS: [u8; 64] = [
    0, 0, 1, 2, 2, 4, 4, 5, 6, 7, 8, 9, 9, 11, 11, 12,
    13, 13, 15, 15, 16, 16, 18, 18, 19, 19, 21, 21, 22, 22, 23, 24,
    24, 25, 26, 26, 27, 27, 28, 29, 29, 30, 30, 30, 31, 32, 32, 33,
    33, 33, 34, 34, 35, 35, 35, 36, 36, 36, 37, 37, 37, 38, 38, 63,
];

// Range table for LPS (indexed by state and qRangeIdx)
const RANGE_TAB_LPS: [[u8; 4]; 64] = [
    [128, 176, 208, 240], [128, 167, 197, 227], [128, 158, 187, 216], [123, 150, 178, 205],
    [116, 142, 169, 195], [111, 135, 160, 185], [105, 128, 152, 175], [100, 122, 144, 166],
    [95, 116, 137, 158], [90, 110, 130, 150], [85, 104, 123, 142], [81, 99, 117, 135],
    [77, 94, 111, 128], [73, 89, 105, 122], [69, 85, 100, 116], [66, 80, 95, 110],
    [62, 76, 90, 104], [59, 72, 86, 99], [56, 69, 81, 94], [53, 65, 77, 89],
    [51, 62, 73, 85], [48, 59, 69, 80], [46, 56, 66, 76], [43, 53, 63, 72],
    [41, 50, 59, 69], [39, 48, 56, 65], [37, 45, 54, 62], [35, 43, 51, 59],
    [33, 41, 48, 56], [32, 39, 46, 53], [30, 37, 43, 50], [29, 35, 41, 48],
    [27, 33, 39, 45], [26, 31, 37, 43], [24, 30, 35, 41], [23, 28, 33, 39],
    [22, 27, 32, 37], [21, 26, 30, 35], [20, 24, 29, 33], [19, 23, 27, 31],
    [18, 22, 26, 30], [17, 21, 25, 28], [16, 20, 23, 27], [15, 19, 22, 25],
    [14, 18, 21, 24], [14, 17, 20, 23], [13, 16, 19, 22], [12, 15, 18, 21],
    [12, 14, 17, 20], [11, 14, 16, 19], [11, 13, 15, 18], [10, 12, 15, 17],
    [10, 12, 14, 16], [9, 11, 13, 15], [9, 11, 12, 14], [8, 10, 12, 14],
    [8, 9, 11, 13], [7, 9, 11, 12], [7, 9, 10, 12], [7, 8, 10, 11],
    [6, 8, 9, 11], [6, 7, 9, 10], [6, 7, 8, 9], [2, 2, 2, 2],
];

/// Bin-level coding primitive.
///
/// Syntax element encoders only ever talk to this trait; the arithmetic coder behind it
/// owns the output buffer.
pub trait BinEncoder {
    /// Encode `bin` with the adaptive probability of `ctx`, updating `ctx`.
    fn encode_adaptive(&mut self, bin: bool, ctx: &mut ProbabilityContext);

    /// Encode `bin` at fixed probability 1/2.
    fn encode_bypass(&mut self, bin: bool);

    /// Encode the end-of-slice terminate bin.
    fn encode_terminate(&mut self, bin: bool);

    /// Monotonic count of bits produced so far.
    fn bits_written(&self) -> u64;
}

/// Byte buffer filled MSB first.
#[derive(Debug, Default)]
struct BitSink {
    data: Vec<u8>,
    bit_pos: u8,
    bits: u64,
}

impl BitSink {
    fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            bit_pos: 0,
            bits: 0,
        }
    }

    fn write_bit(&mut self, bit: bool) {
        if self.bit_pos == 0 {
            self.data.push(0);
        }
        if bit {
            let idx = self.data.len() - 1;
            self.data[idx] |= 1 << (7 - self.bit_pos);
        }
        self.bit_pos = (self.bit_pos + 1) % 8;
        self.bits += 1;
    }

    fn write_bits(&mut self, value: u32, n: u8) {
        for i in (0..n).rev() {
            self.write_bit((value >> i) & 1 != 0);
        }
    }

    fn align_to_byte(&mut self) {
        while self.bit_pos != 0 {
            self.write_bit(false);
        }
    }
}

/// CABAC arithmetic encoder.
#[derive(Debug)]
pub struct ArithmeticEncoder {
    /// Low value (10 bits).
    low: u32,
    /// Range (9 bits).
    range: u32,
    /// Outstanding bits count.
    outstanding: u32,
    /// The first PutBit call is suppressed.
    first_bit: bool,
    /// Number of bins coded.
    bins: u64,
    /// A terminate bin of 1 already flushed the coder.
    terminated: bool,
    sink: BitSink,
}

impl ArithmeticEncoder {
    /// Create a new arithmetic encoder.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new encoder with an output capacity hint in bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            low: 0,
            range: 510,
            outstanding: 0,
            first_bit: true,
            bins: 0,
            terminated: false,
            sink: BitSink::with_capacity(bytes),
        }
    }

    /// Number of bins coded so far.
    pub fn bins(&self) -> u64 {
        self.bins
    }

    /// Flush the coder and return the byte-aligned output.
    ///
    /// The final bit written by the flush doubles as the RBSP stop bit.
    pub fn finish(mut self) -> Vec<u8> {
        if !self.terminated {
            self.flush();
        }
        self.sink.align_to_byte();
        self.sink.data
    }

    fn flush(&mut self) {
        self.range = 2;
        self.renormalize();
        self.put_bit((self.low >> 9) & 1 != 0);
        self.sink.write_bits(((self.low >> 7) & 3) | 1, 2);
    }

    fn renormalize(&mut self) {
        while self.range < 256 {
            if self.low < 256 {
                self.put_bit(false);
            } else if self.low >= 512 {
                self.low -= 512;
                self.put_bit(true);
            } else {
                self.low -= 256;
                self.outstanding += 1;
            }
            self.range <<= 1;
            self.low <<= 1;
        }
    }

    fn put_bit(&mut self, bit: bool) {
        if self.first_bit {
            self.first_bit = false;
        } else {
            self.sink.write_bit(bit);
        }
        while self.outstanding > 0 {
            self.sink.write_bit(!bit);
            self.outstanding -= 1;
        }
    }
}

impl Default for ArithmeticEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BinEncoder for ArithmeticEncoder {
    fn encode_adaptive(&mut self, bin: bool, ctx: &mut ProbabilityContext) {
        let range_lps = ctx.range_lps(self.range);
        self.range -= range_lps;

        if bin != ctx.mps() {
            self.low += self.range;
            self.range = range_lps;
        }
        ctx.update(bin);
        self.bins += 1;

        self.renormalize();
    }

    fn encode_bypass(&mut self, bin: bool) {
        self.low <<= 1;
        if bin {
            self.low += self.range;
        }
        self.bins += 1;

        if self.low >= 1024 {
            self.low -= 1024;
            self.put_bit(true);
        } else if self.low < 512 {
            self.put_bit(false);
        } else {
            self.low -= 512;
            self.outstanding += 1;
        }
    }

    fn encode_terminate(&mut self, bin: bool) {
        self.range -= 2;
        self.bins += 1;
        if bin {
            self.low += self.range;
            self.flush();
            self.terminated = true;
        } else {
            self.renormalize();
        }
    }

    fn bits_written(&self) -> u64 {
        self.sink.bits + self.outstanding as u64
    }
}
