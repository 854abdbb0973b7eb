//! Probability context store and initializer.
//!
//! Contexts are grouped into two catalogues, one for motion information (macroblock and
//! sub-block types, reference indices, motion vector residuals, delta QP, field flag) and
//! one for texture information (coded block pattern, intra modes, residual coefficients).
//! Each slice owns one instance of both; nothing is shared between slices.

use crate::config::ContextInit;
use crate::engine::ProbabilityContext;
use crate::tables::{
    InitPair, ABS_INIT, ABT_MODE_INIT, B8_TYPE_INIT, BCBP_INIT, CBP_INIT, CIPR_INIT,
    DELTA_QP_INIT, IPR_INIT, LAST_INIT, MAP_INIT, MB_AFF_INIT, MB_TYPE_INIT, MV_RES_INIT,
    ONE_INIT, REF_NO_INIT,
};

pub const NUM_ABT_MODE_CTX: usize = 3;
pub const NUM_MB_TYPE_CTX: usize = 11;
pub const NUM_B8_TYPE_CTX: usize = 9;
pub const NUM_MV_RES_CTX: usize = 10;
pub const NUM_REF_NO_CTX: usize = 6;
pub const NUM_DELTA_QP_CTX: usize = 4;
pub const NUM_MB_AFF_CTX: usize = 4;

pub const NUM_BLOCK_TYPES: usize = 8;
pub const NUM_CBP_CTX: usize = 4;
pub const NUM_IPR_CTX: usize = 2;
pub const NUM_CIPR_CTX: usize = 4;
pub const NUM_BCBP_CTX: usize = 4;
pub const NUM_MAP_CTX: usize = 15;
pub const NUM_LAST_CTX: usize = 15;
pub const NUM_ONE_CTX: usize = 5;
pub const NUM_ABS_CTX: usize = 5;

/// Picture coding type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PictureType {
    /// Intra picture.
    I,
    /// Predicted picture.
    P,
    /// Bi-predicted picture.
    B,
}

impl PictureType {
    /// Check if this is an intra picture.
    pub fn is_intra(self) -> bool {
        self == PictureType::I
    }

    /// Check if this is a B picture.
    pub fn is_b(self) -> bool {
        self == PictureType::B
    }

    /// Variant of the texture initialization tables: 0 for intra, 1 for inter.
    pub fn texture_table(self) -> usize {
        if self.is_intra() {
            0
        } else {
            1
        }
    }
}

/// Picture structure; field pictures use the interlaced significance tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum PictureStructure {
    /// Progressive frame.
    #[default]
    Frame,
    /// Single field.
    Field,
}

fn load<const N: usize>(dst: &mut [ProbabilityContext; N], src: &[InitPair; N], init: ContextInit) {
    for (ctx, &(state, mps)) in dst.iter_mut().zip(src.iter()) {
        *ctx = match init {
            ContextInit::Trained => ProbabilityContext::new(state, mps != 0),
            ContextInit::Flat => ProbabilityContext::default(),
        };
    }
}

fn load_rows<const R: usize, const N: usize>(
    dst: &mut [[ProbabilityContext; N]; R],
    src: &[[InitPair; N]; R],
    init: ContextInit,
) {
    for (row, init_row) in dst.iter_mut().zip(src.iter()) {
        load(row, init_row, init);
    }
}

/// Contexts for motion information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionInfoContexts {
    /// ABT intra block mode, row 0 for intra pictures, row 1 otherwise.
    pub abt_mode: [[ProbabilityContext; NUM_ABT_MODE_CTX]; 2],
    /// Macroblock type: row 0 I tree, row 1 P tree and skip, row 2 B tree and skip.
    pub mb_type: [[ProbabilityContext; NUM_MB_TYPE_CTX]; 3],
    /// Sub-macroblock type: row 0 P, row 1 B.
    pub b8_type: [[ProbabilityContext; NUM_B8_TYPE_CTX]; 2],
    /// Motion vector residual: row 0 first bin, row 1 unary suffix.
    pub mv_res: [[ProbabilityContext; NUM_MV_RES_CTX]; 2],
    /// Forward reference index, row per partition class.
    pub ref_no: [[ProbabilityContext; NUM_REF_NO_CTX]; 2],
    /// Backward reference index, row per partition class.
    pub bwd_ref_no: [[ProbabilityContext; NUM_REF_NO_CTX]; 2],
    /// Delta quantizer.
    pub delta_qp: [ProbabilityContext; NUM_DELTA_QP_CTX],
    /// Frame/field coding flag.
    pub mb_aff: [ProbabilityContext; NUM_MB_AFF_CTX],
}

impl MotionInfoContexts {
    /// Create an initialized catalogue.
    pub fn new(init: ContextInit) -> Self {
        let flat = ProbabilityContext::default();
        let mut contexts = Self {
            abt_mode: [[flat; NUM_ABT_MODE_CTX]; 2],
            mb_type: [[flat; NUM_MB_TYPE_CTX]; 3],
            b8_type: [[flat; NUM_B8_TYPE_CTX]; 2],
            mv_res: [[flat; NUM_MV_RES_CTX]; 2],
            ref_no: [[flat; NUM_REF_NO_CTX]; 2],
            bwd_ref_no: [[flat; NUM_REF_NO_CTX]; 2],
            delta_qp: [flat; NUM_DELTA_QP_CTX],
            mb_aff: [flat; NUM_MB_AFF_CTX],
        };
        contexts.init(init);
        contexts
    }

    /// Reset every context. Only valid at the start of a slice.
    pub fn init(&mut self, init: ContextInit) {
        load_rows(&mut self.abt_mode, &ABT_MODE_INIT, init);
        load_rows(&mut self.mb_type, &MB_TYPE_INIT, init);
        load_rows(&mut self.b8_type, &B8_TYPE_INIT, init);
        load_rows(&mut self.mv_res, &MV_RES_INIT, init);
        load_rows(&mut self.ref_no, &REF_NO_INIT, init);
        load_rows(&mut self.bwd_ref_no, &REF_NO_INIT, init);
        load(&mut self.delta_qp, &DELTA_QP_INIT, init);
        load(&mut self.mb_aff, &MB_AFF_INIT, init);
    }
}

/// Contexts for texture information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfoContexts {
    /// Coded block pattern: row 0 luma, row 1 chroma presence, row 2 chroma level.
    pub cbp: [[ProbabilityContext; NUM_CBP_CTX]; 3],
    /// Intra luma prediction mode.
    pub ipr: [[ProbabilityContext; NUM_IPR_CTX]; 9],
    /// Intra chroma prediction mode.
    pub cipr: [ProbabilityContext; NUM_CIPR_CTX],
    /// Coded block bit per block context category.
    pub bcbp: [[ProbabilityContext; NUM_BCBP_CTX]; NUM_BLOCK_TYPES],
    /// Significance map per block context category.
    pub map: [[ProbabilityContext; NUM_MAP_CTX]; NUM_BLOCK_TYPES],
    /// Last significant coefficient per block context category.
    pub last: [[ProbabilityContext; NUM_LAST_CTX]; NUM_BLOCK_TYPES],
    /// Greater-than-one flag per block context category.
    pub one: [[ProbabilityContext; NUM_ONE_CTX]; NUM_BLOCK_TYPES],
    /// Level magnitude prefix per block context category.
    pub abs: [[ProbabilityContext; NUM_ABS_CTX]; NUM_BLOCK_TYPES],
}

impl TextureInfoContexts {
    /// Create a catalogue initialized for `picture`.
    pub fn new(picture: PictureType, init: ContextInit) -> Self {
        let flat = ProbabilityContext::default();
        let mut contexts = Self {
            cbp: [[flat; NUM_CBP_CTX]; 3],
            ipr: [[flat; NUM_IPR_CTX]; 9],
            cipr: [flat; NUM_CIPR_CTX],
            bcbp: [[flat; NUM_BCBP_CTX]; NUM_BLOCK_TYPES],
            map: [[flat; NUM_MAP_CTX]; NUM_BLOCK_TYPES],
            last: [[flat; NUM_LAST_CTX]; NUM_BLOCK_TYPES],
            one: [[flat; NUM_ONE_CTX]; NUM_BLOCK_TYPES],
            abs: [[flat; NUM_ABS_CTX]; NUM_BLOCK_TYPES],
        };
        contexts.init(picture, init);
        contexts
    }

    /// Reset every context. Only valid at the start of a slice.
    pub fn init(&mut self, picture: PictureType, init: ContextInit) {
        let t = picture.texture_table();
        load_rows(&mut self.cbp, &CBP_INIT[t], init);
        load_rows(&mut self.ipr, &IPR_INIT, init);
        load(&mut self.cipr, &CIPR_INIT, init);
        load_rows(&mut self.bcbp, &BCBP_INIT[t], init);
        load_rows(&mut self.map, &MAP_INIT[t], init);
        load_rows(&mut self.last, &LAST_INIT[t], init);
        load_rows(&mut self.one, &ONE_INIT[t], init);
        load_rows(&mut self.abs, &ABS_INIT[t], init);
    }
}

/// Both catalogues of one slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextStore {
    /// Motion information contexts.
    pub motion: MotionInfoContexts,
    /// Texture information contexts.
    pub texture: TextureInfoContexts,
}

impl ContextStore {
    /// Create catalogues initialized for `picture`.
    pub fn new(picture: PictureType, init: ContextInit) -> Self {
        Self {
            motion: MotionInfoContexts::new(init),
            texture: TextureInfoContexts::new(picture, init),
        }
    }

    /// Reinitialize both catalogues for a new slice.
    pub fn initialize(&mut self, picture: PictureType, init: ContextInit) {
        self.motion.init(init);
        self.texture.init(picture, init);
    }
}
