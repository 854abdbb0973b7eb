//! Slice-level CABAC encoder.
//!
//! [`SliceEncoder`] owns the arithmetic coder and both context catalogues of one slice
//! and dispatches [`SyntaxElement`]s to the element encoders. The caller owns the
//! macroblock store and keeps it current; the slice encoder only keeps the coded-block
//! bitmasks it produces while coding residuals.

use tracing::{debug, trace, warn};

use crate::config::CabacConfig;
use crate::context::{ContextStore, PictureStructure, PictureType};
use crate::engine::{ArithmeticEncoder, BinEncoder};
use crate::error::{CabacError, Result};
use crate::neighbor::MacroblockStore;
use crate::residual::{encode_block, CodedBlockBits, CodedBlockNeighborhood};
use crate::syntax::{
    encode_abt_intra_block_mode, encode_cbp, encode_chroma_pred_mode, encode_delta_qp, encode_field_mode,
    encode_intra_pred_mode, encode_mb_skip_flag, encode_mb_type, encode_mvd, encode_ref_idx, encode_sub_mb_type,
    SyntaxElement,
};

/// CABAC encoder for one slice.
#[derive(Debug)]
pub struct SliceEncoder<E: BinEncoder = ArithmeticEncoder> {
    config: CabacConfig,
    picture: PictureType,
    structure: PictureStructure,
    contexts: ContextStore,
    encoder: E,
    coded_blocks: Vec<CodedBlockBits>,
    current_mb: Option<usize>,
    poisoned: bool,
    terminated: bool,
    elements: u64,
}

impl SliceEncoder<ArithmeticEncoder> {
    /// Start a slice: contexts initialized for `picture`, empty arithmetic coder.
    pub fn new(config: CabacConfig, picture: PictureType, structure: PictureStructure) -> Self {
        Self::with_encoder(config, picture, structure, ArithmeticEncoder::new())
    }

    /// Finish the slice and return its byte-aligned payload.
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.poisoned {
            return Err(CabacError::Poisoned);
        }
        let elements = self.elements;
        let bins = self.encoder.bins();
        let data = self.encoder.finish();
        debug!(bytes = data.len(), bins, elements, "CABAC slice finished");
        Ok(data)
    }
}

impl<E: BinEncoder> SliceEncoder<E> {
    /// Start a slice on a caller-supplied bin encoder.
    pub fn with_encoder(config: CabacConfig, picture: PictureType, structure: PictureStructure, encoder: E) -> Self {
        debug!(
            ?picture,
            ?structure,
            abt = ?config.abt_mode,
            init = ?config.context_init,
            "CABAC slice started"
        );
        let contexts = ContextStore::new(picture, config.context_init);
        Self {
            config,
            picture,
            structure,
            contexts,
            encoder,
            coded_blocks: Vec::new(),
            current_mb: None,
            poisoned: false,
            terminated: false,
            elements: 0,
        }
    }

    /// Picture type of the slice.
    pub fn picture(&self) -> PictureType {
        self.picture
    }

    /// Both context catalogues in their current state.
    pub fn contexts(&self) -> &ContextStore {
        &self.contexts
    }

    /// Bits produced so far.
    pub fn bits_written(&self) -> u64 {
        self.encoder.bits_written()
    }

    /// Check if an earlier error left the encoder unusable.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Check if the final end-of-slice flag has been coded.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Coded-block bitmask recorded for macroblock `index`.
    pub fn coded_block_bits(&self, index: usize) -> CodedBlockBits {
        self.coded_blocks.get(index).copied().unwrap_or_default()
    }

    /// Release the underlying bin encoder.
    pub fn into_encoder(self) -> E {
        self.encoder
    }

    /// Encode one syntax element of macroblock `mb_index`; returns the bits it produced.
    ///
    /// Any error poisons the encoder: every later call fails with [`CabacError::Poisoned`].
    /// Writing after the final end-of-slice flag fails with [`CabacError::SliceTerminated`].
    pub fn write(&mut self, store: &MacroblockStore, mb_index: usize, element: &SyntaxElement<'_>) -> Result<u32> {
        self.check_open()?;
        let before = self.encoder.bits_written();
        match self.dispatch(store, mb_index, element) {
            Ok(()) => {
                self.elements += 1;
                let bits = (self.encoder.bits_written() - before) as u32;
                trace!(element = element.name(), mb = mb_index, bits, "encoded");
                Ok(bits)
            }
            Err(err) => {
                warn!(element = element.name(), mb = mb_index, error = %err, "CABAC slice poisoned");
                self.poisoned = true;
                Err(err)
            }
        }
    }

    /// Code the end-of-slice flag after a macroblock.
    ///
    /// A final flag of `true` flushes the coder; nothing may be written after it.
    pub fn end_of_slice(&mut self, last: bool) -> Result<u32> {
        self.check_open()?;
        let before = self.encoder.bits_written();
        self.encoder.encode_terminate(last);
        self.terminated = last;
        Ok((self.encoder.bits_written() - before) as u32)
    }

    fn check_open(&self) -> Result<()> {
        if self.poisoned {
            return Err(CabacError::Poisoned);
        }
        if self.terminated {
            return Err(CabacError::SliceTerminated);
        }
        Ok(())
    }

    fn enter_macroblock(&mut self, store: &MacroblockStore, mb_index: usize) {
        if self.coded_blocks.len() != store.len() {
            self.coded_blocks.resize(store.len(), CodedBlockBits::new());
        }
        if self.current_mb != Some(mb_index) {
            self.current_mb = Some(mb_index);
            if let Some(bits) = self.coded_blocks.get_mut(mb_index) {
                *bits = CodedBlockBits::new();
            }
        }
    }

    fn dispatch(&mut self, store: &MacroblockStore, mb_index: usize, element: &SyntaxElement<'_>) -> Result<()> {
        let mb = store.context(mb_index)?;
        self.enter_macroblock(store, mb_index);

        let encoder = &mut self.encoder;
        let motion = &mut self.contexts.motion;
        let texture = &mut self.contexts.texture;
        match *element {
            SyntaxElement::MbSkipFlag { mb_type, cbp } => {
                encode_mb_skip_flag(encoder, motion, &mb, self.picture, mb_type, cbp);
                Ok(())
            }
            SyntaxElement::MbType(value) => {
                encode_mb_type(encoder, motion, &mb, self.picture, self.config.abt_mode.uses_abt(), value)
            }
            SyntaxElement::SubMbType(value) => encode_sub_mb_type(encoder, motion, self.picture, value),
            SyntaxElement::AbtIntraBlockMode(value) => {
                encode_abt_intra_block_mode(encoder, motion, self.picture, value)
            }
            SyntaxElement::FieldMode(field) => {
                encode_field_mode(encoder, motion, &mb, field);
                Ok(())
            }
            SyntaxElement::RefIdx {
                list,
                value,
                position,
                small_partition,
            } => encode_ref_idx(encoder, motion, &mb, list, value, position, small_partition),
            SyntaxElement::Mvd {
                list,
                component,
                value,
                position,
            } => {
                encode_mvd(encoder, motion, &mb, list, component, value, position);
                Ok(())
            }
            SyntaxElement::DeltaQp(value) => encode_delta_qp(encoder, motion, &mb, value),
            SyntaxElement::IntraPredMode(value) => encode_intra_pred_mode(encoder, texture, value),
            SyntaxElement::ChromaPredMode(value) => encode_chroma_pred_mode(encoder, texture, &mb, value),
            SyntaxElement::CodedBlockPattern(value) => encode_cbp(encoder, texture, &mb, value),
            SyntaxElement::Residual { block, position } => {
                let bits = &mut self.coded_blocks;
                let mut neighborhood = CodedBlockNeighborhood {
                    current: bits[mb_index],
                    above: mb.above_index.map(|i| bits[i]),
                    left: mb.left_index.map(|i| bits[i]),
                    intra: mb.current.mode.is_intra(),
                };
                let result = encode_block(encoder, texture, block, position, self.structure, &mut neighborhood);
                bits[mb_index] = neighborhood.current;
                result
            }
        }
    }
}
