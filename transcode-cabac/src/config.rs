//! CABAC encoder configuration.

/// Adaptive block transform usage.
///
/// With ABT enabled for inter coding, the intra 4x4 macroblock mode is signalled
/// through the ABT intra block mode element, so the P-picture macroblock type tree
/// and one branch of the B-picture tree drop a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbtMode {
    /// No adaptive block transform.
    #[default]
    Off,
    /// ABT for inter macroblocks.
    Inter,
    /// ABT for inter and intra macroblocks.
    InterIntra,
}

impl AbtMode {
    /// Whether ABT is active for inter coding.
    pub fn uses_abt(self) -> bool {
        matches!(self, AbtMode::Inter | AbtMode::InterIntra)
    }
}

/// How context catalogues are seeded at the start of a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextInit {
    /// Pretrained `(state, mps)` tables.
    #[default]
    Trained,
    /// Flat histogram: state 0, MPS 0 for every context.
    Flat,
}

/// CABAC encoder configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CabacConfig {
    /// Adaptive block transform mode.
    pub abt_mode: AbtMode,
    /// Context initialization mode.
    pub context_init: ContextInit,
}

impl CabacConfig {
    /// Create a configuration with trained contexts and ABT disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ABT mode.
    pub fn with_abt_mode(mut self, abt_mode: AbtMode) -> Self {
        self.abt_mode = abt_mode;
        self
    }

    /// Set the context initialization mode.
    pub fn with_context_init(mut self, context_init: ContextInit) -> Self {
        self.context_init = context_init;
        self
    }
}
