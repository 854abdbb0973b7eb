//! Slice-parallel CABAC encoding.
//!
//! Slices are independently decodable: each job gets its own [`SliceEncoder`], so the
//! only shared state is the read-only macroblock store.

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::config::CabacConfig;
use crate::context::{PictureStructure, PictureType};
use crate::error::{CabacError, Result};
use crate::neighbor::MacroblockStore;
use crate::slice::SliceEncoder;
use crate::syntax::SyntaxElement;

/// Threading configuration for slice-parallel encoding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThreadingConfig {
    /// Number of threads to use (0 = auto-detect based on CPU cores).
    pub num_threads: usize,
}

impl ThreadingConfig {
    /// Create a threading configuration with a fixed thread count.
    pub fn with_threads(num_threads: usize) -> Self {
        Self { num_threads }
    }

    /// Get the effective number of threads.
    pub fn effective_threads(&self) -> usize {
        if self.num_threads == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        } else {
            self.num_threads
        }
    }
}

/// Syntax elements of one slice in coding order.
#[derive(Debug, Clone)]
pub struct SliceJob<'a> {
    /// Picture type of the slice.
    pub picture: PictureType,
    /// Frame or field coding.
    pub structure: PictureStructure,
    /// `(macroblock index, element)` pairs; elements of one macroblock are contiguous.
    pub elements: Vec<(usize, SyntaxElement<'a>)>,
}

impl<'a> SliceJob<'a> {
    /// Create an empty job.
    pub fn new(picture: PictureType, structure: PictureStructure) -> Self {
        Self {
            picture,
            structure,
            elements: Vec::new(),
        }
    }

    /// Append one element of macroblock `mb_index`.
    pub fn push(&mut self, mb_index: usize, element: SyntaxElement<'a>) {
        self.elements.push((mb_index, element));
    }

    /// Number of macroblocks covered by the job.
    pub fn macroblock_count(&self) -> usize {
        let mut count = 0;
        let mut last = None;
        for &(mb, _) in &self.elements {
            if last != Some(mb) {
                count += 1;
                last = Some(mb);
            }
        }
        count
    }
}

/// Encode one slice job on the current thread.
///
/// An end-of-slice flag follows every macroblock; the flag after the last one is set
/// and flushes the coder.
pub fn encode_slice(config: &CabacConfig, store: &MacroblockStore, job: &SliceJob<'_>) -> Result<Vec<u8>> {
    let mut slice = SliceEncoder::new(config.clone(), job.picture, job.structure);
    let mut elements = job.elements.iter().peekable();
    while let Some((mb, element)) = elements.next() {
        slice.write(store, *mb, element)?;
        match elements.peek() {
            Some((next, _)) if next == mb => {}
            Some(_) => {
                slice.end_of_slice(false)?;
            }
            None => {
                slice.end_of_slice(true)?;
            }
        }
    }
    if job.elements.is_empty() {
        slice.end_of_slice(true)?;
    }
    slice.finish()
}

/// Parallel slice encoder.
pub struct ParallelSliceEncoder {
    /// Thread pool for parallel slice encoding.
    thread_pool: ThreadPool,
    /// CABAC configuration shared by every slice.
    config: CabacConfig,
}

impl ParallelSliceEncoder {
    /// Create a parallel slice encoder.
    pub fn new(config: CabacConfig, threading: &ThreadingConfig) -> Result<Self> {
        let num_threads = threading.effective_threads();
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|idx| format!("cabac-slice-{}", idx))
            .build()
            .map_err(|e| CabacError::ThreadPool(e.to_string()))?;
        tracing::debug!(num_threads, "CABAC slice pool created");

        Ok(Self { thread_pool, config })
    }

    /// Number of worker threads.
    pub fn num_threads(&self) -> usize {
        self.thread_pool.current_num_threads()
    }

    /// Encode slices in parallel; results keep the order of `jobs`.
    ///
    /// A failing slice does not affect the others.
    pub fn encode_slices(&self, store: &MacroblockStore, jobs: &[SliceJob<'_>]) -> Vec<Result<Vec<u8>>> {
        self.thread_pool.install(|| {
            jobs.par_iter()
                .map(|job| encode_slice(&self.config, store, job))
                .collect()
        })
    }
}

impl std::fmt::Debug for ParallelSliceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelSliceEncoder")
            .field("num_threads", &self.num_threads())
            .field("config", &self.config)
            .finish()
    }
}
