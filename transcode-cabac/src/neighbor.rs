//! Macroblock neighbor store and context offset derivation.
//!
//! Macroblocks live in a flat arena owned by the caller. Neighbor relations are plain
//! indices resolved through the arena: a neighbor outside the picture or in another slice
//! is unavailable and always contributes the documented default, never an error.

use crate::context::PictureType;
use crate::error::{CabacError, Result};

/// Number of 4x4 blocks along one macroblock edge.
pub const BLOCK_SIZE: usize = 4;

/// Coding mode of a macroblock, as seen by its neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum MbMode {
    /// Mode 0: P skip or B direct.
    #[default]
    Skip,
    /// Any other inter mode.
    Inter,
    /// Intra 4x4 prediction.
    Intra4x4,
    /// Intra 16x16 prediction.
    Intra16x16,
}

impl MbMode {
    /// Check if this is an intra mode.
    pub fn is_intra(self) -> bool {
        matches!(self, MbMode::Intra4x4 | MbMode::Intra16x16)
    }
}

/// Reference picture list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefList {
    /// List 0 (forward).
    Forward,
    /// List 1 (backward).
    Backward,
}

impl RefList {
    /// Array index of the list.
    pub fn index(self) -> usize {
        match self {
            RefList::Forward => 0,
            RefList::Backward => 1,
        }
    }
}

/// Motion vector component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MvComponent {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

impl MvComponent {
    /// Array index of the component.
    pub fn index(self) -> usize {
        match self {
            MvComponent::X => 0,
            MvComponent::Y => 1,
        }
    }
}

/// Position of a 4x4 block inside its macroblock, in 4x4 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SubBlock {
    x: usize,
    y: usize,
}

impl SubBlock {
    /// Create a position; both coordinates must lie inside the macroblock.
    pub fn new(x: usize, y: usize) -> Result<Self> {
        for coord in [x, y] {
            if coord >= BLOCK_SIZE {
                return Err(CabacError::invalid("sub-block position", i64::try_from(coord).unwrap_or(i64::MAX)));
            }
        }
        Ok(Self { x, y })
    }

    /// Column (0-3).
    pub fn x(&self) -> usize {
        self.x
    }

    /// Row (0-3).
    pub fn y(&self) -> usize {
        self.y
    }
}

/// Read-only snapshot of one macroblock's coded state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroblockInfo {
    /// Slice the macroblock belongs to.
    pub slice_id: u32,
    /// Coding mode.
    pub mode: MbMode,
    /// Coded block pattern (bits 0-3 luma 8x8, bits 4-5 chroma).
    pub cbp: u32,
    /// Delta quantizer.
    pub delta_qp: i32,
    /// Intra chroma prediction mode.
    pub c_ipred_mode: u8,
    /// Field-coded macroblock.
    pub mb_field: bool,
    /// Reference index per list, indexed `[list][y][x]`; negative when unused.
    pub ref_idx: [[[i8; BLOCK_SIZE]; BLOCK_SIZE]; 2],
    /// Motion vector residual per list, indexed `[list][y][x][component]`.
    pub mvd: [[[[i32; 2]; BLOCK_SIZE]; BLOCK_SIZE]; 2],
}

/// Flat arena of macroblocks in raster order.
#[derive(Debug, Clone)]
pub struct MacroblockStore {
    width: usize,
    macroblocks: Vec<MacroblockInfo>,
}

impl MacroblockStore {
    /// Create a store for a picture of `width` x `height` macroblocks.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(1),
            macroblocks: vec![MacroblockInfo::default(); width.max(1) * height],
        }
    }

    /// Picture width in macroblocks.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of macroblocks.
    pub fn len(&self) -> usize {
        self.macroblocks.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.macroblocks.is_empty()
    }

    /// Get a macroblock.
    pub fn get(&self, index: usize) -> Option<&MacroblockInfo> {
        self.macroblocks.get(index)
    }

    /// Get a macroblock for update by the surrounding encoder.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut MacroblockInfo> {
        self.macroblocks.get_mut(index)
    }

    /// Index of the macroblock above, if available to `index`.
    pub fn above(&self, index: usize) -> Option<usize> {
        let candidate = index.checked_sub(self.width)?;
        self.same_slice(index, candidate)
    }

    /// Index of the macroblock to the left, if available to `index`.
    pub fn left(&self, index: usize) -> Option<usize> {
        if index % self.width == 0 {
            return None;
        }
        self.same_slice(index, index - 1)
    }

    fn same_slice(&self, index: usize, candidate: usize) -> Option<usize> {
        let current = self.macroblocks.get(index)?;
        let neighbor = self.macroblocks.get(candidate)?;
        (neighbor.slice_id == current.slice_id).then_some(candidate)
    }

    /// Resolve the neighborhood of macroblock `index`.
    pub fn context(&self, index: usize) -> Result<MacroblockContext<'_>> {
        let current = self.get(index).ok_or(CabacError::InvalidMacroblock {
            index,
            len: self.len(),
        })?;
        let above_index = self.above(index);
        let left_index = self.left(index);
        Ok(MacroblockContext {
            index,
            current,
            above: above_index.map(|i| &self.macroblocks[i]),
            left: left_index.map(|i| &self.macroblocks[i]),
            above_index,
            left_index,
        })
    }
}

/// Current macroblock with its causal neighbors.
#[derive(Debug, Clone, Copy)]
pub struct MacroblockContext<'a> {
    /// Index of the current macroblock.
    pub index: usize,
    /// Current macroblock.
    pub current: &'a MacroblockInfo,
    /// Macroblock above, if available.
    pub above: Option<&'a MacroblockInfo>,
    /// Macroblock to the left, if available.
    pub left: Option<&'a MacroblockInfo>,
    /// Arena index of the macroblock above.
    pub above_index: Option<usize>,
    /// Arena index of the macroblock to the left.
    pub left_index: Option<usize>,
}

impl<'a> MacroblockContext<'a> {
    /// Context for a macroblock with no available neighbors.
    pub fn isolated(current: &'a MacroblockInfo) -> Self {
        Self {
            index: 0,
            current,
            above: None,
            left: None,
            above_index: None,
            left_index: None,
        }
    }

    fn count<F>(&self, feature: F) -> usize
    where
        F: Fn(&MacroblockInfo) -> bool,
    {
        self.above.map_or(0, |mb| feature(mb) as usize) + self.left.map_or(0, |mb| feature(mb) as usize)
    }

    /// First-bin offset of the I-picture macroblock type (0-2).
    pub fn mb_type_intra_ctx(&self) -> usize {
        self.count(|mb| mb.mode != MbMode::Intra4x4)
    }

    /// First-bin offset of the B-picture macroblock type (0-2).
    pub fn mb_type_b_ctx(&self) -> usize {
        self.count(|mb| mb.mode != MbMode::Skip)
    }

    /// Skip flag offset: 0-2 in P pictures, 7-9 in B pictures.
    pub fn skip_ctx(&self, picture: PictureType) -> usize {
        if picture.is_b() {
            7 + self.count(|mb| !(mb.mode == MbMode::Skip && mb.cbp == 0))
        } else {
            self.count(|mb| mb.mode != MbMode::Skip)
        }
    }

    /// Frame/field flag offset (0-2).
    pub fn field_ctx(&self) -> usize {
        self.count(|mb| mb.mb_field)
    }

    /// Reference index offset (0-3) for the block at `pos`.
    ///
    /// A neighbor feature is 0 whenever the neighboring macroblock on that side is
    /// unavailable, even if the neighboring block lies inside the current macroblock.
    pub fn ref_idx_ctx(&self, list: RefList, pos: SubBlock) -> usize {
        let l = list.index();
        let b = match self.above {
            None => 0,
            Some(above) => {
                let r = if pos.y == 0 {
                    above.ref_idx[l][BLOCK_SIZE - 1][pos.x]
                } else {
                    self.current.ref_idx[l][pos.y - 1][pos.x]
                };
                (r > 0) as usize
            }
        };
        let a = match self.left {
            None => 0,
            Some(left) => {
                let r = if pos.x == 0 {
                    left.ref_idx[l][pos.y][BLOCK_SIZE - 1]
                } else {
                    self.current.ref_idx[l][pos.y][pos.x - 1]
                };
                (r > 0) as usize
            }
        };
        a + 2 * b
    }

    /// Sum of absolute neighbor motion vector residuals for the block at `pos`.
    pub fn mvd_neighbor_sum(&self, list: RefList, component: MvComponent, pos: SubBlock) -> u32 {
        let (l, k) = (list.index(), component.index());
        let b = if pos.y == 0 {
            self.above.map_or(0, |mb| mb.mvd[l][BLOCK_SIZE - 1][pos.x][k].unsigned_abs())
        } else {
            self.current.mvd[l][pos.y - 1][pos.x][k].unsigned_abs()
        };
        let a = if pos.x == 0 {
            self.left.map_or(0, |mb| mb.mvd[l][pos.y][BLOCK_SIZE - 1][k].unsigned_abs())
        } else {
            self.current.mvd[l][pos.y][pos.x - 1][k].unsigned_abs()
        };
        a.saturating_add(b)
    }

    /// First-bin offset of a motion vector residual: `5 * component` plus 0, 2 or 3.
    pub fn mvd_ctx(&self, list: RefList, component: MvComponent, pos: SubBlock) -> usize {
        let base = 5 * component.index();
        match self.mvd_neighbor_sum(list, component, pos) {
            0..=2 => base,
            3..=32 => base + 2,
            _ => base + 3,
        }
    }

    /// Delta quantizer offset (0-1), from the left neighbor only.
    pub fn delta_qp_ctx(&self) -> usize {
        self.left.map_or(0, |mb| (mb.delta_qp != 0) as usize)
    }

    /// Chroma intra prediction mode offset (0-2).
    pub fn chroma_pred_ctx(&self) -> usize {
        self.count(|mb| mb.c_ipred_mode != 0)
    }

    /// Offset (0-3) of luma coded block pattern bit `b8` while coding `cbp`.
    pub fn cbp_luma_ctx(&self, b8: usize, cbp: u32) -> usize {
        let b = if b8 / 2 == 0 {
            self.above.map_or(0, |mb| (mb.cbp & (1 << (b8 + 2)) == 0) as usize)
        } else {
            (cbp & (1 << (b8 - 2)) == 0) as usize
        };
        let a = if b8 % 2 == 0 {
            self.left.map_or(0, |mb| (mb.cbp & (1 << (b8 + 1)) == 0) as usize)
        } else {
            (cbp & (1 << (b8 - 1)) == 0) as usize
        };
        a + 2 * b
    }

    /// Offset (0-3) of chroma coded block pattern bin 0 (presence) or 1 (level).
    pub fn cbp_chroma_ctx(&self, bin: usize) -> usize {
        let feature = |mb: &MacroblockInfo| {
            if bin == 0 {
                mb.cbp > 15
            } else {
                mb.cbp > 15 && (mb.cbp >> 4) == 2
            }
        };
        let b = self.above.map_or(0, |mb| feature(mb) as usize);
        let a = self.left.map_or(0, |mb| feature(mb) as usize);
        a + 2 * b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_3x3() -> MacroblockStore {
        MacroblockStore::new(3, 3)
    }

    #[test]
    fn test_neighbor_availability() {
        let store = store_3x3();
        assert_eq!(store.above(0), None);
        assert_eq!(store.left(0), None);
        assert_eq!(store.above(4), Some(1));
        assert_eq!(store.left(4), Some(3));
        assert_eq!(store.left(3), None);
        assert_eq!(store.above(2), None);
    }

    #[test]
    fn test_slice_boundary_hides_neighbors() {
        let mut store = store_3x3();
        for i in 4..9 {
            store.get_mut(i).unwrap().slice_id = 1;
        }
        assert_eq!(store.left(4), None);
        assert_eq!(store.above(4), None);
        assert_eq!(store.left(5), Some(4));
        assert_eq!(store.above(7), Some(4));
    }

    #[test]
    fn test_context_out_of_range() {
        let store = store_3x3();
        assert_eq!(
            store.context(9).unwrap_err(),
            CabacError::InvalidMacroblock { index: 9, len: 9 }
        );
    }

    #[test]
    fn test_mb_type_ctx() {
        let mut store = store_3x3();
        store.get_mut(1).unwrap().mode = MbMode::Intra16x16;
        store.get_mut(3).unwrap().mode = MbMode::Intra4x4;
        let ctx = store.context(4).unwrap();
        assert_eq!(ctx.mb_type_intra_ctx(), 1);
        assert_eq!(ctx.mb_type_b_ctx(), 2);

        let corner = store.context(0).unwrap();
        assert_eq!(corner.mb_type_intra_ctx(), 0);
    }

    #[test]
    fn test_skip_ctx() {
        let mut store = store_3x3();
        store.get_mut(1).unwrap().cbp = 3;
        store.get_mut(3).unwrap().mode = MbMode::Inter;
        let ctx = store.context(4).unwrap();
        // P: only the left neighbor has a non-skip mode.
        assert_eq!(ctx.skip_ctx(PictureType::P), 1);
        // B: above is direct with coefficients, left is inter.
        assert_eq!(ctx.skip_ctx(PictureType::B), 9);
        assert_eq!(store.context(0).unwrap().skip_ctx(PictureType::B), 7);
    }

    #[test]
    fn test_ref_idx_ctx_availability_quirk() {
        let mut store = store_3x3();
        store.get_mut(1).unwrap().ref_idx[0][0][0] = 1;
        store.get_mut(1).unwrap().mode = MbMode::Inter;
        // Interior block of macroblock 1: its above macroblock is outside the picture.
        let mb = store.get_mut(1).unwrap();
        mb.ref_idx[0][0][1] = 2;
        let ctx = store.context(1).unwrap();
        assert_eq!(ctx.ref_idx_ctx(RefList::Forward, SubBlock::new(1, 1).unwrap()), 0);
        // The left macroblock exists, so the interior left block counts.
        assert_eq!(ctx.ref_idx_ctx(RefList::Forward, SubBlock::new(2, 0).unwrap()), 1);

        let ctx = store.context(4).unwrap();
        assert_eq!(ctx.ref_idx_ctx(RefList::Forward, SubBlock::new(0, 0).unwrap()), 0);
        store.get_mut(1).unwrap().ref_idx[0][3][0] = 3;
        store.get_mut(3).unwrap().ref_idx[0][0][3] = 1;
        let ctx = store.context(4).unwrap();
        assert_eq!(ctx.ref_idx_ctx(RefList::Forward, SubBlock::new(0, 0).unwrap()), 3);
        assert_eq!(ctx.ref_idx_ctx(RefList::Backward, SubBlock::new(0, 0).unwrap()), 0);
    }

    #[test]
    fn test_mvd_ctx_buckets() {
        let mut store = store_3x3();
        let ctx_for = |store: &MacroblockStore| {
            store
                .context(4)
                .unwrap()
                .mvd_ctx(RefList::Forward, MvComponent::Y, SubBlock::new(0, 0).unwrap())
        };
        assert_eq!(ctx_for(&store), 5);

        store.get_mut(1).unwrap().mvd[0][3][0][1] = -2;
        store.get_mut(3).unwrap().mvd[0][0][3][1] = 1;
        assert_eq!(ctx_for(&store), 7);

        store.get_mut(3).unwrap().mvd[0][0][3][1] = 30;
        assert_eq!(ctx_for(&store), 7);

        store.get_mut(3).unwrap().mvd[0][0][3][1] = 31;
        assert_eq!(ctx_for(&store), 8);
    }

    #[test]
    fn test_mvd_interior_uses_current() {
        let mut store = store_3x3();
        store.get_mut(0).unwrap().mvd[1][1][0][0] = 40;
        let ctx = store.context(0).unwrap();
        assert_eq!(ctx.mvd_ctx(RefList::Backward, MvComponent::X, SubBlock::new(1, 1).unwrap()), 3);
        assert_eq!(ctx.mvd_ctx(RefList::Forward, MvComponent::X, SubBlock::new(1, 1).unwrap()), 0);
    }

    #[test]
    fn test_cbp_ctx() {
        let mut store = store_3x3();
        store.get_mut(1).unwrap().cbp = 0b10_0000 | 0b0100;
        store.get_mut(3).unwrap().cbp = 0b01_0000;
        let ctx = store.context(4).unwrap();
        // b8 0: above bit 2 set (b = 0), left bit 1 clear (a = 1).
        assert_eq!(ctx.cbp_luma_ctx(0, 0), 1);
        // b8 3: both neighbors inside the current macroblock.
        assert_eq!(ctx.cbp_luma_ctx(3, 0b0110), 0);
        assert_eq!(ctx.cbp_luma_ctx(3, 0), 3);
        assert_eq!(ctx.cbp_chroma_ctx(0), 3);
        assert_eq!(ctx.cbp_chroma_ctx(1), 2);
    }

    #[test]
    fn test_offsets_stay_in_range() {
        let mut store = store_3x3();
        let modes = [MbMode::Skip, MbMode::Inter, MbMode::Intra4x4, MbMode::Intra16x16];
        for (i, mb) in (0..9).zip(modes.iter().cycle()) {
            let info = store.get_mut(i).unwrap();
            info.mode = *mb;
            info.cbp = (i as u32 * 7) % 48;
            info.delta_qp = i as i32 % 2;
            info.c_ipred_mode = (i % 4) as u8;
            info.mb_field = i % 3 == 0;
            for y in 0..BLOCK_SIZE {
                for x in 0..BLOCK_SIZE {
                    let k = i * 16 + y * 4 + x;
                    info.ref_idx[i % 2][y][x] = (k % 3) as i8 - 1;
                    info.mvd[k % 2][y][x] = [(k as i32 * 13) % 70 - 35, (k as i32 * 5) % 9];
                }
            }
        }
        for i in 0..9 {
            let ctx = store.context(i).unwrap();
            assert!(ctx.mb_type_intra_ctx() < 3);
            assert!(ctx.mb_type_b_ctx() < 3);
            assert!(ctx.skip_ctx(PictureType::P) < 3);
            assert!((7..10).contains(&ctx.skip_ctx(PictureType::B)));
            assert!(ctx.field_ctx() < 3);
            assert!(ctx.delta_qp_ctx() < 2);
            assert!(ctx.chroma_pred_ctx() < 3);
            for b8 in 0..4 {
                assert!(ctx.cbp_luma_ctx(b8, 0b1010) < 4);
            }
            for bin in 0..2 {
                assert!(ctx.cbp_chroma_ctx(bin) < 4);
            }
            for y in 0..BLOCK_SIZE {
                for x in 0..BLOCK_SIZE {
                    let pos = SubBlock::new(x, y).unwrap();
                    for list in [RefList::Forward, RefList::Backward] {
                        assert!(ctx.ref_idx_ctx(list, pos) < 4);
                        for component in [MvComponent::X, MvComponent::Y] {
                            assert!(ctx.mvd_ctx(list, component, pos) < 10);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_sub_block_bounds() {
        let pos = SubBlock::new(3, 2).unwrap();
        assert_eq!((pos.x(), pos.y()), (3, 2));
        assert_eq!(SubBlock::default(), SubBlock::new(0, 0).unwrap());
        assert_eq!(SubBlock::new(4, 0), Err(CabacError::invalid("sub-block position", 4)));
        assert_eq!(SubBlock::new(7, 9), Err(CabacError::invalid("sub-block position", 7)));
        assert_eq!(SubBlock::new(0, usize::MAX), Err(CabacError::invalid("sub-block position", i64::MAX)));
    }
}
