//! Context initialization tables.
//!
//! Each entry is a `(state, mps)` pair. Texture tables carry an intra and an inter
//! variant, indexed by [`PictureType::texture_table`](crate::context::PictureType::texture_table).

use crate::context::{
    NUM_ABS_CTX, NUM_ABT_MODE_CTX, NUM_B8_TYPE_CTX, NUM_BCBP_CTX, NUM_BLOCK_TYPES, NUM_CBP_CTX,
    NUM_CIPR_CTX, NUM_DELTA_QP_CTX, NUM_IPR_CTX, NUM_LAST_CTX, NUM_MAP_CTX, NUM_MB_AFF_CTX,
    NUM_MB_TYPE_CTX, NUM_MV_RES_CTX, NUM_ONE_CTX, NUM_REF_NO_CTX,
};

/// Initial `(state, mps)` of one context.
pub(crate) type InitPair = (u8, u8);

/// ABT intra block mode, rows: intra picture, inter picture.
pub(crate) const ABT_MODE_INIT: [[InitPair; NUM_ABT_MODE_CTX]; 2] = [
    [
        ( 8, 0), (22, 0), (14, 1),
    ],
    [
        (17, 0), (30, 0), (27, 0),
    ],
];

/// Macroblock type, rows: I tree, P tree and skip, B tree and skip.
pub(crate) const MB_TYPE_INIT: [[InitPair; NUM_MB_TYPE_CTX]; 3] = [
    [
        (12, 1), ( 6, 0), (26, 0), (34, 0), (39, 0), ( 6, 1),
        (31, 0), (19, 0), (34, 1), (23, 0), (36, 0),
    ],
    [
        ( 5, 1), (25, 1), ( 7, 1), (14, 0), (24, 1), (37, 1),
        (40, 1), ( 7, 0), (33, 0), ( 9, 1), (41, 0),
    ],
    [
        (29, 0), (37, 0), (10, 0), (25, 0), ( 8, 1), ( 5, 1),
        ( 8, 1), (27, 1), (12, 1), (40, 0), ( 4, 0),
    ],
];

/// Sub-macroblock type, rows: P, B.
pub(crate) const B8_TYPE_INIT: [[InitPair; NUM_B8_TYPE_CTX]; 2] = [
    [
        (14, 0), (13, 0), (11, 1), ( 8, 1), (13, 0), (34, 1),
        (26, 1), (18, 0), (14, 1),
    ],
    [
        ( 9, 1), (11, 0), (31, 0), (12, 0), (30, 0), (18, 0),
        (27, 0), (21, 1), (19, 0),
    ],
];

/// Motion vector residual, rows: first bin, unary suffix.
pub(crate) const MV_RES_INIT: [[InitPair; NUM_MV_RES_CTX]; 2] = [
    [
        (21, 0), (25, 1), (19, 1), (21, 0), ( 4, 0), (12, 0),
        (16, 1), (23, 1), (18, 0), (25, 0),
    ],
    [
        (24, 1), (21, 0), (33, 1), (13, 0), (25, 1), (15, 1),
        (20, 0), (27, 0), ( 6, 0), (38, 1),
    ],
];

/// Reference index, rows: 8x8-or-larger, sub-8x8 partitions.
pub(crate) const REF_NO_INIT: [[InitPair; NUM_REF_NO_CTX]; 2] = [
    [
        (27, 1), ( 7, 0), (32, 1), (31, 1), (18, 1), ( 6, 0),
    ],
    [
        ( 4, 0), (17, 0), (23, 0), (26, 0), (18, 0), (34, 0),
    ],
];

/// Delta quantizer.
pub(crate) const DELTA_QP_INIT: [InitPair; NUM_DELTA_QP_CTX] = [
    (37, 0), (10, 0), (18, 0), (11, 0),
];

/// Frame/field coding flag.
pub(crate) const MB_AFF_INIT: [InitPair; NUM_MB_AFF_CTX] = [
    ( 8, 0), ( 1, 0), (13, 1), ( 7, 0),
];

/// Coded block pattern, rows: luma, chroma presence, chroma level.
pub(crate) const CBP_INIT: [[[InitPair; NUM_CBP_CTX]; 3]; 2] = [
    // intra pictures
    [
        [
            (23, 0), (27, 0), (15, 1), (12, 0),
        ],
        [
            (26, 0), (18, 0), (21, 1), (19, 0),
        ],
        [
            (16, 1), (23, 0), (14, 1), (11, 1),
        ],
    ],
    // inter pictures
    [
        [
            (18, 0), (20, 1), ( 3, 0), (30, 0),
        ],
        [
            (17, 1), (17, 1), (27, 0), (19, 1),
        ],
        [
            (22, 0), (15, 0), (17, 1), (29, 0),
        ],
    ],
];

/// Intra luma prediction mode.
pub(crate) const IPR_INIT: [[InitPair; NUM_IPR_CTX]; 9] = [
    [
        (23, 0), ( 5, 1),
    ],
    [
        (11, 1), ( 7, 1),
    ],
    [
        ( 7, 0), (20, 0),
    ],
    [
        (16, 1), (11, 0),
    ],
    [
        (16, 0), ( 6, 1),
    ],
    [
        ( 5, 0), ( 9, 1),
    ],
    [
        ( 7, 0), ( 0, 1),
    ],
    [
        (12, 0), (17, 1),
    ],
    [
        (25, 0), (21, 0),
    ],
];

/// Intra chroma prediction mode.
pub(crate) const CIPR_INIT: [InitPair; NUM_CIPR_CTX] = [
    (14, 0), (17, 0), (10, 0), ( 8, 0),
];

/// Coded block bit, per block context category.
pub(crate) const BCBP_INIT: [[[InitPair; NUM_BCBP_CTX]; NUM_BLOCK_TYPES]; 2] = [
    // intra pictures
    [
        [
            (35, 1), (14, 1), (19, 1), (17, 1),
        ],
        [
            (21, 1), (40, 1), (37, 0), ( 7, 1),
        ],
        [
            (18, 1), (33, 1), (19, 1), (35, 1),
        ],
        [
            (14, 0), (16, 0), (10, 0), ( 8, 0),
        ],
        [
            (40, 1), (16, 0), (22, 0), (13, 0),
        ],
        [
            (25, 1), (25, 0), ( 3, 0), (12, 0),
        ],
        [
            (21, 1), (32, 1), (40, 1), (35, 1),
        ],
        [
            ( 6, 1), (17, 1), (26, 1), (30, 0),
        ],
    ],
    // inter pictures
    [
        [
            (36, 1), ( 8, 0), (19, 0), (19, 1),
        ],
        [
            (13, 1), (11, 1), ( 8, 0), (37, 0),
        ],
        [
            ( 9, 1), (29, 0), ( 6, 0), (20, 0),
        ],
        [
            (40, 0), (32, 0), (19, 1), (34, 0),
        ],
        [
            (36, 1), (10, 1), (39, 1), (21, 1),
        ],
        [
            (10, 1), (18, 0), (29, 1), (15, 0),
        ],
        [
            ( 7, 0), (20, 0), (11, 0), (31, 1),
        ],
        [
            ( 6, 0), (12, 1), (14, 0), (39, 1),
        ],
    ],
];

/// Significance map, per block context category.
pub(crate) const MAP_INIT: [[[InitPair; NUM_MAP_CTX]; NUM_BLOCK_TYPES]; 2] = [
    // intra pictures
    [
        [
            ( 9, 0), ( 2, 0), (10, 1), ( 0, 0), ( 6, 0), ( 5, 0),
            (21, 0), ( 4, 0), (27, 0), ( 1, 0), ( 8, 0), (23, 0),
            (17, 1), (11, 0), (24, 1),
        ],
        [
            (26, 1), (32, 0), (28, 0), (34, 0), (21, 1), (11, 0),
            ( 8, 0), (34, 0), (20, 0), (28, 0), (27, 0), (26, 0),
            (16, 0), (32, 0), (12, 0),
        ],
        [
            (24, 0), (19, 0), ( 6, 0), (19, 0), (25, 0), ( 2, 1),
            ( 2, 1), (25, 1), (27, 1), (27, 0), (10, 0), (22, 0),
            (25, 1), ( 2, 0), (18, 0),
        ],
        [
            (13, 0), (19, 0), (19, 0), (15, 0), ( 7, 0), (13, 0),
            (21, 0), (26, 1), (16, 0), (10, 1), (35, 0), (20, 0),
            (25, 0), (31, 0), (28, 0),
        ],
        [
            (23, 0), (34, 0), (11, 0), (34, 0), ( 7, 1), (18, 0),
            (11, 0), (22, 0), (13, 0), ( 4, 0), ( 4, 0), (21, 1),
            (18, 0), (28, 0), ( 6, 0),
        ],
        [
            (15, 0), ( 5, 0), ( 2, 1), (22, 0), (28, 0), (33, 0),
            (27, 0), (32, 1), (26, 0), (26, 0), (21, 0), ( 4, 0),
            (30, 0), ( 4, 0), ( 1, 1),
        ],
        [
            (13, 0), (34, 0), ( 2, 0), ( 4, 0), (20, 0), (16, 0),
            (33, 0), (31, 0), ( 2, 1), ( 7, 0), (23, 0), (23, 0),
            (31, 1), ( 3, 0), (35, 0),
        ],
        [
            ( 6, 0), (10, 0), (26, 0), ( 6, 0), (33, 0), (33, 1),
            ( 4, 0), (11, 0), (21, 0), (18, 0), ( 3, 0), (10, 0),
            ( 9, 0), ( 9, 0), (24, 1),
        ],
    ],
    // inter pictures
    [
        [
            (22, 0), (26, 0), (11, 1), ( 7, 0), (32, 1), ( 8, 0),
            (20, 0), (31, 0), (23, 0), (10, 0), (33, 0), (30, 0),
            (20, 0), ( 4, 1), (33, 0),
        ],
        [
            (11, 1), (21, 0), (29, 0), (30, 0), (22, 1), (31, 0),
            (33, 1), (14, 1), ( 2, 0), (13, 1), (22, 1), (21, 0),
            (20, 0), ( 4, 0), (26, 1),
        ],
        [
            (19, 0), (32, 0), ( 4, 1), (17, 0), (12, 0), ( 2, 0),
            (29, 0), (13, 0), (30, 0), (32, 1), ( 6, 1), ( 3, 0),
            (32, 0), ( 0, 0), ( 7, 0),
        ],
        [
            (23, 0), (12, 0), ( 9, 0), ( 0, 0), (23, 0), (24, 1),
            (31, 0), (20, 0), ( 4, 1), ( 6, 0), (32, 1), (28, 0),
            ( 3, 0), (11, 0), (10, 0),
        ],
        [
            ( 9, 0), (30, 0), (32, 0), (18, 0), (19, 0), (16, 0),
            (21, 0), ( 9, 0), (20, 1), (15, 0), (24, 0), (17, 0),
            (25, 0), (31, 1), (34, 1),
        ],
        [
            (20, 0), (15, 0), (20, 0), (22, 0), (30, 0), ( 8, 0),
            (28, 0), (27, 0), (11, 0), (34, 0), (34, 0), (29, 0),
            (35, 0), ( 7, 1), (12, 1),
        ],
        [
            (30, 0), ( 1, 0), (13, 0), ( 7, 0), ( 5, 1), (19, 0),
            (27, 0), ( 3, 0), (24, 1), (17, 0), ( 1, 0), (27, 0),
            (18, 0), (33, 0), (17, 0),
        ],
        [
            (26, 0), ( 0, 0), (11, 0), ( 2, 1), ( 5, 0), (32, 0),
            (20, 0), (18, 1), (11, 0), (24, 0), (33, 0), (14, 0),
            ( 4, 0), (12, 0), (34, 1),
        ],
    ],
];

/// Last significant coefficient, per block context category.
pub(crate) const LAST_INIT: [[[InitPair; NUM_LAST_CTX]; NUM_BLOCK_TYPES]; 2] = [
    // intra pictures
    [
        [
            ( 8, 0), (14, 0), (15, 0), (40, 0), (10, 0), (37, 0),
            (36, 0), (32, 0), (24, 1), (15, 1), ( 6, 0), (22, 0),
            ( 2, 1), (33, 1), ( 3, 0),
        ],
        [
            (29, 1), (21, 0), ( 6, 0), (11, 0), ( 9, 0), ( 4, 0),
            (32, 0), (26, 0), (30, 1), (22, 0), (14, 0), ( 6, 0),
            (40, 1), (35, 0), ( 1, 1),
        ],
        [
            (39, 0), (36, 0), ( 8, 0), (30, 0), (21, 1), (37, 0),
            ( 1, 0), ( 7, 1), (36, 0), (27, 0), (18, 0), (33, 0),
            (27, 0), (33, 1), ( 5, 1),
        ],
        [
            (31, 0), ( 8, 1), (12, 0), (10, 1), (20, 1), (27, 1),
            ( 7, 0), ( 5, 0), ( 8, 1), ( 4, 0), (12, 0), ( 1, 0),
            (14, 0), (14, 0), (28, 0),
        ],
        [
            (31, 0), (23, 1), ( 3, 0), ( 1, 0), (11, 0), (21, 0),
            (35, 0), (34, 0), (31, 0), (25, 0), (27, 0), (12, 1),
            ( 2, 1), (39, 0), (31, 0),
        ],
        [
            (35, 0), (24, 0), (29, 0), (33, 0), (40, 0), ( 6, 1),
            (38, 0), ( 9, 1), (40, 1), ( 0, 0), ( 3, 1), (39, 0),
            ( 7, 0), (24, 0), (40, 0),
        ],
        [
            ( 7, 1), (10, 0), (12, 1), (17, 1), (21, 1), ( 6, 1),
            (40, 0), (39, 0), (27, 1), (23, 0), (28, 0), (19, 0),
            ( 1, 1), (38, 0), ( 9, 1),
        ],
        [
            (16, 0), (13, 0), (14, 0), ( 5, 0), (23, 0), (16, 0),
            (17, 0), (18, 1), (29, 1), ( 8, 1), (38, 0), (40, 0),
            ( 3, 0), (18, 0), (12, 0),
        ],
    ],
    // inter pictures
    [
        [
            ( 0, 0), (16, 0), (11, 0), (10, 0), (16, 0), (29, 1),
            ( 5, 1), (10, 0), (27, 0), (40, 1), (34, 0), (28, 0),
            (36, 1), (13, 0), ( 9, 0),
        ],
        [
            ( 3, 1), (31, 0), (11, 0), (23, 0), (14, 1), (20, 1),
            (24, 0), (21, 1), (26, 1), (39, 0), (14, 0), (29, 0),
            ( 5, 1), (18, 0), ( 5, 0),
        ],
        [
            (29, 0), (16, 1), (17, 0), (24, 1), ( 1, 0), ( 8, 0),
            ( 6, 0), (22, 0), ( 3, 0), ( 2, 1), (40, 0), ( 0, 1),
            ( 2, 0), (40, 0), (26, 0),
        ],
        [
            (38, 0), (14, 1), ( 8, 0), ( 5, 0), (22, 0), (34, 0),
            (39, 0), ( 9, 1), ( 9, 0), (14, 0), (14, 0), ( 9, 0),
            (32, 0), (33, 0), (15, 0),
        ],
        [
            (21, 0), (32, 0), (17, 0), (39, 0), ( 4, 0), ( 9, 0),
            ( 5, 1), (27, 0), ( 7, 0), (30, 1), (17, 1), (36, 1),
            ( 9, 0), (30, 0), ( 8, 1),
        ],
        [
            ( 3, 1), ( 0, 1), (28, 0), (29, 0), (31, 1), ( 3, 0),
            (33, 0), (11, 0), (40, 1), ( 6, 0), ( 7, 0), (11, 1),
            ( 1, 0), (27, 1), (23, 1),
        ],
        [
            (25, 0), ( 2, 0), ( 6, 0), (40, 1), (25, 0), (22, 0),
            (39, 1), (37, 1), ( 2, 0), (40, 1), ( 8, 1), ( 2, 0),
            (14, 0), ( 8, 0), (18, 0),
        ],
        [
            (17, 1), (40, 0), (23, 0), (16, 0), (16, 0), (10, 0),
            (30, 0), (15, 0), (36, 1), (32, 0), ( 6, 0), (28, 1),
            (28, 0), ( 4, 0), ( 7, 1),
        ],
    ],
];

/// Greater-than-one flag, per block context category.
pub(crate) const ONE_INIT: [[[InitPair; NUM_ONE_CTX]; NUM_BLOCK_TYPES]; 2] = [
    // intra pictures
    [
        [
            (14, 0), (27, 1), (16, 0), ( 3, 0), (11, 1),
        ],
        [
            (11, 0), (18, 0), (17, 0), (23, 0), (17, 0),
        ],
        [
            ( 5, 0), (25, 1), (15, 0), (11, 1), (13, 1),
        ],
        [
            (24, 0), ( 4, 1), ( 5, 1), ( 9, 0), (22, 0),
        ],
        [
            ( 3, 0), (17, 0), (16, 1), (35, 0), (17, 0),
        ],
        [
            (14, 0), (20, 1), (24, 0), (21, 0), (28, 0),
        ],
        [
            ( 2, 1), (20, 1), (26, 1), (32, 1), (35, 0),
        ],
        [
            (22, 0), (26, 0), (13, 0), ( 7, 0), (35, 0),
        ],
    ],
    // inter pictures
    [
        [
            (11, 0), (14, 0), ( 7, 1), (13, 0), (28, 0),
        ],
        [
            (30, 0), ( 3, 0), (24, 0), ( 9, 0), (12, 1),
        ],
        [
            (11, 0), (32, 0), (31, 0), (28, 0), (26, 0),
        ],
        [
            (34, 1), (22, 0), (14, 0), (17, 0), (21, 0),
        ],
        [
            ( 2, 0), (26, 0), (17, 0), (34, 0), (18, 0),
        ],
        [
            (27, 0), (27, 0), ( 3, 1), (10, 0), (11, 0),
        ],
        [
            (12, 1), (21, 1), (17, 0), (10, 0), (10, 0),
        ],
        [
            (23, 0), (34, 0), (25, 0), (30, 0), ( 8, 0),
        ],
    ],
];

/// Level magnitude prefix, per block context category.
pub(crate) const ABS_INIT: [[[InitPair; NUM_ABS_CTX]; NUM_BLOCK_TYPES]; 2] = [
    // intra pictures
    [
        [
            (21, 0), (22, 1), (30, 1), ( 9, 1), ( 6, 0),
        ],
        [
            ( 9, 0), (16, 0), (10, 1), (16, 0), ( 5, 0),
        ],
        [
            (34, 0), (35, 0), (27, 1), (35, 1), (12, 1),
        ],
        [
            (20, 0), (31, 0), (26, 1), (27, 0), (10, 1),
        ],
        [
            (25, 0), (25, 0), (18, 0), (21, 0), (24, 0),
        ],
        [
            (24, 0), (23, 1), (11, 1), (18, 0), (11, 1),
        ],
        [
            (33, 0), ( 2, 0), (25, 0), (33, 1), ( 8, 1),
        ],
        [
            (24, 1), (22, 1), (14, 0), ( 2, 0), (26, 1),
        ],
    ],
    // inter pictures
    [
        [
            (25, 1), ( 2, 0), ( 5, 1), ( 6, 0), (20, 1),
        ],
        [
            (24, 1), (11, 0), ( 7, 1), (30, 1), ( 9, 0),
        ],
        [
            (30, 0), ( 5, 1), (22, 0), ( 5, 0), ( 6, 0),
        ],
        [
            (32, 0), (34, 1), ( 4, 0), (32, 0), (28, 0),
        ],
        [
            (29, 0), ( 7, 0), (27, 0), (27, 0), (33, 0),
        ],
        [
            (23, 1), (11, 0), (16, 0), (12, 1), (22, 0),
        ],
        [
            (18, 1), ( 5, 0), (25, 0), ( 4, 1), (20, 1),
        ],
        [
            (13, 0), (19, 1), (25, 1), (23, 0), (14, 0),
        ],
    ],
];
