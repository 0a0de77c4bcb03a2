//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{FPoint, Point};

pub use crate::{CompactRoi, Connectivity, Contour, PlaneWriteVis, Roi, RoiTraverser};
pub use crate::{Cursor, Points, TravStatus};

pub use crate::rle::{Interval, Line, Plane};

pub use crate::spacing::{PixelSpacing, SliceSpacing, UniformSpacing};

pub use crate::consts::{BOUNDARY_MAX_RETRIES, POLYGON_RASTER_LIMIT};
pub use crate::{Invariant, RoiError, RoiResult};

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        pub use serde::{Deserialize, Serialize};
    }
}
