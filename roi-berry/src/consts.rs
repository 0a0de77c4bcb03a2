//! 通用常量.

/// 边界追踪时, 连续改变方向 (回退) 的最大尝试次数.
///
/// 超过该次数仍找不到下一个边界点时, 当前轮廓被截断并按原样接受.
/// 这是防止在损坏或自接触的输入上死循环的策略值, 而不是一个被证明的上界.
pub const BOUNDARY_MAX_RETRIES: u32 = 5;

/// 多边形扫描转换所使用的临时栅格的最大像素数.
///
/// 多边形包围盒 (含 1 像素外边) 超过该值时, `add_planar_polygon` 不添加任何点.
pub const POLYGON_RASTER_LIMIT: usize = 1 << 26;

/// 平面内 4-邻接的行偏移 `(dy, dz)`.
pub(crate) const N4_LINE_OFFSETS: [(i32, i32); 2] = [(-1, 0), (1, 0)];

/// 三维 26-邻接的 `(dy, dz)` 偏移 (不含 `(0, 0)`, 因为同一行的区间之间总有间隔).
pub(crate) const N26_LINE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];
