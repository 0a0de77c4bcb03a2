//! 稀疏三维 ROI 容器.
//!
//! [`Roi`] 按值拥有所有平面/行/区间 (深拷贝语义), 并保证:
//!
//! 1. 平面按 z 严格递增, 行按 y 严格递增, 区间按 x1 严格递增;
//! 2. 同一行内的区间两两之间至少间隔一个点;
//! 3. 不存在空行, 也不存在空平面 (级联删除).
//!
//! 所有公开操作都在返回前恢复这些不变量.

use crate::consts::N4_LINE_OFFSETS;
use crate::rle::sorted;
use crate::rle::{Interval, Line, Plane};
use crate::{FPoint, Invariant, Point, RoiResult};
use num::integer::Roots;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod algebra;
mod boundary;
mod contig;
mod cursor;
mod hull;
mod io;
mod mask;
mod morph;
mod polygon;
mod raster;
mod resample;

pub use contig::Connectivity;
pub use cursor::{Cursor, Points, TravStatus};
pub use io::CompactRoi;
pub use mask::PlaneWriteVis;

/// 行程编码的稀疏三维点集.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Roi {
    planes: Vec<Plane>,
}

/// 构造与基本访问.
impl Roi {
    /// 创建空 ROI.
    #[inline]
    pub fn new() -> Self {
        Self { planes: Vec::new() }
    }

    /// 直接由已满足不变量的平面序列构造.
    #[inline]
    pub(crate) fn from_sorted(planes: Vec<Plane>) -> Self {
        let ans = Self { planes };
        debug_assert!(ans.is_well_formed());
        ans
    }

    /// 所有平面.
    #[inline]
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// 获取 z 坐标为 `z` 的平面.
    #[inline]
    pub fn plane(&self, z: i32) -> Option<&Plane> {
        sorted::find_item(&self.planes, z)
            .ok()
            .map(|idx| &self.planes[idx])
    }

    /// 平面个数.
    #[inline]
    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    /// 所有平面的 z 坐标, 升序.
    pub fn plane_zs(&self) -> Vec<i32> {
        self.planes.iter().map(Plane::z).collect()
    }

    /// 是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// 清空.
    #[inline]
    pub fn clear(&mut self) {
        self.planes.clear();
    }

    /// 以光栅顺序迭代所有 `(z, y, 区间)`.
    pub fn intervals(&self) -> impl Iterator<Item = (i32, i32, Interval)> + '_ {
        self.planes.iter().flat_map(|p| {
            p.lines()
                .iter()
                .flat_map(move |l| l.intervals().iter().map(move |iv| (p.z(), l.y(), *iv)))
        })
    }

    /// 检查全部不变量. 通过公开接口构造的 ROI 总是满足不变量.
    pub fn is_well_formed(&self) -> bool {
        sorted::is_strictly_sorted(&self.planes)
            && self.planes.iter().all(|p| !p.is_empty() && p.is_well_formed())
    }
}

/// 添加/删除几何体.
impl Roi {
    /// 添加单点.
    #[inline]
    pub fn add_point(&mut self, p: Point) {
        self.add_interval(p.x, p.x, p.y, p.z);
    }

    /// 在 `(y, z)` 行添加区间 `[x1, x2]`. 要求 `x1 <= x2`, 否则程序 panic.
    pub fn add_interval(&mut self, x1: i32, x2: i32, y: i32, z: i32) {
        let iv = Interval::new(x1, x2);
        let idx = sorted::find_or_add(&mut self.planes, z, Plane::new);
        self.planes[idx].add_interval(y, iv);
    }

    /// 添加以 `tl`, `br` 为对角 (包含两端) 的长方体.
    ///
    /// `tl` 必须在每个分量上都不大于 `br`, 否则返回致命错误
    /// [`Invariant::InvalidBox`], ROI 保持不变.
    pub fn add_box(&mut self, tl: Point, br: Point) -> RoiResult<()> {
        if !tl.le_componentwise(&br) {
            return Err(Invariant::InvalidBox { tl, br }.into());
        }
        for z in tl.z..=br.z {
            for y in tl.y..=br.y {
                self.add_interval(tl.x, br.x, y, z);
            }
        }
        Ok(())
    }

    /// 在 `center.z` 平面添加以 `center` 为圆心, `radius` 为半径的实心圆盘
    /// (所有满足 `dx² + dy² <= radius²` 的点).
    ///
    /// `radius` 必须为正数, 否则返回致命错误.
    pub fn add_circle(&mut self, center: Point, radius: i32) -> RoiResult<()> {
        if radius <= 0 {
            return Err(Invariant::NonPositiveRadius(radius).into());
        }
        let r2 = radius as i64 * radius as i64;
        for dy in -radius..=radius {
            let half = isqrt(r2 - dy as i64 * dy as i64);
            self.add_interval(center.x - half, center.x + half, center.y + dy, center.z);
        }
        Ok(())
    }

    /// 添加以 `center` 为球心, `radius` 为半径的实心球. `radius` 必须为正数.
    pub fn add_sphere(&mut self, center: Point, radius: i32) -> RoiResult<()> {
        if radius <= 0 {
            return Err(Invariant::NonPositiveRadius(radius).into());
        }
        let r2 = radius as i64 * radius as i64;
        for dz in -radius..=radius {
            for dy in -radius..=radius {
                let rest = r2 - (dz as i64).pow(2) - (dy as i64).pow(2);
                if rest < 0 {
                    continue;
                }
                let half = isqrt(rest);
                self.add_interval(
                    center.x - half,
                    center.x + half,
                    center.y + dy,
                    center.z + dz,
                );
            }
        }
        Ok(())
    }

    /// 快速追加单点. 见 [`Self::append_interval`].
    #[inline]
    pub fn append_point(&mut self, p: Point) {
        self.append_interval(p.x, p.x, p.y, p.z);
    }

    /// 快速追加区间.
    ///
    /// 当区间在光栅顺序上严格位于所有已有点之后时, 操作为均摊 O(1);
    /// 否则自动退化为 [`Self::add_interval`]. 两种情况结果一致.
    pub fn append_interval(&mut self, x1: i32, x2: i32, y: i32, z: i32) {
        let iv = Interval::new(x1, x2);
        let appended = match self.planes.last_mut() {
            Some(last) if last.z() == z => last.append(y, iv),
            Some(last) if last.z() > z => false,
            _ => {
                self.planes.push(Plane::from_sorted(z, vec![Line::with_interval(y, iv)]));
                true
            }
        };
        if !appended {
            self.add_interval(x1, x2, y, z);
        }
    }

    /// 删除单点. 返回 ROI 是否发生变化.
    #[inline]
    pub fn remove_point(&mut self, p: Point) -> bool {
        self.remove_interval(p.x, p.x, p.y, p.z)
    }

    /// 删除 `(y, z)` 行上的区间 `[x1, x2]`. 返回 ROI 是否发生变化.
    pub fn remove_interval(&mut self, x1: i32, x2: i32, y: i32, z: i32) -> bool {
        let Ok(idx) = sorted::find_item(&self.planes, z) else {
            return false;
        };
        let changed = self.planes[idx].subtract_interval(y, Interval::new(x1, x2));
        if self.planes[idx].is_empty() {
            self.planes.remove(idx);
        }
        changed
    }
}

/// 结构元.
impl Roi {
    /// 以偏移 `lo..=hi` (逐分量, 包含两端) 构造长方体结构元.
    pub fn kernel_box(lo: Point, hi: Point) -> RoiResult<Roi> {
        let mut ans = Roi::new();
        ans.add_box(lo, hi)?;
        Ok(ans)
    }

    /// 构造大小为 `sx * sy * sz` 的居中长方体结构元.
    ///
    /// 每个轴上覆盖偏移 `[-(s / 2), s - 1 - s / 2]`. 各分量必须不小于 1.
    pub fn centered_box(sx: i32, sy: i32, sz: i32) -> RoiResult<Roi> {
        if sx < 1 || sy < 1 || sz < 1 {
            return Err(Invariant::NonPositiveStep(sx, sy, sz).into());
        }
        let lo = Point::new(-(sx / 2), -(sy / 2), -(sz / 2));
        let hi = Point::new(sx - 1 - sx / 2, sy - 1 - sy / 2, sz - 1 - sz / 2);
        Self::kernel_box(lo, hi)
    }

    /// 平面内 4-邻域十字结构元 (含中心).
    pub fn cross_2d() -> Roi {
        let mut ans = Roi::new();
        ans.add_interval(-1, 1, 0, 0);
        for (dy, dz) in N4_LINE_OFFSETS {
            ans.add_point(Point::new(0, dy, dz));
        }
        ans
    }
}

/// 查询.
impl Roi {
    /// 是否包含点 `p`?
    #[inline]
    pub fn in_roi(&self, p: Point) -> bool {
        self.plane(p.z).is_some_and(|plane| plane.contains(p.x, p.y))
    }

    /// 总点数. O(区间总数).
    pub fn num_pix(&self) -> u64 {
        self.planes.iter().map(Plane::num_pix).sum()
    }

    /// 平面 `z` 上的点数.
    pub fn plane_num_pix(&self, z: i32) -> u64 {
        self.plane(z).map_or(0, Plane::num_pix)
    }

    /// 平面 `z` 上的包围盒 `(最小角, 最大角)`. 平面不存在时返回 `None`.
    pub fn bounding_box(&self, z: i32) -> Option<(Point, Point)> {
        let (x1, y1, x2, y2) = self.plane(z)?.bounds()?;
        Some((Point::new(x1, y1, z), Point::new(x2, y2, z)))
    }

    /// 整个 ROI 的包围长方体 `(最小角, 最大角)`. 空 ROI 返回 `None`.
    pub fn bounding_cube(&self) -> Option<(Point, Point)> {
        self.planes
            .iter()
            .filter_map(|p| {
                let (x1, y1, x2, y2) = p.bounds()?;
                Some((Point::new(x1, y1, p.z()), Point::new(x2, y2, p.z())))
            })
            .reduce(|(lo, hi), (a, b)| (lo.min_componentwise(&a), hi.max_componentwise(&b)))
    }

    /// 平面 `z` 上所有点的 (面积加权) 二维质心, z 分量即为 `z`.
    /// 平面不存在时返回 `None`.
    pub fn centroid(&self, z: i32) -> Option<FPoint> {
        let plane = self.plane(z)?;
        let (mut n, mut sx, mut sy) = (0.0f64, 0.0f64, 0.0f64);
        for line in plane.lines() {
            for iv in line.intervals() {
                let len = iv.len() as f64;
                n += len;
                // 区间内 x 坐标之和 = 长度 * 中点
                sx += len * (iv.x1() as f64 + iv.x2() as f64) / 2.0;
                sy += len * line.y() as f64;
            }
        }
        (n > 0.0).then(|| FPoint::new(sx / n, sy / n, z as f64))
    }

    /// 光栅顺序下的第一个点.
    pub fn first_point(&self) -> Option<Point> {
        let plane = self.planes.first()?;
        let line = plane.lines().first()?;
        Some(Point::new(line.first()?.x1(), line.y(), plane.z()))
    }

    /// 光栅顺序下的最后一个点.
    pub fn last_point(&self) -> Option<Point> {
        let plane = self.planes.last()?;
        let line = plane.lines().last()?;
        Some(Point::new(line.last()?.x2(), line.y(), plane.z()))
    }
}

impl FromIterator<Point> for Roi {
    fn from_iter<T: IntoIterator<Item = Point>>(iter: T) -> Self {
        let mut ans = Roi::new();
        ans.extend(iter);
        ans
    }
}

impl Extend<Point> for Roi {
    fn extend<T: IntoIterator<Item = Point>>(&mut self, iter: T) {
        for p in iter {
            self.append_point(p);
        }
    }
}

/// 非负整数平方根 (向下取整).
#[inline]
fn isqrt(n: i64) -> i32 {
    debug_assert!(n >= 0);
    Roots::sqrt(&n) as i32
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    /// 将 ROI 展开为有序点集, 作为参照模型.
    pub(crate) fn point_set(roi: &Roi) -> BTreeSet<Point> {
        roi.points().collect()
    }

    /// 在 `[0, extent)^2 x [0, 3)` 内随机生成最多 `max_runs` 段区间的 ROI.
    pub(crate) fn arb_roi(extent: i32, max_runs: usize) -> impl Strategy<Value = Roi> {
        prop::collection::vec((0..extent, 0..extent, 0..3i32, 1..5i32), 0..max_runs).prop_map(
            |runs| {
                let mut r = Roi::new();
                for (x, y, z, len) in runs {
                    r.add_interval(x, x + len - 1, y, z);
                }
                r
            },
        )
    }

    pub(crate) fn init_logger() {
        let _ = simple_logger::SimpleLogger::new()
            .with_level(log::LevelFilter::Debug)
            .init();
    }

    #[test]
    fn test_box_count() {
        let mut r = Roi::new();
        r.add_box(Point::new(0, 0, 0), Point::new(2, 2, 0)).unwrap();
        assert_eq!(r.num_pix(), 9);
        assert_eq!(r.num_planes(), 1);
        assert!(r.is_well_formed());
    }

    #[test]
    fn test_invalid_box_is_fatal() {
        let mut r = Roi::new();
        let e = r
            .add_box(Point::new(0, 3, 0), Point::new(2, 2, 0))
            .unwrap_err();
        assert!(e.is_fatal());
        assert!(r.is_empty());
    }

    #[test]
    fn test_interval_merge_on_same_line() {
        let mut r = Roi::new();
        r.add_interval(5, 5, 4, 4);
        r.add_interval(3, 9, 4, 4);
        let line = r.plane(4).unwrap().line(4).unwrap();
        assert_eq!(line.intervals(), [Interval::new(3, 9)]);
    }

    #[test]
    fn test_first_last_point_in_raster_order() {
        let pts = [
            Point::new(3, 1, 2),
            Point::new(9, 0, 0),
            Point::new(-4, 7, 2),
            Point::new(1, 0, 0),
            Point::new(0, 5, -1),
        ];
        let mut r = Roi::new();
        for p in pts {
            r.add_point(p);
        }
        assert_eq!(r.first_point(), pts.iter().min().copied());
        assert_eq!(r.last_point(), pts.iter().max().copied());
        assert_eq!(r.first_point(), Some(Point::new(0, 5, -1)));
        assert_eq!(r.last_point(), Some(Point::new(-4, 7, 2)));
    }

    #[test]
    fn test_append_matches_add() {
        let pts = [
            Point::new(0, 0, 0),
            Point::new(1, 0, 0),
            Point::new(5, 0, 0),
            Point::new(2, 1, 0),
            Point::new(0, 0, 3),
            // 非光栅顺序: 退化为普通插入
            Point::new(-1, 0, 0),
            Point::new(4, 0, 0),
        ];
        let mut a = Roi::new();
        let mut b = Roi::new();
        for p in pts {
            a.append_point(p);
            b.add_point(p);
        }
        assert_eq!(a, b);
        assert!(a.is_well_formed());
        assert_eq!(a.num_pix(), 7);
    }

    #[test]
    fn test_remove_cascades() {
        let mut r = Roi::new();
        r.add_point(Point::new(1, 1, 1));
        r.add_point(Point::new(2, 1, 1));
        assert!(r.remove_point(Point::new(1, 1, 1)));
        assert!(!r.remove_point(Point::new(1, 1, 1)));
        assert_eq!(r.num_planes(), 1);
        assert!(r.remove_point(Point::new(2, 1, 1)));
        assert!(r.is_empty());
    }

    #[test]
    fn test_circle_and_sphere() {
        let mut c = Roi::new();
        c.add_circle(Point::new(0, 0, 0), 1).unwrap();
        assert_eq!(c.num_pix(), 5);
        c.add_circle(Point::new(10, 10, 0), 2).unwrap();
        assert_eq!(c.num_pix(), 5 + 13);

        let mut s = Roi::new();
        s.add_sphere(Point::new(0, 0, 0), 1).unwrap();
        assert_eq!(s.num_pix(), 7);
        assert!(s.add_sphere(Point::origin(), 0).unwrap_err().is_fatal());
        assert!(c.add_circle(Point::origin(), -2).unwrap_err().is_fatal());
    }

    #[test]
    fn test_bounds_and_centroid() {
        let mut r = Roi::new();
        r.add_box(Point::new(0, 0, 1), Point::new(3, 1, 1)).unwrap();
        r.add_point(Point::new(-5, 9, 4));
        assert_eq!(
            r.bounding_box(1),
            Some((Point::new(0, 0, 1), Point::new(3, 1, 1)))
        );
        assert_eq!(r.bounding_box(2), None);
        assert_eq!(
            r.bounding_cube(),
            Some((Point::new(-5, 0, 1), Point::new(3, 9, 4)))
        );
        let c = r.centroid(1).unwrap();
        assert!((c.x - 1.5).abs() < 1e-12);
        assert!((c.y - 0.5).abs() < 1e-12);
        assert_eq!(r.centroid(0), None);
        assert_eq!(Roi::new().bounding_cube(), None);
    }

    #[test]
    fn test_centered_box() {
        let k = Roi::centered_box(4, 3, 1).unwrap();
        assert_eq!(
            k.bounding_cube(),
            Some((Point::new(-2, -1, 0), Point::new(1, 1, 0)))
        );
        assert_eq!(k.num_pix(), 12);
        assert!(Roi::centered_box(0, 1, 1).unwrap_err().is_fatal());
        assert_eq!(Roi::cross_2d().num_pix(), 5);
    }

    #[test]
    fn test_isqrt() {
        for n in 0..200i64 {
            let r = isqrt(n) as i64;
            assert!(r * r <= n && (r + 1) * (r + 1) > n);
        }
    }
}
