//! 重采样与坐标变换.

use super::Roi;
use crate::rle::{Interval, Line};
use crate::{Invariant, Point, RoiResult};
use itertools::Itertools;
use log::debug;
use num::Integer;

#[inline]
fn check_steps(xs: i32, ys: i32, zs: i32) -> RoiResult<()> {
    if xs < 1 || ys < 1 || zs < 1 {
        return Err(Invariant::NonPositiveStep(xs, ys, zs).into());
    }
    Ok(())
}

/// `v * s + (s - 1)` 是否在 `i32` 范围内?
#[inline]
fn scale_fits(v: i32, s: i32) -> bool {
    v.checked_mul(s).and_then(|m| m.checked_add(s - 1)).is_some()
}

impl Roi {
    /// 只包含平面 `z` 的新 ROI.
    pub fn plane_roi(&self, z: i32) -> Roi {
        match self.plane(z) {
            Some(p) => Roi::from_sorted(vec![p.clone()]),
            None => Roi::new(),
        }
    }

    /// 降采样: 新坐标 `(x / xs, y / ys, z / zs)`, 只保留原坐标恰为步长整数倍的点.
    ///
    /// 采样前先以 `xs * ys * zs` 的居中长方体处理原 ROI: 保守模式腐蚀 (结果偏小),
    /// 非保守模式膨胀 (结果偏大). `self` 保持不变.
    ///
    /// 任一步长小于 1 时返回致命错误.
    pub fn subsample(&self, xs: i32, ys: i32, zs: i32, conservative: bool) -> RoiResult<Roi> {
        check_steps(xs, ys, zs)?;
        let kernel = Roi::centered_box(xs, ys, zs)?;
        let src = if conservative {
            self.eroded(&kernel)
        } else {
            self.dilated(&kernel)
        };

        let mut ans = Roi::new();
        for plane in src.planes.iter() {
            let (nz, rz) = plane.z().div_mod_floor(&zs);
            if rz != 0 {
                continue;
            }
            for line in plane.lines() {
                let (ny, ry) = line.y().div_mod_floor(&ys);
                if ry != 0 {
                    continue;
                }
                for iv in line.intervals() {
                    let lo = Integer::div_ceil(&iv.x1(), &xs);
                    let hi = Integer::div_floor(&iv.x2(), &xs);
                    if lo <= hi {
                        ans.append_interval(lo, hi, ny, nz);
                    }
                }
            }
        }
        debug!(
            "降采样 ({xs}, {ys}, {zs}), 保守: {conservative}: {} -> {} 点",
            self.num_pix(),
            ans.num_pix()
        );
        Ok(ans)
    }

    /// 升采样: 每个点 `(x, y, z)` 映射为 `(x * xs, y * ys, z * zs)`, 再以
    /// 正方向的长方体膨胀填补空隙. 非保守模式的核宽度为步长 (恰好铺满),
    /// 保守模式为步长的一半 (至少 1). `self` 保持不变.
    ///
    /// 任一步长小于 1, 或缩放后的坐标 (含填补的空隙) 超出 `i32` 范围时返回致命错误.
    pub fn upsample(&self, xs: i32, ys: i32, zs: i32, conservative: bool) -> RoiResult<Roi> {
        check_steps(xs, ys, zs)?;
        if let Some((lo, hi)) = self.bounding_cube() {
            // 缩放是单调的, 只需检查两个角点
            for p in [lo, hi] {
                if !(scale_fits(p.x, xs) && scale_fits(p.y, ys) && scale_fits(p.z, zs)) {
                    return Err(Invariant::ScaleOverflow(p, Point::new(xs, ys, zs)).into());
                }
            }
        }
        let width = |s: i32| if conservative { (s / 2).max(1) } else { s };
        let kernel = Roi::kernel_box(
            Point::origin(),
            Point::new(width(xs) - 1, width(ys) - 1, width(zs) - 1),
        )?;

        let mut scaled = Roi::new();
        for (z, y, iv) in self.intervals() {
            if xs == 1 {
                scaled.append_interval(iv.x1(), iv.x2(), y * ys, z * zs);
            } else {
                for x in iv.x1()..=iv.x2() {
                    scaled.append_point(Point::new(x * xs, y * ys, z * zs));
                }
            }
        }
        let ans = scaled.dilated(&kernel);
        debug!(
            "升采样 ({xs}, {ys}, {zs}), 保守: {conservative}: {} -> {} 点",
            self.num_pix(),
            ans.num_pix()
        );
        Ok(ans)
    }

    /// 就地平移 `d`.
    pub fn translate(&mut self, d: Point) {
        for plane in self.planes.iter_mut() {
            plane.set_z(plane.z() + d.z);
            for line in plane.lines_mut().iter_mut() {
                line.set_y(line.y() + d.y);
                line.shift_x(d.x);
            }
        }
    }

    /// 就地裁剪到以 `tl`, `br` 为对角的长方体 (包含边界).
    ///
    /// `tl` 必须在每个分量上都不大于 `br`, 否则返回致命错误, ROI 保持不变.
    pub fn crop(&mut self, tl: Point, br: Point) -> RoiResult<()> {
        if !tl.le_componentwise(&br) {
            return Err(Invariant::InvalidBox { tl, br }.into());
        }
        let clip = Line::with_interval(0, Interval::new(tl.x, br.x));
        self.planes.retain(|p| (tl.z..=br.z).contains(&p.z()));
        for plane in self.planes.iter_mut() {
            let lines = plane.lines_mut();
            lines.retain(|l| (tl.y..=br.y).contains(&l.y()));
            for line in lines.iter_mut() {
                *line = line.intersect(&clip);
            }
            lines.retain(|l| !l.is_empty());
        }
        self.planes.retain(|p| !p.is_empty());
        Ok(())
    }

    /// 通过索引表重新映射平面坐标: 平面 `z` 变为 `table[z]`.
    /// 映射到同一坐标的平面被合并.
    ///
    /// 存在 `z` 不是 `table` 的合法索引时返回致命错误, ROI 保持不变.
    pub fn inverse_map_z(&mut self, table: &[i32]) -> RoiResult<()> {
        if let Some(p) = self
            .planes
            .iter()
            .find(|p| usize::try_from(p.z()).map_or(true, |i| i >= table.len()))
        {
            return Err(Invariant::IndexOutOfRange(p.z(), table.len()).into());
        }

        let mut planes = std::mem::take(&mut self.planes);
        for plane in planes.iter_mut() {
            plane.set_z(table[plane.z() as usize]);
        }
        planes.sort_by_key(|p| p.z());
        self.planes = planes
            .into_iter()
            .coalesce(|a, b| {
                if a.z() == b.z() {
                    Ok(a.union(&b))
                } else {
                    Err((a, b))
                }
            })
            .collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{arb_roi, point_set};
    use crate::{Point, Roi};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_subsample_isolated_point() {
        let mut r = Roi::new();
        r.add_point(Point::new(5, 5, 5));
        let c = r.subsample(4, 4, 4, true).unwrap();
        assert!(c.is_empty());
        let n = r.subsample(4, 4, 4, false).unwrap();
        assert_eq!(point_set(&n), [Point::new(1, 1, 1)].into_iter().collect::<BTreeSet<_>>());
        // 原 ROI 不变
        assert_eq!(r.num_pix(), 1);
    }

    #[test]
    fn test_non_positive_steps_are_fatal() {
        let r = Roi::new();
        assert!(r.subsample(0, 1, 1, true).unwrap_err().is_fatal());
        assert!(r.upsample(1, -2, 1, false).unwrap_err().is_fatal());
    }

    #[test]
    fn test_subsample_negative_coordinates() {
        let mut r = Roi::new();
        r.add_box(Point::new(-8, -4, 0), Point::new(7, 3, 0)).unwrap();
        let s = r.subsample(2, 2, 1, true).unwrap();
        // 腐蚀后 x 属于 [-7, 7], y 属于 [-3, 3]; 取偶数
        assert_eq!(
            s.bounding_cube(),
            Some((Point::new(-3, -1, 0), Point::new(3, 1, 0)))
        );
        assert_eq!(s.num_pix(), 7 * 3);
    }

    #[test]
    fn test_upsample_overflow_is_fatal() {
        let mut r = Roi::new();
        r.add_point(Point::new(i32::MAX / 2, 0, 0));
        let err = r.upsample(3, 1, 1, false).unwrap_err();
        assert!(err.is_fatal());
        assert!(r.upsample(1, 3, 3, false).is_ok());

        // 负方向同样检查; 结果刚好可以容纳时不报错
        let mut r = Roi::new();
        r.add_point(Point::new(0, i32::MIN / 4, 0));
        assert!(r.upsample(1, 5, 1, true).unwrap_err().is_fatal());
        assert!(r.upsample(1, 4, 1, true).is_ok());
    }

    #[test]
    fn test_upsample_tiles() {
        let mut r = Roi::new();
        r.add_point(Point::new(1, 1, 0));
        r.add_point(Point::new(2, 1, 0));
        let u = r.upsample(3, 3, 2, false).unwrap();
        assert_eq!(u.num_pix(), 2 * 3 * 3 * 2);
        assert_eq!(
            u.bounding_cube(),
            Some((Point::new(3, 3, 0), Point::new(8, 5, 1)))
        );
        let c = r.upsample(3, 3, 2, true).unwrap();
        // 核宽度 (1, 1, 1)
        assert_eq!(c.num_pix(), 2);
        assert!(c.in_roi(Point::new(6, 3, 0)));
    }

    #[test]
    fn test_translate_crop() {
        let mut r = Roi::new();
        r.add_box(Point::new(0, 0, 0), Point::new(4, 4, 4)).unwrap();
        r.translate(Point::new(-2, 10, 3));
        assert_eq!(
            r.bounding_cube(),
            Some((Point::new(-2, 10, 3), Point::new(2, 14, 7)))
        );
        r.crop(Point::new(0, 12, 7), Point::new(9, 99, 9)).unwrap();
        assert_eq!(r.num_pix(), 3 * 3);
        assert!(r.is_well_formed());
        assert!(r
            .crop(Point::new(1, 0, 0), Point::new(0, 0, 0))
            .unwrap_err()
            .is_fatal());
        assert_eq!(r.num_pix(), 9);
        r.crop(Point::new(100, 0, 0), Point::new(200, 200, 200)).unwrap();
        assert!(r.is_empty());
    }

    #[test]
    fn test_inverse_map_z() {
        let mut r = Roi::new();
        r.add_point(Point::new(0, 0, 0));
        r.add_point(Point::new(1, 0, 1));
        r.add_point(Point::new(5, 0, 2));
        let before = r.clone();
        assert!(r.inverse_map_z(&[7, 3]).unwrap_err().is_fatal());
        assert_eq!(r, before);

        r.inverse_map_z(&[12, 4, 12]).unwrap();
        assert_eq!(r.plane_zs(), [4, 12]);
        assert_eq!(r.plane_num_pix(12), 2);
        assert!(r.is_well_formed());
    }

    proptest! {
        #[test]
        fn prop_translate_is_pointwise(a in arb_roi(10, 16), dx in -5..5i32, dy in -5..5i32, dz in -5..5i32) {
            let d = Point::new(dx, dy, dz);
            let mut t = a.clone();
            t.translate(d);
            prop_assert!(t.is_well_formed());
            prop_assert_eq!(point_set(&t), point_set(&a).into_iter().map(|p| p + d).collect::<BTreeSet<_>>());
        }

        #[test]
        fn prop_subsample_brackets(a in arb_roi(16, 20)) {
            let c = a.subsample(2, 2, 1, true).unwrap();
            let n = a.subsample(2, 2, 1, false).unwrap();
            prop_assert!(point_set(&c).is_subset(&point_set(&n)));
        }
    }
}
