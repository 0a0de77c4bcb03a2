//! 形态学腐蚀/膨胀.
//!
//! 两者共用同一个 "壳" 算法: 枚举结构元的每个区间 `(dy, dz, [sx1, sx2])`,
//! 把整个 ROI 平移 `±(dy, dz)`, 同时把每个区间 `[a, b]` 变换为
//! `[a + sx1, b + sx2]` (膨胀) 或 `[a - sx1, b - sx2]` (腐蚀),
//! 再对所有副本取并 (膨胀) 或取交 (腐蚀).
//!
//! 一个结构元区间等价于它覆盖的所有单点偏移, 所以结果与逐体素定义严格一致.

use super::Roi;
use crate::rle::Plane;
use log::{debug, warn};
use once_cell::sync::Lazy;

/// 平面内 3x3 方形结构元, 以原点为中心.
pub(crate) static SQUARE_3X3: Lazy<Roi> = Lazy::new(|| {
    let mut se = Roi::new();
    for y in -1..=1 {
        se.add_interval(-1, 1, y, 0);
    }
    se
});

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Shell {
    Erode,
    Dilate,
}

impl Roi {
    /// 平移 `(dy, dz)`, 并把每个区间 `[a, b]` 变换为 `[a + lo, b + hi]`.
    /// 变换后为空的区间, 行, 平面都被丢弃.
    fn stretched_copy(&self, dy: i32, dz: i32, lo: i32, hi: i32) -> Roi {
        let planes = self
            .planes
            .iter()
            .filter_map(|p| {
                let lines: Vec<_> = p
                    .lines()
                    .iter()
                    .filter_map(|l| {
                        let mut s = l.stretched(lo, hi);
                        s.set_y(l.y() + dy);
                        (!s.is_empty()).then_some(s)
                    })
                    .collect();
                (!lines.is_empty()).then(|| Plane::from_sorted(p.z() + dz, lines))
            })
            .collect();
        Roi::from_sorted(planes)
    }

    fn shell(&self, se: &Roi, op: Shell) -> Option<Roi> {
        let mut acc: Option<Roi> = None;
        for (dz, dy, iv) in se.intervals() {
            let part = match op {
                Shell::Dilate => self.stretched_copy(dy, dz, iv.x1(), iv.x2()),
                Shell::Erode => self.stretched_copy(-dy, -dz, -iv.x1(), -iv.x2()),
            };
            acc = Some(match acc.take() {
                None => part,
                Some(mut a) => {
                    match op {
                        Shell::Dilate => a.or(&part),
                        Shell::Erode => a.and(&part),
                    }
                    a
                }
            });
            if op == Shell::Erode && acc.as_ref().is_some_and(Roi::is_empty) {
                break;
            }
        }
        acc
    }

    /// 以 `se` 腐蚀后的副本. 结构元为空时返回自身的副本.
    pub(crate) fn eroded(&self, se: &Roi) -> Roi {
        match self.shell(se, Shell::Erode) {
            Some(ans) => ans,
            None => {
                warn!("使用空结构元腐蚀, 忽略");
                self.clone()
            }
        }
    }

    /// 以 `se` 膨胀后的副本. 结构元为空时返回自身的副本.
    pub(crate) fn dilated(&self, se: &Roi) -> Roi {
        match self.shell(se, Shell::Dilate) {
            Some(ans) => ans,
            None => {
                warn!("使用空结构元膨胀, 忽略");
                self.clone()
            }
        }
    }

    /// 就地腐蚀: 保留所有满足 "对 `se` 中每个偏移 `s`, `p + s` 都在 ROI 内" 的点 `p`.
    ///
    /// 空结构元不改变 ROI.
    pub fn erode(&mut self, se: &Roi) {
        let before = self.num_pix();
        *self = self.eroded(se);
        debug!("腐蚀: {before} -> {} 点", self.num_pix());
    }

    /// 就地膨胀: 得到所有 `p + s` 组成的集合, 其中 `p` 在 ROI 内, `s` 在 `se` 内.
    ///
    /// 空结构元不改变 ROI.
    pub fn dilate(&mut self, se: &Roi) {
        let before = self.num_pix();
        *self = self.dilated(se);
        debug!("膨胀: {before} -> {} 点", self.num_pix());
    }

    /// 开运算: 先腐蚀, 再膨胀. 结果总是原 ROI 的子集.
    pub fn open(&mut self, se: &Roi) {
        *self = self.eroded(se).dilated(se);
    }

    /// 闭运算: 先膨胀, 再腐蚀. 结果总是包含原 ROI.
    pub fn close(&mut self, se: &Roi) {
        *self = self.dilated(se).eroded(se);
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{arb_roi, init_logger, point_set};
    use super::SQUARE_3X3;
    use crate::{Point, Roi};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    /// 逐点定义的膨胀.
    fn dilate_model(a: &BTreeSet<Point>, se: &BTreeSet<Point>) -> BTreeSet<Point> {
        a.iter()
            .flat_map(|&p| se.iter().map(move |&s| p + s))
            .collect()
    }

    /// 逐点定义的腐蚀. 候选点只需考虑 `a - s0`.
    fn erode_model(a: &BTreeSet<Point>, se: &BTreeSet<Point>) -> BTreeSet<Point> {
        let Some(&s0) = se.iter().next() else {
            return a.clone();
        };
        a.iter()
            .map(|&p| p - s0)
            .filter(|&q| se.iter().all(|&s| a.contains(&(q + s))))
            .collect()
    }

    #[test]
    fn test_point_and_square() {
        init_logger();
        let mut r = Roi::new();
        r.add_point(Point::new(4, 4, 0));
        r.dilate(&SQUARE_3X3);
        assert_eq!(r.num_pix(), 9);
        assert_eq!(r.bounding_box(0), Some((Point::new(3, 3, 0), Point::new(5, 5, 0))));
        r.erode(&SQUARE_3X3);
        assert_eq!(point_set(&r), [Point::new(4, 4, 0)].into_iter().collect::<BTreeSet<_>>());
        r.erode(&SQUARE_3X3);
        assert!(r.is_empty());
    }

    #[test]
    fn test_empty_structuring_element_is_noop() {
        init_logger();
        let mut r = Roi::new();
        r.add_box(Point::new(0, 0, 0), Point::new(3, 3, 3)).unwrap();
        let before = r.clone();
        r.erode(&Roi::new());
        assert_eq!(r, before);
        r.dilate(&Roi::new());
        assert_eq!(r, before);
    }

    #[test]
    fn test_asymmetric_kernel() {
        let se = Roi::kernel_box(Point::new(0, 0, 0), Point::new(2, 0, 1)).unwrap();
        let mut r = Roi::new();
        r.add_point(Point::new(0, 0, 0));
        r.dilate(&se);
        assert_eq!(r.num_pix(), 6);
        assert!(r.in_roi(Point::new(2, 0, 1)));
        assert!(!r.in_roi(Point::new(-1, 0, 0)));
        r.erode(&se);
        assert_eq!(r.num_pix(), 1);
        assert!(r.in_roi(Point::origin()));
    }

    #[test]
    fn test_box_erosion_shrinks_by_radius() {
        let mut r = Roi::new();
        r.add_box(Point::new(0, 0, 0), Point::new(9, 9, 0)).unwrap();
        let mut hole = Roi::new();
        hole.add_point(Point::new(5, 5, 0));
        r.subtract(&hole);
        r.erode(&SQUARE_3X3);
        // 外圈收缩一格, 孔洞周围的 3x3 被删除
        assert_eq!(r.num_pix(), 64 - 9);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_shell_matches_pointwise(a in arb_roi(10, 16), se in arb_roi(3, 3)) {
            prop_assume!(!se.is_empty());
            let (sa, sse) = (point_set(&a), point_set(&se));
            let d = a.dilated(&se);
            prop_assert!(d.is_well_formed());
            prop_assert_eq!(point_set(&d), dilate_model(&sa, &sse));
            let e = a.eroded(&se);
            prop_assert!(e.is_well_formed());
            prop_assert_eq!(point_set(&e), erode_model(&sa, &sse));
        }

        #[test]
        fn prop_opening_closing_bracket(a in arb_roi(12, 20)) {
            let mut opened = a.clone();
            opened.open(&SQUARE_3X3);
            let mut closed = a.clone();
            closed.close(&SQUARE_3X3);

            let sa = point_set(&a);
            prop_assert!(point_set(&opened).is_subset(&sa));
            prop_assert!(sa.is_subset(&point_set(&closed)));
        }

        #[test]
        fn prop_erosion_dilation_duality(a in arb_roi(12, 20)) {
            let mut universe = Roi::new();
            universe.add_box(Point::new(-3, -3, 0), Point::new(15, 15, 2)).unwrap();
            let mut inner = Roi::new();
            inner.add_box(Point::new(-1, -1, 0), Point::new(13, 13, 2)).unwrap();

            let mut lhs = universe.clone();
            lhs.subtract(&a);
            lhs.dilate(&SQUARE_3X3);
            lhs.and(&inner);

            let mut rhs = inner.clone();
            rhs.subtract(&a.eroded(&SQUARE_3X3));
            prop_assert_eq!(lhs, rhs);
        }
    }
}
