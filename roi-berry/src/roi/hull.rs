//! 逐平面二维凸包.

use super::morph::SQUARE_3X3;
use super::Roi;
use crate::{Contour, Point};
use binary_heap_plus::BinaryHeap;
use log::warn;
use std::cmp::Ordering;

/// `(a - o) x (b - o)`. 为正时 `o -> a -> b` 逆时针转.
#[inline]
fn cross(o: Point, a: Point, b: Point) -> i64 {
    let (ax, ay) = (a.x as i64 - o.x as i64, a.y as i64 - o.y as i64);
    let (bx, by) = (b.x as i64 - o.x as i64, b.y as i64 - o.y as i64);
    ax * by - ay * bx
}

#[inline]
fn dist2(o: Point, a: Point) -> i64 {
    (a.x as i64 - o.x as i64).pow(2) + (a.y as i64 - o.y as i64).pow(2)
}

/// Graham 扫描. 返回逆时针排列的凸包顶点, 不含共线的中间点.
pub(super) fn graham_scan(points: &[Point]) -> Vec<Point> {
    let mut pts = points.to_vec();
    pts.sort_unstable_by_key(|p| (p.y, p.x));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    // 基点 y 最小 (其次 x 最小), 其余点都位于其上方的半平面, 因此按叉积排序是全序.
    let pivot = pts[0];
    pts[1..].sort_unstable_by(|&a, &b| match cross(pivot, a, b).cmp(&0) {
        Ordering::Greater => Ordering::Less,
        Ordering::Less => Ordering::Greater,
        Ordering::Equal => dist2(pivot, a).cmp(&dist2(pivot, b)),
    });

    let mut stack: Vec<Point> = Vec::with_capacity(pts.len());
    for &p in pts.iter() {
        // 共线也必须前进
        while stack.len() >= 2 && cross(stack[stack.len() - 2], stack[stack.len() - 1], p) <= 0 {
            stack.pop();
        }
        stack.push(p);
    }
    stack
}

impl Roi {
    /// 平面 `z` 上所有像素中心的凸包顶点, 逆时针排列. 平面不存在时为空.
    ///
    /// 只有每行区间的端点可能成为顶点.
    pub fn hull_vertices(&self, z: i32) -> Vec<Point> {
        let Some(plane) = self.plane(z) else {
            return Vec::new();
        };
        let ends: Vec<Point> = plane
            .lines()
            .iter()
            .flat_map(|line| {
                let (y, first, last) = (line.y(), line.first(), line.last());
                first
                    .map(|iv| Point::new(iv.x1(), y, z))
                    .into_iter()
                    .chain(last.map(|iv| Point::new(iv.x2(), y, z)))
            })
            .collect();
        graham_scan(&ends)
    }

    /// 就地替换为每个平面的二维凸包.
    ///
    /// 先以 3x3 方形膨胀消除单像素宽的自接触, 然后从最长的轮廓开始,
    /// 对不在已有凸包内的每条轮廓求凸包并扫描转换, 最后以同一结构元腐蚀回去.
    /// 结果总是包含原 ROI. 某个平面的凸包包围盒超过 [`crate::consts::POLYGON_RASTER_LIMIT`]
    /// 时, 该平面只做闭运算.
    pub fn convex_hull(&mut self) {
        let mut ans = Roi::new();
        for z in self.plane_zs() {
            let grown = self.plane_roi(z).dilated(&SQUARE_3X3);

            // 堆顶为最长的轮廓
            let mut heap: BinaryHeap<Contour, _> =
                BinaryHeap::new_by(|a: &Contour, b: &Contour| a.len().cmp(&b.len()));
            heap.extend(grown.boundaries(z));

            let mut hulls = Roi::new();
            while let Some(contour) = heap.pop() {
                if contour.points().first().is_some_and(|&p| hulls.in_roi(p)) {
                    continue;
                }
                if !hulls.add_planar_polygon(&graham_scan(contour.points())) {
                    // 凸包无法扫描转换, 该平面保持原样
                    warn!("平面 z = {z} 的凸包过大, 保留原平面");
                    hulls.or(&grown);
                    break;
                }
            }
            ans.or(&hulls.eroded(&SQUARE_3X3));
        }
        *self = ans;
    }
}

#[cfg(test)]
mod tests {
    use super::{graham_scan, Point};
    use crate::Roi;

    #[test]
    fn test_graham_scan_drops_collinear() {
        let pts: Vec<_> = [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (1, 1), (0, 2), (1, 2)]
            .iter()
            .map(|&(x, y)| Point::new(x, y, 0))
            .collect();
        let hull = graham_scan(&pts);
        assert_eq!(
            hull,
            [
                Point::new(0, 0, 0),
                Point::new(2, 0, 0),
                Point::new(2, 2, 0),
                Point::new(0, 2, 0)
            ]
        );
    }

    #[test]
    fn test_oversized_hull_keeps_plane() {
        // L 形平面, 凸包包围盒约 9001 x 9001, 超过扫描转换的上限
        let mut r = Roi::new();
        r.add_interval(0, 9000, 0, 0);
        for y in 1..=9000 {
            r.add_point(Point::new(0, y, 0));
        }
        r.add_interval(3, 5, 2, 1);
        let n = r.num_pix();
        assert_eq!(n, 18001 + 3);

        let mut h = r.clone();
        h.convex_hull();
        assert_eq!(h.plane_roi(0), r.plane_roi(0));
        assert_eq!(h.plane_roi(1), r.plane_roi(1));
        assert_eq!(h.num_pix(), n);
    }

    #[test]
    fn test_hull_vertices_of_box() {
        let mut r = Roi::new();
        r.add_box(Point::new(2, 3, 5), Point::new(6, 4, 5)).unwrap();
        assert_eq!(
            r.hull_vertices(5),
            [
                Point::new(2, 3, 5),
                Point::new(6, 3, 5),
                Point::new(6, 4, 5),
                Point::new(2, 4, 5)
            ]
        );
        assert!(r.hull_vertices(0).is_empty());
        r.add_point(Point::new(0, 0, 1));
        assert_eq!(r.hull_vertices(1), [Point::new(0, 0, 1)]);
    }

    #[test]
    fn test_box_is_fixed_point() {
        let mut r = Roi::new();
        r.add_box(Point::new(0, 0, 0), Point::new(4, 3, 1)).unwrap();
        let before = r.clone();
        r.convex_hull();
        assert_eq!(r, before);
    }

    #[test]
    fn test_l_shape_and_ring() {
        let mut l = Roi::new();
        l.add_box(Point::new(0, 0, 0), Point::new(9, 1, 0)).unwrap();
        l.add_box(Point::new(0, 0, 0), Point::new(1, 9, 0)).unwrap();
        let mut hull = l.clone();
        hull.convex_hull();
        let mut diff = l.clone();
        diff.subtract(&hull);
        assert!(diff.is_empty());
        assert!(hull.num_pix() > l.num_pix());
        assert!(hull.in_roi(Point::new(4, 4, 0)));
        assert!(!hull.in_roi(Point::new(8, 8, 0)));

        // 孔洞被凸包覆盖
        let mut ring = Roi::new();
        ring.add_box(Point::new(0, 0, 2), Point::new(6, 6, 2)).unwrap();
        let mut inner = Roi::new();
        inner.add_box(Point::new(2, 2, 2), Point::new(4, 4, 2)).unwrap();
        ring.subtract(&inner);
        ring.convex_hull();
        assert_eq!(ring.num_pix(), 49);
    }
}
