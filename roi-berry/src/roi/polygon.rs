//! 多边形扫描转换与孔洞填充.

use super::raster::Raster;
use super::Roi;
use crate::Point;
use log::{debug, warn};

/// 以 Bresenham 算法生成从 `a` 到 `b` 的 8-连通格点序列, 不含 `b`.
fn bresenham((x0, y0): (i32, i32), (x1, y1): (i32, i32), out: &mut Vec<(i32, i32)>) {
    let dx = (x1 as i64 - x0 as i64).abs();
    let dy = -(y1 as i64 - y0 as i64).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let (mut x, mut y) = (x0, y0);
    let mut err = dx + dy;
    while (x, y) != (x1, y1) {
        out.push((x, y));
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

impl Roi {
    /// 把平面多边形 (含边界) 加入 ROI. 多边形所在平面取第一个顶点的 `z`.
    ///
    /// 顶点序列首尾自动闭合, 每条边以 8-连通格点连接, 然后所有不能从外部 4-连通到达的
    /// 像素都被视为内部, 因此自接触或自相交的多边形也能得到确定的结果.
    ///
    /// 多边形包围盒超过 [`crate::consts::POLYGON_RASTER_LIMIT`] 时不添加任何点, 返回 `false`.
    pub fn add_planar_polygon(&mut self, vertices: &[Point]) -> bool {
        let Some(first) = vertices.first() else {
            return false;
        };
        let z = first.z;
        if vertices.iter().any(|p| p.z != z) {
            warn!("多边形顶点不在同一平面, 按 z = {z} 处理");
        }

        let mut boundary = Vec::with_capacity(vertices.len() * 2);
        for (a, b) in vertices.iter().zip(vertices.iter().cycle().skip(1)) {
            bresenham((a.x, a.y), (b.x, b.y), &mut boundary);
        }
        if boundary.is_empty() {
            // 所有顶点重合
            boundary.push((first.x, first.y));
        }

        let (mut lo, mut hi) = (boundary[0], boundary[0]);
        for &(x, y) in boundary.iter() {
            lo = (lo.0.min(x), lo.1.min(y));
            hi = (hi.0.max(x), hi.1.max(y));
        }
        let Some(mut raster) = Raster::covering(lo, hi, 1) else {
            warn!("多边形包围盒 {lo:?} - {hi:?} 过大, 未添加任何点");
            return false;
        };
        for &(x, y) in boundary.iter() {
            raster.mark(x, y);
        }
        raster.flood_exterior();
        if !raster.origin_is_exterior() {
            warn!("多边形扫描转换溢出, 未添加任何点");
            return false;
        }

        let mut poly = Roi::new();
        raster.interior_into(&mut poly, z);
        debug!("多边形 ({} 个顶点) 覆盖 {} 点", vertices.len(), poly.num_pix());
        self.or(&poly);
        true
    }

    /// 逐平面填充孔洞: 不能从平面包围盒外 4-连通到达的背景像素被加入 ROI.
    /// 返回新增的点数.
    pub fn fill_holes_2d(&mut self) -> u64 {
        let mut holes = Roi::new();
        let mut total = 0;
        for plane in self.planes.iter() {
            let Some((x1, y1, x2, y2)) = plane.bounds() else {
                continue;
            };
            let Some(mut raster) = Raster::covering((x1, y1), (x2, y2), 1) else {
                warn!("平面 z = {} 过大, 跳过孔洞填充", plane.z());
                continue;
            };
            for line in plane.lines() {
                raster.mark_line(line);
            }
            raster.flood_exterior();
            total += raster.holes_into(&mut holes, plane.z());
        }
        self.or(&holes);
        total
    }
}

#[cfg(test)]
mod tests {
    use super::bresenham;
    use crate::{Point, Roi};

    #[test]
    fn test_bresenham_is_8_connected() {
        let mut v = vec![];
        bresenham((0, 0), (5, 2), &mut v);
        assert_eq!(v.len(), 5);
        assert_eq!(v[0], (0, 0));
        for w in v.windows(2) {
            assert!((w[0].0 - w[1].0).abs() <= 1 && (w[0].1 - w[1].1).abs() <= 1);
        }
        v.clear();
        bresenham((3, 3), (3, 3), &mut v);
        assert!(v.is_empty());
    }

    #[test]
    fn test_rectangle_polygon() {
        let mut r = Roi::new();
        let verts = [
            Point::new(0, 0, 2),
            Point::new(4, 0, 2),
            Point::new(4, 3, 2),
            Point::new(0, 3, 2),
        ];
        assert!(r.add_planar_polygon(&verts));
        let mut expected = Roi::new();
        expected
            .add_box(Point::new(0, 0, 2), Point::new(4, 3, 2))
            .unwrap();
        assert_eq!(r, expected);
    }

    #[test]
    fn test_triangle_contains_centroid() {
        let mut r = Roi::new();
        let verts = [Point::new(0, 0, 0), Point::new(10, 0, 0), Point::new(0, 10, 0)];
        assert!(r.add_planar_polygon(&verts));
        assert!(r.in_roi(Point::new(3, 3, 0)));
        assert!(!r.in_roi(Point::new(8, 8, 0)));
        // 含斜边, 面积介于 50 与 11 * 12 / 2 之间
        assert!(r.num_pix() >= 50 && r.num_pix() <= 66);
    }

    #[test]
    fn test_degenerate_polygons() {
        let mut r = Roi::new();
        assert!(!r.add_planar_polygon(&[]));
        assert!(r.add_planar_polygon(&[Point::new(1, 1, 1)]));
        assert_eq!(r.num_pix(), 1);
        assert!(r.add_planar_polygon(&[Point::new(0, 5, 1), Point::new(3, 5, 1)]));
        assert_eq!(r.plane_num_pix(1), 1 + 4);
    }

    #[test]
    fn test_huge_polygon_is_silent_noop() {
        let mut r = Roi::new();
        r.add_point(Point::new(0, 0, 0));
        let verts = [
            Point::new(-1_000_000, -1_000_000, 0),
            Point::new(1_000_000, -1_000_000, 0),
            Point::new(0, 1_000_000, 0),
        ];
        assert!(!r.add_planar_polygon(&verts));
        assert_eq!(r.num_pix(), 1);
    }

    #[test]
    fn test_fill_holes() {
        let mut r = Roi::new();
        r.add_box(Point::new(0, 0, 0), Point::new(6, 6, 0)).unwrap();
        r.add_box(Point::new(0, 0, 3), Point::new(2, 2, 3)).unwrap();
        let mut holes = Roi::new();
        holes.add_box(Point::new(2, 2, 0), Point::new(3, 3, 0)).unwrap();
        holes.add_point(Point::new(5, 5, 0));
        holes.add_point(Point::new(1, 1, 3));
        let full = r.clone();
        r.subtract(&holes);
        // 与外部相连的缺口不是孔洞
        r.remove_point(Point::new(6, 3, 0));

        assert_eq!(r.fill_holes_2d(), 4 + 1 + 1);
        let mut expected = full;
        expected.remove_point(Point::new(6, 3, 0));
        assert_eq!(r, expected);
    }
}
