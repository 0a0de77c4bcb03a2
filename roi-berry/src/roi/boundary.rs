//! 平面边界追踪.
//!
//! 坐标系取 x 向右, y 向上. 追踪过程中 ROI 内部始终位于前进方向的左侧,
//! 所以外轮廓为逆时针, 孔洞轮廓为顺时针.
//!
//! 每一步在前右, 正前, 前左三个候选像素中按顺序选择第一个属于 ROI 的;
//! 三者都不属于时原地左转. 回到起始状态 (位置与朝向都相同) 时结束.

use super::raster::Raster;
use super::Roi;
use crate::consts::BOUNDARY_MAX_RETRIES;
use crate::rle::Plane;
use crate::{Connectivity, Contour, Point};
use log::warn;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Heading {
    E,
    N,
    W,
    S,
}

impl Heading {
    #[inline]
    fn delta(self) -> (i32, i32) {
        match self {
            Heading::E => (1, 0),
            Heading::N => (0, 1),
            Heading::W => (-1, 0),
            Heading::S => (0, -1),
        }
    }

    /// 逆时针旋转 90 度.
    #[inline]
    fn left(self) -> Self {
        match self {
            Heading::E => Heading::N,
            Heading::N => Heading::W,
            Heading::W => Heading::S,
            Heading::S => Heading::E,
        }
    }

    /// 顺时针旋转 90 度.
    #[inline]
    fn right(self) -> Self {
        match self {
            Heading::E => Heading::S,
            Heading::S => Heading::W,
            Heading::W => Heading::N,
            Heading::N => Heading::E,
        }
    }
}

#[inline]
fn step((x, y): (i32, i32), h: Heading) -> (i32, i32) {
    let (dx, dy) = h.delta();
    (x + dx, y + dy)
}

/// 从 `start` 出发, 以朝向 `heading` 追踪一条闭合轮廓.
///
/// 连续左转超过 [`BOUNDARY_MAX_RETRIES`] 次, 或总步数超过 `max_steps` 时,
/// 轮廓被截断并按原样返回.
fn trace(plane: &Plane, start: (i32, i32), heading: Heading, max_steps: usize) -> Vec<Point> {
    let z = plane.z();
    let inside = |(x, y): (i32, i32)| plane.contains(x, y);
    let mut ans = vec![Point::new(start.0, start.1, z)];
    let (mut p, mut d) = (start, heading);
    let mut failures = 0;

    for _ in 0..max_steps {
        let ahead = step(p, d);
        let candidates = [
            (step(ahead, d.right()), d.right()),
            (ahead, d),
            (step(ahead, d.left()), d),
        ];
        match candidates.into_iter().find(|&(c, _)| inside(c)) {
            Some((c, nd)) => {
                p = c;
                d = nd;
                failures = 0;
                ans.push(Point::new(p.0, p.1, z));
            }
            None => {
                failures += 1;
                if failures > BOUNDARY_MAX_RETRIES {
                    warn!("边界追踪在 {:?} 处连续失败, 轮廓被截断", p);
                    return ans;
                }
                d = d.left();
            }
        }
        if (p, d) == (start, heading) {
            if ans.len() > 1 && ans.last() == ans.first() {
                ans.pop();
            }
            return ans;
        }
    }
    warn!("边界追踪超过 {max_steps} 步, 轮廓被截断");
    ans
}

impl Roi {
    /// 平面 `z` 上的所有轮廓: 先是每个 8-连通区域的外轮廓,
    /// 然后是每个孔洞 (4-连通背景区域) 的内轮廓. 各自按起点的光栅顺序排列.
    ///
    /// ROI 内部始终位于轮廓前进方向的左侧. 平面不存在时返回空表.
    pub fn boundaries(&self, z: i32) -> Vec<Contour> {
        let Some(plane) = self.plane(z) else {
            return vec![];
        };
        let max_steps = 4 * plane.num_pix() as usize + 16;
        let mut ans = vec![];

        for comp in self.components_2d(z) {
            if let Some(p) = comp.first_point() {
                ans.push(Contour::new(trace(plane, (p.x, p.y), Heading::E, max_steps)));
            }
        }

        let Some((x1, y1, x2, y2)) = plane.bounds() else {
            return ans;
        };
        let Some(mut raster) = Raster::covering((x1, y1), (x2, y2), 1) else {
            warn!("平面 z = {z} 过大, 忽略孔洞轮廓");
            return ans;
        };
        for line in plane.lines() {
            raster.mark_line(line);
        }
        raster.flood_exterior();
        let mut holes = Roi::new();
        raster.holes_into(&mut holes, z);

        for hole in holes.components(Connectivity::Four) {
            // 孔洞第一个点正下方的像素一定属于 ROI
            if let Some(h) = hole.first_point() {
                ans.push(Contour::new(trace(plane, (h.x, h.y - 1), Heading::W, max_steps)));
            }
        }
        ans
    }
}
