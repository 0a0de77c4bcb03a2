//! 连通区域转移.
//!
//! 以区间为单位做广度优先搜索: 从种子所在区间出发, 在相邻的行 (或平面) 上
//! 查找与之相邻的区间, 因此代价与区间数而不是点数成正比.

use super::Roi;
use crate::consts::{N26_LINE_OFFSETS, N4_LINE_OFFSETS};
use crate::rle::Interval;
use crate::Point;
use std::collections::{HashSet, VecDeque};

/// 邻接规则.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Connectivity {
    /// 平面内 4-邻接.
    Four,
    /// 平面内 8-邻接.
    Eight,
    /// 三维 26-邻接.
    TwentySix,
}

impl Connectivity {
    /// 需要查看的 `(dy, dz)` 行偏移.
    fn line_offsets(self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::Four | Connectivity::Eight => &N4_LINE_OFFSETS,
            Connectivity::TwentySix => &N26_LINE_OFFSETS,
        }
    }

    /// 区间 `[a, b]` 在相邻行上的搜索范围向两侧扩展的宽度.
    fn reach(self) -> i64 {
        match self {
            Connectivity::Four => 0,
            Connectivity::Eight | Connectivity::TwentySix => 1,
        }
    }
}

impl Roi {
    /// 把 `source` 中与 `seed` 平面内 4-连通的所有点加入 `self`.
    /// `sub` 为真时同时从 `source` 中删除这些点. 返回转移的点数.
    ///
    /// `seed` 不在 `source` 中时什么也不做, 返回 0.
    #[inline]
    pub fn add_contig(&mut self, source: &mut Roi, seed: Point, sub: bool) -> u64 {
        self.add_contig_with(source, seed, Connectivity::Four, sub)
    }

    /// 同 [`Self::add_contig`], 但使用三维 26-邻接.
    #[inline]
    pub fn add_contig_3d(&mut self, source: &mut Roi, seed: Point, sub: bool) -> u64 {
        self.add_contig_with(source, seed, Connectivity::TwentySix, sub)
    }

    /// 按指定邻接规则转移连通区域.
    pub fn add_contig_with(
        &mut self,
        source: &mut Roi,
        seed: Point,
        conn: Connectivity,
        sub: bool,
    ) -> u64 {
        let found = source.contig_region(seed, conn);
        if found.is_empty() {
            return 0;
        }
        self.or(&found);
        if sub {
            source.subtract(&found);
        }
        found.num_pix()
    }

    /// 包含 `seed` 的连通区域. `seed` 不在 ROI 内时返回空 ROI.
    fn contig_region(&self, seed: Point, conn: Connectivity) -> Roi {
        let Some(start) = self
            .plane(seed.z)
            .and_then(|p| p.line(seed.y))
            .and_then(|l| l.find_interval(seed.x).ok().map(|idx| l.intervals()[idx]))
        else {
            return Roi::new();
        };

        let mut visited: HashSet<(i32, i32, i32)> = HashSet::with_capacity(16);
        let mut bfs_q = VecDeque::with_capacity(4);
        let mut runs: Vec<(i32, i32, Interval)> = Vec::new();
        bfs_q.push_back((seed.z, seed.y, start));
        visited.insert((seed.z, seed.y, start.x1()));

        while let Some((z, y, iv)) = bfs_q.pop_front() {
            runs.push((z, y, iv));
            let lo = iv.x1() as i64 - conn.reach();
            let hi = iv.x2() as i64 + conn.reach();
            for &(dy, dz) in conn.line_offsets() {
                let (ny, nz) = (y + dy, z + dz);
                let Some(line) = self.plane(nz).and_then(|p| p.line(ny)) else {
                    continue;
                };
                let ivs = line.intervals();
                let from = ivs.partition_point(|c| (c.x2() as i64) < lo);
                for c in ivs[from..].iter().take_while(|c| c.x1() as i64 <= hi) {
                    if visited.insert((nz, ny, c.x1())) {
                        bfs_q.push_back((nz, ny, *c));
                    }
                }
            }
        }

        runs.sort_unstable_by_key(|&(z, y, iv)| (z, y, iv.x1()));
        let mut ans = Roi::new();
        for (z, y, iv) in runs {
            ans.append_interval(iv.x1(), iv.x2(), y, z);
        }
        ans
    }

    /// 按邻接规则把整个 ROI 拆分为连通区域, 按各区域第一个点的光栅顺序排列.
    pub fn components(&self, conn: Connectivity) -> Vec<Roi> {
        let mut rest = self.clone();
        let mut ans = vec![];
        while let Some(seed) = rest.first_point() {
            let mut comp = Roi::new();
            comp.add_contig_with(&mut rest, seed, conn, true);
            ans.push(comp);
        }
        ans
    }

    /// 平面 `z` 上的 8-连通区域.
    #[inline]
    pub fn components_2d(&self, z: i32) -> Vec<Roi> {
        self.components_2d_with(z, Connectivity::Eight)
    }

    /// 平面 `z` 上按指定规则划分的连通区域. 26-邻接在单个平面上等同于 8-邻接.
    pub fn components_2d_with(&self, z: i32, conn: Connectivity) -> Vec<Roi> {
        self.plane_roi(z).components(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::Connectivity;
    use crate::{Point, Roi};

    fn diagonal_pair() -> Roi {
        let mut r = Roi::new();
        r.add_box(Point::new(0, 0, 0), Point::new(1, 1, 0)).unwrap();
        r.add_box(Point::new(2, 2, 0), Point::new(3, 3, 0)).unwrap();
        r
    }

    #[test]
    fn test_four_vs_eight() {
        let r = diagonal_pair();
        assert_eq!(r.components_2d_with(0, Connectivity::Four).len(), 2);
        assert_eq!(r.components_2d(0).len(), 1);
    }

    #[test]
    fn test_transfer_with_sub() {
        let mut src = diagonal_pair();
        src.add_point(Point::new(9, 9, 0));
        let mut dst = Roi::new();
        assert_eq!(dst.add_contig(&mut src, Point::new(3, 3, 0), true), 4);
        assert_eq!(dst.num_pix(), 4);
        assert_eq!(src.num_pix(), 5);
        assert!(!src.in_roi(Point::new(2, 2, 0)));

        // 种子不在源 ROI 中
        assert_eq!(dst.add_contig(&mut src, Point::new(3, 3, 0), true), 0);
        // 不删除时源保持不变
        let before = src.clone();
        assert_eq!(dst.add_contig(&mut src, Point::new(0, 0, 0), false), 4);
        assert_eq!(src, before);
        assert_eq!(dst.num_pix(), 8);
    }

    #[test]
    fn test_3d_reaches_diagonal_planes() {
        let mut src = Roi::new();
        src.add_point(Point::new(0, 0, 0));
        src.add_point(Point::new(1, 1, 1));
        src.add_point(Point::new(1, 1, 3));
        let mut dst = Roi::new();
        assert_eq!(dst.add_contig_3d(&mut src.clone(), Point::origin(), false), 2);
        assert_eq!(src.components(Connectivity::TwentySix).len(), 2);
        assert_eq!(src.components(Connectivity::Eight).len(), 3);
    }

    #[test]
    fn test_u_shape_joins_through_bottom() {
        // U 形: 两根竖条只通过底部相连, 需要多次往返搜索
        let mut r = Roi::new();
        r.add_box(Point::new(0, 0, 0), Point::new(0, 5, 0)).unwrap();
        r.add_box(Point::new(4, 0, 0), Point::new(4, 5, 0)).unwrap();
        r.add_interval(0, 4, 5, 0);
        let comps = r.components_2d_with(0, Connectivity::Four);
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0], r);
    }
}
