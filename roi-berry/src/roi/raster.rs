//! 单平面临时栅格. 供多边形扫描转换与孔洞填充使用.
//!
//! 栅格以 `(h, w)` 即 `(y - y0, x - x0)` 索引.

use super::Roi;
use crate::consts::POLYGON_RASTER_LIMIT;
use crate::rle::Line;
use ndarray::Array2;
use std::collections::VecDeque;

type Idx2d = (usize, usize);

const BACKGROUND: u8 = 0;
const FOREGROUND: u8 = 1;
const EXTERIOR: u8 = 2;

pub(crate) struct Raster {
    x0: i32,
    y0: i32,
    cells: Array2<u8>,
}

impl Raster {
    /// 覆盖 `[min_x, max_x] x [min_y, max_y]` 且四周各留 `margin` 个像素的空栅格.
    /// 像素数超过 [`POLYGON_RASTER_LIMIT`] 时返回 `None`.
    pub(crate) fn covering(
        (min_x, min_y): (i32, i32),
        (max_x, max_y): (i32, i32),
        margin: i32,
    ) -> Option<Self> {
        debug_assert!(min_x <= max_x && min_y <= max_y && margin >= 0);
        let w = max_x as i64 - min_x as i64 + 1 + 2 * margin as i64;
        let h = max_y as i64 - min_y as i64 + 1 + 2 * margin as i64;
        let (w, h) = (usize::try_from(w).ok()?, usize::try_from(h).ok()?);
        if w.checked_mul(h)? > POLYGON_RASTER_LIMIT {
            return None;
        }
        Some(Self {
            x0: min_x.checked_sub(margin)?,
            y0: min_y.checked_sub(margin)?,
            cells: Array2::zeros((h, w)),
        })
    }

    #[inline]
    fn height(&self) -> usize {
        self.cells.nrows()
    }

    #[inline]
    fn width(&self) -> usize {
        self.cells.ncols()
    }

    #[inline]
    fn idx(&self, x: i32, y: i32) -> Idx2d {
        let (h, w) = (y as i64 - self.y0 as i64, x as i64 - self.x0 as i64);
        assert!(
            (0..self.height() as i64).contains(&h) && (0..self.width() as i64).contains(&w),
            "({x}, {y}) 不在栅格内"
        );
        (h as usize, w as usize)
    }

    /// 标记前景像素.
    #[inline]
    pub(crate) fn mark(&mut self, x: i32, y: i32) {
        let pos = self.idx(x, y);
        self.cells[pos] = FOREGROUND;
    }

    /// 标记一整行.
    pub(crate) fn mark_line(&mut self, line: &Line) {
        for iv in line.intervals() {
            let (h, w1) = self.idx(iv.x1(), line.y());
            let (_, w2) = self.idx(iv.x2(), line.y());
            self.cells
                .row_mut(h)
                .slice_mut(ndarray::s![w1..=w2])
                .fill(FOREGROUND);
        }
    }

    /// 原点处 (左上角) 是否为外部? 外边距不为 0 时总是成立.
    #[inline]
    pub(crate) fn origin_is_exterior(&self) -> bool {
        self.cells.get((0, 0)) == Some(&EXTERIOR)
    }

    /// 从四条边上的所有背景像素出发, 按 4-相邻规则广度优先标记外部区域.
    pub(crate) fn flood_exterior(&mut self) {
        let (height, width) = (self.height(), self.width());
        let mut bfs_q: VecDeque<Idx2d> = VecDeque::with_capacity(2 * (height + width));
        for h in 0..height {
            bfs_q.push_back((h, 0));
            bfs_q.push_back((h, width - 1));
        }
        for w in 0..width {
            bfs_q.push_back((0, w));
            bfs_q.push_back((height - 1, w));
        }

        while let Some(cur_pos) = bfs_q.pop_front() {
            if self.cells[cur_pos] != BACKGROUND {
                continue;
            }
            self.cells[cur_pos] = EXTERIOR;

            let (cur_h, cur_w) = cur_pos;
            if cur_h > 0 && self.cells[(cur_h - 1, cur_w)] == BACKGROUND {
                bfs_q.push_back((cur_h - 1, cur_w));
            }
            if cur_h + 1 < height && self.cells[(cur_h + 1, cur_w)] == BACKGROUND {
                bfs_q.push_back((cur_h + 1, cur_w));
            }
            if cur_w > 0 && self.cells[(cur_h, cur_w - 1)] == BACKGROUND {
                bfs_q.push_back((cur_h, cur_w - 1));
            }
            if cur_w + 1 < width && self.cells[(cur_h, cur_w + 1)] == BACKGROUND {
                bfs_q.push_back((cur_h, cur_w + 1));
            }
        }
    }

    /// 把所有非外部像素 (前景与孔洞) 写入平面 `z`.
    pub(crate) fn interior_into(&self, roi: &mut Roi, z: i32) {
        self.runs_into(roi, z, |c| c != EXTERIOR);
    }

    /// 把所有孔洞像素 (未被外部区域到达的背景) 写入平面 `z`. 返回像素数.
    pub(crate) fn holes_into(&self, roi: &mut Roi, z: i32) -> u64 {
        self.runs_into(roi, z, |c| c == BACKGROUND)
    }

    /// 以光栅顺序逐行提取满足 `pred` 的连续像素段.
    fn runs_into(&self, roi: &mut Roi, z: i32, pred: impl Fn(u8) -> bool) -> u64 {
        let mut count = 0;
        for (h, row) in self.cells.outer_iter().enumerate() {
            let y = self.y0 + h as i32;
            let mut start: Option<usize> = None;
            for (w, &c) in row.iter().enumerate() {
                match (pred(c), start) {
                    (true, None) => start = Some(w),
                    (false, Some(s)) => {
                        roi.append_interval(self.x0 + s as i32, self.x0 + w as i32 - 1, y, z);
                        count += (w - s) as u64;
                        start = None;
                    }
                    _ => {}
                }
            }
            if let Some(s) = start {
                roi.append_interval(self.x0 + s as i32, self.x0 + row.len() as i32 - 1, y, z);
                count += (row.len() - s) as u64;
            }
        }
        count
    }
}
