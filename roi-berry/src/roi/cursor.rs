//! 游标 (workspace) 与光栅顺序遍历.
//!
//! [`Cursor`] 只是一个 `(平面, 行, 区间, 区间内偏移)` 索引四元组, 不借用 ROI.
//! 每次操作都显式传入 ROI 的引用. 游标在 ROI 发生任何修改后即失效,
//! 此时继续使用不会导致内存错误, 但结果无意义.

use super::Roi;
use crate::rle::sorted;
use crate::rle::{Interval, Line, Plane};
use crate::Point;

/// 游标操作的结果状态.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TravStatus {
    /// 当前位置有效, 且不处于任何集合的开头.
    Ok,
    /// 当前位置是一个新区间的第一个点.
    NewInterval,
    /// 当前位置是一个新行的第一个点.
    NewLine,
    /// 当前位置是一个新平面的第一个点.
    NewPlane,
    /// 查找失败. 游标停留在插入位置.
    NotFound,
    /// 遍历结束.
    EndRoi,
}

impl TravStatus {
    /// 当前位置是否指向一个有效点?
    #[inline]
    pub fn is_valid(&self) -> bool {
        !matches!(self, TravStatus::NotFound | TravStatus::EndRoi)
    }
}

/// ROI 内位置的弱引用.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cursor {
    pi: usize,
    li: usize,
    ii: usize,
    xi: i64,
}

impl Cursor {
    /// 创建指向第一个点的游标. 不检查 ROI 是否为空.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 平面索引.
    #[inline]
    pub fn plane_index(&self) -> usize {
        self.pi
    }

    /// 行索引 (平面内).
    #[inline]
    pub fn line_index(&self) -> usize {
        self.li
    }

    /// 区间索引 (行内).
    #[inline]
    pub fn interval_index(&self) -> usize {
        self.ii
    }

    /// 区间内偏移.
    #[inline]
    pub fn offset(&self) -> i64 {
        self.xi
    }

    /// 所在平面.
    #[inline]
    pub fn plane<'a>(&self, roi: &'a Roi) -> Option<&'a Plane> {
        roi.planes.get(self.pi)
    }

    /// 所在行.
    #[inline]
    pub fn line<'a>(&self, roi: &'a Roi) -> Option<&'a Line> {
        self.plane(roi)?.lines().get(self.li)
    }

    /// 所在区间.
    #[inline]
    pub fn interval<'a>(&self, roi: &'a Roi) -> Option<&'a Interval> {
        self.line(roi)?.intervals().get(self.ii)
    }

    /// 当前点. 游标无效时返回 `None`.
    pub fn point(&self, roi: &Roi) -> Option<Point> {
        let plane = self.plane(roi)?;
        let line = plane.lines().get(self.li)?;
        let iv = line.intervals().get(self.ii)?;
        let x = iv.x1() as i64 + self.xi;
        (x <= iv.x2() as i64).then(|| Point::new(x as i32, line.y(), plane.z()))
    }

    /// 当前点所在区间的两个端点.
    pub fn interval_points(&self, roi: &Roi) -> Option<(Point, Point)> {
        let plane = self.plane(roi)?;
        let line = plane.lines().get(self.li)?;
        let iv = line.intervals().get(self.ii)?;
        Some((
            Point::new(iv.x1(), line.y(), plane.z()),
            Point::new(iv.x2(), line.y(), plane.z()),
        ))
    }

    /// 不移动游标, 报告其所处位置的状态.
    pub fn status(&self, roi: &Roi) -> TravStatus {
        if self.point(roi).is_none() {
            if self.pi >= roi.planes.len() {
                return TravStatus::EndRoi;
            }
            return TravStatus::NotFound;
        }
        match (self.li, self.ii, self.xi) {
            (0, 0, 0) => TravStatus::NewPlane,
            (_, 0, 0) => TravStatus::NewLine,
            (_, _, 0) => TravStatus::NewInterval,
            _ => TravStatus::Ok,
        }
    }

    /// 是否位于所在平面的最后一个点?
    pub fn is_last_in_plane(&self, roi: &Roi) -> bool {
        let Some(plane) = self.plane(roi) else {
            return false;
        };
        let Some(line) = plane.lines().get(self.li) else {
            return false;
        };
        self.li + 1 == plane.len()
            && self.ii + 1 == line.len()
            && line.intervals()[self.ii].x1() as i64 + self.xi == line.intervals()[self.ii].x2() as i64
    }

    /// 回到第一个点.
    pub fn reset(&mut self, roi: &Roi) -> TravStatus {
        *self = Self::default();
        if roi.is_empty() {
            TravStatus::EndRoi
        } else {
            TravStatus::NewPlane
        }
    }

    /// 前进一个点. 区间结束时转入下一个区间.
    pub fn next_x(&mut self, roi: &Roi) -> TravStatus {
        let Some(iv) = self.interval(roi) else {
            return self.clamp_end(roi);
        };
        if iv.x1() as i64 + self.xi < iv.x2() as i64 {
            self.xi += 1;
            TravStatus::Ok
        } else {
            self.next_interval(roi)
        }
    }

    /// 前进到下一个区间的第一个点. 行结束时转入下一行.
    pub fn next_interval(&mut self, roi: &Roi) -> TravStatus {
        let Some(line) = self.line(roi) else {
            return self.clamp_end(roi);
        };
        self.xi = 0;
        if self.ii + 1 < line.len() {
            self.ii += 1;
            TravStatus::NewInterval
        } else {
            self.next_line(roi)
        }
    }

    /// 前进到下一行的第一个点. 平面结束时转入下一个平面.
    pub fn next_line(&mut self, roi: &Roi) -> TravStatus {
        let Some(plane) = self.plane(roi) else {
            return self.clamp_end(roi);
        };
        self.ii = 0;
        self.xi = 0;
        if self.li + 1 < plane.len() {
            self.li += 1;
            TravStatus::NewLine
        } else {
            self.next_plane(roi)
        }
    }

    /// 前进到下一个平面的第一个点. ROI 结束时返回 [`TravStatus::EndRoi`].
    pub fn next_plane(&mut self, roi: &Roi) -> TravStatus {
        self.li = 0;
        self.ii = 0;
        self.xi = 0;
        if self.pi + 1 < roi.planes.len() {
            self.pi += 1;
            TravStatus::NewPlane
        } else {
            self.pi = roi.planes.len();
            TravStatus::EndRoi
        }
    }

    /// 二分定位到平面 `z`. 不存在时游标停在插入位置并返回 [`TravStatus::NotFound`].
    pub fn set_plane(&mut self, roi: &Roi, z: i32) -> TravStatus {
        self.li = 0;
        self.ii = 0;
        self.xi = 0;
        match sorted::find_item(&roi.planes, z) {
            Ok(idx) => {
                self.pi = idx;
                TravStatus::NewPlane
            }
            Err(idx) => {
                self.pi = idx;
                TravStatus::NotFound
            }
        }
    }

    /// 在当前平面内二分定位到行 `y`.
    pub fn set_line(&mut self, roi: &Roi, y: i32) -> TravStatus {
        self.ii = 0;
        self.xi = 0;
        let Some(plane) = self.plane(roi) else {
            return self.clamp_end(roi);
        };
        match plane.find_line(y) {
            Ok(idx) => {
                self.li = idx;
                TravStatus::NewLine
            }
            Err(idx) => {
                self.li = idx;
                TravStatus::NotFound
            }
        }
    }

    /// 在当前行内二分定位到包含 `x` 的区间, 偏移指向 `x`.
    pub fn set_interval(&mut self, roi: &Roi, x: i32) -> TravStatus {
        self.xi = 0;
        let Some(line) = self.line(roi) else {
            return TravStatus::NotFound;
        };
        match line.find_interval(x) {
            Ok(idx) => {
                self.ii = idx;
                self.xi = x as i64 - line.intervals()[idx].x1() as i64;
                if self.xi == 0 {
                    TravStatus::NewInterval
                } else {
                    TravStatus::Ok
                }
            }
            Err(idx) => {
                self.ii = idx;
                TravStatus::NotFound
            }
        }
    }

    /// 二分定位到点 `p`.
    pub fn set_point(&mut self, roi: &Roi, p: Point) -> TravStatus {
        if self.set_plane(roi, p.z) == TravStatus::NotFound
            || self.set_line(roi, p.y) == TravStatus::NotFound
        {
            return TravStatus::NotFound;
        }
        self.set_interval(roi, p.x)
    }

    /// 从当前平面开始向前扫描, 停在第一个 `z` 不小于给定值的平面.
    ///
    /// 恰好等于时返回 [`TravStatus::NewPlane`]; 越过末尾时返回 [`TravStatus::EndRoi`].
    pub fn find_fwd_plane(&mut self, roi: &Roi, z: i32) -> TravStatus {
        self.li = 0;
        self.ii = 0;
        self.xi = 0;
        self.pi = sorted::find_fwd(&roi.planes, self.pi, z);
        match roi.planes.get(self.pi) {
            None => TravStatus::EndRoi,
            Some(p) if p.z() == z => TravStatus::NewPlane,
            Some(_) => TravStatus::NotFound,
        }
    }

    /// 在当前平面内从当前行开始向前扫描, 停在第一个 `y` 不小于给定值的行.
    ///
    /// 越过平面末尾时行索引等于行数, 返回 [`TravStatus::NotFound`].
    pub fn find_fwd_line(&mut self, roi: &Roi, y: i32) -> TravStatus {
        self.ii = 0;
        self.xi = 0;
        let Some(plane) = self.plane(roi) else {
            return self.clamp_end(roi);
        };
        self.li = sorted::find_fwd(plane.lines(), self.li, y);
        match plane.lines().get(self.li) {
            Some(l) if l.y() == y => TravStatus::NewLine,
            _ => TravStatus::NotFound,
        }
    }

    /// 在当前行内从当前区间开始向前扫描, 停在第一个右端点不小于 `x` 的区间.
    ///
    /// 该区间包含 `x` 时偏移指向 `x`, 否则返回 [`TravStatus::NotFound`].
    pub fn find_fwd_interval(&mut self, roi: &Roi, x: i32) -> TravStatus {
        self.xi = 0;
        let Some(line) = self.line(roi) else {
            return TravStatus::NotFound;
        };
        let ivs = line.intervals();
        while self.ii < ivs.len() && ivs[self.ii].x2() < x {
            self.ii += 1;
        }
        match ivs.get(self.ii) {
            Some(iv) if iv.x1() <= x => {
                self.xi = x as i64 - iv.x1() as i64;
                if self.xi == 0 {
                    TravStatus::NewInterval
                } else {
                    TravStatus::Ok
                }
            }
            _ => TravStatus::NotFound,
        }
    }

    /// 游标越界: 平面索引超出末尾时为遍历结束, 否则为未找到.
    #[inline]
    fn clamp_end(&mut self, roi: &Roi) -> TravStatus {
        if self.pi >= roi.planes.len() {
            self.pi = roi.planes.len();
            TravStatus::EndRoi
        } else {
            TravStatus::NotFound
        }
    }
}

/// 以光栅顺序逐点迭代 ROI. 见 [`Roi::points`].
#[derive(Clone, Debug)]
pub struct Points<'a> {
    roi: &'a Roi,
    cursor: Cursor,
    status: TravStatus,
}

impl<'a> Iterator for Points<'a> {
    type Item = Point;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.status.is_valid() {
            return None;
        }
        let p = self.cursor.point(self.roi);
        self.status = self.cursor.next_x(self.roi);
        p
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.status.is_valid() {
            (1, None)
        } else {
            (0, Some(0))
        }
    }
}

impl Roi {
    /// 以光栅顺序迭代所有点.
    pub fn points(&self) -> Points<'_> {
        let mut cursor = Cursor::new();
        let status = cursor.reset(self);
        Points {
            roi: self,
            cursor,
            status,
        }
    }

    /// 游标指向第一个点.
    #[inline]
    pub fn cursor(&self) -> (Cursor, TravStatus) {
        let mut w = Cursor::new();
        let status = w.reset(self);
        (w, status)
    }
}
