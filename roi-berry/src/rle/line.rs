use super::sorted::{self, Keyed};
use super::Interval;
use itertools::Itertools;
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 同一 `y` 坐标上的有序区间序列.
///
/// 区间按 `x1` 严格递增, 且两两既不重叠也不相邻 (相邻区间之间至少空出一个点).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Line {
    y: i32,
    intervals: Vec<Interval>,
}

impl Line {
    /// 创建空行. 空行不应长期存在于 [`crate::rle::Plane`] 中.
    #[inline]
    pub fn new(y: i32) -> Self {
        Self {
            y,
            intervals: Vec::with_capacity(1),
        }
    }

    /// 创建只含一个区间的行.
    #[inline]
    pub fn with_interval(y: i32, iv: Interval) -> Self {
        Self {
            y,
            intervals: vec![iv],
        }
    }

    /// 直接由已满足不变量的区间序列构造.
    #[inline]
    pub(crate) fn from_sorted(y: i32, intervals: Vec<Interval>) -> Self {
        let ans = Self { y, intervals };
        debug_assert!(ans.is_well_formed());
        ans
    }

    /// 行坐标.
    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    #[inline]
    pub(crate) fn set_y(&mut self, y: i32) {
        self.y = y;
    }

    /// 所有区间.
    #[inline]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// 区间个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// 是否为空行?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// 行内点数.
    pub fn num_pix(&self) -> u64 {
        self.intervals.iter().map(Interval::len).sum()
    }

    /// 第一个区间.
    #[inline]
    pub fn first(&self) -> Option<&Interval> {
        self.intervals.first()
    }

    /// 最后一个区间.
    #[inline]
    pub fn last(&self) -> Option<&Interval> {
        self.intervals.last()
    }

    /// 查找包含 `x` 的区间. 找到时返回 `Ok(索引)`,
    /// 否则返回 `Err(插入位置)`, 即第一个位于 `x` 右侧的区间的索引.
    pub fn find_interval(&self, x: i32) -> Result<usize, usize> {
        let idx = self.intervals.partition_point(|c| c.x2() < x);
        match self.intervals.get(idx) {
            Some(c) if c.x1() <= x => Ok(idx),
            _ => Err(idx),
        }
    }

    /// 是否包含 `x`?
    #[inline]
    pub fn contains(&self, x: i32) -> bool {
        self.find_interval(x).is_ok()
    }

    /// 插入区间, 与所有与之接触的区间合并.
    pub fn add(&mut self, iv: Interval) {
        // 第一个可能与 `iv` 接触的区间
        let lo = self
            .intervals
            .partition_point(|c| (c.x2() as i64) + 1 < iv.x1() as i64);
        // 第一个完全位于 `iv` 右侧且不接触的区间
        let hi = self
            .intervals
            .partition_point(|c| c.x1() as i64 <= iv.x2() as i64 + 1);

        if lo == hi {
            self.intervals.insert(lo, iv);
            return;
        }
        let merged = iv.hull(&self.intervals[lo]).hull(&self.intervals[hi - 1]);
        self.intervals.splice(lo..hi, std::iter::once(merged));
    }

    /// 从本行中去除 `iv` 覆盖的所有点. 被完全覆盖的区间被删除,
    /// 被部分覆盖的区间被裁剪 (可能一分为二). 返回本行是否发生变化.
    pub fn subtract(&mut self, iv: Interval) -> bool {
        let lo = self.intervals.partition_point(|c| c.x2() < iv.x1());
        let hi = self.intervals.partition_point(|c| c.x1() <= iv.x2());
        if lo >= hi {
            return false;
        }

        let (first, last) = (self.intervals[lo], self.intervals[hi - 1]);
        let left = (first.x1() < iv.x1()).then(|| Interval::new(first.x1(), iv.x1() - 1));
        let right = (last.x2() > iv.x2()).then(|| Interval::new(iv.x2() + 1, last.x2()));
        self.intervals.splice(lo..hi, left.into_iter().chain(right));
        true
    }

    /// 快速追加. 仅当 `iv` 严格位于本行所有点右侧时成功并返回 `true`.
    #[inline]
    pub(crate) fn append(&mut self, iv: Interval) -> bool {
        match self.intervals.last_mut() {
            None => {
                self.intervals.push(iv);
                true
            }
            Some(last) if iv.x1() > last.x2() => {
                if iv.touches(last) == Ordering::Equal {
                    *last = last.hull(&iv);
                } else {
                    self.intervals.push(iv);
                }
                true
            }
            _ => false,
        }
    }

    /// 并集. 行坐标取 `self` 的.
    pub fn union(&self, other: &Line) -> Line {
        let intervals = self
            .intervals
            .iter()
            .merge_by(other.intervals.iter(), |a, b| a.x1() <= b.x1())
            .copied()
            .coalesce(|a, b| match a.touches(&b) {
                Ordering::Equal => Ok(a.hull(&b)),
                _ => Err((a, b)),
            })
            .collect();
        Line::from_sorted(self.y, intervals)
    }

    /// 交集. 行坐标取 `self` 的; 结果可能为空行.
    pub fn intersect(&self, other: &Line) -> Line {
        let (a, b) = (&self.intervals, &other.intervals);
        let mut ans = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            if let Some(c) = a[i].intersection(&b[j]) {
                ans.push(c);
            }
            if a[i].x2() < b[j].x2() {
                i += 1;
            } else {
                j += 1;
            }
        }
        Line::from_sorted(self.y, ans)
    }

    /// 差集 `self - other`. 行坐标取 `self` 的; 结果可能为空行.
    pub fn difference(&self, other: &Line) -> Line {
        let b = &other.intervals;
        let mut ans = Vec::with_capacity(self.intervals.len());
        let mut j = 0;
        for &iv in self.intervals.iter() {
            while j < b.len() && b[j].x2() < iv.x1() {
                j += 1;
            }
            // `start` 之前的部分已经处理完毕.
            let mut start = iv.x1() as i64;
            let mut k = j;
            while k < b.len() && b[k].x1() <= iv.x2() {
                if b[k].x1() as i64 > start {
                    ans.push(Interval::new(start as i32, b[k].x1() - 1));
                }
                start = start.max(b[k].x2() as i64 + 1);
                k += 1;
            }
            if start <= iv.x2() as i64 {
                ans.push(Interval::new(start as i32, iv.x2()));
            }
        }
        Line::from_sorted(self.y, ans)
    }

    /// 两行是否共享至少一个 x 坐标?
    pub fn overlaps(&self, other: &Line) -> bool {
        let (a, b) = (&self.intervals, &other.intervals);
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].overlaps(&b[j]) {
                Ordering::Equal => return true,
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        false
    }

    /// 对每个区间做变换 `[x1, x2] -> [x1 + lo, x2 + hi]` 并重新合并.
    /// 变换后为空 (`x1 + lo > x2 + hi`) 的区间被丢弃.
    pub(crate) fn stretched(&self, lo: i32, hi: i32) -> Line {
        let intervals = self
            .intervals
            .iter()
            .filter_map(|c| {
                let (x1, x2) = (c.x1() + lo, c.x2() + hi);
                (x1 <= x2).then(|| Interval::new(x1, x2))
            })
            .coalesce(|a, b| match a.touches(&b) {
                Ordering::Equal => Ok(a.hull(&b)),
                _ => Err((a, b)),
            })
            .collect();
        Line::from_sorted(self.y, intervals)
    }

    /// 就地平移 `dx`.
    #[inline]
    pub(crate) fn shift_x(&mut self, dx: i32) {
        for iv in self.intervals.iter_mut() {
            *iv = iv.shifted(dx);
        }
    }

    /// 检查行内不变量.
    pub(crate) fn is_well_formed(&self) -> bool {
        self.intervals.iter().all(|c| c.x1() <= c.x2())
            && self
                .intervals
                .windows(2)
                .all(|w| w[0].touches(&w[1]) == Ordering::Less)
            && sorted::is_strictly_sorted(&self.intervals)
    }
}

impl Keyed for Line {
    #[inline]
    fn key(&self) -> i32 {
        self.y
    }
}
