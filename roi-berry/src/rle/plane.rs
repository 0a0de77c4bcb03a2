use super::sorted::{self, Keyed};
use super::{Interval, Line};
use itertools::{EitherOrBoth, Itertools};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 同一 `z` 坐标上的有序行序列.
///
/// 行按 `y` 严格递增, 不存在空行.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plane {
    z: i32,
    lines: Vec<Line>,
}

impl Plane {
    /// 创建空平面.
    #[inline]
    pub fn new(z: i32) -> Self {
        Self {
            z,
            lines: Vec::with_capacity(1),
        }
    }

    /// 直接由已满足不变量的行序列构造.
    #[inline]
    pub(crate) fn from_sorted(z: i32, lines: Vec<Line>) -> Self {
        let ans = Self { z, lines };
        debug_assert!(ans.is_well_formed());
        ans
    }

    /// 平面坐标.
    #[inline]
    pub fn z(&self) -> i32 {
        self.z
    }

    #[inline]
    pub(crate) fn set_z(&mut self, z: i32) {
        self.z = z;
    }

    /// 所有行.
    #[inline]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    #[inline]
    pub(crate) fn lines_mut(&mut self) -> &mut Vec<Line> {
        &mut self.lines
    }

    /// 行数.
    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// 是否为空平面?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 平面内点数.
    pub fn num_pix(&self) -> u64 {
        self.lines.iter().map(Line::num_pix).sum()
    }

    /// 二分查找行坐标为 `y` 的行.
    #[inline]
    pub fn find_line(&self, y: i32) -> Result<usize, usize> {
        sorted::find_item(&self.lines, y)
    }

    /// 获取行坐标为 `y` 的行.
    #[inline]
    pub fn line(&self, y: i32) -> Option<&Line> {
        self.find_line(y).ok().map(|idx| &self.lines[idx])
    }

    /// 是否包含 `(x, y)`?
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.line(y).is_some_and(|l| l.contains(x))
    }

    /// 在第 `y` 行插入区间.
    pub fn add_interval(&mut self, y: i32, iv: Interval) {
        let idx = sorted::find_or_add(&mut self.lines, y, Line::new);
        self.lines[idx].add(iv);
    }

    /// 从第 `y` 行去除区间. 行被清空时立即删除. 返回平面是否发生变化.
    pub fn subtract_interval(&mut self, y: i32, iv: Interval) -> bool {
        let Ok(idx) = self.find_line(y) else {
            return false;
        };
        let changed = self.lines[idx].subtract(iv);
        if self.lines[idx].is_empty() {
            self.lines.remove(idx);
        }
        changed
    }

    /// 快速追加. 仅当 `(iv, y)` 在光栅顺序上严格位于本平面所有点之后时成功.
    pub(crate) fn append(&mut self, y: i32, iv: Interval) -> bool {
        match self.lines.last_mut() {
            Some(last) if last.y() == y => last.append(iv),
            Some(last) if last.y() > y => false,
            _ => {
                self.lines.push(Line::with_interval(y, iv));
                true
            }
        }
    }

    /// 并集. 平面坐标取 `self` 的.
    pub fn union(&self, other: &Plane) -> Plane {
        let lines = self
            .lines
            .iter()
            .merge_join_by(other.lines.iter(), |a, b| a.y().cmp(&b.y()))
            .map(|e| match e {
                EitherOrBoth::Left(a) => a.clone(),
                EitherOrBoth::Right(b) => b.clone(),
                EitherOrBoth::Both(a, b) => a.union(b),
            })
            .collect();
        Plane::from_sorted(self.z, lines)
    }

    /// 交集. 平面坐标取 `self` 的; 结果可能为空平面.
    pub fn intersect(&self, other: &Plane) -> Plane {
        let lines = self
            .lines
            .iter()
            .merge_join_by(other.lines.iter(), |a, b| a.y().cmp(&b.y()))
            .filter_map(|e| match e {
                EitherOrBoth::Both(a, b) => Some(a.intersect(b)),
                _ => None,
            })
            .filter(|l| !l.is_empty())
            .collect();
        Plane::from_sorted(self.z, lines)
    }

    /// 差集 `self - other`. 平面坐标取 `self` 的; 结果可能为空平面.
    pub fn difference(&self, other: &Plane) -> Plane {
        let lines = self
            .lines
            .iter()
            .merge_join_by(other.lines.iter(), |a, b| a.y().cmp(&b.y()))
            .filter_map(|e| match e {
                EitherOrBoth::Left(a) => Some(a.clone()),
                EitherOrBoth::Both(a, b) => Some(a.difference(b)),
                EitherOrBoth::Right(_) => None,
            })
            .filter(|l| !l.is_empty())
            .collect();
        Plane::from_sorted(self.z, lines)
    }

    /// 平面内包围盒 `(min x, min y, max x, max y)`. 空平面返回 `None`.
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        let (first, last) = (self.lines.first()?, self.lines.last()?);
        let min_x = self.lines.iter().filter_map(|l| l.first()).map(Interval::x1).min()?;
        let max_x = self.lines.iter().filter_map(|l| l.last()).map(Interval::x2).max()?;
        Some((min_x, first.y(), max_x, last.y()))
    }

    /// 检查平面内不变量.
    pub(crate) fn is_well_formed(&self) -> bool {
        sorted::is_strictly_sorted(&self.lines)
            && self.lines.iter().all(|l| !l.is_empty() && l.is_well_formed())
    }
}

impl Keyed for Plane {
    #[inline]
    fn key(&self) -> i32 {
        self.z
    }
}

#[cfg(test)]
mod tests {
    use super::{Interval, Plane};

    #[test]
    fn test_empty_lines_are_dropped() {
        let mut p = Plane::new(0);
        p.add_interval(3, Interval::new(0, 4));
        p.add_interval(1, Interval::new(2, 2));
        assert_eq!(p.len(), 2);
        assert_eq!(p.lines()[0].y(), 1);

        assert!(p.subtract_interval(1, Interval::new(0, 10)));
        assert_eq!(p.len(), 1);
        assert!(!p.subtract_interval(7, Interval::new(0, 10)));
        assert!(p.is_well_formed());
    }

    #[test]
    fn test_bounds() {
        let mut p = Plane::new(2);
        assert_eq!(p.bounds(), None);
        p.add_interval(5, Interval::new(3, 4));
        p.add_interval(-1, Interval::new(7, 9));
        p.add_interval(0, Interval::new(-2, 0));
        assert_eq!(p.bounds(), Some((-2, -1, 9, 5)));
        assert_eq!(p.num_pix(), 2 + 3 + 3);
    }

    #[test]
    fn test_plane_algebra_drops_empty_lines() {
        let mut a = Plane::new(0);
        a.add_interval(0, Interval::new(0, 4));
        a.add_interval(1, Interval::new(0, 4));
        let mut b = Plane::new(0);
        b.add_interval(1, Interval::new(0, 9));
        b.add_interval(2, Interval::new(0, 9));

        let d = a.difference(&b);
        assert_eq!(d.len(), 1);
        assert_eq!(d.lines()[0].y(), 0);

        let i = a.intersect(&b);
        assert_eq!(i.len(), 1);
        assert_eq!(i.num_pix(), 5);

        let u = a.union(&b);
        assert_eq!(u.len(), 3);
        assert_eq!(u.num_pix(), 5 + 10 + 10);
    }
}
