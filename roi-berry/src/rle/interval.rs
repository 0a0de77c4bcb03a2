use super::sorted::Keyed;
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 一行上的闭区间 `[x1, x2]`, 表示该行上所有整数 x 坐标 `x1 <= x <= x2`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval {
    x1: i32,
    x2: i32,
}

impl Interval {
    /// 构造区间. 要求 `x1 <= x2`, 否则程序 panic.
    #[inline]
    pub fn new(x1: i32, x2: i32) -> Self {
        assert!(x1 <= x2, "区间端点顺序错误: [{x1}, {x2}]");
        Self { x1, x2 }
    }

    /// 单点区间 `[x, x]`.
    #[inline]
    pub fn point(x: i32) -> Self {
        Self { x1: x, x2: x }
    }

    /// 左端点.
    #[inline]
    pub fn x1(&self) -> i32 {
        self.x1
    }

    /// 右端点.
    #[inline]
    pub fn x2(&self) -> i32 {
        self.x2
    }

    /// 区间包含的点数.
    #[inline]
    pub fn len(&self) -> u64 {
        (self.x2 as i64 - self.x1 as i64 + 1) as u64
    }

    /// 是否包含 `x`?
    #[inline]
    pub fn contains(&self, x: i32) -> bool {
        (self.x1..=self.x2).contains(&x)
    }

    /// 接触比较. 两区间重叠或相邻 (间隔不超过 1) 时返回 `Equal`,
    /// 否则返回与 x 顺序一致的比较结果.
    #[inline]
    pub fn touches(&self, other: &Interval) -> Ordering {
        if (self.x2 as i64) + 1 < other.x1 as i64 {
            Ordering::Less
        } else if (other.x2 as i64) + 1 < self.x1 as i64 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// 重叠比较. 只有两区间真正共享至少一个点时返回 `Equal`,
    /// 否则返回与 x 顺序一致的比较结果.
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> Ordering {
        if self.x2 < other.x1 {
            Ordering::Less
        } else if other.x2 < self.x1 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// 同时覆盖两区间的最小区间.
    #[inline]
    pub fn hull(&self, other: &Interval) -> Interval {
        Interval {
            x1: self.x1.min(other.x1),
            x2: self.x2.max(other.x2),
        }
    }

    /// 两区间的交集. 不相交时返回 `None`.
    #[inline]
    pub fn intersection(&self, other: &Interval) -> Option<Interval> {
        let (x1, x2) = (self.x1.max(other.x1), self.x2.min(other.x2));
        (x1 <= x2).then_some(Interval { x1, x2 })
    }

    /// 平移 `dx`.
    #[inline]
    pub(crate) fn shifted(&self, dx: i32) -> Interval {
        Interval {
            x1: self.x1 + dx,
            x2: self.x2 + dx,
        }
    }
}

impl Keyed for Interval {
    #[inline]
    fn key(&self) -> i32 {
        self.x1
    }
}
