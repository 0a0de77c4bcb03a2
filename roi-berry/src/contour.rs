use crate::Point;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 平面上一条闭合轮廓: 8-相邻的有序点列, 最后一个点与第一个点隐式相连.
///
/// 由 [`crate::Roi::boundaries`] 生成时, ROI 内部位于前进方向左侧
/// (x 向右, y 向上的坐标系中), 即外轮廓逆时针, 孔洞轮廓顺时针.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    /// 由有序点列构造.
    #[inline]
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// 所有点.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// 取出点列.
    #[inline]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// 点数.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 迭代所有点.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// 有向面积的两倍 (鞋带公式, 包含首尾相连的边). 逆时针为正.
    ///
    /// 以 `i64` 计算, 坐标绝对值在 `i32` 范围内时不会溢出.
    pub fn signed_area2(&self) -> i64 {
        #[inline]
        fn shoelace(a: &Point, b: &Point) -> i64 {
            a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
        }

        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return 0;
        };
        self.points
            .windows(2)
            .map(|w| shoelace(&w[0], &w[1]))
            .sum::<i64>()
            + shoelace(last, first)
    }

    /// 是否为逆时针? 面积为 0 的退化轮廓返回 `false`.
    #[inline]
    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area2() > 0
    }
}

impl<'a> IntoIterator for &'a Contour {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
