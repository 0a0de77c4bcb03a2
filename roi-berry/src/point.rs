use std::cmp::Ordering;
use std::fmt::Formatter;
use std::ops::{Add, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 三维整数格点, 同时也可用作整数偏移向量.
///
/// 其全序 (`Ord`) 为光栅顺序: 先比较 `z`, 再比较 `y`, 最后比较 `x`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// 行内坐标.
    pub x: i32,
    /// 行坐标.
    pub y: i32,
    /// 平面坐标.
    pub z: i32,
}

impl Point {
    /// 构造格点.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// 原点.
    #[inline]
    pub const fn origin() -> Self {
        Self::new(0, 0, 0)
    }

    /// 是否在每个分量上都不大于 `other`?
    #[inline]
    pub fn le_componentwise(&self, other: &Point) -> bool {
        self.x <= other.x && self.y <= other.y && self.z <= other.z
    }

    /// 逐分量取较小值.
    #[inline]
    pub fn min_componentwise(&self, other: &Point) -> Point {
        Point::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// 逐分量取较大值.
    #[inline]
    pub fn max_componentwise(&self, other: &Point) -> Point {
        Point::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// 转换为浮点坐标.
    #[inline]
    pub fn to_f(self) -> FPoint {
        FPoint::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

impl Ord for Point {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        (self.z, self.y, self.x).cmp(&(other.z, other.y, other.x))
    }
}

impl PartialOrd for Point {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(i32, i32, i32)> for Point {
    #[inline]
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Point {
    type Output = Point;

    #[inline]
    fn neg(self) -> Self::Output {
        Point::new(-self.x, -self.y, -self.z)
    }
}

/// 三维浮点坐标. 用作质心, 物理距离等.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FPoint {
    /// x 分量.
    pub x: f64,
    /// y 分量.
    pub y: f64,
    /// z 分量.
    pub z: f64,
}

impl FPoint {
    /// 构造浮点坐标.
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 到 `other` 的欧氏距离.
    #[inline]
    pub fn distance(&self, other: &FPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }
}

impl std::fmt::Display for FPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4})", self.x, self.y, self.z)
    }
}
