//! 物理量测.
//!
//! ROI 本身只认识整数格点. 影像序列通过 [`PixelSpacing`] 告诉调用方
//! 每个平面的像素间距与层位置, 本模块据此把格点量换算为毫米量.
//!
//! 约定: 列间距对应 x 方向, 行间距对应 y 方向, 单位均为毫米.

use crate::{FPoint, Point, Roi, RoiTraverser};
use either::Either;
use itertools::Itertools;
use ndarray::ArrayView3;

/// 表明一个可以按平面提供像素间距的对象, 通常是一组医学影像切片.
pub trait PixelSpacing {
    /// 平面 `z` 中相邻两行的间距 (y 方向).
    fn row_pixel_spacing(&self, z: i32) -> f64;

    /// 平面 `z` 中相邻两列的间距 (x 方向).
    fn column_pixel_spacing(&self, z: i32) -> f64;

    /// 平面 `z` 的层位置.
    fn slice_location(&self, z: i32) -> f64;

    /// 平面 `z` 中单个像素的面积.
    #[inline]
    fn pixel_area(&self, z: i32) -> f64 {
        self.row_pixel_spacing(z) * self.column_pixel_spacing(z)
    }

    /// 平面 `z` 的层厚, 取与下一层位置之差的绝对值.
    #[inline]
    fn slice_thickness(&self, z: i32) -> f64 {
        (self.slice_location(z.saturating_add(1)) - self.slice_location(z)).abs()
    }

    /// 格点对应的物理坐标.
    #[inline]
    fn to_physical(&self, p: Point) -> FPoint {
        FPoint::new(
            p.x as f64 * self.column_pixel_spacing(p.z),
            p.y as f64 * self.row_pixel_spacing(p.z),
            self.slice_location(p.z),
        )
    }
}

/// 各向同性或各向异性, 但所有平面都相同的像素间距.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformSpacing {
    row: f64,
    column: f64,
    thickness: f64,
}

impl UniformSpacing {
    /// 以行间距 `row`, 列间距 `column`, 层厚 `thickness` 构造. 平面 0 位于 0 毫米处.
    ///
    /// 任何参数不是正的有限数时程序 panic.
    pub fn new(row: f64, column: f64, thickness: f64) -> Self {
        assert_spacing(row);
        assert_spacing(column);
        assert_spacing(thickness);
        Self {
            row,
            column,
            thickness,
        }
    }

    /// 所有方向都为 1 毫米.
    #[inline]
    pub fn unit() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

impl PixelSpacing for UniformSpacing {
    #[inline]
    fn row_pixel_spacing(&self, _z: i32) -> f64 {
        self.row
    }

    #[inline]
    fn column_pixel_spacing(&self, _z: i32) -> f64 {
        self.column
    }

    #[inline]
    fn slice_location(&self, z: i32) -> f64 {
        z as f64 * self.thickness
    }

    #[inline]
    fn slice_thickness(&self, _z: i32) -> f64 {
        self.thickness
    }
}

/// 等距排列的层位置.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Evenly {
    origin: f64,
    step: f64,
}

/// 平面内像素间距相同, 层位置可以逐层给出的间距表.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceSpacing {
    row: f64,
    column: f64,

    // 注: 只有两种来源, 直接用 `Either`.
    /// 层位置: 等距, 或按平面 `0..n` 逐一列出.
    locations: Either<Evenly, Vec<f64>>,
}

impl SliceSpacing {
    /// 平面 `z` 位于 `origin + z * step` 处.
    ///
    /// 像素间距不是正的有限数时程序 panic.
    pub fn evenly(row: f64, column: f64, origin: f64, step: f64) -> Self {
        assert_spacing(row);
        assert_spacing(column);
        Self {
            row,
            column,
            locations: Either::Left(Evenly { origin, step }),
        }
    }

    /// 平面 `z` 位于 `locations[z]` 处. 超出表格范围的平面按两端的层距线性外推.
    ///
    /// 像素间距不是正的有限数, 或 `locations` 为空时程序 panic.
    pub fn with_locations(row: f64, column: f64, locations: Vec<f64>) -> Self {
        assert_spacing(row);
        assert_spacing(column);
        assert!(!locations.is_empty(), "层位置表为空");
        Self {
            row,
            column,
            locations: Either::Right(locations),
        }
    }
}

impl PixelSpacing for SliceSpacing {
    #[inline]
    fn row_pixel_spacing(&self, _z: i32) -> f64 {
        self.row
    }

    #[inline]
    fn column_pixel_spacing(&self, _z: i32) -> f64 {
        self.column
    }

    fn slice_location(&self, z: i32) -> f64 {
        match &self.locations {
            Either::Left(Evenly { origin, step }) => origin + z as f64 * step,
            Either::Right(table) => {
                let n = table.len() as i64;
                let z = z as i64;
                if (0..n).contains(&z) {
                    return table[z as usize];
                }
                if n == 1 {
                    return table[0];
                }
                // 外推
                let last = (n - 1) as usize;
                let (base, idx, step) = if z < 0 {
                    (table[0], z, table[1] - table[0])
                } else {
                    (table[last], z - (n - 1), table[last] - table[last - 1])
                };
                base + idx as f64 * step
            }
        }
    }
}

#[inline]
fn assert_spacing(v: f64) {
    assert!(v.is_finite() && v > 0.0, "非法的像素间距 {v}");
}

/// 物理量测.
impl Roi {
    /// 平面 `z` 的面积 (平方毫米).
    pub fn area_mm2<S: PixelSpacing>(&self, z: i32, spacing: &S) -> f64 {
        self.plane_num_pix(z) as f64 * spacing.pixel_area(z)
    }

    /// 体积 (立方毫米): 每个平面的面积乘以该平面的层厚.
    pub fn volume_mm3<S: PixelSpacing>(&self, spacing: &S) -> f64 {
        self.plane_zs()
            .into_iter()
            .map(|z| self.area_mm2(z, spacing) * spacing.slice_thickness(z))
            .sum()
    }

    /// 平面 `z` 的质心在物理坐标系中的位置. 平面不存在时返回 `None`.
    pub fn physical_centroid<S: PixelSpacing>(&self, z: i32, spacing: &S) -> Option<FPoint> {
        let c = self.centroid(z)?;
        Some(FPoint::new(
            c.x * spacing.column_pixel_spacing(z),
            c.y * spacing.row_pixel_spacing(z),
            spacing.slice_location(z),
        ))
    }

    /// 平面 `z` 内任意两像素中心之间的最大物理距离 (毫米).
    /// 单像素平面为 0, 平面不存在时返回 `None`.
    pub fn max_diameter_mm<S: PixelSpacing>(&self, z: i32, spacing: &S) -> Option<f64> {
        let vertices = self.hull_vertices(z);
        if vertices.is_empty() {
            return None;
        }
        let (sx, sy) = (spacing.column_pixel_spacing(z), spacing.row_pixel_spacing(z));
        let diameter = vertices
            .iter()
            .tuple_combinations()
            .map(|(a, b)| {
                let dx = (a.x as f64 - b.x as f64) * sx;
                let dy = (a.y as f64 - b.y as f64) * sy;
                dx.hypot(dy)
            })
            .fold(0.0, f64::max);
        Some(diameter)
    }

    /// ROI 覆盖的体素在稠密体数据 `volume` (按 `(z, y, x)` 索引) 上的均值.
    ///
    /// 落在 `volume` 以外的点被忽略. 没有任何点落在 `volume` 内时返回 `None`.
    pub fn mean_value(&self, volume: ArrayView3<f32>) -> Option<f64> {
        let mut t = RoiTraverser::new(self);
        let (mut n, mut sum) = (0u64, 0.0f64);
        while t.valid() {
            if let Some(p) = t.current_point() {
                let idx = (usize::try_from(p.z), usize::try_from(p.y), usize::try_from(p.x));
                if let (Ok(d), Ok(h), Ok(w)) = idx {
                    if let Some(&v) = volume.get((d, h, w)) {
                        sum += v as f64;
                        n += 1;
                    }
                }
            }
            t.next_point();
        }
        (n > 0).then(|| sum / n as f64)
    }
}
