//! 与稠密体素掩码之间的转换, 以及平面的可视化存储.
//!
//! 稠密数组一律按 `(z, y, x)` 或 `(y, x)` 索引, 与 `ndarray` 的行主序一致.

use super::Roi;
use crate::consts::POLYGON_RASTER_LIMIT;
use image::error::{ImageError, LimitError, LimitErrorKind};
use image::ImageResult;
use ndarray::{Array3, ArrayView2, ArrayView3, Axis};
use std::path::Path;

/// 稠密掩码互转.
impl Roi {
    /// 把二维掩码中为 `true` 的像素加入平面 `z`. 像素 `(h, w)` 对应点 `(w, h, z)`.
    pub fn from_mask_2d(z: i32, mask: ArrayView2<bool>) -> Roi {
        let mut ans = Roi::new();
        ans.append_mask_2d(z, mask);
        ans
    }

    /// 把三维掩码中为 `true` 的体素加入新 ROI. 体素 `(d, h, w)` 对应点 `(w, h, d)`.
    pub fn from_mask_3d(mask: ArrayView3<bool>) -> Roi {
        let mut ans = Roi::new();
        for (d, sli) in mask.axis_iter(Axis(0)).enumerate() {
            ans.append_mask_2d(d as i32, sli);
        }
        ans
    }

    /// 按行提取连续的 `true` 段并追加.
    fn append_mask_2d(&mut self, z: i32, mask: ArrayView2<bool>) {
        for (h, row) in mask.outer_iter().enumerate() {
            let mut start = None;
            for (w, &on) in row.iter().enumerate() {
                match (on, start) {
                    (true, None) => start = Some(w),
                    (false, Some(s)) => {
                        self.append_interval(s as i32, w as i32 - 1, h as i32, z);
                        start = None;
                    }
                    _ => {}
                }
            }
            if let Some(s) = start {
                self.append_interval(s as i32, row.len() as i32 - 1, h as i32, z);
            }
        }
    }

    /// 展开为形状为 `(depth, height, width)` 的稠密掩码. 超出范围的点 (包括负坐标) 被忽略.
    pub fn to_mask_3d(&self, (depth, height, width): (usize, usize, usize)) -> Array3<bool> {
        let mut ans = Array3::from_elem((depth, height, width), false);
        for (z, y, iv) in self.intervals() {
            let (Ok(d), Ok(h)) = (usize::try_from(z), usize::try_from(y)) else {
                continue;
            };
            if d >= depth || h >= height {
                continue;
            }
            let w1 = iv.x1().max(0) as i64;
            let w2 = (iv.x2() as i64).min(width as i64 - 1);
            for w in w1..=w2 {
                ans[(d, h, w as usize)] = true;
            }
        }
        ans
    }
}

/// 表明一个可以把某个平面以 **可视化友好** 方式存储为图像的对象.
pub trait PlaneWriteVis {
    /// 把平面 `z` 的包围盒区域保存为灰度图: 前景为白色, 背景为黑色.
    /// 平面不存在时保存一张 1x1 的黑色图像. 包围盒像素数超过
    /// [`POLYGON_RASTER_LIMIT`] 时返回 [`ImageError::Limits`], 不写入文件.
    fn save_plane<P: AsRef<Path>>(&self, z: i32, path: P) -> ImageResult<()>;
}

impl PlaneWriteVis for Roi {
    fn save_plane<P: AsRef<Path>>(&self, z: i32, path: P) -> ImageResult<()> {
        let Some((tl, br)) = self.bounding_box(z) else {
            return image::GrayImage::new(1, 1).save(path);
        };
        let width = br.x as i64 - tl.x as i64 + 1;
        let height = br.y as i64 - tl.y as i64 + 1;
        if width.checked_mul(height).map_or(true, |n| n > POLYGON_RASTER_LIMIT as i64) {
            return Err(ImageError::Limits(LimitError::from_kind(
                LimitErrorKind::DimensionError,
            )));
        }
        let (width, height) = (width as u32, height as u32);
        let mut buf = image::GrayImage::new(width, height);
        for p in self.plane_roi(z).points() {
            buf.put_pixel(
                (p.x - tl.x) as u32,
                (p.y - tl.y) as u32,
                image::Luma([u8::MAX]),
            );
        }
        buf.save(path)
    }
}
