//! 各项实验. 每项实验都在同一组体模上运行行程编码算法, 并与稠密体素参照逐点比对.

use log::debug;
use ndarray::{Array3, Zip};
use roi_berry::prelude::*;
use utils::loader::PhantomLoader;
use utils::Profile;

/// 体模外围留出的空白, 保证 3x3x3 膨胀结果仍在稠密数组内.
const PAD: i32 = 1;

/// 实验所需的体模个数.
pub const PHANTOMS: usize = 24;

type Idx3d = (usize, usize, usize);

/// 稠密数组形状.
#[inline]
fn dense_shape(extent: i32) -> Idx3d {
    let n = (extent + 2 * PAD) as usize;
    (n, n, n)
}

/// 把体模平移到稠密数组的有效区域内.
#[inline]
fn padded(mut roi: Roi) -> Roi {
    roi.translate(Point::new(PAD, PAD, PAD));
    roi
}

/// 两个稠密掩码中取值不同的体素个数.
fn count_mismatched(a: &Array3<bool>, b: &Array3<bool>) -> u64 {
    Zip::from(a)
        .and(b)
        .fold(0u64, |acc, x, y| acc + u64::from(x != y))
}

/// `(d, h, w)` 的 26-邻域及其自身. 越界的邻居为 `None`.
fn neighbourhood27((d, h, w): Idx3d, (dd, hh, ww): Idx3d) -> impl Iterator<Item = Option<Idx3d>> {
    let shift = |v: usize, o: i64, n: usize| {
        let s = v as i64 + o;
        (0..n as i64).contains(&s).then_some(s as usize)
    };
    (-1..=1i64).flat_map(move |oz| {
        (-1..=1i64).flat_map(move |oy| {
            (-1..=1i64).map(move |ox| {
                Some((shift(d, oz, dd)?, shift(h, oy, hh)?, shift(w, ox, ww)?))
            })
        })
    })
}

/// 稠密参照: 3x3x3 膨胀.
fn dense_dilate(m: &Array3<bool>) -> Array3<bool> {
    let shape = m.dim();
    let mut ans = Array3::from_elem(shape, false);
    for (idx, _) in m.indexed_iter().filter(|(_, on)| **on) {
        for n in neighbourhood27(idx, shape).flatten() {
            ans[n] = true;
        }
    }
    ans
}

/// 稠密参照: 3x3x3 腐蚀. 数组以外视为背景.
fn dense_erode(m: &Array3<bool>) -> Array3<bool> {
    let shape = m.dim();
    Array3::from_shape_fn(shape, |idx| {
        neighbourhood27(idx, shape).all(|n| n.is_some_and(|n| m[n]))
    })
}

/// 在所有体模上运行 `op`. `op` 的前一部分 (行程编码算法) 计时, 参照比对不计时.
fn run_on_phantoms<F>(name: &str, mut op: F) -> Profile
where
    F: FnMut(&Roi, Idx3d, &mut Profile),
{
    let mut profile = Profile::new();
    let loader = PhantomLoader::from_env(PHANTOMS);
    let shape = dense_shape(loader.extent());
    for (idx, roi) in loader {
        if roi.is_empty() {
            profile.count_trivial();
            continue;
        }
        debug!("{name}: phantom {idx}, {} voxels", roi.num_pix());
        op(&padded(roi), shape, &mut profile);
    }
    profile.finish()
}

/// 3x3x3 方形结构元.
fn cube_se() -> Roi {
    Roi::centered_box(3, 3, 3).unwrap()
}

/// 膨胀.
pub fn dilation() -> Profile {
    let se = cube_se();
    run_on_phantoms("Dilation", |roi, shape, profile| {
        let mut out = roi.clone();
        profile.count_target(true);
        out.dilate(&se);
        profile.target_elapsed();

        let reference = dense_dilate(&roi.to_mask_3d(shape));
        let mismatched = count_mismatched(&out.to_mask_3d(shape), &reference);
        profile.count_result(out.num_pix(), mismatched);
    })
}

/// 腐蚀.
pub fn erosion() -> Profile {
    let se = cube_se();
    run_on_phantoms("Erosion", |roi, shape, profile| {
        let mut out = roi.clone();
        profile.count_target(true);
        out.erode(&se);
        profile.target_elapsed();

        let reference = dense_erode(&roi.to_mask_3d(shape));
        let mismatched = count_mismatched(&out.to_mask_3d(shape), &reference);
        profile.count_result(out.num_pix(), mismatched);
    })
}

/// 集合代数: 与自身平移一个体素后的副本求并, 交, 差.
pub fn algebra() -> Profile {
    run_on_phantoms("Algebra", |roi, shape, profile| {
        let mut moved = roi.clone();
        moved.translate(Point::new(1, 0, -1));
        let (mut u, mut i, mut d) = (roi.clone(), roi.clone(), roi.clone());
        profile.count_target(true);
        u |= &moved;
        i &= &moved;
        d -= &moved;
        profile.target_elapsed();

        // 平移后的副本可能越过稠密数组边界, 所以参照也由平移后的 ROI 生成
        let (a, b) = (roi.to_mask_3d(shape), moved.to_mask_3d(shape));
        let ru = Zip::from(&a).and(&b).map_collect(|&x, &y| x || y);
        let ri = Zip::from(&a).and(&b).map_collect(|&x, &y| x && y);
        let rd = Zip::from(&a).and(&b).map_collect(|&x, &y| x && !y);
        let mismatched = count_mismatched(&u.to_mask_3d(shape), &ru)
            + count_mismatched(&i.to_mask_3d(shape), &ri)
            + count_mismatched(&d.to_mask_3d(shape), &rd);
        profile.count_result(u.num_pix() + i.num_pix() + d.num_pix(), mismatched);
    })
}

/// 边界追踪: 每个轮廓点都必须在 ROI 内, 且至少有一个平面内 8-邻居在 ROI 外.
pub fn boundary() -> Profile {
    run_on_phantoms("Boundary", |roi, shape, profile| {
        profile.count_target(true);
        let contours: Vec<_> = roi
            .plane_zs()
            .into_iter()
            .flat_map(|z| roi.boundaries(z))
            .collect();
        profile.target_elapsed();

        let m = roi.to_mask_3d(shape);
        let inside = |x: i32, y: i32, z: i32| {
            let idx = (usize::try_from(z), usize::try_from(y), usize::try_from(x));
            match idx {
                (Ok(d), Ok(h), Ok(w)) => m.get((d, h, w)).copied().unwrap_or(false),
                _ => false,
            }
        };
        let mut produced = 0;
        let mut mismatched = 0;
        for p in contours.iter().flat_map(|c| c.iter()) {
            produced += 1;
            let on_edge = (-1..=1)
                .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
                .any(|(dx, dy)| !inside(p.x + dx, p.y + dy, p.z));
            if !inside(p.x, p.y, p.z) || !on_edge {
                mismatched += 1;
            }
        }
        profile.count_result(produced, mismatched);
    })
}
