//! 合成体模加载器. 以环境变量控制体模规模与随机种子, 保证实验可复现.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roi_berry::{Point, Roi};
use std::env;

/// 默认体模边长.
pub const DEFAULT_EXTENT: i32 = 48;

/// 默认随机种子.
pub const DEFAULT_SEED: u64 = 20231019;

/// 获取体模边长.
///
/// 1. 若环境变量 `$ROI_ABLATION_EXTENT` 是不小于 8 的整数, 则返回其值;
/// 2. 否则, 返回 [`DEFAULT_EXTENT`].
pub fn extent_from_env_or_default() -> i32 {
    env::var("ROI_ABLATION_EXTENT")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .filter(|&e: &i32| e >= 8)
        .unwrap_or(DEFAULT_EXTENT)
}

/// 获取随机种子.
///
/// 1. 若环境变量 `$ROI_ABLATION_SEED` 是合法的无符号整数, 则返回其值;
/// 2. 否则, 返回 [`DEFAULT_SEED`].
pub fn seed_from_env_or_default() -> u64 {
    env::var("ROI_ABLATION_SEED")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_SEED)
}

/// 随机体模序列. 每个体模由若干球体与长方体叠加, 并挖去一个较小的球体.
///
/// 每 8 个体模中有一个是空的, 用于检验各算法对平凡输入的处理.
pub struct PhantomLoader {
    rng: StdRng,
    extent: i32,
    idx: usize,
    len: usize,
}

impl PhantomLoader {
    /// 以边长 `extent` 和种子 `seed` 生成 `len` 个体模.
    pub fn new(extent: i32, seed: u64, len: usize) -> Self {
        assert!(extent >= 8, "体模边长过小: {extent}");
        Self {
            rng: StdRng::seed_from_u64(seed),
            extent,
            idx: 0,
            len,
        }
    }

    /// 从环境变量读入配置.
    #[inline]
    pub fn from_env(len: usize) -> Self {
        Self::new(extent_from_env_or_default(), seed_from_env_or_default(), len)
    }

    /// 体模边长.
    #[inline]
    pub fn extent(&self) -> i32 {
        self.extent
    }

    fn random_point(&mut self, margin: i32) -> Point {
        let hi = self.extent - 1 - margin;
        Point::new(
            self.rng.gen_range(margin..=hi),
            self.rng.gen_range(margin..=hi),
            self.rng.gen_range(margin..=hi),
        )
    }

    fn make_phantom(&mut self) -> Roi {
        let mut roi = Roi::new();
        if self.idx % 8 == 7 {
            return roi;
        }
        let max_r = (self.extent / 4).max(2);
        for _ in 0..self.rng.gen_range(1..=3) {
            let r = self.rng.gen_range(2..=max_r);
            let c = self.random_point(r);
            roi.add_sphere(c, r).unwrap();
        }
        for _ in 0..self.rng.gen_range(0..=2) {
            let (a, b) = (self.random_point(0), self.random_point(0));
            roi.add_box(a.min_componentwise(&b), a.max_componentwise(&b))
                .unwrap();
        }
        let r = self.rng.gen_range(1..=max_r / 2 + 1);
        let c = self.random_point(r);
        let mut hole = Roi::new();
        hole.add_sphere(c, r).unwrap();
        roi.subtract(&hole);
        roi
    }
}

impl Iterator for PhantomLoader {
    type Item = (usize, Roi);

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.len {
            return None;
        }
        let roi = self.make_phantom();
        let idx = self.idx;
        self.idx += 1;
        Some((idx, roi))
    }
}

#[cfg(test)]
mod tests {
    use super::PhantomLoader;

    #[test]
    fn test_reproducible() {
        let a: Vec<_> = PhantomLoader::new(16, 7, 9).collect();
        let b: Vec<_> = PhantomLoader::new(16, 7, 9).collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 9);
        assert!(a[7].1.is_empty());
        for (_, roi) in a.iter() {
            if let Some((lo, hi)) = roi.bounding_cube() {
                assert!(lo.x >= 0 && lo.y >= 0 && lo.z >= 0);
                assert!(hi.x < 16 && hi.y < 16 && hi.z < 16);
            }
        }
    }
}
