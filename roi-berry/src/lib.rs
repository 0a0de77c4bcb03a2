#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供基于行程编码 (run-length encoding) 的稀疏三维 ROI
//! (Region of Interest) 引擎, 供分割与特征计算流程使用.
//!
//! 一个 ROI 是三维整数格点的稀疏集合, 以 "平面 (z) -> 行 (y) -> 区间 (x)"
//! 三层有序结构存储. 每一层都严格有序, 且不存在空的行或平面,
//! 所以所有操作都可以用二分查找或归并遍历完成, 无需哈希表或稠密体素网格.
//!
//! # 注意
//!
//! 1. 坐标一律为 `i32`, 允许负数. "光栅顺序" (raster order) 指先比较 z, 再比较 y, 最后比较 x.
//! 2. 调用方的前置条件错误 (如 `add_box` 的角点顺序颠倒) 通过
//!   [`RoiError::FatalInvariant`] 返回, 调用方应当用 `?` 向上传递, 不应吞掉.
//! 3. 内部不变量被破坏时程序会直接 panic, 而不会导致内存错误. As what Rust promises.
//!
//! # 开发计划
//!
//! ### 行程编码基本结构 ✅
//!
//! `Interval`, `Line`, `Plane` 及其有序插入/合并/裁剪.
//!
//! 实现位于 `roi-berry/src/rle`.
//!
//! ### 游标 (workspace) 与遍历器 ✅
//!
//! 以 (平面, 行, 区间, 区间内偏移) 四元组表示位置, 所有遍历都是游标状态转移.
//! `RoiTraverser` 持有 ROI 的快照, 对外提供有状态的安全遍历接口.
//!
//! 实现位于 `roi-berry/src/roi/cursor.rs` 和 `roi-berry/src/traverser.rs`.
//!
//! ### 集合代数 ✅
//!
//! 并, 交, 差, 以及判断是否相交. 均为 O(N + M) 的归并算法.
//!
//! ### 形态学腐蚀/膨胀 ✅
//!
//! 以结构元 ROI 为核, 在区间粒度上平移并累积 (膨胀取并, 腐蚀取交),
//! 结果与逐体素定义严格一致.
//!
//! ### 边界追踪, 连通域填充, 凸包 ✅
//!
//! 1. 8-邻接边界追踪, ROI 内部始终位于轮廓左侧.
//! 2. 平面内 4-邻接 / 三维 26-邻接的连通区域转移.
//! 3. 逐平面二维凸包.
//!
//! ### 多边形扫描转换与孔洞填充 ✅
//!
//! 实现位于 `roi-berry/src/roi/polygon.rs`.
//!
//! ### 重采样 ✅
//!
//! 保守/非保守的降采样与升采样.
//!
//! ### 持久化 ✅
//!
//! 1. 纯文本嵌套格式, 可逐位往返.
//! 2. zlib 压缩存储.
//! 3. bincode 二进制格式 (需要 `serde` feature).
//!
//! ### 物理量测 ✅
//!
//! 通过 [`spacing::PixelSpacing`] 接口获取像素间距, 计算面积, 体积, 质心, 最大径和均值.

/// 坐标类型.
mod point;

pub use point::{FPoint, Point};

pub mod consts;

mod error;

pub use error::{Invariant, RoiError, RoiResult};

/// 行程编码的基础层次结构.
pub mod rle;

mod roi;

pub use roi::{CompactRoi, Connectivity, Cursor, PlaneWriteVis, Points, Roi, TravStatus};

mod contour;

pub use contour::Contour;

mod traverser;

pub use traverser::RoiTraverser;

pub mod spacing;

pub mod prelude;
