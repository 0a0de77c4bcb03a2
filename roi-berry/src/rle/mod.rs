//! 行程编码的三层结构: 区间 ([`Interval`]), 行 ([`Line`]) 和平面 ([`Plane`]).
//!
//! 每一层的元素都按关键字 (x1, y, z) 严格递增排列, 行内区间两两之间至少间隔一个点,
//! 且不存在空行/空平面. 所有修改操作都在返回前恢复这些不变量.

mod interval;
mod line;
mod plane;
pub(crate) mod sorted;

pub use interval::Interval;
pub use line::Line;
pub use plane::Plane;
