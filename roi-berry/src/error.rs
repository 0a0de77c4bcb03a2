//! 运行时错误.

use crate::Point;
use thiserror::Error;

/// 调用方违反的前置条件. 这类错误不可在同一流程内恢复.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invariant {
    /// 长方体角点顺序颠倒, 即 `tl` 在某个分量上大于 `br`.
    InvalidBox {
        /// 左上 (最小) 角.
        tl: Point,
        /// 右下 (最大) 角.
        br: Point,
    },

    /// 圆/球半径不是正数.
    NonPositiveRadius(i32),

    /// 重采样步长存在小于 1 的分量. `(x, y, z)`
    NonPositiveStep(i32, i32, i32),

    /// 索引越界. 第一个参数为索引, 第二个参数为表长.
    IndexOutOfRange(i32, usize),

    /// 升采样后的坐标超出 `i32` 范围. 第一个参数为越界的原坐标, 第二个为步长.
    ScaleOverflow(Point, Point),
}

impl std::fmt::Display for Invariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Invariant::InvalidBox { tl, br } => write!(f, "长方体角点顺序错误: {tl} > {br}"),
            Invariant::NonPositiveRadius(r) => write!(f, "半径 `{r}` 不是正数"),
            Invariant::NonPositiveStep(x, y, z) => {
                write!(f, "重采样步长 `({x}, {y}, {z})` 存在小于 1 的分量")
            }
            Invariant::IndexOutOfRange(i, len) => write!(f, "索引 `{i}` 越界 (长度 {len})"),
            Invariant::ScaleOverflow(p, s) => write!(f, "坐标 {p} 按步长 {s} 缩放后溢出"),
        }
    }
}

/// ROI 引擎错误.
#[derive(Debug, Error)]
pub enum RoiError {
    /// 致命的前置条件错误. 调用方必须向上传递, 不得忽略后继续运行.
    #[error("致命错误: {0}")]
    FatalInvariant(Invariant),

    /// 文本格式解析错误. 第一个参数是出错的 token 序号 (从 0 开始).
    #[error("解析错误 (token #{0}): {1}")]
    Parse(usize, String),

    /// 二进制数据不满足 ROI 不变量.
    #[error("数据损坏: {0}")]
    Corrupted(String),

    /// 读写错误.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// 二进制编解码错误.
    #[cfg(feature = "serde")]
    #[error(transparent)]
    Bincode(#[from] bincode::Error),
}

impl RoiError {
    /// 是否是致命错误?
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FatalInvariant(_))
    }
}

impl From<Invariant> for RoiError {
    #[inline]
    fn from(value: Invariant) -> Self {
        Self::FatalInvariant(value)
    }
}

/// ROI 操作结果.
pub type RoiResult<T> = Result<T, RoiError>;
