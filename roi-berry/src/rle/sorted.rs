//! 有序容器的通用操作.
//!
//! 三层结构都使用 `Vec` 存储, 元素按 [`Keyed::key`] 严格递增,
//! 因此查找统一为二分查找, 前向搜索统一为单调扫描.

/// 带有排序关键字的元素.
pub(crate) trait Keyed {
    /// 排序关键字.
    fn key(&self) -> i32;
}

/// 二分查找关键字为 `key` 的元素. 找到时返回 `Ok(索引)`, 否则返回 `Err(插入位置)`.
#[inline]
pub(crate) fn find_item<T: Keyed>(items: &[T], key: i32) -> Result<usize, usize> {
    items.binary_search_by_key(&key, Keyed::key)
}

/// 查找关键字为 `key` 的元素, 不存在时用 `make` 构造并按序插入. 返回元素索引.
pub(crate) fn find_or_add<T: Keyed>(
    items: &mut Vec<T>,
    key: i32,
    make: impl FnOnce(i32) -> T,
) -> usize {
    match find_item(items, key) {
        Ok(idx) => idx,
        Err(idx) => {
            items.insert(idx, make(key));
            idx
        }
    }
}

/// 从 `from` 开始向前扫描, 返回第一个关键字不小于 `key` 的元素索引.
/// 若不存在则返回 `items.len()`.
///
/// 只向前看, 供归并类算法使用.
#[inline]
pub(crate) fn find_fwd<T: Keyed>(items: &[T], from: usize, key: i32) -> usize {
    let mut idx = from;
    while idx < items.len() && items[idx].key() < key {
        idx += 1;
    }
    idx
}

/// 关键字是否严格递增?
#[inline]
pub(crate) fn is_strictly_sorted<T: Keyed>(items: &[T]) -> bool {
    items.windows(2).all(|w| w[0].key() < w[1].key())
}
