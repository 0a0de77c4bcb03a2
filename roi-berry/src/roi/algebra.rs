//! 集合代数. 所有操作都是按 z -> y -> x 顺序进行的归并, 复杂度 O(N + M).

use super::{Cursor, Roi, TravStatus};
use itertools::{EitherOrBoth, Itertools};
use std::ops::{BitAndAssign, BitOrAssign, SubAssign};

impl Roi {
    /// 就地并集 `self = self ∪ other`.
    pub fn or(&mut self, other: &Roi) {
        if other.is_empty() {
            return;
        }
        let planes = std::mem::take(&mut self.planes);
        self.planes = planes
            .into_iter()
            .merge_join_by(other.planes.iter(), |a, b| a.z().cmp(&b.z()))
            .map(|e| match e {
                EitherOrBoth::Left(a) => a,
                EitherOrBoth::Right(b) => b.clone(),
                EitherOrBoth::Both(a, b) => a.union(b),
            })
            .collect();
    }

    /// 就地交集 `self = self ∩ other`.
    pub fn and(&mut self, other: &Roi) {
        let planes = std::mem::take(&mut self.planes);
        self.planes = planes
            .into_iter()
            .merge_join_by(other.planes.iter(), |a, b| a.z().cmp(&b.z()))
            .filter_map(|e| match e {
                EitherOrBoth::Both(a, b) => Some(a.intersect(b)),
                _ => None,
            })
            .filter(|p| !p.is_empty())
            .collect();
    }

    /// 就地差集 `self = self - other`.
    pub fn subtract(&mut self, other: &Roi) {
        if other.is_empty() {
            return;
        }
        let planes = std::mem::take(&mut self.planes);
        self.planes = planes
            .into_iter()
            .merge_join_by(other.planes.iter(), |a, b| a.z().cmp(&b.z()))
            .filter_map(|e| match e {
                EitherOrBoth::Left(a) => Some(a),
                EitherOrBoth::Both(a, b) => Some(a.difference(b)),
                EitherOrBoth::Right(_) => None,
            })
            .filter(|p| !p.is_empty())
            .collect();
    }

    /// 两个 ROI 是否至少共享一个点? 找到第一个公共点后立即返回.
    pub fn overlaps(&self, other: &Roi) -> bool {
        let mut w = Cursor::new();
        for pa in self.planes.iter() {
            match w.find_fwd_plane(other, pa.z()) {
                TravStatus::EndRoi => return false,
                TravStatus::NotFound => continue,
                _ => {}
            }
            for la in pa.lines() {
                if w.find_fwd_line(other, la.y()) != TravStatus::NewLine {
                    continue;
                }
                if w.line(other).is_some_and(|lb| la.overlaps(lb)) {
                    return true;
                }
            }
        }
        false
    }
}

impl BitOrAssign<&Roi> for Roi {
    #[inline]
    fn bitor_assign(&mut self, rhs: &Roi) {
        self.or(rhs);
    }
}

impl BitAndAssign<&Roi> for Roi {
    #[inline]
    fn bitand_assign(&mut self, rhs: &Roi) {
        self.and(rhs);
    }
}

impl SubAssign<&Roi> for Roi {
    #[inline]
    fn sub_assign(&mut self, rhs: &Roi) {
        self.subtract(rhs);
    }
}
