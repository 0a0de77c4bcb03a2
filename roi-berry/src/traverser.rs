use crate::{Contour, Cursor, Point, Roi, TravStatus};

/// 持有 ROI 快照的有状态遍历器.
///
/// 构造时复制目标 ROI, 之后对原 ROI 的修改对遍历器不可见.
/// 所有只读查询都直接转发给快照.
#[derive(Clone, Debug)]
pub struct RoiTraverser {
    roi: Roi,
    cursor: Cursor,
    status: TravStatus,
}

impl RoiTraverser {
    /// 复制 `roi` 并指向第一个点.
    pub fn new(roi: &Roi) -> Self {
        let roi = roi.clone();
        let (cursor, status) = roi.cursor();
        Self {
            roi,
            cursor,
            status,
        }
    }

    /// 只复制 `roi` 的平面 `z`.
    pub fn from_plane(roi: &Roi, z: i32) -> Self {
        let roi = roi.plane_roi(z);
        let (cursor, status) = roi.cursor();
        Self {
            roi,
            cursor,
            status,
        }
    }

    /// 以新的 ROI 重新初始化.
    pub fn reinitialize(&mut self, roi: &Roi) {
        *self = Self::new(roi);
    }

    /// 回到第一个点.
    pub fn reset(&mut self) -> TravStatus {
        self.status = self.cursor.reset(&self.roi);
        self.status
    }

    /// 当前位置是否有效?
    #[inline]
    pub fn valid(&self) -> bool {
        self.status.is_valid()
    }

    /// 最近一次操作的结果.
    #[inline]
    pub fn last_status(&self) -> TravStatus {
        self.status
    }

    /// 不移动游标, 报告当前位置是否处于新平面/新行/新区间的开头.
    #[inline]
    pub fn status(&self) -> TravStatus {
        self.cursor.status(&self.roi)
    }

    /// 当前点.
    #[inline]
    pub fn current_point(&self) -> Option<Point> {
        self.cursor.point(&self.roi)
    }

    /// 当前区间的两个端点.
    #[inline]
    pub fn current_interval(&self) -> Option<(Point, Point)> {
        self.cursor.interval_points(&self.roi)
    }

    /// 前进一个点.
    pub fn next_point(&mut self) -> TravStatus {
        self.status = self.cursor.next_x(&self.roi);
        self.status
    }

    /// 前进到下一个区间.
    pub fn next_interval(&mut self) -> TravStatus {
        self.status = self.cursor.next_interval(&self.roi);
        self.status
    }

    /// 前进到下一行.
    pub fn next_line(&mut self) -> TravStatus {
        self.status = self.cursor.next_line(&self.roi);
        self.status
    }

    /// 前进到下一个平面.
    pub fn next_plane(&mut self) -> TravStatus {
        self.status = self.cursor.next_plane(&self.roi);
        self.status
    }

    /// 当前点是否为所在平面的最后一个点?
    #[inline]
    pub fn last_point_in_plane(&self) -> bool {
        self.cursor.is_last_in_plane(&self.roi)
    }

    /// 跳转到平面 `z` 的第一个点. 平面不存在时返回 [`TravStatus::NotFound`].
    pub fn set_plane(&mut self, z: i32) -> TravStatus {
        self.status = self.cursor.set_plane(&self.roi, z);
        self.status
    }

    /// 快照.
    #[inline]
    pub fn roi(&self) -> &Roi {
        &self.roi
    }

    /// 见 [`Roi::in_roi`].
    #[inline]
    pub fn in_roi(&self, p: Point) -> bool {
        self.roi.in_roi(p)
    }

    /// 见 [`Roi::num_pix`].
    #[inline]
    pub fn num_pix(&self) -> u64 {
        self.roi.num_pix()
    }

    /// 见 [`Roi::boundaries`].
    #[inline]
    pub fn boundaries(&self, z: i32) -> Vec<Contour> {
        self.roi.boundaries(z)
    }

    /// 见 [`Roi::bounding_box`].
    #[inline]
    pub fn bounding_box(&self, z: i32) -> Option<(Point, Point)> {
        self.roi.bounding_box(z)
    }

    /// 见 [`Roi::bounding_cube`].
    #[inline]
    pub fn bounding_cube(&self) -> Option<(Point, Point)> {
        self.roi.bounding_cube()
    }
}

#[cfg(test)]
mod tests {
    use super::RoiTraverser;
    use crate::{Point, Roi, TravStatus};

    #[test]
    fn test_snapshot_semantics() {
        let mut r = Roi::new();
        r.add_box(Point::new(0, 0, 0), Point::new(1, 1, 1)).unwrap();
        let t = RoiTraverser::new(&r);
        r.clear();
        assert_eq!(t.num_pix(), 8);
        assert!(t.in_roi(Point::new(1, 1, 1)));
        assert!(t.valid());
    }

    #[test]
    fn test_walk_planes() {
        let mut r = Roi::new();
        r.add_interval(0, 2, 0, 0);
        r.add_interval(5, 6, 1, 0);
        r.add_point(Point::new(9, 9, 4));
        let mut t = RoiTraverser::new(&r);

        assert_eq!(t.status(), TravStatus::NewPlane);
        assert_eq!(
            t.current_interval(),
            Some((Point::new(0, 0, 0), Point::new(2, 0, 0)))
        );
        let mut n = 1;
        while !t.last_point_in_plane() {
            t.next_point();
            n += 1;
        }
        assert_eq!(n, 5);
        assert_eq!(t.current_point(), Some(Point::new(6, 1, 0)));

        assert_eq!(t.next_point(), TravStatus::NewPlane);
        assert_eq!(t.current_point(), Some(Point::new(9, 9, 4)));
        assert!(t.last_point_in_plane());
        assert_eq!(t.next_point(), TravStatus::EndRoi);
        assert!(!t.valid());
        assert_eq!(t.current_point(), None);

        assert_eq!(t.reset(), TravStatus::NewPlane);
        assert_eq!(t.next_line(), TravStatus::NewLine);
        assert_eq!(t.status(), TravStatus::NewLine);
        assert_eq!(t.next_interval(), TravStatus::NewPlane);
        assert_eq!(t.set_plane(3), TravStatus::NotFound);
        assert!(!t.valid());
        assert_eq!(t.set_plane(0), TravStatus::NewPlane);
        assert_eq!(t.next_plane(), TravStatus::NewPlane);
        assert_eq!(t.next_plane(), TravStatus::EndRoi);
    }

    #[test]
    fn test_single_plane_and_forwarders() {
        let mut r = Roi::new();
        r.add_box(Point::new(0, 0, 0), Point::new(2, 2, 3)).unwrap();
        let mut t = RoiTraverser::from_plane(&r, 2);
        assert_eq!(t.num_pix(), 9);
        assert_eq!(t.boundaries(2).len(), 1);
        assert_eq!(t.bounding_box(2), t.bounding_cube());
        t.reinitialize(&Roi::new());
        assert!(!t.valid());
        assert_eq!(t.last_status(), TravStatus::EndRoi);
        assert_eq!(t.roi(), &Roi::new());
    }
}
