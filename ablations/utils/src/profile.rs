//! 算法运行统计.

use std::time::{Duration, Instant};

/// ablation/benchmark 计时器.
///
/// 该计时器支持 "中途中断" 与 "结束中断, 继续开始计时".
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时.
    #[inline]
    fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    /// 开始计时.
    #[inline]
    fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    ///
    /// # 注意
    ///
    /// 上一次调用必须是 `self.start()`, 否则计算时间值无意义.
    #[inline]
    fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 累计时长 (微秒).
    #[inline]
    fn total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

/// ablation/benchmark 数据统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 遇到的空体模个数.
    trivial: u64,

    /// 遇到的非空体模个数.
    target: u64,

    /// 在非空体模上运行算法的总时间.
    target_time: AccTimer,

    /// 整个任务花费的总时间 (包括生成体模与稠密参照计算).
    real_time: AccTimer,

    /// 最耗时的一次任务.
    most: Option<Duration>,

    /// 与稠密参照结果不一致的体素总数.
    mismatched: u64,

    /// 算法输出的体素总数.
    produced: u64,
}

impl Profile {
    /// 初始化. 同时开始总计时.
    #[inline]
    pub fn new() -> Self {
        Self {
            trivial: 0,
            target: 0,
            target_time: AccTimer::new(),
            real_time: AccTimer::new(),
            most: None,
            mismatched: 0,
            produced: 0,
        }
    }

    /// 记录一个空体模.
    #[inline]
    pub fn count_trivial(&mut self) {
        self.trivial += 1;
    }

    /// 记录一个非空体模. `start` 表明是否同时开启新一轮计时.
    #[inline]
    pub fn count_target(&mut self, start: bool) {
        self.target += 1;
        if start {
            self.target_start();
        }
    }

    /// 开始一次计时.
    #[inline]
    pub fn target_start(&mut self) {
        self.target_time.start();
    }

    /// 结束一次计时.
    #[inline]
    pub fn target_elapsed(&mut self) {
        let d = self.target_time.elapsed();
        self.most = Some(self.most.map_or(d, |m| m.max(d)));
    }

    /// 累加一次比对结果: 输出 `produced` 个体素, 其中 `mismatched` 个与参照不一致.
    #[inline]
    pub fn count_result(&mut self, produced: u64, mismatched: u64) {
        self.produced += produced;
        self.mismatched += mismatched;
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    /// 空体模个数.
    #[inline]
    pub fn get_trivial(&self) -> u64 {
        self.trivial
    }

    /// 非空体模个数.
    #[inline]
    pub fn get_target(&self) -> u64 {
        self.target
    }

    /// 不一致体素总数.
    #[inline]
    pub fn get_mismatched(&self) -> u64 {
        self.mismatched
    }

    /// 输出体素总数.
    #[inline]
    pub fn get_produced(&self) -> u64 {
        self.produced
    }

    /// 以微秒为单位获得处理非空体模的总时间.
    #[inline]
    pub fn get_target_time_us(&self) -> u64 {
        self.target_time.total_us()
    }

    /// 以微秒为单位获得总自然时间.
    #[inline]
    pub fn get_real_time_us(&self) -> u64 {
        self.real_time.total_us()
    }

    /// 以微秒为单位获得处理非空体模的平均时间.
    #[inline]
    pub fn get_avg_target_time_us(&self) -> Option<f64> {
        match self.target {
            0 => None,
            target => Some(self.get_target_time_us() as f64 / target as f64),
        }
    }

    /// 最耗时的一次任务. 不存在任务时返回 `None`.
    #[inline]
    pub fn get_most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
