//! 批处理指标收集模块
//!
//! 记录切分与 KPI 计算的运行指标，并在内存中聚合批次摘要。

use std::collections::BTreeMap;

use contracts::EventKind;
use metrics::{counter, gauge, histogram};

/// 记录一次记录文件的切分结果
///
/// # Example
///
/// ```ignore
/// let report = segmenter.segment(&recording, kind, &mut sink)?;
/// record_segmentation(kind, report.events, &report.window_durations, report.discarded.len());
/// ```
pub fn record_segmentation(
    kind: EventKind,
    events: usize,
    window_durations: &[f64],
    discarded: usize,
) {
    counter!("kpi_recordings_segmented_total", "kind" => kind.as_str()).increment(1);
    gauge!("kpi_last_recording_events", "kind" => kind.as_str()).set(events as f64);

    for duration in window_durations {
        histogram!("kpi_window_duration_s", "kind" => kind.as_str()).record(*duration);
    }
    if discarded > 0 {
        counter!("kpi_windows_dropped_total", "kind" => kind.as_str()).increment(discarded as u64);
    }
}

/// 记录加载或切分失败的记录文件
pub fn record_recording_failed(stage: &str) {
    counter!("kpi_recordings_failed_total", "stage" => stage.to_string()).increment(1);
}

/// 记录 KPI 行计算结果
pub fn record_kpi_rows(kind: EventKind, computed: usize, skipped: usize) {
    counter!("kpi_rows_computed_total", "kind" => kind.as_str()).increment(computed as u64);
    if skipped > 0 {
        counter!("kpi_rows_skipped_total", "kind" => kind.as_str()).increment(skipped as u64);
    }
}

/// 记录阶段耗时
pub fn record_stage_duration_ms(stage: &str, duration_ms: f64) {
    histogram!("kpi_stage_duration_ms", "stage" => stage.to_string()).record(duration_ms);
}

/// 批次指标聚合器
///
/// 在内存中聚合一次运行的统计，结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct BatchMetricsAggregator {
    /// 成功切分的记录数
    pub recordings: u64,

    /// 失败的记录数
    pub failed_recordings: u64,

    /// 各事件类型的检测数
    pub events: BTreeMap<EventKind, u64>,

    /// 各事件类型持久化的窗口数
    pub windows: BTreeMap<EventKind, u64>,

    /// 被丢弃的窗口数
    pub discarded_windows: u64,

    /// 计算出的 KPI 行数
    pub rows_computed: u64,

    /// 跳过的 KPI 行数
    pub rows_skipped: u64,

    /// 窗口时长统计 (s)
    pub window_duration_stats: RunningStats,
}

impl BatchMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加一次切分结果
    pub fn update_segmentation(
        &mut self,
        kind: EventKind,
        events: usize,
        window_durations: &[f64],
        discarded: usize,
    ) {
        *self.events.entry(kind).or_insert(0) += events as u64;
        *self.windows.entry(kind).or_insert(0) += window_durations.len() as u64;
        self.discarded_windows += discarded as u64;
        for duration in window_durations {
            self.window_duration_stats.push(*duration);
        }
    }

    /// 累加成功处理的记录
    pub fn recording_done(&mut self) {
        self.recordings += 1;
    }

    /// 累加失败的记录
    pub fn recording_failed(&mut self) {
        self.failed_recordings += 1;
    }

    /// 累加 KPI 行
    pub fn update_rows(&mut self, computed: usize, skipped: usize) {
        self.rows_computed += computed as u64;
        self.rows_skipped += skipped as u64;
    }

    /// 生成摘要报告
    pub fn summary(&self) -> BatchSummary {
        let total = self.recordings + self.failed_recordings;
        BatchSummary {
            recordings: self.recordings,
            failed_recordings: self.failed_recordings,
            failure_rate: if total > 0 {
                self.failed_recordings as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            events: self.events.clone(),
            windows: self.windows.clone(),
            discarded_windows: self.discarded_windows,
            rows_computed: self.rows_computed,
            rows_skipped: self.rows_skipped,
            window_duration_s: StatsSummary::from(&self.window_duration_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 批次摘要
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub recordings: u64,
    pub failed_recordings: u64,
    pub failure_rate: f64,
    pub events: BTreeMap<EventKind, u64>,
    pub windows: BTreeMap<EventKind, u64>,
    pub discarded_windows: u64,
    pub rows_computed: u64,
    pub rows_skipped: u64,
    pub window_duration_s: StatsSummary,
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== KPI Batch Summary ===")?;
        writeln!(
            f,
            "Recordings: {} ok, {} failed ({:.2}%)",
            self.recordings, self.failed_recordings, self.failure_rate
        )?;
        for (kind, events) in &self.events {
            let windows = self.windows.get(kind).copied().unwrap_or(0);
            writeln!(f, "  {}: {} events, {} windows", kind, events, windows)?;
        }
        writeln!(f, "Discarded windows: {}", self.discarded_windows)?;
        writeln!(
            f,
            "KPI rows: {} computed, {} skipped",
            self.rows_computed, self.rows_skipped
        )?;
        writeln!(f, "Window duration (s): {}", self.window_duration_s)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值，NaN 忽略
    pub fn push(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats_skips_nan() {
        let mut stats = RunningStats::default();
        for v in [2.0, f64::NAN, 4.0, 6.0] {
            stats.push(v);
        }
        assert_eq!(stats.count(), 3);
        assert!((stats.mean() - 4.0).abs() < 1e-10);
        assert!((stats.variance() - 4.0).abs() < 1e-10);
        assert_eq!(stats.min(), 2.0);
        assert_eq!(stats.max(), 6.0);
    }

    #[test]
    fn test_aggregator_update() {
        let mut agg = BatchMetricsAggregator::new();
        agg.update_segmentation(EventKind::Aeb, 2, &[12.0, 14.0], 0);
        agg.update_segmentation(EventKind::Fcw, 1, &[], 1);
        agg.recording_done();
        agg.recording_failed();
        agg.update_rows(2, 1);

        let summary = agg.summary();
        assert_eq!(summary.events.get(&EventKind::Aeb), Some(&2));
        assert_eq!(summary.windows.get(&EventKind::Fcw), Some(&0));
        assert_eq!(summary.discarded_windows, 1);
        assert!((summary.failure_rate - 50.0).abs() < 1e-10);
        assert!((summary.window_duration_s.mean - 13.0).abs() < 1e-10);
    }

    #[test]
    fn test_summary_display() {
        let mut agg = BatchMetricsAggregator::new();
        agg.update_segmentation(EventKind::Aeb, 3, &[10.0], 2);
        agg.recording_done();
        agg.update_rows(1, 0);

        let output = agg.summary().to_string();
        assert!(output.contains("Recordings: 1 ok, 0 failed (0.00%)"));
        assert!(output.contains("events, 1 windows"));
        assert!(output.contains("KPI rows: 1 computed, 0 skipped"));
    }

    #[test]
    fn test_recorders_without_exporter() {
        // no recorder installed: calls are no-ops
        record_segmentation(EventKind::Fcw, 1, &[9.0], 0);
        record_recording_failed("load");
        record_kpi_rows(EventKind::Aeb, 1, 1);
        record_stage_duration_ms("segment", 3.5);
    }
}
