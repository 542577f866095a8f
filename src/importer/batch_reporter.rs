// ==========================================
// 校医院健康档案系统 - 批次汇报
// ==========================================
// 职责: 五类计数、行级错误收集、进度与摘要输出
// 约束: 行级错误只记录，不中断批次
// ==========================================

use crate::domain::{CollisionNotice, ImportCounts, ImportReport, RowError};
use crate::i18n::{format_count, t, t_with_args};
use crate::importer::error::ImportError;
use std::time::Duration;
use tracing::{error, info};

pub struct BatchReporter {
    progress_interval: usize,
    counts: ImportCounts,
    errors: Vec<RowError>,
    collisions: Vec<CollisionNotice>,
    rows_seen: usize,
    progress_lines: usize,
}

impl BatchReporter {
    /// # 参数
    /// - progress_interval: 每处理多少行输出一次进度（0 = 不输出）
    pub fn new(progress_interval: usize) -> Self {
        Self {
            progress_interval,
            counts: ImportCounts::default(),
            errors: Vec::new(),
            collisions: Vec::new(),
            rows_seen: 0,
            progress_lines: 0,
        }
    }

    /// 记录成功行
    pub fn record_success(&mut self, row_counts: &ImportCounts, collisions: Vec<CollisionNotice>) {
        self.counts.merge(row_counts);
        self.collisions.extend(collisions);
    }

    /// 记录失败行
    ///
    /// # 参数
    /// - persisted: 本行失败前已保留的实体计数（ATOMIC 模式下为空）
    pub fn record_failure(
        &mut self,
        row_index: usize,
        err: &ImportError,
        persisted: Option<&ImportCounts>,
        collisions: Vec<CollisionNotice>,
    ) {
        if let Some(partial) = persisted {
            self.counts.merge(partial);
        }
        self.collisions.extend(collisions);

        let message = err.to_string();
        error!(
            row = row_index,
            kind = err.row_error_kind().as_str(),
            "{}",
            t_with_args(
                "import.row_error",
                &[("row", row_index.to_string().as_str()), ("message", message.as_str())]
            )
        );
        self.errors.push(RowError {
            row_index,
            kind: err.row_error_kind(),
            message,
        });
    }

    /// 行处理结束（成功或失败），按间隔输出进度
    ///
    /// # 返回
    /// - true: 本行输出了进度行
    pub fn row_finished(&mut self, row_index: usize) -> bool {
        self.rows_seen += 1;
        if self.progress_interval == 0 || row_index % self.progress_interval != 0 {
            return false;
        }
        info!(
            rows = row_index,
            "{}",
            t_with_args("import.progress", &[("count", format_count(row_index).as_str())])
        );
        self.progress_lines += 1;
        true
    }

    pub fn counts(&self) -> &ImportCounts {
        &self.counts
    }

    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    pub fn collisions(&self) -> &[CollisionNotice] {
        &self.collisions
    }

    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    pub fn progress_lines(&self) -> usize {
        self.progress_lines
    }

    /// 摘要行（已本地化）
    pub fn summary_lines(&self) -> Vec<String> {
        let count = |key: &str, n: usize| t_with_args(key, &[("count", format_count(n).as_str())]);

        let mut lines = vec![
            t("import.completed"),
            count("import.students_created", self.counts.students),
            count("import.appointments_created", self.counts.appointments),
            count("import.consultations_created", self.counts.consultations),
            count("import.lab_tests_created", self.counts.lab_tests),
            count("import.bills_created", self.counts.bills),
        ];
        if !self.errors.is_empty() {
            lines.push(count("import.failed_rows", self.errors.len()));
        }
        if !self.collisions.is_empty() {
            lines.push(count("import.collisions", self.collisions.len()));
        }
        lines
    }

    pub fn log_summary(&self) {
        for line in self.summary_lines() {
            info!("{}", line);
        }
    }

    pub fn into_report(self, batch_id: String, elapsed: Duration) -> ImportReport {
        ImportReport {
            batch_id,
            total_rows: self.rows_seen,
            counts: self.counts,
            errors: self.errors,
            collisions: self.collisions,
            elapsed,
        }
    }
}
