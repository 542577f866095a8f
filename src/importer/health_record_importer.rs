// ==========================================
// 校医院健康档案系统 - 健康档案导入器
// ==========================================
// 职责: 串联读取 → 解析实体 → 落库 → 汇报，每行独立
// 流程: 逐行顺序处理，单线程，无并行
// 红线: 行级错误不越过行边界；只有数据源不可用会中止批次
// ==========================================

use crate::config::{ImportOptions, RowCommitMode};
use crate::domain::{ImportBatch, ImportCounts, ImportReport};
use crate::importer::batch_reporter::BatchReporter;
use crate::importer::entity_resolver::EntityResolver;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RowSource;
use crate::importer::record_materializer::RecordMaterializer;
use crate::importer::row::Row;
use crate::repository::{HealthRecordRepository, HealthRecordRepositoryImpl, ImportBatchRepository};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// HealthRecordImporter
// ==========================================
pub struct HealthRecordImporter<R: HealthRecordRepository> {
    repo: R,
    // 批次台账（可选）
    ledger: Option<ImportBatchRepository>,
    options: ImportOptions,
}

impl HealthRecordImporter<HealthRecordRepositoryImpl> {
    /// 基于共享连接创建导入器（健康档案与批次台账共用连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>, options: ImportOptions) -> Self {
        let ledger = ImportBatchRepository::new(Arc::clone(&conn));
        Self::new(HealthRecordRepositoryImpl::new(conn), options).with_ledger(ledger)
    }
}

impl<R: HealthRecordRepository> HealthRecordImporter<R> {
    pub fn new(repo: R, options: ImportOptions) -> Self {
        Self {
            repo,
            ledger: None,
            options,
        }
    }

    pub fn with_ledger(mut self, ledger: ImportBatchRepository) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 从文件导入（.csv / .xlsx / .xls）
    ///
    /// # 返回
    /// - Ok(ImportReport): 批次完成（可能含行级错误）
    /// - Err(SourceUnavailable | UnsupportedFormat): 未处理任何行
    #[instrument(skip(self, file_path), fields(batch_id))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportReport> {
        let path = file_path.as_ref();
        let source = RowSource::open(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "无法打开导入文件");
            e
        })?;

        let missing = source.missing_columns();
        if !missing.is_empty() {
            warn!(columns = ?missing, "表头缺少必需列，相关行将报错");
        }

        Ok(self.import_rows(source, Some(path)))
    }

    /// 导入已解析的行序列
    ///
    /// 行级错误（含读取失败的记录）均被记录后跳过。
    pub fn import_rows<I>(&self, rows: I, source_path: Option<&Path>) -> ImportReport
    where
        I: IntoIterator<Item = ImportResult<Row>>,
    {
        let started = Instant::now();
        let started_at = Utc::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let path_display = source_path
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        info!(
            batch_id = %batch_id,
            mode = self.options.row_commit_mode.as_str(),
            collision_policy = self.options.collision_policy.as_str(),
            "{}",
            crate::i18n::t_with_args("import.started", &[("path", path_display.as_str())])
        );

        let mut resolver = EntityResolver::new(&self.repo, self.options.collision_policy);
        let materializer = RecordMaterializer::new(&self.repo);
        let mut reporter = BatchReporter::new(self.options.progress_interval);

        for (position, item) in rows.into_iter().enumerate() {
            let row_index = position + 1;
            match item {
                Ok(row) => {
                    self.process_row(&row, &mut resolver, &materializer, &mut reporter);
                }
                Err(e) => reporter.record_failure(row_index, &e, None, Vec::new()),
            }
            reporter.row_finished(row_index);
        }

        let elapsed = started.elapsed();
        reporter.log_summary();
        info!(
            batch_id = %batch_id,
            elapsed_ms = elapsed.as_millis() as u64,
            students = resolver.cached_students(),
            doctors = resolver.cached_doctors(),
            technicians = resolver.cached_technicians(),
            "导入完成"
        );

        let report = reporter.into_report(batch_id, elapsed);
        self.record_batch(&report, source_path, started_at);
        report
    }

    /// 处理单行：ATOMIC 模式下包裹在 SAVEPOINT 中
    fn process_row(
        &self,
        row: &Row,
        resolver: &mut EntityResolver<'_, R>,
        materializer: &RecordMaterializer<'_, R>,
        reporter: &mut BatchReporter,
    ) {
        let atomic = self.options.row_commit_mode == RowCommitMode::Atomic;
        resolver.begin_row(row.index);

        if atomic {
            if let Err(e) = self.repo.begin_row() {
                reporter.record_failure(row.index, &ImportError::from(e), None, Vec::new());
                return;
            }
        }

        let mut row_counts = ImportCounts::default();
        let result = materializer
            .materialize(row, resolver, &mut row_counts)
            .and_then(|materialized| {
                if atomic {
                    self.repo.commit_row()?;
                }
                Ok(materialized)
            });

        match result {
            Ok(materialized) => {
                debug!(
                    row = row.index,
                    appointment_id = materialized.appointment_id,
                    "行导入完成"
                );
                let collisions = resolver.commit_row();
                reporter.record_success(&row_counts, collisions);
            }
            Err(e) if atomic => {
                if let Err(rollback_err) = self.repo.rollback_row() {
                    error!(row = row.index, error = %rollback_err, "行回滚失败");
                }
                resolver.rollback_row();
                reporter.record_failure(row.index, &e, None, Vec::new());
            }
            Err(e) => {
                // 已写入的实体保留，计数同步保留
                let collisions = resolver.commit_row();
                reporter.record_failure(row.index, &e, Some(&row_counts), collisions);
            }
        }
    }

    /// 写入批次台账；失败只告警，不影响导入结果
    fn record_batch(
        &self,
        report: &ImportReport,
        source_path: Option<&Path>,
        started_at: DateTime<Utc>,
    ) {
        let Some(ledger) = &self.ledger else {
            return;
        };

        let batch = ImportBatch {
            batch_id: report.batch_id.clone(),
            file_name: source_path
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string()),
            file_path: source_path.map(|p| p.display().to_string()),
            total_rows: report.total_rows,
            counts: report.counts,
            failed_rows: report.failed_rows(),
            collision_count: report.collisions.len(),
            row_commit_mode: self.options.row_commit_mode.as_str().to_string(),
            started_at,
            completed_at: Utc::now(),
            elapsed_ms: report.elapsed.as_millis() as i64,
        };

        if let Err(e) = ledger.insert_batch(&batch, &report.errors) {
            warn!(batch_id = %report.batch_id, error = %e, "批次台账写入失败");
        }
    }
}
