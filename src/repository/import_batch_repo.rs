// ==========================================
// 校医院健康档案系统 - 导入批次台账仓储
// ==========================================
// 对齐: schema.sql import_batch / import_row_error 表
// 红线: 台账只追加，不修改已落库的批次
// ==========================================

use crate::domain::{ImportBatch, ImportCounts, RowError, RowErrorKind};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const BATCH_COLUMNS: &str = r#"
    batch_id, file_name, file_path, total_rows,
    students_created, appointments_created, consultations_created,
    lab_tests_created, bills_created,
    failed_rows, collision_count, row_commit_mode,
    started_at, completed_at, elapsed_ms
"#;

fn parse_error_kind(raw: &str) -> RowErrorKind {
    match raw.trim() {
        "MALFORMED_ROW" => RowErrorKind::MalformedRow,
        "RESOLUTION_COLLISION" => RowErrorKind::ResolutionCollision,
        "STORAGE" => RowErrorKind::Storage,
        _ => RowErrorKind::Other,
    }
}

fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn map_batch(row: &Row) -> rusqlite::Result<ImportBatch> {
    Ok(ImportBatch {
        batch_id: row.get(0)?,
        file_name: row.get(1)?,
        file_path: row.get(2)?,
        total_rows: row.get::<_, i64>(3)? as usize,
        counts: ImportCounts {
            students: row.get::<_, i64>(4)? as usize,
            appointments: row.get::<_, i64>(5)? as usize,
            consultations: row.get::<_, i64>(6)? as usize,
            lab_tests: row.get::<_, i64>(7)? as usize,
            bills: row.get::<_, i64>(8)? as usize,
        },
        failed_rows: row.get::<_, i64>(9)? as usize,
        collision_count: row.get::<_, i64>(10)? as usize,
        row_commit_mode: row.get(11)?,
        started_at: parse_timestamp(12, row.get(12)?)?,
        completed_at: parse_timestamp(13, row.get(13)?)?,
        elapsed_ms: row.get(14)?,
    })
}

// ==========================================
// ImportBatchRepository - 导入批次台账
// ==========================================
pub struct ImportBatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ImportBatchRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入批次摘要及其行级错误（同一事务）
    ///
    /// # 返回
    /// - Ok(n): 写入的行级错误条数
    pub fn insert_batch(&self, batch: &ImportBatch, errors: &[RowError]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            &format!(
                "INSERT INTO import_batch ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                BATCH_COLUMNS
            ),
            params![
                batch.batch_id,
                batch.file_name,
                batch.file_path,
                batch.total_rows as i64,
                batch.counts.students as i64,
                batch.counts.appointments as i64,
                batch.counts.consultations as i64,
                batch.counts.lab_tests as i64,
                batch.counts.bills as i64,
                batch.failed_rows as i64,
                batch.collision_count as i64,
                batch.row_commit_mode,
                batch.started_at.to_rfc3339(),
                batch.completed_at.to_rfc3339(),
                batch.elapsed_ms,
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO import_row_error (batch_id, row_index, error_kind, message)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )?;
            for error in errors {
                stmt.execute(params![
                    batch.batch_id,
                    error.row_index as i64,
                    error.kind.as_str(),
                    error.message,
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(errors.len())
    }

    /// 按批次 ID 查询
    pub fn find_batch(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatch>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM import_batch WHERE batch_id = ?1", BATCH_COLUMNS);
        Ok(conn.query_row(&sql, params![batch_id], map_batch).optional()?)
    }

    /// 最近的导入批次（按开始时间倒序）
    pub fn get_recent_batches(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM import_batch ORDER BY started_at DESC LIMIT ?1",
            BATCH_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let batches = stmt
            .query_map(params![limit as i64], map_batch)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    /// 批次的行级错误（按行号升序）
    pub fn list_row_errors(&self, batch_id: &str) -> RepositoryResult<Vec<RowError>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT row_index, error_kind, message
            FROM import_row_error
            WHERE batch_id = ?1
            ORDER BY row_index, id
            "#,
        )?;
        let errors = stmt
            .query_map(params![batch_id], |row| {
                Ok(RowError {
                    row_index: row.get::<_, i64>(0)? as usize,
                    kind: parse_error_kind(&row.get::<_, String>(1)?),
                    message: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(errors)
    }
}
