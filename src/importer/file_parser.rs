// ==========================================
// 校医院健康档案系统 - 输入文件读取
// ==========================================
// 支持: CSV (.csv, 流式逐行) / Excel (.xlsx/.xls, 首个工作表)
// 约束: 打开失败为致命错误；单条记录解析失败只影响该行
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::row::{Field, Row};
use calamine::{open_workbook_auto, Reader};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::Path;

fn source_unavailable(path: &Path, message: impl ToString) -> ImportError {
    ImportError::SourceUnavailable {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

// ==========================================
// CsvRowReader - 流式 CSV 读取
// ==========================================
pub struct CsvRowReader {
    reader: csv::Reader<File>,
    headers: Vec<String>,
    record: StringRecord,
    next_index: usize,
    finished: bool,
}

impl CsvRowReader {
    pub fn open(path: &Path) -> ImportResult<Self> {
        let file = File::open(path).map_err(|e| source_unavailable(path, e))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| source_unavailable(path, e))?
            .iter()
            .map(normalize_header)
            .collect();

        Ok(Self {
            reader,
            headers,
            record: StringRecord::new(),
            next_index: 1,
            finished: false,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for CsvRowReader {
    type Item = ImportResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let index = self.next_index;
        match self.reader.read_record(&mut self.record) {
            Ok(true) => {
                self.next_index += 1;
                let values = self.record.iter().map(str::to_string);
                Some(Ok(Row::from_columns(
                    index,
                    self.headers.iter().map(String::as_str),
                    values,
                )))
            }
            Ok(false) => {
                self.finished = true;
                None
            }
            Err(e) => {
                // I/O 错误无法跳过，报告后结束
                if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                    self.finished = true;
                }
                self.next_index += 1;
                Some(Err(e.into()))
            }
        }
    }
}

// ==========================================
// ExcelRowReader - 工作簿读取
// ==========================================
// 工作表整体载入后按行顺序迭代
pub struct ExcelRowReader {
    headers: Vec<String>,
    rows: std::vec::IntoIter<Vec<String>>,
    next_index: usize,
}

impl ExcelRowReader {
    pub fn open(path: &Path) -> ImportResult<Self> {
        let mut workbook = open_workbook_auto(path).map_err(|e| source_unavailable(path, e))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| source_unavailable(path, "工作簿没有工作表"))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| source_unavailable(path, e))?;

        let mut rows = range
            .rows()
            .map(|cells| cells.iter().map(|cell| cell.to_string()).collect::<Vec<_>>());

        let headers = rows
            .next()
            .map(|header| header.iter().map(|h| normalize_header(h)).collect())
            .unwrap_or_default();
        let rows: Vec<Vec<String>> = rows.collect();

        Ok(Self {
            headers,
            rows: rows.into_iter(),
            next_index: 1,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for ExcelRowReader {
    type Item = ImportResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.rows.next()?;
        let index = self.next_index;
        self.next_index += 1;
        Some(Ok(Row::from_columns(
            index,
            self.headers.iter().map(String::as_str),
            values,
        )))
    }
}

// ==========================================
// RowSource - 按扩展名选择读取器
// ==========================================
pub enum RowSource {
    Csv(CsvRowReader),
    Excel(ExcelRowReader),
}

impl RowSource {
    /// 打开输入文件
    ///
    /// # 错误
    /// - SourceUnavailable: 文件不存在或无法读取
    /// - UnsupportedFormat: 扩展名不是 csv/xlsx/xls
    pub fn open(path: &Path) -> ImportResult<Self> {
        if !path.is_file() {
            return Err(source_unavailable(path, "文件不存在"));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(RowSource::Csv(CsvRowReader::open(path)?)),
            "xlsx" | "xls" => Ok(RowSource::Excel(ExcelRowReader::open(path)?)),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }

    pub fn headers(&self) -> &[String] {
        match self {
            RowSource::Csv(reader) => reader.headers(),
            RowSource::Excel(reader) => reader.headers(),
        }
    }

    /// 表头中缺失的必需列
    pub fn missing_columns(&self) -> Vec<&'static str> {
        let headers = self.headers();
        Field::ALL
            .iter()
            .map(Field::column)
            .filter(|column| !headers.iter().any(|h| h == column))
            .collect()
    }
}

impl Iterator for RowSource {
    type Item = ImportResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RowSource::Csv(reader) => reader.next(),
            RowSource::Excel(reader) => reader.next(),
        }
    }
}
