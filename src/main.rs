// ==========================================
// 校医院健康档案系统 - 命令行入口
// ==========================================
// 子命令: import / init-db / history / config
// 退出码: 0 = 完成；1 = 致命错误；2 = 存在失败行且启用 --fail-on-row-errors
// ==========================================

use anyhow::Context;
use clap::{Parser, Subcommand};
use health_center::config::{
    CollisionPolicy, ConfigManager, ImportConfigReader, ImportOptions, RowCommitMode,
};
use health_center::db::{default_db_path, ensure_schema, open_sqlite_connection};
use health_center::i18n;
use health_center::importer::HealthRecordImporter;
use health_center::repository::ImportBatchRepository;
use rusqlite::Connection;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

const EXIT_ROW_ERRORS: u8 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Health center records import", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// SQLite database path
    #[arg(long, global = true, env = "HEALTH_CENTER_DB", value_hint = clap::ValueHint::FilePath)]
    db: Option<PathBuf>,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a health-records file (.csv, .xlsx, .xls)
    Import {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
        /// Fail rows whose doctor/technician name collides with an existing user
        #[arg(long)]
        strict: bool,
        /// Roll back every entity of a failed row
        #[arg(long)]
        atomic_rows: bool,
        /// Rows between progress lines (0 disables)
        #[arg(long)]
        progress_interval: Option<usize>,
        /// Exit with status 2 when any row failed
        #[arg(long)]
        fail_on_row_errors: bool,
        /// Summary language (en, zh-CN)
        #[arg(long)]
        locale: Option<String>,
    },
    /// Create the database schema
    InitDb,
    /// Show recent import batches
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Also list the failed rows of each batch
        #[arg(long)]
        errors: bool,
    },
    /// Read or change stored import settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// List stored settings
    List,
    /// Print the effective import options
    Show,
    /// Store a setting
    Set { key: String, value: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    health_center::logging::init(cli.log_json);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let db_path = cli
        .db
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(default_db_path);

    match cli.command {
        Commands::Import {
            file,
            strict,
            atomic_rows,
            progress_interval,
            fail_on_row_errors,
            locale,
        } => {
            let conn = open_database(&db_path)?;
            let config = ConfigManager::from_connection(Arc::clone(&conn))?;

            let mut options = config
                .load_import_options()
                .context("读取导入配置失败")?;
            apply_overrides(
                &mut options,
                strict,
                atomic_rows,
                progress_interval,
                fail_on_row_errors,
                locale,
            );
            i18n::set_locale(&options.locale);

            tracing::info!(db = %db_path, "使用数据库");
            let importer = HealthRecordImporter::from_connection(conn, options.clone());
            let report = importer.import_file(&file)?;
            tracing::info!(
                "{}",
                i18n::t_with_args("import.batch_id", &[("batch_id", report.batch_id.as_str())])
            );

            if options.fail_on_row_errors && report.has_row_errors() {
                return Ok(ExitCode::from(EXIT_ROW_ERRORS));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::InitDb => {
            open_database(&db_path)?;
            tracing::info!(db = %db_path, "{}", i18n::t("common.success"));
            Ok(ExitCode::SUCCESS)
        }
        Commands::History { limit, errors } => {
            let conn = open_database(&db_path)?;
            let ledger = ImportBatchRepository::new(conn);
            for batch in ledger.get_recent_batches(limit)? {
                println!(
                    "{}  {}  rows={} failed={} collisions={} created={} mode={} {}ms  {}",
                    batch.started_at.format("%Y-%m-%d %H:%M:%S"),
                    batch.batch_id,
                    batch.total_rows,
                    batch.failed_rows,
                    batch.collision_count,
                    batch.counts.total(),
                    batch.row_commit_mode,
                    batch.elapsed_ms,
                    batch.file_path.as_deref().unwrap_or("-"),
                );
                if errors {
                    for row_error in ledger.list_row_errors(&batch.batch_id)? {
                        println!(
                            "    row {} [{}] {}",
                            row_error.row_index, row_error.kind, row_error.message
                        );
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { action } => {
            let conn = open_database(&db_path)?;
            let config = ConfigManager::from_connection(conn)?;
            match action {
                ConfigAction::List => {
                    for (key, value) in config.get_config_snapshot()? {
                        println!("{} = {}", key, value);
                    }
                }
                ConfigAction::Show => {
                    let options = config.load_import_options()?;
                    println!("{}", serde_json::to_string_pretty(&options)?);
                }
                ConfigAction::Set { key, value } => {
                    config.set_global_config_value(&key, &value)?;
                    tracing::info!(key = %key, value = %value, "配置已保存");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn open_database(db_path: &str) -> anyhow::Result<Arc<Mutex<Connection>>> {
    let conn = open_sqlite_connection(db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    ensure_schema(&conn).context("建表失败")?;
    Ok(Arc::new(Mutex::new(conn)))
}

fn apply_overrides(
    options: &mut ImportOptions,
    strict: bool,
    atomic_rows: bool,
    progress_interval: Option<usize>,
    fail_on_row_errors: bool,
    locale: Option<String>,
) {
    if strict {
        options.collision_policy = CollisionPolicy::Strict;
    }
    if atomic_rows {
        options.row_commit_mode = RowCommitMode::Atomic;
    }
    if let Some(interval) = progress_interval {
        options.progress_interval = interval;
    }
    if fail_on_row_errors {
        options.fail_on_row_errors = true;
    }
    if let Some(locale) = locale {
        options.locale = locale;
    }
}
