// ==========================================
// HealthRecordImporter 集成测试
// ==========================================
// 测试目标: 文件 → 数据库的完整导入流程
// ==========================================

mod test_helpers;

use health_center::config::{CollisionPolicy, ConfigManager, ImportConfigReader, ImportOptions, RowCommitMode};
use health_center::domain::{Role, RowErrorKind};
use health_center::importer::{HealthRecordImporter, ImportError};
use health_center::logging;
use health_center::repository::{HealthRecordRepositoryImpl, ImportBatchRepository};
use test_helpers::{create_test_db, open_shared, write_csv, write_csv_with_header, write_raw_csv, RecordBuilder, HEADER};

fn create_test_importer(
    db_path: &str,
    options: ImportOptions,
) -> HealthRecordImporter<HealthRecordRepositoryImpl> {
    HealthRecordImporter::from_connection(open_shared(db_path), options)
}

#[test]
fn test_import_csv_basic() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, ImportOptions::default());

    let csv = write_csv(&[
        RecordBuilder::new("HU-UGR-2024-10001"),
        RecordBuilder::new("HU-UGR-2024-10002").set("full_name", "Abdi Daba"),
        RecordBuilder::new("HU-UGR-2024-10003")
            .set("full_name", "Sara Lemma")
            .without_consultation(),
    ]);

    let report = importer.import_file(csv.path()).expect("Import should succeed");

    assert_eq!(report.total_rows, 3);
    assert!(!report.has_row_errors(), "errors: {:?}", report.errors);
    assert_eq!(report.counts.students, 3);
    assert_eq!(report.counts.appointments, 3);
    assert_eq!(report.counts.consultations, 2);
    assert_eq!(report.counts.lab_tests, 3);
    assert_eq!(report.counts.bills, 3);

    // 计数与库内记录一致
    let stored = importer.repository().count_records().unwrap();
    assert_eq!(stored, report.counts);

    // 3 名学生 + 2 名医生 + 1 名技师
    assert_eq!(importer.repository().count_people().unwrap(), 6);
}

#[test]
fn test_duplicate_student_keeps_first_profile() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path, ImportOptions::default());

    let csv = write_csv(&[
        RecordBuilder::new("HU-UGR-2023-10007").set("college", "CNCS"),
        RecordBuilder::new("HU-UGR-2023-10007")
            .set("college", "CBE")
            .set("department", "Economics")
            .set("year", "4"),
    ]);

    let report = importer.import_file(csv.path()).unwrap();
    assert!(!report.has_row_errors());
    assert_eq!(report.counts.students, 1);
    assert_eq!(report.counts.appointments, 2);
    assert_eq!(report.counts.bills, 2);

    let profile = importer
        .repository()
        .find_student_profile("HU-UGR-2023-10007")
        .unwrap()
        .expect("profile should exist");
    assert_eq!(profile.college, "CNCS");
    assert_eq!(profile.department, "ICT");
    assert_eq!(profile.year, 2);

    let appointments = importer
        .repository()
        .list_appointments_for_student(profile.id)
        .unwrap();
    assert_eq!(appointments.len(), 2);
}

#[test]
fn test_empty_consultation_id_creates_four_records() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path, ImportOptions::default());

    // 问诊编号为空时，其余问诊列即使有值也被忽略
    let csv = write_csv(&[RecordBuilder::new("HU-UGR-2022-10010").set("consultation_id", "")]);

    let report = importer.import_file(csv.path()).unwrap();
    assert!(!report.has_row_errors());
    assert_eq!(report.counts.consultations, 0);
    assert_eq!(report.counts.total(), 4);

    // 问诊医生未被创建
    assert!(importer
        .repository()
        .find_person_by_username("dr_roba")
        .unwrap()
        .is_none());
}

#[test]
fn test_invalid_date_row_is_logged_and_skipped() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path, ImportOptions::default());

    let csv = write_csv(&[
        RecordBuilder::new("HU-UGR-2024-10001"),
        RecordBuilder::new("HU-UGR-2024-10002"),
        RecordBuilder::new("HU-UGR-2024-10003"),
        RecordBuilder::new("HU-UGR-2024-10004").set("appointment_date", "2024-13-45"),
        RecordBuilder::new("HU-UGR-2024-10005"),
    ]);

    let report = importer.import_file(csv.path()).unwrap();

    assert_eq!(report.total_rows, 5);
    assert_eq!(report.failed_rows(), 1);
    let row_error = &report.errors[0];
    assert_eq!(row_error.row_index, 4);
    assert_eq!(row_error.kind, RowErrorKind::MalformedRow);
    assert!(row_error.message.contains("appointment_date"));
    assert!(row_error.message.contains("2024-13-45"));

    // 失败行未创建任何实体
    assert_eq!(report.counts.students, 4);
    assert_eq!(report.counts.appointments, 4);
    assert!(importer
        .repository()
        .find_student_profile("HU-UGR-2024-10004")
        .unwrap()
        .is_none());
    assert!(importer
        .repository()
        .find_person_by_username("hu_ugr_2024_10004")
        .unwrap()
        .is_none());
}

#[test]
fn test_counts_match_database_with_partial_rows() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path, ImportOptions::default());

    let csv = write_csv(&[
        RecordBuilder::new("HU-UGR-2024-10001"),
        RecordBuilder::new("HU-UGR-2024-10002").set("amount", "12,50"),
        RecordBuilder::new("HU-UGR-2024-10003").set("year", "second"),
        RecordBuilder::new("HU-UGR-2024-10004").set("appointment_doctor", "  "),
        RecordBuilder::new("HU-UGR-2024-10005").without_consultation(),
    ]);

    let report = importer.import_file(csv.path()).unwrap();
    assert_eq!(report.failed_rows(), 2);
    assert_eq!(
        report.errors.iter().map(|e| e.row_index).collect::<Vec<_>>(),
        vec![2, 3]
    );

    // 增量模式：失败行已写入的实体保留并计数
    let stored = importer.repository().count_records().unwrap();
    assert_eq!(stored, report.counts);
    assert_eq!(report.counts.bills, 3);
    // 行 2 写入了预约、问诊与检验，行 3 未创建档案
    assert_eq!(report.counts.appointments, 4);
    assert_eq!(report.counts.consultations, 3);
    assert_eq!(report.counts.lab_tests, 4);
    assert_eq!(report.counts.students, 4);

    // 空白医生姓名按原值解析为一名医生
    let blank_doctor = importer
        .repository()
        .find_person_by_username("__")
        .unwrap()
        .expect("blank doctor should be created");
    assert_eq!(blank_doctor.role, Role::Doctor);
}

#[test]
fn test_atomic_rows_leave_no_partial_records() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let options = ImportOptions {
        row_commit_mode: RowCommitMode::Atomic,
        ..ImportOptions::default()
    };
    let importer = create_test_importer(&db_path, options);

    let csv = write_csv(&[
        RecordBuilder::new("HU-UGR-2024-10001"),
        RecordBuilder::new("HU-UGR-2024-10002")
            .set("amount", "abc")
            .set("appointment_doctor", "Dr. Gemechu"),
        // 行 2 回滚后，同一医生在后续行重新创建
        RecordBuilder::new("HU-UGR-2024-10003").set("appointment_doctor", "Dr. Gemechu"),
    ]);

    let report = importer.import_file(csv.path()).unwrap();
    assert_eq!(report.failed_rows(), 1);
    assert_eq!(report.counts.students, 2);
    assert_eq!(report.counts.appointments, 2);
    assert_eq!(report.counts.bills, 2);

    let repo = importer.repository();
    assert_eq!(repo.count_records().unwrap(), report.counts);
    assert!(repo.find_person_by_username("hu_ugr_2024_10002").unwrap().is_none());
    assert!(repo.find_person_by_username("dr_gemechu").unwrap().is_some());
}

#[test]
fn test_name_collision_lenient_and_strict() {
    logging::init_test();

    let records = [
        RecordBuilder::new("HU-UGR-2024-10001").set("appointment_doctor", "Dr. Lensa"),
        RecordBuilder::new("HU-UGR-2024-10002").set("appointment_doctor", "Dr Lensa"),
    ];

    // 宽松模式：绑定到已有医生并报告
    let (_db_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path, ImportOptions::default());
    let report = importer.import_file(write_csv(&records).path()).unwrap();
    assert!(!report.has_row_errors());
    assert_eq!(report.collisions.len(), 1);
    assert_eq!(report.collisions[0].row_index, 2);
    assert_eq!(report.collisions[0].username, "dr_lensa");
    assert_eq!(report.collisions[0].existing_name, "Dr. Lensa");

    // 严格模式：冲突行失败
    let (_db_file2, db_path2) = create_test_db().unwrap();
    let options = ImportOptions {
        collision_policy: CollisionPolicy::Strict,
        ..ImportOptions::default()
    };
    let importer = create_test_importer(&db_path2, options);
    let report = importer.import_file(write_csv(&records).path()).unwrap();
    assert_eq!(report.failed_rows(), 1);
    assert_eq!(report.errors[0].row_index, 2);
    assert_eq!(report.errors[0].kind, RowErrorKind::ResolutionCollision);
}

#[test]
fn test_missing_file_aborts_batch() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path, ImportOptions::default());

    let result = importer.import_file("/nonexistent/health_records.csv");
    assert!(matches!(result, Err(ImportError::SourceUnavailable { .. })));
    assert!(result.unwrap_err().is_fatal());

    let ledger = ImportBatchRepository::new(open_shared(&db_path));
    assert!(ledger.get_recent_batches(10).unwrap().is_empty());
}

#[test]
fn test_unsupported_extension_rejected() {
    let (_db_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path, ImportOptions::default());

    let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    let result = importer.import_file(file.path());
    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
}

#[test]
fn test_missing_column_fails_every_row() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path, ImportOptions::default());

    let header: Vec<&str> = HEADER.iter().copied().filter(|c| *c != "amount").collect();
    let amount_pos = HEADER.iter().position(|c| *c == "amount").unwrap();
    let records = ["HU-UGR-2024-10001", "HU-UGR-2024-10002"].map(|id| {
        let mut record = RecordBuilder::new(id).to_record();
        record.remove(amount_pos);
        record
    });

    let csv = write_csv_with_header(&header, records);
    let report = importer.import_file(csv.path()).unwrap();

    assert_eq!(report.failed_rows(), 2);
    assert!(report
        .errors
        .iter()
        .all(|e| e.kind == RowErrorKind::MalformedRow && e.message.starts_with("amount")));
    assert_eq!(report.counts.bills, 0);
}

#[test]
fn test_short_record_is_a_row_error() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path, ImportOptions::default());

    let full = RecordBuilder::new("HU-UGR-2024-10001").to_record().join(",");
    let content = format!(
        "{}\n{}\nHU-UGR-2024-10002,Abdi Daba,CBE\n",
        HEADER.join(","),
        full
    );
    let csv = write_raw_csv(&content);

    let report = importer.import_file(csv.path()).unwrap();
    assert_eq!(report.total_rows, 2);
    assert_eq!(report.failed_rows(), 1);
    assert_eq!(report.errors[0].row_index, 2);
    assert_eq!(report.counts.students, 1);
}

#[test]
fn test_rerun_reuses_entities_and_appends_records() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let csv = write_csv(&[
        RecordBuilder::new("HU-UGR-2024-10001"),
        RecordBuilder::new("HU-UGR-2024-10002"),
    ]);

    let first = create_test_importer(&db_path, ImportOptions::default())
        .import_file(csv.path())
        .unwrap();
    assert_eq!(first.counts.students, 2);

    let importer = create_test_importer(&db_path, ImportOptions::default());
    let second = importer.import_file(csv.path()).unwrap();
    assert!(!second.has_row_errors());
    assert_eq!(second.counts.students, 0);
    assert_eq!(second.counts.appointments, 2);
    assert!(second.collisions.is_empty());

    let stored = importer.repository().count_records().unwrap();
    assert_eq!(stored.students, 2);
    assert_eq!(stored.appointments, 4);
    assert_eq!(importer.repository().count_people().unwrap(), 5);
}

#[test]
fn test_batch_ledger_records_each_import() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path, ImportOptions::default());

    let csv = write_csv(&[
        RecordBuilder::new("HU-UGR-2024-10001"),
        RecordBuilder::new("HU-UGR-2024-10002").set("appointment_time", "9am"),
    ]);
    let report = importer.import_file(csv.path()).unwrap();

    let ledger = ImportBatchRepository::new(open_shared(&db_path));
    let batch = ledger
        .find_batch(&report.batch_id)
        .unwrap()
        .expect("batch should be recorded");
    assert_eq!(batch.total_rows, 2);
    assert_eq!(batch.failed_rows, 1);
    assert_eq!(batch.counts, report.counts);
    assert_eq!(batch.row_commit_mode, "INCREMENTAL");

    let errors = ledger.list_row_errors(&report.batch_id).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].row_index, 2);
}

#[test]
fn test_options_loaded_from_config() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);

    let config = ConfigManager::from_connection(conn.clone()).unwrap();
    config
        .set_global_config_value("import.collision_policy", "strict")
        .unwrap();
    config
        .set_global_config_value("import.row_commit_mode", "ATOMIC")
        .unwrap();

    let options = config.load_import_options().unwrap();
    let importer = HealthRecordImporter::from_connection(conn, options);
    assert_eq!(importer.options().collision_policy, CollisionPolicy::Strict);
    assert_eq!(importer.options().row_commit_mode, RowCommitMode::Atomic);
}

#[test]
fn test_import_excel_workbook() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path, ImportOptions::default());

    let workbook = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/health_records_sample.xlsx");
    let report = importer.import_file(&workbook).unwrap();

    // 第 3 行日期 2024-02-30 无效
    assert_eq!(report.total_rows, 3);
    assert_eq!(report.failed_rows(), 1);
    assert_eq!(report.errors[0].row_index, 3);
    assert_eq!(report.errors[0].kind, RowErrorKind::MalformedRow);

    // 同一学生两行：档案取第一行
    assert_eq!(report.counts.students, 1);
    assert_eq!(report.counts.appointments, 2);
    assert_eq!(report.counts.consultations, 1);
    assert_eq!(report.counts.lab_tests, 2);
    assert_eq!(report.counts.bills, 2);

    let repo = importer.repository();
    let profile = repo
        .find_student_profile("HU-UGR-2024-20001")
        .unwrap()
        .expect("profile should exist");
    assert_eq!(profile.college, "CHE");
    assert_eq!(profile.year, 2);

    let amounts: Vec<i64> = repo
        .list_bills_for_student(profile.id)
        .unwrap()
        .iter()
        .map(|bill| bill.amount.cents())
        .collect();
    assert_eq!(amounts, vec![3550, 10000]);
}
