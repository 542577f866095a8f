// ==========================================
// 健康档案测试数据生成器
// ==========================================
// 用途: 生成大批量平面健康记录 CSV（确定性，同参数同输出）
// 用法: generate_health_records [输出路径] [记录数]
// 默认: data/complete_health_records.csv, 20000 条
// ==========================================

use chrono::{Duration, NaiveDate};
use csv::Writer;
use std::env;
use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

const DEFAULT_OUTPUT: &str = "data/complete_health_records.csv";
const DEFAULT_RECORDS: usize = 20_000;
const DATE_RANGE_DAYS: u64 = 365;

const CSV_HEADER: &[&str] = &[
    "student_id",
    "full_name",
    "college",
    "department",
    "phone",
    "gender",
    "year",
    "appointment_id",
    "appointment_doctor",
    "appointment_date",
    "appointment_time",
    "appointment_reason",
    "appointment_status",
    "consultation_id",
    "symptoms",
    "diagnosis",
    "consultation_doctor",
    "consultation_date",
    "lab_test_id",
    "test_type",
    "test_result",
    "lab_technician",
    "lab_date",
    "bill_id",
    "service",
    "amount",
    "bill_status",
    "bill_date",
];

// ===== 数据池 =====

const FIRST_NAMES_MALE: &[&str] = &[
    "Mohammed", "Abdi", "Dawit", "Yonas", "Biniam", "Tesfaye", "Kebede", "Mulugeta", "Bekele",
    "Tadesse", "Ahmed", "Ali", "Hassan", "Ibrahim", "Omar", "Solomon", "Daniel", "Samuel",
    "Elias", "Abraham",
];

const FIRST_NAMES_FEMALE: &[&str] = &[
    "Hana", "Fatuma", "Sara", "Meron", "Rahel", "Tigist", "Hawi", "Bekelech", "Chaltu", "Lensa",
    "Aisha", "Amina", "Mariam", "Ruth", "Esther", "Bethlehem", "Selam", "Senait",
];

const LAST_NAMES: &[&str] = &[
    "Ahmed", "Ali", "Hassan", "Kebede", "Tesfaye", "Mulugeta", "Tadesse", "Bekele", "Haile",
    "Solomon", "Abera", "Negash", "Fikadu", "Daba", "Gurmessa", "Gemechu", "Lemma", "Desta",
    "Girma", "Wolde", "Gebre", "Assefa", "Alemu",
];

const COLLEGES: &[(&str, &[&str])] = &[
    ("CNCS", &["ICT", "Computer Science", "Software Engineering", "Data Science"]),
    ("CVM", &["Vet Science", "Animal Science", "Veterinary Medicine"]),
    ("CAES", &["Agronomy", "Horticulture", "Plant Science", "Soil Science"]),
    ("CHE", &["Public Health", "Nursing", "Environmental Health"]),
    ("CBE", &["Economics", "Accounting", "Management", "Finance"]),
    ("CALS", &["Law", "Legal Studies", "Criminology"]),
];

const DOCTORS: &[&str] = &[
    "Dr. Lensa",
    "Dr. Roba",
    "Dr. Gemechu",
    "Dr. Abera",
    "Dr. Tadesse",
    "Dr. Bekele",
];

const TECHNICIANS: &[&str] = &["Merga", "Chaltu", "Tigist", "Hawi", "Bekelech", "Ahmed"];

const REASONS: &[&str] = &[
    "Headache", "Abdominal pain", "Fever", "Cough", "Eye infection", "Skin rash", "Dental pain",
    "Back pain", "Allergies", "Chest pain", "Dizziness", "Sore throat",
];

const SYMPTOMS: &[&str] = &[
    "Fever and cough",
    "Stomach cramps and nausea",
    "Red and itchy eyes",
    "Lower back pain",
    "High fever and body aches",
    "Severe headache",
    "Persistent cough",
    "Sore throat and fever",
];

const DIAGNOSES: &[&str] = &[
    "Flu", "Gastritis", "Conjunctivitis", "Muscle strain", "Malaria", "Migraine", "Bronchitis",
    "Tonsillitis", "Common cold", "Typhoid", "UTI",
];

const TEST_TYPES: &[&str] = &[
    "Malaria", "Urine Test", "Blood Test", "TB Test", "CBC", "Stool Test", "HIV Test",
];

const TEST_RESULTS: &[&str] = &["Negative", "Positive", "Normal", "Abnormal", "High WBC"];

const SERVICES: &[&str] = &[
    "CBC Test", "Urine Analysis", "Malaria Test", "Blood Test", "Eye Examination",
    "Consultation Fee", "TB Test", "X-Ray", "ECG",
];

const AMOUNTS: &[u32] = &[5, 10, 15, 20, 25, 30, 35, 40, 50, 60, 75, 100];

const STATUSES: &[&str] = &["Pending", "Approved", "Completed", "Cancelled"];

const BILL_STATUSES: &[&str] = &["Paid", "Pending"];

// ===== 确定性取值 =====

// 对 (index, salt) 做整数散列，避免各列按同一周期对齐
fn mix(index: usize, salt: u64) -> u64 {
    let mut x = (index as u64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(salt.wrapping_mul(0xBF58_476D_1CE4_E5B9));
    x ^= x >> 31;
    x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 29)
}

fn pick<T: Copy>(pool: &[T], index: usize, salt: u64) -> T {
    pool[(mix(index, salt) % pool.len() as u64) as usize]
}

fn range(index: usize, salt: u64, low: u64, high: u64) -> u64 {
    low + mix(index, salt) % (high - low + 1)
}

fn generate_record(index: usize, start: NaiveDate) -> Vec<String> {
    // ===== 学生 =====
    let female = mix(index, 1) % 2 == 0;
    let first_name = if female {
        pick(FIRST_NAMES_FEMALE, index, 2)
    } else {
        pick(FIRST_NAMES_MALE, index, 2)
    };
    let (college, departments) = pick(COLLEGES, index, 3);
    let enrollment_year = range(index, 4, 2021, 2024);

    // ===== 预约 =====
    let date = start + Duration::days(range(index, 5, 0, DATE_RANGE_DAYS) as i64);
    let date = date.format("%Y-%m-%d").to_string();
    let time = format!(
        "{:02}:{:02}",
        range(index, 6, 8, 16),
        if mix(index, 7) % 2 == 0 { 0 } else { 30 }
    );

    // 约 30% 的记录无问诊
    let has_consultation = mix(index, 8) % 10 >= 3;
    let (consultation_id, symptoms, diagnosis, consultation_doctor, consultation_date) =
        if has_consultation {
            (
                format!("CONS-{:05}", 10000 + index),
                pick(SYMPTOMS, index, 9).to_string(),
                pick(DIAGNOSES, index, 10).to_string(),
                pick(DOCTORS, index, 11).to_string(),
                date.clone(),
            )
        } else {
            Default::default()
        };

    vec![
        format!("HU-UGR-{}-{:05}", enrollment_year, 10000 + index),
        format!("{} {}", first_name, pick(LAST_NAMES, index, 12)),
        college.to_string(),
        pick(departments, index, 13).to_string(),
        format!("09{}", range(index, 14, 10_000_000, 99_999_999)),
        if female { "F" } else { "M" }.to_string(),
        range(index, 15, 1, 5).to_string(),
        format!("APT-{:05}", 10000 + index),
        pick(DOCTORS, index, 16).to_string(),
        date.clone(),
        time,
        pick(REASONS, index, 17).to_string(),
        pick(STATUSES, index, 18).to_string(),
        consultation_id,
        symptoms,
        diagnosis,
        consultation_doctor,
        consultation_date,
        format!("LAB-{:05}", 10000 + index),
        pick(TEST_TYPES, index, 19).to_string(),
        pick(TEST_RESULTS, index, 20).to_string(),
        pick(TECHNICIANS, index, 21).to_string(),
        date.clone(),
        format!("BILL-{:05}", 10000 + index),
        pick(SERVICES, index, 22).to_string(),
        pick(AMOUNTS, index, 23).to_string(),
        pick(BILL_STATUSES, index, 24).to_string(),
        date,
    ]
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let output = args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let records: usize = match args.next() {
        Some(raw) => raw.parse()?,
        None => DEFAULT_RECORDS,
    };

    if let Some(parent) = Path::new(&output).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    println!("开始生成 {} 条健康记录 → {}", records, output);

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("起始日期无效")?;
    let mut wtr = Writer::from_writer(File::create(&output)?);
    wtr.write_record(CSV_HEADER)?;

    for i in 0..records {
        wtr.write_record(&generate_record(i, start))?;
        if (i + 1) % 1000 == 0 {
            println!("✓ 已生成 {} 条", i + 1);
        }
    }

    wtr.flush()?;
    println!("✓ 生成完成: {} ({} 条)", output, records);
    Ok(())
}
