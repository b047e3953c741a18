// ==========================================
// 取込管道集成测试
// ==========================================
// 测试目标: CSV 文件 → 管道 → SQLite 的完整流程
// ==========================================


use chrono::NaiveDate;
use hr_import::domain::import::{CellValue, ImportContext};
use hr_import::domain::types::EntityKind;
use hr_import::importer::{
    DecodeError, ExcelParser, FileParser, ImportError, ImportPipeline, TabularImporter,
};
use hr_import::logging;
use hr_import::repository::{EmployeeRepository, ImportRepositoryImpl, TimerCardRepository};
use serde_json::json;
use std::path::{Path, PathBuf};
use test_helpers::{count_rows, create_test_db, seed_employee, seed_reference_data, write_csv};

/// 社員台帳 xlsx: 派遣元ID 为数值、生年月日 为日期格式、第 2 行缺 氏名、第 3 行为空行
fn employees_xlsx() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/employees_basic.xlsx")
}

fn create_pipeline(db_path: &str) -> ImportPipeline<ImportRepositoryImpl> {
    let repo = ImportRepositoryImpl::new(db_path).expect("Failed to create ImportRepository");
    ImportPipeline::new(repo)
}

#[tokio::test]
async fn test_three_row_partial_success() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "employees.csv",
        &[
            "派遣元ID,氏名,生年月日",
            "1001,山田 太郎,1990-04-01",
            "1002,,1991-05-02",
            "1003,グエン ヴァン アン,1995-12-24",
        ],
    );

    let summary = create_pipeline(&db_path)
        .import(&file, EntityKind::Employee, &ImportContext::employees())
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&summary).unwrap(),
        json!({
            "created": 2,
            "updated": 0,
            "rejected": 1,
            "errors": [{"row": 2, "reason": "missing required field: full_name_kanji"}]
        })
    );
    assert_eq!(count_rows(&db_path, "employees"), 2);
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    seed_reference_data(&db_path).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "employees.csv",
        &[
            "社員ID,氏名,性別,派遣先ID,寮ID,時給",
            "2001,佐藤 花子,女,F001,10,1250",
            "2002,鈴木 一郎,男性,F002,,1300",
            "2003,田中 次郎,M,,,",
        ],
    );
    let pipeline = create_pipeline(&db_path);

    let first = pipeline
        .import(&file, EntityKind::Employee, &ImportContext::employees())
        .await
        .unwrap();
    let second = pipeline
        .import(&file, EntityKind::Employee, &ImportContext::employees())
        .await
        .unwrap();

    assert_eq!((first.created, first.updated, first.rejected), (3, 0, 0));
    assert_eq!((second.created, second.updated, second.rejected), (0, 3, 0));
    assert_eq!(count_rows(&db_path, "employees"), 3);

    let employee = EmployeeRepository::new(&db_path)
        .unwrap()
        .find_by_hakenmoto_id("2001")
        .unwrap()
        .unwrap();
    assert_eq!(employee.gender.as_deref(), Some("女性"));
    assert_eq!(employee.apartment_id, Some(10));
    assert_eq!(employee.jikyu, Some(1250));
}

#[tokio::test]
async fn test_bad_date_isolated_to_its_row() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "employees.csv",
        &[
            "派遣元ID,氏名,生年月日",
            "3001,A,1990/01/01",
            "3002,B,1990-13-45",
            "3003,C,19900303",
        ],
    );

    let summary = create_pipeline(&db_path)
        .import(&file, EntityKind::Employee, &ImportContext::employees())
        .await
        .unwrap();

    assert_eq!(summary.created, 2);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.errors[0].row, 2);
    assert!(summary.errors[0].reason.contains("date_of_birth"));
}

#[tokio::test]
async fn test_rows_counted_with_blank_lines_and_unknown_refs() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    seed_reference_data(&db_path).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "employees.csv",
        &[
            "派遣元ID,氏名,派遣先ID,寮ID",
            "4001,A,F001,10",
            ",,,",
            "4002,B,F999,",
            "4003,C,,99",
            "4004,D,F002,",
        ],
    );

    let summary = create_pipeline(&db_path)
        .import(&file, EntityKind::Employee, &ImportContext::employees())
        .await
        .unwrap();

    // 空行不计入，但保留文件中的行号
    assert_eq!(summary.total_rows(), 4);
    assert_eq!(summary.created, 2);
    let rows: Vec<usize> = summary.errors.iter().map(|e| e.row).collect();
    assert_eq!(rows, vec![3, 4]);
    assert_eq!(summary.errors[0].reason, "unknown factory: F999");
}

#[tokio::test]
async fn test_header_only_file_writes_nothing() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(dir.path(), "employees.csv", &["派遣元ID,氏名"]);

    let err = create_pipeline(&db_path)
        .import(&file, EntityKind::Employee, &ImportContext::employees())
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Decode(DecodeError::NoDataRows)));
    assert_eq!(count_rows(&db_path, "employees"), 0);
}

#[tokio::test]
async fn test_unsupported_and_missing_files() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let txt = write_csv(dir.path(), "employees.txt", &["派遣元ID,氏名", "1,A"]);
    let pipeline = create_pipeline(&db_path);

    let err = pipeline
        .import(&txt, EntityKind::Employee, &ImportContext::employees())
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Decode(DecodeError::UnsupportedFormat(_))));

    let err = pipeline
        .import(
            &dir.path().join("missing.csv"),
            EntityKind::Employee,
            &ImportContext::employees(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Decode(DecodeError::FileNotFound(_))));
}

#[tokio::test]
async fn test_timer_cards_for_month() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    seed_reference_data(&db_path).unwrap();
    seed_employee(&db_path, "1001", "山田 太郎").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "timecards.csv",
        &[
            "日付,社員ID,社員名,出勤時刻,退勤時刻,休憩(分),備考",
            "2025-10-01,1001,山田 太郎,08:00,17:00,60,",
            "2025-10-02,1001,山田 太郎,20:00,05:00,45,夜勤",
            "2025-11-01,1001,山田 太郎,08:00,17:00,60,",
            "2025-10-03,9999,不明,08:00,17:00,60,",
            "2025-10-01,1001,山田 太郎,08:30,17:30,60,重複",
        ],
    );

    let summary = create_pipeline(&db_path)
        .import(
            &file,
            EntityKind::TimerCard,
            &ImportContext::timer_cards("F001", 2025, 10),
        )
        .await
        .unwrap();

    assert_eq!(summary.created, 2);
    assert_eq!(summary.rejected, 3);
    let reasons: Vec<&str> = summary.errors.iter().map(|e| e.reason.as_str()).collect();
    assert_eq!(
        reasons,
        vec![
            "work_date 2025-11-01 is outside 2025-10",
            "unknown employee: 9999",
            "duplicate natural key in batch (first seen at row 1)",
        ]
    );

    let cards = TimerCardRepository::new(&db_path)
        .unwrap()
        .list_for_month("F001", 2025, 10)
        .unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].factory_id, "F001");
    assert_eq!(cards[1].worked_minutes(), Some(495));
    assert_eq!(cards[1].notes.as_deref(), Some("夜勤"));
}

#[tokio::test]
async fn test_timer_card_unknown_factory_rejects_rows() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    seed_reference_data(&db_path).unwrap();
    seed_employee(&db_path, "1001", "山田 太郎").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(dir.path(), "tc.csv", &["日付,社員ID", "2025-10-01,1001"]);

    let summary = create_pipeline(&db_path)
        .import(
            &file,
            EntityKind::TimerCard,
            &ImportContext::timer_cards("F404", 2025, 10),
        )
        .await
        .unwrap();

    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.errors[0].reason, "unknown factory: F404");
}

#[test]
fn test_excel_parser_decodes_workbook() {
    let sheet = ExcelParser.open(&employees_xlsx()).unwrap();

    assert_eq!(sheet.headers, vec!["派遣元ID", "氏名", "生年月日"]);

    let rows: Vec<_> = sheet.rows.map(|r| r.unwrap()).collect();
    // 空行跳过，行号保持文件中的位置
    let indices: Vec<usize> = rows.iter().map(|r| r.row_index).collect();
    assert_eq!(indices, vec![1, 2, 4]);

    let birth = NaiveDate::from_ymd_opt(1990, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(rows[0].get("派遣元ID"), Some(&CellValue::Float(1001.0)));
    assert_eq!(rows[0].get("氏名"), Some(&CellValue::Text("山田 太郎".to_string())));
    assert_eq!(rows[0].get("生年月日"), Some(&CellValue::DateTime(birth)));
    assert_eq!(rows[1].get("氏名"), Some(&CellValue::Empty));
}

#[tokio::test]
async fn test_excel_import_end_to_end() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();

    let summary = create_pipeline(&db_path)
        .import(&employees_xlsx(), EntityKind::Employee, &ImportContext::employees())
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&summary).unwrap(),
        json!({
            "created": 2,
            "updated": 0,
            "rejected": 1,
            "errors": [{"row": 2, "reason": "missing required field: full_name_kanji"}]
        })
    );

    let repo = EmployeeRepository::new(&db_path).unwrap();
    let taro = repo.find_by_hakenmoto_id("1001").unwrap().unwrap();
    assert_eq!(taro.full_name_kanji, "山田 太郎");
    assert_eq!(taro.date_of_birth, NaiveDate::from_ymd_opt(1990, 1, 1));
    let hanako = repo.find_by_hakenmoto_id("1003").unwrap().unwrap();
    assert_eq!(hanako.date_of_birth, NaiveDate::from_ymd_opt(1995, 12, 25));
}
