// ==========================================
// ImportApi 端到端测试
// ==========================================
// 测试目标: 配置 → ImportApi → 管道 → SQLite
// ==========================================


use hr_import::api::{ApiError, HealthApi, ImportApi};
use hr_import::domain::import::ImportContext;
use hr_import::domain::types::EntityKind;
use hr_import::logging;
use hr_import::repository::EmployeeRepository;
use test_helpers::{
    count_rows, create_test_db, seed_employee, seed_reference_data, test_config, test_config_with,
    write_csv, write_large_employee_csv,
};

#[tokio::test]
async fn test_import_employees_report() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let upload_dir = tempfile::tempdir().unwrap();
    let api = ImportApi::new(&test_config(&db_path, &upload_dir)).unwrap();
    let file = write_csv(
        upload_dir.path(),
        "employees.csv",
        &["派遣元ID,氏名,メール", "1001,山田 太郎,taro@example.jp", "1002,佐藤 花子,not-an-email"],
    );

    let report = api.import_employees(&file).await.unwrap();

    assert_eq!(report.entity_kind, EntityKind::Employee);
    assert_eq!(report.summary.created, 1);
    assert_eq!(report.summary.rejected, 1);
    assert!(!report.batch_id.is_empty());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["entity_kind"], "employee");
    assert_eq!(json["created"], 1);
    assert_eq!(json["errors"][0]["row"], 2);
}

#[tokio::test]
async fn test_import_upload_removes_temp_file() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let upload_dir = tempfile::tempdir().unwrap();
    let config = test_config(&db_path, &upload_dir);
    let api = ImportApi::new(&config).unwrap();

    let content = "派遣元ID,氏名\n5001,高橋 三郎\n".as_bytes();
    let report = api
        .import_upload("社員台帳.csv", content, EntityKind::Employee, &ImportContext::employees())
        .await
        .unwrap();
    assert_eq!(report.summary.created, 1);

    // 解码失败时同样清理
    let err = api
        .import_upload("empty.csv", b"", EntityKind::Employee, &ImportContext::employees())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Import(_)));

    let leftover = std::fs::read_dir(&config.upload_dir).unwrap().count();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn test_rejects_unsupported_extension() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let upload_dir = tempfile::tempdir().unwrap();
    let api = ImportApi::new(&test_config(&db_path, &upload_dir)).unwrap();

    let err = api
        .import_upload("photo.png", b"\x89PNG", EntityKind::Employee, &ImportContext::employees())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn test_import_timer_cards_validates_month() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let upload_dir = tempfile::tempdir().unwrap();
    let api = ImportApi::new(&test_config(&db_path, &upload_dir)).unwrap();
    let file = write_csv(upload_dir.path(), "tc.csv", &["日付,社員ID", "2025-10-01,1001"]);

    let err = api.import_timer_cards(&file, "F001", 2025, 0).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = api.import_timer_cards(&file, " ", 2025, 10).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn test_batch_import_runs_each_file() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    seed_reference_data(&db_path).unwrap();
    seed_employee(&db_path, "1001", "山田 太郎").unwrap();
    let upload_dir = tempfile::tempdir().unwrap();
    let api = ImportApi::new(&test_config(&db_path, &upload_dir)).unwrap();

    let files = vec![
        write_csv(upload_dir.path(), "a.csv", &["日付,社員ID", "2025-10-01,1001", "2025-10-02,1001"]),
        write_csv(upload_dir.path(), "b.csv", &["日付,社員ID", "2025-10-03,1001"]),
        write_csv(upload_dir.path(), "c.csv", &["日付,社員ID"]),
    ];
    let context = ImportContext::timer_cards("F001", 2025, 10);

    let results = api.batch_import(files, EntityKind::TimerCard, &context).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().summary.created, 2);
    assert_eq!(results[1].as_ref().unwrap().summary.created, 1);
    assert!(results[2].is_err());
    assert_eq!(count_rows(&db_path, "timer_cards"), 3);
}

#[tokio::test]
async fn test_factory_configs_then_employees() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let upload_dir = tempfile::tempdir().unwrap();
    let api = ImportApi::new(&test_config(&db_path, &upload_dir)).unwrap();

    let factories = tempfile::tempdir().unwrap();
    std::fs::write(
        factories.path().join("F010.json"),
        r#"{"factory_id":"F010","name":"瑞陵精機 恵那工場","shifts":["昼勤","夜勤"]}"#,
    )
    .unwrap();
    std::fs::write(factories.path().join("broken.json"), "{").unwrap();

    let summary = api.import_factory_configs(factories.path()).await.unwrap();
    assert_eq!((summary.created, summary.failed), (1, 1));

    let file = write_csv(upload_dir.path(), "e.csv", &["派遣元ID,氏名,工場ID", "7001,木村 四郎,F010"]);
    let report = api.import_employees(&file).await.unwrap();
    assert_eq!(report.summary.created, 1);

    let employee = EmployeeRepository::new(&db_path)
        .unwrap()
        .find_by_hakenmoto_id("7001")
        .unwrap()
        .unwrap();
    assert_eq!(employee.factory_id.as_deref(), Some("F010"));
}

#[tokio::test]
async fn test_template_and_health() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let upload_dir = tempfile::tempdir().unwrap();
    let api = ImportApi::new(&test_config(&db_path, &upload_dir)).unwrap();

    let columns = api.template(EntityKind::Employee);
    assert_eq!(&columns[..2], &["派遣元ID".to_string(), "氏名".to_string()]);

    let status = HealthApi::new(api.connection()).check();
    assert!(status.is_healthy());
    assert_eq!(status.schema_version, Some(hr_import::db::CURRENT_SCHEMA_VERSION));
}

#[tokio::test]
async fn test_timeout_keeps_committed_rows() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let upload_dir = tempfile::tempdir().unwrap();
    let config = test_config_with(&db_path, &upload_dir, &[("IMPORT_TIMEOUT_SECS", "1")]);
    let api = ImportApi::new(&config).unwrap();

    // 每行一个事务，1 秒内无法写完
    let total_rows = 200_000;
    let file = write_large_employee_csv(upload_dir.path(), "large.csv", total_rows);

    let err = api.import_employees(&file).await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout(1)));

    // 超时前已提交的行保留
    let committed = count_rows(&db_path, "employees");
    assert!(committed > 0);
    assert!(committed < total_rows as i64);
}

#[tokio::test]
async fn test_invalid_caller_context_is_invalid_input() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let upload_dir = tempfile::tempdir().unwrap();
    let api = ImportApi::new(&test_config(&db_path, &upload_dir)).unwrap();
    let file = write_csv(upload_dir.path(), "tc.csv", &["日付,社員ID", "2025-10-01,1001"]);

    let err = api
        .import_file(&file, EntityKind::TimerCard, &ImportContext::timer_cards("F001", 2025, 13))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert_eq!(count_rows(&db_path, "timer_cards"), 0);
}
