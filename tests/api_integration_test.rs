// ==========================================
// API 层集成测试
// ==========================================
// 测试目标: ImportApi（操作日志 / 限流 / 清空）与 CatalogApi（过滤 / 脱敏）
// ==========================================

mod test_helpers;

use lease_inventory::activity::{ActivityThrottle, ManualClock};
use lease_inventory::api::{ApiError, CatalogApi, ImportApi};
use lease_inventory::domain::Restricted;
use lease_inventory::repository::{ActionLogRepository, OfferQuery};
use lease_inventory::{ActionType, ImportStatus, Role};
use std::sync::Arc;
use std::time::Duration;
use test_helpers::*;

fn throttled_api(
    db_path: &str,
    max_events: usize,
) -> (ImportApi<Arc<ManualClock>>, Arc<ManualClock>, ActionLogRepository) {
    let conn = shared_conn(db_path).unwrap();
    let clock = Arc::new(ManualClock::new());
    let throttle = ActivityThrottle::new(clock.clone(), Duration::from_secs(60), max_events, 100);
    let api = ImportApi::new(conn.clone(), throttle);
    (api, clock, ActionLogRepository::new(conn))
}

#[tokio::test]
async fn test_import_actions_are_throttled_per_actor() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (api, clock, logs) = throttled_api(&db_path, 2);

    for i in 0..3 {
        let data = sheet(vec![valid_row(&format!("OFR-{}", i))]);
        let result = api
            .import_spreadsheet("offers.xlsx", data, Some("alice"))
            .await
            .unwrap();
        assert_eq!(result.status, ImportStatus::Completed);
    }

    // 第三次被限流，但导入本身成功
    assert_eq!(logs.find_by_type(ActionType::ImportVehicles).unwrap().len(), 2);
    assert_eq!(api.list_batches(10).await.unwrap().len(), 3);

    // 其他操作人独立计数
    api.import_spreadsheet("offers.xlsx", sheet(vec![]), Some("bob"))
        .await
        .unwrap();
    assert_eq!(logs.find_by_type(ActionType::ImportVehicles).unwrap().len(), 3);

    // 窗口过后恢复
    clock.advance(Duration::from_secs(60));
    api.import_spreadsheet("offers.xlsx", sheet(vec![]), Some("alice"))
        .await
        .unwrap();
    assert_eq!(logs.find_by_type(ActionType::ImportVehicles).unwrap().len(), 4);
}

#[tokio::test]
async fn test_import_action_payload_and_system_actor() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (api, _clock, logs) = throttled_api(&db_path, 10);

    let result = api
        .import_spreadsheet("offers.xlsx", sheet(vec![valid_row("OFR-1")]), None)
        .await
        .unwrap();

    let recorded = logs.find_recent(10).unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].actor, "system");
    assert_eq!(recorded[0].detail.as_deref(), Some("completed"));
    let payload = recorded[0].payload_json.as_ref().unwrap();
    assert_eq!(payload["importBatchId"], result.import_batch_id.as_str());
    assert_eq!(payload["summary"]["importedRows"], 1);
}

#[tokio::test]
async fn test_clear_import_data_requires_actor_and_is_always_logged() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (api, _clock, logs) = throttled_api(&db_path, 0);

    let rows = vec![
        valid_row("OFR-1"),
        with_column(valid_row("OFR-2"), "Год выпуска", "1800"),
    ];
    api.import_spreadsheet("offers.xlsx", sheet(rows), Some("alice"))
        .await
        .unwrap();

    let err = api.clear_import_data("   ").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let summary = api.clear_import_data("admin").await.unwrap();
    assert_eq!(summary.deleted_offers, 1);
    assert_eq!(summary.deleted_errors, 1);
    assert_eq!(summary.deleted_batches, 1);
    assert!(api.list_batches(10).await.unwrap().is_empty());

    // 限流为 0 时导入不记录，清空仍记录
    assert!(logs.find_by_type(ActionType::ImportVehicles).unwrap().is_empty());
    let cleared = logs.find_by_type(ActionType::ClearImportData).unwrap();
    assert_eq!(cleared.len(), 1);
    assert_eq!(cleared[0].actor, "admin");
}

#[tokio::test]
async fn test_list_batch_errors_paginates_full_ledger() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (api, _clock, _logs) = throttled_api(&db_path, 10);

    let rows: Vec<Vec<String>> = (0..120)
        .map(|i| with_column(valid_row(&format!("OFR-{}", i)), "Цена", ""))
        .collect();
    let result = api
        .import_spreadsheet("offers.xlsx", sheet(rows), None)
        .await
        .unwrap();
    assert_eq!(result.errors.len(), 100);

    let page = api
        .list_batch_errors(&result.import_batch_id, 50, 100)
        .await
        .unwrap();
    assert_eq!(page.total, 120);
    assert_eq!(page.errors.len(), 20);
    assert_eq!(page.errors[0].row_number, 102);

    let err = api.list_batch_errors("no-such-batch", 10, 0).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = api.list_batches(0).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn test_import_missing_file_maps_to_not_found() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (api, _clock, _logs) = throttled_api(&db_path, 10);

    let err = api.import_file("/nonexistent/offers.xlsx", None).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let batches = api.list_batches(10).await.unwrap();
    assert_eq!(batches[0].status, ImportStatus::Failed);
}

// ==========================================
// CatalogApi
// ==========================================

#[tokio::test]
async fn test_catalog_redacts_restricted_fields_for_non_admin() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (api, _clock, _logs) = throttled_api(&db_path, 10);
    api.import_spreadsheet("offers.xlsx", sheet(vec![valid_row("OFR-1")]), None)
        .await
        .unwrap();

    let catalog = CatalogApi::new(shared_conn(&db_path).unwrap());
    let query = OfferQuery::default();

    let admin_page = catalog.list_offers(&query, Role::Admin).unwrap();
    assert_eq!(admin_page.total, 1);
    let offer = &admin_page.items[0];
    assert_eq!(
        offer.responsible_person.visible().map(String::as_str),
        Some("Иванов И.И.")
    );
    assert_eq!(
        offer.website_url,
        Restricted::Visible(Some("https://example.com/offers/1".to_string()))
    );
    assert_eq!(
        offer.yandex_disk_url.as_deref(),
        Some("https://disk.yandex.ru/d/abc123")
    );
    assert_eq!(offer.title, "Toyota Camry 2.5 AT");
    assert_eq!(offer.mileage_km, 45_000);
    assert_eq!(offer.price, 1_850_000.0);

    for role in [Role::Manager, Role::Viewer] {
        let page = catalog.list_offers(&query, role).unwrap();
        assert!(page.items[0].responsible_person.is_redacted());
        assert!(page.items[0].website_url.is_redacted());

        let json = serde_json::to_value(&page.items[0]).unwrap();
        assert!(json.get("responsiblePerson").is_none());
        assert!(json.get("websiteUrl").is_none());

        let single = catalog.get_offer(page.items[0].id, role).unwrap();
        assert!(single.responsible_person.is_redacted());
    }
}

#[tokio::test]
async fn test_catalog_filters_and_validation() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (api, _clock, _logs) = throttled_api(&db_path, 10);

    let rows = vec![
        valid_row("OFR-1"),
        with_column(with_column(valid_row("OFR-2"), "Марка", "Kia"), "Цена", "900 000"),
        with_column(valid_row("OFR-3_X"), "Год выпуска", "2015"),
    ];
    api.import_spreadsheet("offers.xlsx", sheet(rows), None)
        .await
        .unwrap();

    let catalog = CatalogApi::new(shared_conn(&db_path).unwrap());

    let page = catalog
        .list_offers(
            &OfferQuery {
                brand: Some("kia".to_string()),
                ..Default::default()
            },
            Role::Viewer,
        )
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].offer_code, "OFR-2");

    let page = catalog
        .list_offers(
            &OfferQuery {
                min_price: Some(1_000_000.0),
                year_from: Some(2018),
                ..Default::default()
            },
            Role::Viewer,
        )
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].offer_code, "OFR-1");

    // '_' 按字面匹配
    let page = catalog
        .list_offers(
            &OfferQuery {
                search: Some("3_x".to_string()),
                ..Default::default()
            },
            Role::Viewer,
        )
        .unwrap();
    assert_eq!(page.total, 1);

    let err = catalog
        .list_offers(
            &OfferQuery {
                min_price: Some(10.0),
                max_price: Some(1.0),
                ..Default::default()
            },
            Role::Viewer,
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let brands = catalog.list_brands().unwrap();
    assert_eq!(brands, vec!["Kia".to_string(), "Toyota".to_string()]);

    assert!(matches!(
        catalog.get_offer(9_999, Role::Admin).unwrap_err(),
        ApiError::NotFound(_)
    ));
}
