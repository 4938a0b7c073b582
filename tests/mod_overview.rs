mod common;

use bson::Bson;
use evgrid::errors::AppError;
use evgrid::query::OverviewParams;
use evgrid::service::VehicleService;
use std::sync::Arc;

fn service() -> (VehicleService, Arc<common::MemorySink>) {
    let sink = Arc::new(common::MemorySink::default());
    (VehicleService::new(Arc::new(common::vehicles()), sink.clone()), sink)
}

fn params(page: &str, size: &str) -> OverviewParams {
    OverviewParams { page: Some(page.into()), page_size: Some(size.into()), ..Default::default() }
}

#[test]
fn pages_cover_all_matches_without_overlap() {
    let (svc, _) = service();
    let first = svc.overview(&params("1", "3")).unwrap();
    let last = svc.overview(&params("3", "3")).unwrap();
    assert_eq!((first.total_count, first.total_pages), (7, 3));
    assert_eq!(first.rows.len(), 3);
    assert_eq!(last.rows.len(), 1);
    assert!(first.rows.iter().all(|r| !last.rows.iter().any(|l| l.id == r.id)));
}

#[test]
fn page_past_the_end_is_empty_but_counted() {
    let (svc, _) = service();
    let res = svc.overview(&params("9", "10")).unwrap();
    assert!(res.rows.is_empty());
    assert_eq!(res.total_count, 7);
}

#[test]
fn garbage_paging_uses_defaults() {
    let (svc, _) = service();
    let res = svc.overview(&params("-1", "ten")).unwrap();
    assert_eq!((res.page, res.page_size), (1, 10));
    assert_eq!(res.rows.len(), 7);
}

#[test]
fn sorted_pages_follow_the_sort() {
    let (svc, _) = service();
    let p = OverviewParams {
        sort_field: Some("PriceEuro".into()),
        page_size: Some("2".into()),
        ..Default::default()
    };
    let res = svc.overview(&p).unwrap();
    let prices: Vec<_> = res.rows.iter().filter_map(|d| d.get("PriceEuro").cloned()).collect();
    assert_eq!(prices, vec![Bson::Int32(75000), Bson::Int32(68040)]);
}

#[test]
fn rows_carry_only_the_overview_projection() {
    let (svc, _) = service();
    let res = svc.overview(&OverviewParams::default()).unwrap();
    for row in &res.rows {
        let keys: Vec<&str> = row.data.keys().map(String::as_str).collect();
        assert!(keys.iter().all(|k| ["Brand", "Model", "BodyStyle", "PriceEuro", "Date"].contains(k)));
        assert!(row.get("AccelSec").is_none());
    }
}

#[test]
fn store_failure_is_reported_with_the_query() {
    let sink = Arc::new(common::MemorySink::default());
    let svc = VehicleService::new(Arc::new(common::DownStore), sink.clone());
    let p = OverviewParams { search: Some("tesla".into()), ..Default::default() };
    assert!(matches!(svc.overview(&p), Err(AppError::Storage(_))));
    let logged = sink.0.lock();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].endpoint, "/api/data/overview");
    assert!(logged[0].additional["query"].is_object());
    assert_eq!(logged[0].additional["projection"][0], "Brand");
    assert_eq!(logged[0].request_data["search"], "tesla");
}

#[test]
fn every_failing_operation_reports_once() {
    let sink = Arc::new(common::MemorySink::default());
    let svc = VehicleService::new(Arc::new(common::DownStore), sink.clone());
    let id = evgrid::types::RecordId::new().to_string();
    assert!(svc.list(&OverviewParams::default()).is_err());
    assert!(svc.get(&id).is_err());
    assert!(svc.delete(&id).is_err());
    assert!(svc.count().is_err());
    assert!(svc.seed(&[serde_json::json!({"Brand": "x"})]).is_err());
    let endpoints: Vec<String> = sink.0.lock().iter().map(|e| e.endpoint.clone()).collect();
    assert_eq!(endpoints.len(), 5);
    assert_eq!(endpoints[0], "/api/data");
    assert_eq!(endpoints[4], "/api/seed");
}
