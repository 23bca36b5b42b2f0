//! Offline unit tests for parkdeals-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::{NaiveDate, Utc};
use parkdeals_core::{AppConfig, Environment};
use parkdeals_db::{DealRow, DealSourceRow, PoolConfig};
use uuid::Uuid;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        request_timeout_secs: 30,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`DealRow`] has all expected fields
/// with the correct types. No database required.
#[test]
fn deal_row_has_expected_fields() {
    let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
    let row = DealRow {
        id: 1,
        public_id: Uuid::nil(),
        source_id: 2,
        title: "30% off deluxe resorts".to_string(),
        description: "Book by September".to_string(),
        deal_type: "room_discount".to_string(),
        discount_percentage: Some(30),
        valid_from: date,
        valid_to: date,
        travel_valid_from: date,
        travel_valid_to: date,
        source_url: "https://example.com/deal".to_string(),
        deal_code: None,
        is_active: true,
        priority: 0,
        blackout_dates: vec![],
        ticket_required: false,
        dining_plan_included: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.deal_type, "room_discount");
    assert!(row.blackout_dates.is_empty());
}

#[test]
fn deal_source_row_health_fields_default_shape() {
    let row = DealSourceRow {
        id: 1,
        public_id: Uuid::nil(),
        name: "AllEars.net".to_string(),
        source_type: "content_site".to_string(),
        is_active: true,
        error_count: 0,
        last_error: None,
        last_checked_at: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.error_count, 0);
    assert!(row.last_error.is_none());
    assert!(row.last_checked_at.is_none());
}
