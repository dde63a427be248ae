//! # Reports
//!
//! Stock value and sales value. The aggregation itself lives in
//! `stockroom_core::report`; this module fetches the records and decides
//! what "nothing to report" means.

use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use stockroom_core::validation::validate_date_range;
use stockroom_core::{DocumentStatus, SalesValueReport, StockValueReport};
use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};
use crate::service::InventoryService;

const LAST_TEXT_ORDERED_YEAR: i32 = 9999;

impl InventoryService {
    /// Values all stock on hand at buy price.
    ///
    /// `NotFound` when no SKU is registered, `Validation(AmountOverflow)`
    /// when a value does not fit in 64 bits.
    pub async fn get_all_stock_value(&self) -> ServiceResult<StockValueReport> {
        let stock = self.stock.find_all().await?;
        if stock.is_empty() {
            return Err(ServiceError::NotFound("No SKU available".to_string()));
        }

        let report = StockValueReport::from_stock(Utc::now(), &stock)?;
        info!(
            items = report.total_item_kind,
            quantity = report.total_quantity,
            amount = %report.total_amount,
            "Stock value report"
        );
        Ok(report)
    }

    /// Turnover and profit of the Done sales dated from `start` through
    /// `end`, both calendar days included. An `end` in the last storable
    /// year leaves the range open above.
    ///
    /// ## Errors
    /// - `Validation(InvalidDateRange)` when `start > end`
    /// - `NotFound` when no Done sale falls in the range
    /// - `Validation(AmountOverflow)` when a total does not fit in 64 bits
    pub async fn get_all_sales_value(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<SalesValueReport> {
        validate_date_range(start, end)?;

        // Dates are stored as RFC 3339 text, which sorts correctly only
        // through year 9999.
        let from = start.and_time(NaiveTime::MIN).and_utc();
        let until = end
            .succ_opt()
            .filter(|day| day.year() <= LAST_TEXT_ORDERED_YEAR)
            .map(|day| day.and_time(NaiveTime::MIN).and_utc());
        debug!(%from, ?until, "Sales value range");

        let sales = self
            .sales
            .find_by_status_and_date_range(DocumentStatus::Done, from, until)
            .await?;
        if sales.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "No sales between {} and {}",
                start, end
            )));
        }

        let report = SalesValueReport::from_sales(start, end, &sales)?;
        info!(
            sales = report.sale_count,
            turnover = %report.turnover,
            profit = %report.profit,
            "Sales value report"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::{seed, service};
    use chrono::{DateTime, TimeZone};
    use stockroom_core::{CoreError, Money, Sale, SaleItem, SaleLine};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    /// Stores a sale directly with a chosen date and status.
    async fn store_sale(
        svc: &InventoryService,
        invoice_id: &str,
        date: DateTime<Utc>,
        status: DocumentStatus,
        lines: &[(&str, i64, i64, i64)],
    ) {
        let mut sale = Sale::new(invoice_id, date, "");
        sale.status = status;
        for (sku, qty, buy, sell) in lines {
            sale.add_item(SaleItem::new(
                *sku,
                *qty,
                Money::from_cents(*buy),
                Money::from_cents(*sell),
            ))
            .unwrap();
        }
        svc.db.sales().insert(&sale).await.unwrap();
    }

    #[tokio::test]
    async fn test_stock_value() {
        let svc = service().await;
        seed(&svc, &[("A", 2, 100, 150), ("B", 3, 50, 80), ("C", 0, 900, 999)]).await;

        let report = svc.get_all_stock_value().await.unwrap();

        assert_eq!(report.total_amount, Money::from_cents(350));
        assert_eq!(report.total_quantity, 5);
        assert_eq!(report.total_item_kind, 3);
        assert_eq!(report.items.len(), 3);
    }

    #[tokio::test]
    async fn test_stock_value_empty_is_not_found() {
        let svc = service().await;
        let err = svc.get_all_stock_value().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_sales_value_counts_done_sales_only() {
        let svc = service().await;
        let noon = |d| Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap();

        store_sale(&svc, "INV1", noon(1), DocumentStatus::Done, &[("A", 2, 100, 150), ("B", 1, 200, 260)]).await;
        store_sale(&svc, "INV2", noon(2), DocumentStatus::Done, &[("A", 3, 100, 140)]).await;
        store_sale(&svc, "INV3", noon(2), DocumentStatus::Draft, &[("A", 9, 100, 150)]).await;
        store_sale(&svc, "INV4", noon(2), DocumentStatus::Canceled, &[("A", 9, 100, 150)]).await;

        let report = svc.get_all_sales_value(day(1), day(2)).await.unwrap();

        assert_eq!(report.sale_count, 2);
        assert_eq!(report.total_quantity, 6);
        assert_eq!(report.total_item_kind, 2);
        assert_eq!(report.turnover, Money::from_cents(980));
        assert_eq!(report.profit, Money::from_cents(280));
        assert_eq!(report.items.len(), 3);
    }

    #[tokio::test]
    async fn test_sales_value_range_includes_whole_end_day() {
        let svc = service().await;
        let late = Utc.with_ymd_and_hms(2024, 3, 2, 23, 59, 59).unwrap();
        let next = Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap();

        store_sale(&svc, "LATE", late, DocumentStatus::Done, &[("A", 1, 100, 150)]).await;
        store_sale(&svc, "NEXT", next, DocumentStatus::Done, &[("A", 1, 100, 150)]).await;

        let report = svc.get_all_sales_value(day(2), day(2)).await.unwrap();
        assert_eq!(report.sale_count, 1);
        assert_eq!(report.items[0].invoice_id, "LATE");
    }

    #[tokio::test]
    async fn test_sales_value_open_ended_range() {
        let svc = service().await;
        let noon = Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap();
        store_sale(&svc, "INV1", noon, DocumentStatus::Done, &[("A", 1, 100, 150)]).await;

        let last = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
        for end in [NaiveDate::MAX, last] {
            let report = svc.get_all_sales_value(day(1), end).await.unwrap();
            assert_eq!(report.sale_count, 1);
            assert_eq!(report.end_date, end);
        }
    }

    #[tokio::test]
    async fn test_sales_value_invalid_range() {
        let svc = service().await;
        let err = svc.get_all_sales_value(day(5), day(1)).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(CoreError::InvalidDateRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_sales_value_empty_range_is_not_found() {
        let svc = service().await;
        let err = svc.get_all_sales_value(day(1), day(31)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_sales_value_after_finalizing_through_the_service() {
        let svc = service().await;
        seed(&svc, &[("A", 5, 100, 150)]).await;
        svc.create_sale("INV1", "", &[SaleLine::new("A", 2)])
            .await
            .unwrap();
        svc.update_sale("INV1", DocumentStatus::Done).await.unwrap();

        let today = Utc::now().date_naive();
        let report = svc.get_all_sales_value(today, today).await.unwrap();

        assert_eq!(report.profit, Money::from_cents(100));
        assert_eq!(report.turnover, Money::from_cents(300));
    }

    #[tokio::test]
    async fn test_stock_value_overflow_is_a_validation_error() {
        let svc = service().await;
        seed(&svc, &[("A", i64::MAX / 2 + 1, 2, 3)]).await;

        let err = svc.get_all_stock_value().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(
            err,
            ServiceError::Validation(CoreError::AmountOverflow(_))
        ));
    }

    #[tokio::test]
    async fn test_sales_value_overflow_is_a_validation_error() {
        let svc = service().await;
        seed(&svc, &[("A", 5_000_000_000, 1, 4_000_000_000)]).await;
        svc.create_sale("INV1", "", &[SaleLine::new("A", 5_000_000_000)])
            .await
            .unwrap();
        svc.update_sale("INV1", DocumentStatus::Done).await.unwrap();

        let today = Utc::now().date_naive();
        let err = svc.get_all_sales_value(today, today).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Validation(CoreError::AmountOverflow(_))
        ));
        assert_eq!(svc.get_item_info("A").await.unwrap().quantity, 0);
    }
}
