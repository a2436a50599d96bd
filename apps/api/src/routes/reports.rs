//! Sales reports and CSV export.
//!
//! Dates in the query are local calendar days in the store's offset.
//! Without `start`/`end` the report covers the last 30 days.

use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use softmax_core::export::{csv_filename, sales_csv};
use softmax_core::report::{summarize, DateRange, SalesReport};
use softmax_core::SaleRecord;

use crate::error::ApiResult;
use crate::session::Session;
use crate::state::{Backend, SharedState};

/// Length of the default report window.
pub const DEFAULT_REPORT_DAYS: u64 = 30;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/reports/sales", get(sales_report))
        .route("/reports/sales.csv", get(sales_export))
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl RangeQuery {
    /// Resolves missing bounds against `today`.
    ///
    /// - neither: the last 30 days
    /// - only `start`: `start` through today
    /// - only `end`: the 30 days ending on `end`
    pub fn resolve(&self, today: NaiveDate) -> ApiResult<DateRange> {
        let range = match (self.start, self.end) {
            (Some(start), Some(end)) => DateRange::new(start, end)?,
            (Some(start), None) => DateRange::new(start, today)?,
            (None, Some(end)) => DateRange::last_days(end, DEFAULT_REPORT_DAYS),
            (None, None) => DateRange::last_days(today, DEFAULT_REPORT_DAYS),
        };
        Ok(range)
    }
}

async fn load(
    state: &SharedState,
    backend: &Backend,
    query: &RangeQuery,
) -> ApiResult<(DateRange, Vec<SaleRecord>)> {
    let offset = state.config.offset();
    let today = Utc::now().with_timezone(&offset).date_naive();
    let range = query.resolve(today)?;

    let (from, to) = range.utc_bounds(offset);
    let records = backend.db.sales().list_between(from, to).await?;

    tracing::debug!(
        start = %range.start,
        end = %range.end,
        sales = records.len(),
        "Loaded report range"
    );
    Ok((range, records))
}

async fn sales_report(
    State(state): State<SharedState>,
    backend: Backend,
    _session: Session,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<SalesReport>> {
    let (range, records) = load(&state, &backend, &query).await?;
    Ok(Json(summarize(&records, range, state.config.offset())))
}

async fn sales_export(
    State(state): State<SharedState>,
    backend: Backend,
    _session: Session,
    Query(query): Query<RangeQuery>,
) -> ApiResult<impl IntoResponse> {
    let (range, records) = load(&state, &backend, &query).await?;
    let body = sales_csv(&records, state.config.offset());
    let disposition = format!("attachment; filename=\"{}\"", csv_filename(&range));

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::Days;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_default_range_is_last_30_days() {
        let range = RangeQuery::default().resolve(day("2026-10-18")).unwrap();
        assert_eq!(range.start, day("2026-09-19"));
        assert_eq!(range.end, day("2026-10-18"));
        assert_eq!(
            range.end.checked_sub_days(Days::new(DEFAULT_REPORT_DAYS - 1)),
            Some(range.start)
        );
    }

    #[test]
    fn test_partial_bounds() {
        let today = day("2026-10-18");
        let query = RangeQuery {
            start: Some(day("2026-10-01")),
            end: None,
        };
        assert_eq!(query.resolve(today).unwrap().end, today);

        let query = RangeQuery {
            start: None,
            end: Some(day("2026-03-31")),
        };
        assert_eq!(query.resolve(today).unwrap().start, day("2026-03-02"));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let query = RangeQuery {
            start: Some(day("2026-10-18")),
            end: Some(day("2026-10-01")),
        };
        let err = query.resolve(day("2026-10-18")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
