//! # Sales Report Aggregation
//!
//! Reduces the sales of a date range into the figures shown on the
//! reports screen and feeds the CSV export.
//!
//! ## Single Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for each SaleRecord (ascending by created_at)                          │
//! │     │                                                                   │
//! │     ├──► daily[local date]          += sale.total                      │
//! │     ├──► by_payment[method]         += sale.total, count + 1           │
//! │     ├──► total_sales                += sale.total                      │
//! │     ├──► recent (ring of last 10)   ← sale                             │
//! │     │                                                                   │
//! │     └──► for each line                                                  │
//! │             ├──► total_items        += qty                             │
//! │             └──► products[name]     += qty, revenue                    │
//! │                                                                         │
//! │  then: top 10 products by qty desc, average = total / transactions     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Day buckets use the store's UTC offset, so a sale at 23:30 UTC lands on
//! the next local day in Maputo (UTC+2).

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, SaleRecord};
use crate::{RECENT_SALES_LIMIT, TOP_PRODUCTS_LIMIT, UNKNOWN_PRODUCT_LABEL};

// =============================================================================
// Date Range
// =============================================================================

/// An inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(DateRange { start, end })
    }

    /// The `days`-long range ending on `today` (inclusive).
    pub fn last_days(today: NaiveDate, days: u64) -> Self {
        let start = today
            .checked_sub_days(Days::new(days.saturating_sub(1)))
            .unwrap_or(today);
        DateRange { start, end: today }
    }

    /// UTC instants `[from, to)` covering every local day of the range.
    ///
    /// `to` is local midnight after `end`, which makes the whole last day,
    /// up to 23:59:59.999, part of the range.
    pub fn utc_bounds(&self, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
        let day_after_end = self.end.checked_add_days(Days::new(1)).unwrap_or(self.end);
        (
            local_midnight(self.start, offset),
            local_midnight(day_after_end, offset),
        )
    }
}

fn local_midnight(day: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let naive = day.and_time(NaiveTime::MIN);
    // A fixed offset has no gaps or folds, so the mapping is always single.
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

// =============================================================================
// Report Types
// =============================================================================

/// Revenue for one local day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyTotal {
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// `dd/mm/yyyy`, as printed on the chart axis.
    pub label: String,
    pub total_cents: i64,
}

/// Revenue for one payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentTotal {
    pub method: PaymentMethod,
    pub label: String,
    pub total_cents: i64,
    pub transactions: i64,
}

/// Units sold of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSales {
    pub name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

/// One row of the "recent sales" table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecentSale {
    pub id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_label: String,
    /// Number of distinct lines on the sale.
    pub line_count: usize,
}

/// The aggregated report for a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    pub range: DateRange,
    pub daily: Vec<DailyTotal>,
    pub by_payment: Vec<PaymentTotal>,
    /// At most 10 entries, quantity descending.
    pub top_products: Vec<ProductSales>,
    pub total_sales_cents: i64,
    pub total_items: i64,
    pub total_transactions: i64,
    /// `total_sales / total_transactions`, 0 when there are none.
    pub average_ticket_cents: i64,
    /// Newest first.
    pub recent_sales: Vec<RecentSale>,
}

// =============================================================================
// Aggregation
// =============================================================================

#[derive(Default)]
struct ProductAcc {
    quantity: i64,
    revenue: Money,
}

/// Aggregates the records of a range.
///
/// `records` are expected in ascending `created_at` order, as the store
/// returns them; the "recent sales" slice relies on it.
pub fn summarize(records: &[SaleRecord], range: DateRange, offset: FixedOffset) -> SalesReport {
    let mut daily: BTreeMap<NaiveDate, Money> = BTreeMap::new();
    let mut by_payment: BTreeMap<PaymentMethod, (Money, i64)> = BTreeMap::new();
    let mut products: BTreeMap<String, ProductAcc> = BTreeMap::new();
    let mut recent: VecDeque<&SaleRecord> = VecDeque::with_capacity(RECENT_SALES_LIMIT);

    let mut total_sales = Money::zero();
    let mut total_items = 0_i64;

    for record in records {
        let sale = &record.sale;
        let total = sale.total();
        let day = sale.created_at.with_timezone(&offset).date_naive();

        *daily.entry(day).or_default() += total;

        let payment = by_payment
            .entry(sale.payment_method)
            .or_insert((Money::zero(), 0));
        payment.0 += total;
        payment.1 += 1;

        total_sales += total;

        for line in &record.items {
            total_items += line.quantity;

            let name = line
                .product_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_PRODUCT_LABEL.to_string());
            let acc = products.entry(name).or_default();
            acc.quantity += line.quantity;
            acc.revenue += line.line_total();
        }

        if recent.len() == RECENT_SALES_LIMIT {
            recent.pop_front();
        }
        recent.push_back(record);
    }

    let total_transactions = records.len() as i64;

    let mut top_products: Vec<ProductSales> = products
        .into_iter()
        .map(|(name, acc)| ProductSales {
            name,
            quantity: acc.quantity,
            revenue_cents: acc.revenue.cents(),
        })
        .collect();
    // BTreeMap iteration already orders by name, and the sort is stable.
    top_products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    top_products.truncate(TOP_PRODUCTS_LIMIT);

    SalesReport {
        range,
        daily: daily
            .into_iter()
            .map(|(date, total)| DailyTotal {
                date,
                label: date.format("%d/%m/%Y").to_string(),
                total_cents: total.cents(),
            })
            .collect(),
        by_payment: by_payment
            .into_iter()
            .map(|(method, (total, transactions))| PaymentTotal {
                method,
                label: method.label().to_string(),
                total_cents: total.cents(),
                transactions,
            })
            .collect(),
        top_products,
        total_sales_cents: total_sales.cents(),
        total_items,
        total_transactions,
        average_ticket_cents: total_sales.divide_by(total_transactions).cents(),
        recent_sales: recent
            .into_iter()
            .rev()
            .map(|r| RecentSale {
                id: r.sale.id.clone(),
                created_at: r.sale.created_at,
                total_cents: r.sale.total_cents,
                payment_method: r.sale.payment_method,
                payment_label: r.sale.payment_method.label().to_string(),
                line_count: r.items.len(),
            })
            .collect(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
