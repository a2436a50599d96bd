//! # CSV Export
//!
//! Flattens the sales of a report range into a spreadsheet-friendly file.
//!
//! ```text
//! Data,Total,Forma de Pagamento,Itens
//! 01/10/2026,R$ 330.00,Dinheiro,2
//! 01/10/2026,R$ 120.00,Cartão,1
//! ```
//!
//! `Itens` is the number of lines on the sale, not the units sold. The `R$`
//! prefix is fixed for compatibility with existing spreadsheets and does not
//! follow the store currency.

use chrono::FixedOffset;

use crate::report::DateRange;
use crate::types::SaleRecord;

/// Header row of the export.
pub const CSV_HEADER: &str = "Data,Total,Forma de Pagamento,Itens";

const CSV_AMOUNT_PREFIX: &str = "R$";

/// Renders one row per sale, in the order given, after the header.
///
/// Rows are joined with `\n` and the file has no trailing newline.
pub fn sales_csv(records: &[SaleRecord], offset: FixedOffset) -> String {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(CSV_HEADER.to_string());

    for record in records {
        let sale = &record.sale;
        rows.push(
            [
                sale.created_at
                    .with_timezone(&offset)
                    .format("%d/%m/%Y")
                    .to_string(),
                format!("{} {}", CSV_AMOUNT_PREFIX, sale.total()),
                sale.payment_method.label().to_string(),
                record.items.len().to_string(),
            ]
            .join(","),
        );
    }

    rows.join("\n")
}

/// `relatorio-vendas-{start}-{end}.csv`, dates as `yyyy-mm-dd`.
pub fn csv_filename(range: &DateRange) -> String {
    format!(
        "relatorio-vendas-{}-{}.csv",
        range.start.format("%Y-%m-%d"),
        range.end.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{maputo, record};
    use crate::types::PaymentMethod;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn test_header_only_when_no_sales() {
        assert_eq!(sales_csv(&[], maputo()), CSV_HEADER);
    }

    #[test]
    fn test_one_row_per_sale() {
        let records = vec![
            record(
                "s1",
                Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap(),
                PaymentMethod::Cash,
                &[(Some("Coca-Cola"), 2, 15000), (Some("Pão"), 1, 3000)],
            ),
            record(
                "s2",
                Utc.with_ymd_and_hms(2026, 10, 1, 23, 0, 0).unwrap(),
                PaymentMethod::Transfer,
                &[(None, 5, 100)],
            ),
        ];

        let csv = sales_csv(&records, maputo());
        let lines: Vec<&str> = csv.split('\n').collect();

        assert_eq!(lines.len(), records.len() + 1);
        assert_eq!(lines[1], "01/10/2026,R$ 330.00,Dinheiro,2");
        assert_eq!(lines[2], "02/10/2026,R$ 5.00,Transferência,1");
    }

    #[test]
    fn test_filename() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 9, 18).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        )
        .unwrap();
        assert_eq!(csv_filename(&range), "relatorio-vendas-2026-09-18-2026-10-18.csv");
    }
}
