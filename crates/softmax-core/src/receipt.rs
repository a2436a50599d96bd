//! # Receipt Renderer
//!
//! Turns a finalized cart into a self-contained, printable HTML document.
//!
//! ## Receipt Layout
//! ```text
//! ┌──────────────────────────────────────┐
//! │            SoftMax Sales             │  store name
//! │     Sistema de Gestão de Vendas      │
//! │    Data: 18/10/2026, 14:03:05        │  local time (store offset)
//! ├──────────────────────────────────────┤
//! │ Coca-Cola                MZN 300.00  │  one row per cart line
//! │ 2x MZN 150.00                        │
//! │ Pão                       MZN 30.00  │
//! │ 1x MZN 30.00                         │
//! ├──────────────────────────────────────┤
//! │ Subtotal:                MZN 330.00  │
//! │ Forma de Pagamento:        Dinheiro  │
//! │ TOTAL:                   MZN 330.00  │
//! ├──────────────────────────────────────┤
//! │          Operador: Ana               │
//! │   Obrigado pela sua preferência!     │
//! │ SoftMax Sales Management System v1.0 │
//! └──────────────────────────────────────┘
//! ```
//!
//! The renderer never touches the clock or the network: the timestamp and
//! operator come in through [`ReceiptContext`].

use chrono::{DateTime, FixedOffset};

use crate::cart::CartLine;
use crate::money::Money;
use crate::types::PaymentMethod;

/// Everything on the receipt that does not come from the cart.
#[derive(Debug, Clone)]
pub struct ReceiptContext<'a> {
    pub store_name: &'a str,
    /// Prefix for every amount, e.g. `"MZN"`.
    pub currency: &'a str,
    pub operator: &'a str,
    pub payment_method: PaymentMethod,
    /// Already shifted to the store's offset.
    pub issued_at: DateTime<FixedOffset>,
}

const STYLE: &str = r#"
      body { font-family: Arial, sans-serif; max-width: 400px; margin: 0 auto; padding: 20px; font-size: 12px; line-height: 1.4; }
      .header { text-align: center; border-bottom: 2px solid #333; padding-bottom: 15px; margin-bottom: 20px; }
      .company-name { font-size: 20px; font-weight: bold; margin-bottom: 5px; }
      .system-name { font-size: 14px; color: #666; margin-bottom: 10px; }
      .date { font-size: 11px; color: #666; }
      .items { margin: 20px 0; }
      .item { display: flex; justify-content: space-between; margin-bottom: 8px; padding-bottom: 5px; border-bottom: 1px dotted #ccc; }
      .item-info { flex: 1; }
      .item-name { font-weight: bold; margin-bottom: 2px; }
      .item-details { font-size: 10px; color: #666; }
      .item-total { font-weight: bold; text-align: right; min-width: 80px; }
      .summary { border-top: 2px solid #333; padding-top: 15px; margin-top: 20px; }
      .summary-row { display: flex; justify-content: space-between; margin-bottom: 8px; }
      .total-row { font-size: 16px; font-weight: bold; border-top: 1px solid #333; padding-top: 8px; margin-top: 8px; }
      .footer { text-align: center; margin-top: 30px; padding-top: 15px; border-top: 1px dotted #ccc; font-size: 10px; color: #666; }
      @media print { body { margin: 0; padding: 10px; } }
"#;

/// Renders the receipt document.
///
/// `total` is passed in rather than recomputed so the printed figure is
/// exactly the one recorded on the sale.
pub fn render_receipt(lines: &[CartLine], total: Money, ctx: &ReceiptContext<'_>) -> String {
    let currency = escape_html(ctx.currency);
    let mut items = String::new();

    for line in lines {
        items.push_str(&format!(
            r#"
      <div class="item">
        <div class="item-info">
          <div class="item-name">{name}</div>
          <div class="item-details">{qty}x {currency} {price}</div>
        </div>
        <div class="item-total">{currency} {line_total}</div>
      </div>"#,
            name = escape_html(&line.product.name),
            qty = line.quantity,
            currency = currency,
            price = line.product.price(),
            line_total = line.line_total(),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="UTF-8">
    <title>Recibo de Venda - {store}</title>
    <style>{style}</style>
  </head>
  <body>
    <div class="header">
      <div class="company-name">{store}</div>
      <div class="system-name">Sistema de Gestão de Vendas</div>
      <div class="date">Data: {date}</div>
    </div>
    <div class="items">{items}
    </div>
    <div class="summary">
      <div class="summary-row"><span>Subtotal:</span><span>{currency} {total}</span></div>
      <div class="summary-row"><span>Forma de Pagamento:</span><span>{payment}</span></div>
      <div class="summary-row total-row"><span>TOTAL:</span><span>{currency} {total}</span></div>
    </div>
    <div class="footer">
      <p>Operador: {operator}</p>
      <p>Obrigado pela sua preferência!</p>
      <p>SoftMax Sales Management System v1.0</p>
    </div>
    <script>window.onload = function () {{ window.print(); }};</script>
  </body>
</html>
"#,
        store = escape_html(ctx.store_name),
        style = STYLE,
        date = format_receipt_date(&ctx.issued_at),
        items = items,
        currency = currency,
        total = total,
        payment = ctx.payment_method.label(),
        operator = escape_html(ctx.operator),
    )
}

/// `dd/mm/yyyy, HH:MM:SS`, the pt-BR locale layout.
pub fn format_receipt_date(at: &DateTime<FixedOffset>) -> String {
    at.format("%d/%m/%Y, %H:%M:%S").to_string()
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::types::Product;
    use chrono::{TimeZone, Utc};

    fn product(id: &str, name: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            price_cents,
            stock: 10,
            category_id: None,
            supplier_id: None,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn maputo_time() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 18, 14, 3, 5)
            .unwrap()
    }

    fn context(operator: &str) -> ReceiptContext<'_> {
        ReceiptContext {
            store_name: "SoftMax Sales",
            currency: "MZN",
            operator,
            payment_method: PaymentMethod::Card,
            issued_at: maputo_time(),
        }
    }

    #[test]
    fn test_receipt_lists_lines_and_totals() {
        let mut cart = Cart::new();
        let coke = product("a", "Coca-Cola", 15000);
        cart.add_item(&coke).unwrap();
        cart.add_item(&coke).unwrap();
        cart.add_item(&product("b", "Pão", 3000)).unwrap();

        let html = render_receipt(cart.lines(), cart.total(), &context("Ana"));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Data: 18/10/2026, 14:03:05"));
        assert!(html.contains("2x MZN 150.00"));
        assert!(html.contains("MZN 300.00"));
        assert!(html.contains("1x MZN 30.00"));
        assert!(html.contains("<span>TOTAL:</span><span>MZN 330.00</span>"));
        assert!(html.contains("<span>Cartão</span>"));
        assert!(html.contains("Operador: Ana"));
        assert!(html.contains("window.print()"));
    }

    #[test]
    fn test_receipt_escapes_user_text() {
        let mut cart = Cart::new();
        cart.add_item(&product("x", "<b>Bolo & Chá</b>", 500)).unwrap();

        let html = render_receipt(cart.lines(), cart.total(), &context("O'Neil"));

        assert!(html.contains("&lt;b&gt;Bolo &amp; Chá&lt;/b&gt;"));
        assert!(!html.contains("<b>Bolo"));
        assert!(html.contains("Operador: O&#39;Neil"));
    }

    #[test]
    fn test_format_receipt_date_uses_given_offset() {
        let utc = Utc.with_ymd_and_hms(2026, 1, 31, 23, 30, 0).unwrap();
        let local = utc.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(format_receipt_date(&local), "01/02/2026, 01:30:00");
    }
}
