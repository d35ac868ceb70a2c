//! Result Formatting
//!
//! Turns tool payloads into replies. Payloads are tried as JSON first; what
//! does not decode, or decodes to a shape we do not recognise, is echoed.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::context::{ConversationContext, PendingDiscount};

/// Echo a payload verbatim
pub fn render_raw(output: &str) -> String {
    format!("The result is: {output}")
}

/// Render a tool payload, consuming a pending discount when the payload is a
/// list.
pub fn format_tool_output(output: &str, context: &mut ConversationContext) -> String {
    let Ok(data) = serde_json::from_str::<Value>(output) else {
        return render_raw(output);
    };

    if let Value::Array(items) = &data {
        if let Some(pending) = context.take_pending_discount() {
            return render_discount(items, &pending);
        }
    }

    render_structured(&data).unwrap_or_else(|| render_raw(output))
}

fn render_structured(data: &Value) -> Option<String> {
    match data {
        Value::Array(items) if items.first().is_some_and(|i| i.get("name").is_some()) => {
            Some(render_listing(items))
        }
        Value::Object(record) if record.contains_key("total_count") => Some(format!(
            "I found {} products with an average price of ${}.",
            display_value(&record["total_count"]),
            record.get("average_price").map_or_else(|| "0".into(), display_value),
        )),
        Value::Object(record) if record.contains_key("id") => Some(format!(
            "Successfully added '{}' (ID: {}) to the catalog.",
            record.get("name").map(display_value).unwrap_or_default(),
            display_value(&record["id"]),
        )),
        _ => None,
    }
}

fn render_listing(items: &[Value]) -> String {
    let mut lines = vec!["Here are the products I found:".to_string()];
    for item in items {
        lines.push(format!(
            "• {} (${}) - {}",
            field(item, "name"),
            field(item, "price"),
            field(item, "category"),
        ));
    }
    lines.join("\n")
}

fn render_discount(items: &[Value], pending: &PendingDiscount) -> String {
    let wanted = pending.product_name.to_lowercase();

    let found = items.iter().find_map(|item| {
        let name = item.get("name")?.as_str()?;
        let price = decimal_value(item.get("price")?)?;
        name.to_lowercase().contains(&wanted).then_some((name, price))
    });

    let percent = Decimal::try_from(pending.discount_percent).unwrap_or_default();
    match found {
        Some((name, price)) => {
            let discounted =
                (price * (Decimal::ONE_HUNDRED - percent) / Decimal::ONE_HUNDRED).round_dp(2);
            format!(
                "The {name} costs ${}. With a {}% discount, the price would be ${discounted:.2}.",
                price.normalize(),
                percent.normalize(),
            )
        }
        None => format!(
            "I couldn't find a product matching '{}' in the catalog.",
            pending.product_name
        ),
    }
}

/// Exact decimal from a JSON number or numeric string
fn decimal_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn field(item: &Value, key: &str) -> String {
    item.get(key).map(display_value).unwrap_or_default()
}

/// Strings unquoted, numbers without a trailing ".0"
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string()),
        other => other.to_string(),
    }
}
