//! Display formatting for prices, dollar amounts and percentages.

/// Format a USD price with precision scaled to its magnitude
pub fn format_price(price: f64) -> String {
    if price == 0.0 || !price.is_finite() {
        return "$0.00".to_string();
    }
    if price < 0.000_000_01 {
        format!("${:.2e}", price)
    } else if price < 0.0001 {
        format!("${:.8}", price)
    } else if price < 0.01 {
        format!("${:.6}", price)
    } else if price < 1.0 {
        format!("${:.4}", price)
    } else if price < 1000.0 {
        format!("${:.2}", price)
    } else {
        format!("${}", group_thousands(price))
    }
}

/// Format a large dollar amount with a B/M/K suffix
pub fn format_number(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "$0".to_string();
    }
    if value >= 1_000_000_000.0 {
        format!("${:.2}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.2}K", value / 1_000.0)
    } else {
        format!("${:.2}", value)
    }
}

/// Format a signed percentage change
pub fn format_percentage(pct: f64) -> String {
    if pct == 0.0 || !pct.is_finite() {
        return "0%".to_string();
    }
    let sign = if pct >= 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, pct)
}

/// Shorten an address to `start...end`
pub fn truncate_address(address: &str, start: usize, end: usize) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= start + end {
        return address.to_string();
    }
    let head: String = chars[..start].iter().collect();
    let tail: String = chars[chars.len() - end..].iter().collect();
    format!("{}...{}", head, tail)
}

fn group_thousands(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, frac)
    }
}
