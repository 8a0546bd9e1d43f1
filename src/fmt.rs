fn group_thousands(int_part: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let with_commas = group_thousands(int_part);

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Integer with thousands separators: 12,345
pub fn number(val: u64) -> String {
    group_thousands(&val.to_string())
}

/// Two-decimal figure with thousands separators, no currency sign.
pub fn decimal(val: f64) -> String {
    let s = money(val);
    s.replacen('$', "", 1)
}

/// Value of a metric: currency for revenue, grouped number otherwise.
/// Non-integral counts (averages) keep two decimals.
pub fn metric_value(val: f64, currency: bool) -> String {
    if currency {
        money(val)
    } else if val.fract() == 0.0 && val >= 0.0 {
        number(val as u64)
    } else {
        decimal(val)
    }
}

/// Render an optional value, with a dash for undefined entries.
pub fn opt<F: Fn(f64) -> String>(val: Option<f64>, f: F) -> String {
    val.map(f).unwrap_or_else(|| "—".to_string())
}

pub fn pct(val: f64) -> String {
    format!("{val:.2}%")
}
