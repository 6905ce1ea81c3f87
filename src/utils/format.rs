use chrono::{Datelike, NaiveDate};

/// en-US dollar amount with thousands separators: `-$1,200.50`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// One decimal place, as shown next to the progress bar
pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// `M/D/YYYY`, the en-US short date
pub fn format_short_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// `March 2025`, for the dashboard greeting
pub fn format_month_year(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands_and_keeps_sign() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-200.0), "-$200.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
    }

    #[test]
    fn negative_rounding_to_zero_drops_sign() {
        assert_eq!(format_currency(-0.001), "$0.00");
    }

    #[test]
    fn dates_use_en_us_layout() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(format_short_date(date), "3/4/2025");
        assert_eq!(format_month_year(date), "March 2025");
        assert_eq!(format_percent(120.0), "120.0%");
    }
}
