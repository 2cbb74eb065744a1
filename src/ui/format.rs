//! Number formatting for the board and chart

use crate::market_data::PriceText;

/// Two decimals at or above one, eight below
pub fn format_number(value: f64) -> String {
    if value.abs() >= 1.0 {
        format!("{value:.2}")
    } else {
        format!("{value:.8}")
    }
}

/// Drop trailing zeros after the decimal point, and the point itself if bare
pub fn trim_trailing_zeros(text: &str) -> &str {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.')
}

/// Exchange text when present, otherwise the formatted number, trimmed
pub fn display_price(text: &PriceText, value: f64) -> String {
    if text.is_empty() {
        trim_trailing_zeros(&format_number(value)).to_string()
    } else {
        trim_trailing_zeros(text.as_str()).to_string()
    }
}

/// Axis label with enough decimals to separate ticks over `range`
pub fn format_axis_price(value: f64, range: f64) -> String {
    let decimals = match range {
        r if r < 0.0005 => 10,
        r if r < 0.005 => 8,
        r if r < 0.05 => 6,
        r if r < 0.5 => 4,
        _ => 2,
    };
    trim_trailing_zeros(&format!("{value:.decimals$}")).to_string()
}

/// Insert thousands separators into the integer part of a numeric string
pub fn insert_commas(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };

    let mut out = String::with_capacity(text.len() + int_part.len() / 3);
    out.push_str(sign);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push_str(frac_part);
    out
}

pub fn format_number_with_commas(value: f64) -> String {
    insert_commas(&format_number(value))
}

pub fn format_integer_with_commas(value: u64) -> String {
    insert_commas(&value.to_string())
}

/// Signed percentage, e.g. `+1.25%`
pub fn format_change(percent: f64) -> String {
    format!("{percent:+.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_precision() {
        assert_eq!(format_number(43250.1), "43250.10");
        assert_eq!(format_number(0.000123), "0.00012300");
        assert_eq!(format_number(-2.5), "-2.50");
    }

    #[test]
    fn test_trim_trailing_zeros() {
        assert_eq!(trim_trailing_zeros("43250.10000000"), "43250.1");
        assert_eq!(trim_trailing_zeros("100.00"), "100");
        assert_eq!(trim_trailing_zeros("1200"), "1200");
    }

    #[test]
    fn test_display_price_prefers_text() {
        let text = PriceText::from_str_or_empty("0.00001230");
        assert_eq!(display_price(&text, 0.0), "0.0000123");
        assert_eq!(display_price(&PriceText::new(), 12.0), "12");
    }

    #[test]
    fn test_axis_precision_grows_with_tight_range() {
        assert_eq!(format_axis_price(101.25, 20.0), "101.25");
        assert_eq!(format_axis_price(0.123456, 0.01), "0.123456");
    }

    #[test]
    fn test_commas() {
        assert_eq!(format_number_with_commas(1234567.891), "1,234,567.89");
        assert_eq!(format_number_with_commas(-1234.0), "-1,234.00");
        assert_eq!(format_integer_with_commas(987654), "987,654");
        assert_eq!(format_integer_with_commas(12), "12");
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(1.254), "+1.25%");
        assert_eq!(format_change(-0.5), "-0.50%");
    }
}
