use crate::error::Error;
use crate::types::{Value, ValueType};

/// Numbers closer than this to an integer render without a fraction.
pub const ROUNDING_THRESHOLD: f64 = 0.00001;

pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn format_number(n: f64) -> String {
    if (n - n.round()).abs() < ROUNDING_THRESHOLD {
        // keeps the sign of negative zero, as printf does
        return format!("{:.0}", n);
    }
    format_significant(n, 17)
}

/// `%g`-style rendering with `digits` significant digits.
fn format_significant(n: f64, digits: usize) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let scientific = format!("{:.*e}", digits - 1, n);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, n)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Parses the longest numeric prefix of `s` after leading whitespace, the
/// way C's `strtod` does. Returns `None` when no digits could be read.
pub fn parse_number_prefix(s: &str) -> Option<f64> {
    let text = s.trim_start();
    let bytes = text.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let negative = i > 0 && bytes[0] == b'-';
    let rest = &text[i..];
    if starts_with_ignore_case(rest, "inf") {
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }
    if starts_with_ignore_case(rest, "nan") {
        return Some(f64::NAN);
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return None;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    text[..i].parse::<f64>().ok()
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}

/// Maps `index` into `0..size`, counting negative indices from the end.
/// Anything outside `-size..size` maps to `size`, which is never a valid slot.
pub fn compute_index(index: i64, size: usize) -> usize {
    let n = size as i64;
    if (0..n).contains(&index) || (index < 0 && index >= -n) {
        ((n + index % n) % n) as usize
    } else {
        size
    }
}

pub fn compute_index_of(index: &Value, size: usize) -> Result<usize, Error> {
    let n = index.convert_to(ValueType::Number)?.number_value()?;
    Ok(compute_index(n as i64, size))
}

/// Flattens nested arrays and ranges of indices into slots of an indexable
/// of `size` elements.
pub fn compute_index_array(index: &Value, size: usize) -> Result<Vec<usize>, Error> {
    let mut out = Vec::new();
    collect_indices(index, size, &mut out)?;
    Ok(out)
}

fn collect_indices(index: &Value, size: usize, out: &mut Vec<usize>) -> Result<(), Error> {
    match index {
        Value::Array(items) => {
            out.reserve(items.len());
            for item in items.iter() {
                collect_indices(item, size, out)?;
            }
        }
        Value::Range(range) => {
            if let Some((first, last)) = range.bounds_for(size) {
                push_range_slots(first, last, size, out);
            }
        }
        other => out.push(compute_index_of(other, size)?),
    }
    Ok(())
}

/// Pushes the slots of `first..=last` in range order. Each run of indices
/// outside `-size..size` collapses into one `size` sentinel, so huge
/// ranges cost no more than the indexable itself.
fn push_range_slots(first: i64, last: i64, size: usize, out: &mut Vec<usize>) {
    let n = i64::try_from(size).unwrap_or(i64::MAX);
    let (low, high) = (first.min(last), first.max(last));
    let (from, to) = (low.max(-n), high.min(n - 1));
    let below = low < -n;
    let above = high > n - 1;
    let inner = (from..=to).map(|i| compute_index(i, size));
    if first <= last {
        if below {
            out.push(size);
        }
        out.extend(inner);
        if above {
            out.push(size);
        }
    } else {
        if above {
            out.push(size);
        }
        out.extend(inner.rev());
        if below {
            out.push(size);
        }
    }
}
