use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};

/// Truncate a B256 hash to "0xabcd...ef12" format
pub fn truncate_hash(hash: &B256) -> String {
    truncate(&format!("{hash}"))
}

/// Truncate an address to "0xabcd...ef12" format
pub fn truncate_address(addr: &Address) -> String {
    truncate(&format!("{addr}"))
}

fn truncate(s: &str) -> String {
    if s.len() > 14 {
        format!("{}...{}", &s[..8], &s[s.len() - 4..])
    } else {
        s.to_string()
    }
}

/// Format a fixed-point value with `decimals` decimals, showing at most 6 fractional digits.
pub fn format_units(value: U256, decimals: u8) -> String {
    if value.is_zero() {
        return "0.0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        return format!("{whole}.0");
    }

    let remainder_str = format!("{remainder}");
    let padded = format!("{:0>width$}", remainder_str, width = decimals as usize);
    let trimmed = padded.trim_end_matches('0');

    // Limit to 6 decimal places
    let shown = trimmed[..trimmed.len().min(6)].trim_end_matches('0');
    if shown.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{shown}")
    }
}

/// Format an 18-decimal amount followed by its symbol.
pub fn format_amount(value: U256, symbol: &str) -> String {
    format!("{} {symbol}", format_units(value, 18))
}

/// Format a number with comma separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a Unix timestamp as "Xm ago", "Xh ago", etc.
pub fn format_time_ago(timestamp: u64) -> String {
    let now = Utc::now().timestamp() as u64;
    if timestamp > now {
        return "just now".to_string();
    }
    let diff = now - timestamp;
    if diff < 60 {
        format!("{diff}s ago")
    } else if diff < 3600 {
        format!("{}m ago", diff / 60)
    } else if diff < 86400 {
        format!("{}h ago", diff / 3600)
    } else {
        format!("{}d ago", diff / 86400)
    }
}

/// Format a Unix timestamp as a datetime string
pub fn format_timestamp(timestamp: u64) -> String {
    DateTime::from_timestamp(timestamp as i64, 0)
        .map(|dt| dt.format("%b %d, %Y %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}
