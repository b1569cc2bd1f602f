use std::fs;
use std::io::Write;

use crate::data::calls::AMOUNT_DECIMALS;
use crate::data::types::TransferEvent;
use crate::utils;

/// Export transfer history to CSV format.
///
/// Columns: tx_hash, block_number, log_index, timestamp, direction, from, to, value_wei, value
pub fn export_history_csv(entries: &[TransferEvent], path: &str) -> Result<String, String> {
    let file = fs::File::create(path).map_err(|e| format!("Failed to create file: {e}"))?;
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "tx_hash",
        "block_number",
        "log_index",
        "timestamp",
        "direction",
        "from",
        "to",
        "value_wei",
        "value",
    ])
    .map_err(|e| format!("Failed to write CSV header: {e}"))?;

    for entry in entries {
        wtr.write_record(&[
            format!("{:#x}", entry.tx_hash),
            entry.block_number.to_string(),
            entry.log_index.to_string(),
            entry.timestamp.map(|t| t.to_string()).unwrap_or_default(),
            entry.direction.to_string(),
            format!("{:#x}", entry.from),
            format!("{:#x}", entry.to),
            entry.value.to_string(),
            utils::format_units(entry.value, AMOUNT_DECIMALS),
        ])
        .map_err(|e| format!("Failed to write CSV row: {e}"))?;
    }

    wtr.flush().map_err(|e| format!("Failed to flush CSV: {e}"))?;

    Ok(format!("Exported {} transfers to {path}", entries.len()))
}

/// Export transfer history to JSON format.
pub fn export_history_json(entries: &[TransferEvent], path: &str) -> Result<String, String> {
    let json = serde_json::json!({
        "count": entries.len(),
        "transfers": entries.iter().map(|e| serde_json::json!({
            "tx_hash": format!("{:#x}", e.tx_hash),
            "block_number": e.block_number,
            "log_index": e.log_index,
            "timestamp": e.timestamp,
            "direction": e.direction,
            "from": format!("{:#x}", e.from),
            "to": format!("{:#x}", e.to),
            "value_wei": e.value.to_string(),
        })).collect::<Vec<_>>(),
    });

    let formatted = serde_json::to_string_pretty(&json)
        .map_err(|e| format!("Failed to serialize JSON: {e}"))?;

    let mut file = fs::File::create(path).map_err(|e| format!("Failed to create file: {e}"))?;
    file.write_all(formatted.as_bytes())
        .map_err(|e| format!("Failed to write file: {e}"))?;

    Ok(format!("Exported {} transfers to {path}", entries.len()))
}

/// Default export path in the working directory, stamped with the current time.
pub fn default_path(extension: &str) -> String {
    format!(
        "token-desk-history-{}.{extension}",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256, U256};
    use std::fs;

    use crate::data::types::Direction;

    fn sample_entries() -> Vec<TransferEvent> {
        vec![
            TransferEvent {
                tx_hash: B256::repeat_byte(0x01),
                log_index: 3,
                from: Address::repeat_byte(0xaa),
                to: Address::repeat_byte(0xbb),
                value: U256::from(1_500_000_000_000_000_000u128),
                block_number: 20,
                direction: Direction::Sent,
                timestamp: Some(1_700_000_000),
            },
            TransferEvent {
                tx_hash: B256::repeat_byte(0x02),
                log_index: 0,
                from: Address::repeat_byte(0xcc),
                to: Address::repeat_byte(0xaa),
                value: U256::from(7u64),
                block_number: 5,
                direction: Direction::Received,
                timestamp: None,
            },
        ]
    }

    #[test]
    fn test_export_history_csv() {
        let path = "/tmp/token-desk-test-history.csv";
        let result = export_history_csv(&sample_entries(), path);
        assert!(result.is_ok());

        let contents = fs::read_to_string(path).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("tx_hash,block_number"));
        let first = lines.next().unwrap();
        assert!(first.contains(",20,3,1700000000,Sent,"));
        assert!(first.ends_with(",1500000000000000000,1.5"));
        // Missing timestamp stays empty
        assert!(lines.next().unwrap().contains(",5,0,,Received,"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_export_history_csv_empty() {
        let path = "/tmp/token-desk-test-history-empty.csv";
        let result = export_history_csv(&[], path);
        assert!(result.unwrap().contains("0 transfers"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_export_history_json() {
        let path = "/tmp/token-desk-test-history.json";
        let result = export_history_json(&sample_entries(), path);
        assert!(result.unwrap().contains("2 transfers"));

        let contents = fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["transfers"][0]["direction"], "Sent");
        assert_eq!(value["transfers"][0]["value_wei"], "1500000000000000000");
        assert!(value["transfers"][1]["timestamp"].is_null());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let result = export_history_csv(&sample_entries(), "/nonexistent-dir/history.csv");
        assert!(result.unwrap_err().starts_with("Failed to create file"));
    }

    #[test]
    fn test_default_path_extension() {
        assert!(default_path("csv").ends_with(".csv"));
        assert!(default_path("json").starts_with("token-desk-history-"));
    }
}
