#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

pub const ADDRESS: &str = "pos@ln.example";

/// A payments CSV with one `mint,amount` row per entry.
pub fn payments_csv(rows: &[(&str, u64)]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "mint, amount").unwrap();
    for (mint, amount) in rows {
        writeln!(file, "{mint}, {amount}").unwrap();
    }
    file.flush().unwrap();
    file
}

/// Settings enabling each of `mints` with the given threshold and a 95% share.
pub fn settings_json(global_enabled: bool, mints: &[&str], threshold: u64) -> NamedTempFile {
    let entries: serde_json::Map<String, serde_json::Value> = mints
        .iter()
        .map(|mint| {
            (
                mint.to_string(),
                serde_json::json!({
                    "mint": mint,
                    "enabled": true,
                    "threshold": threshold,
                    "percentage": 95,
                    "address": ADDRESS,
                }),
            )
        })
        .collect();
    let document = serde_json::json!({
        "global_enabled": global_enabled,
        "defaults": { "address": ADDRESS },
        "mints": entries,
    });

    let mut file = NamedTempFile::new().unwrap();
    serde_json::to_writer(&mut file, &document).unwrap();
    file.flush().unwrap();
    file
}
