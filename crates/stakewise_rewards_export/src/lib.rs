//! Spreadsheet (CSV) export of reward records.

use stakewise_rewards::{Network, RewardRecord};
use std::io::Write;
use std::path::Path;

/// Fixed column ordering and header labels.
const HEADER: [&str; 3] = ["date", "daily_reward", "daily_reward_gbp"];

/// Export filename: `{network}_{vault name}_rewards.csv`, lower-cased,
/// spaces replaced with underscores.
pub fn export_filename(network: Network, vault_name: &str) -> String {
    format!(
        "{}_{}_rewards.csv",
        network.slug(),
        vault_name.to_lowercase().replace(' ', "_")
    )
}

/// Write the full record sequence to `out_path` in one pass. An empty
/// sequence still produces the header row.
pub fn write_rewards_csv(
    records: &[RewardRecord],
    out_path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let csv = rewards_csv_string(records)?;
    let mut f = std::fs::File::create(out_path.as_ref()).map_err(ExportError::Io)?;
    f.write_all(csv.as_bytes()).map_err(ExportError::Io)?;
    Ok(())
}

/// Build the CSV text (for testing or in-memory use).
pub fn rewards_csv_string(records: &[RewardRecord]) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(HEADER).map_err(ExportError::Csv)?;
    for record in records {
        wtr.serialize(record).map_err(ExportError::Csv)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::Io(std::io::Error::other(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Io(std::io::Error::other(e.to_string())))
}

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "io: {}", e),
            ExportError::Csv(e) => write!(f, "csv: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month};

    fn record(day: u8, reward: f64, gbp: f64) -> RewardRecord {
        RewardRecord {
            date: Date::from_calendar_date(2023, Month::November, day).unwrap(),
            daily_reward: reward,
            daily_reward_gbp: gbp,
        }
    }

    #[test]
    fn empty_session_exports_header_only() {
        let csv = rewards_csv_string(&[]).unwrap();
        assert_eq!(csv, "date,daily_reward,daily_reward_gbp\n");
    }

    #[test]
    fn one_row_per_record_in_order() {
        let records = [record(14, 1.5, 1.2), record(15, 0.75, 0.6)];
        let csv = rewards_csv_string(&records).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "date,daily_reward,daily_reward_gbp");
        assert_eq!(lines[1], "2023-11-14,1.5,1.2");
        assert_eq!(lines[2], "2023-11-15,0.75,0.6");
    }

    #[test]
    fn filename_rule() {
        assert_eq!(
            export_filename(Network::Ethereum, "Vault B"),
            "ethereum_vault_b_rewards.csv"
        );
        assert_eq!(
            export_filename(Network::Gnosis, "Genesis"),
            "gnosis_genesis_rewards.csv"
        );
    }

    #[test]
    fn write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(export_filename(Network::Ethereum, "Genesis"));
        write_rewards_csv(&[record(14, 1.5, 1.2)], &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("date,daily_reward,daily_reward_gbp\n"));
        assert!(written.contains("2023-11-14"));
    }
}
