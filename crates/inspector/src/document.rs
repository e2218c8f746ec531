//! Reading and writing JSON documents

use std::path::Path;

use anyhow::{Context, Result};
use seisdm_datamodel::ConfigRecord;

pub async fn read_record(path: &Path) -> Result<ConfigRecord> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse document {}", path.display()))
}

pub async fn write_record(path: &Path, record: &ConfigRecord) -> Result<()> {
    let text = serde_json::to_string_pretty(record).context("Failed to serialize document")?;
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("Failed to write document {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn written_record_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let record: ConfigRecord = serde_json::from_str(
            r#"{"publicID": "Config/1", "parameterSets": [{"publicID": "PS/1", "moduleID": "global"}]}"#,
        )
        .unwrap();

        write_record(&path, &record).await.unwrap();
        let loaded = read_record(&path).await.unwrap();

        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = read_record(&path).await.unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }

    #[tokio::test]
    async fn malformed_identifier_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        tokio::fs::write(&path, r#"{"publicID": "   "}"#).await.unwrap();

        let err = read_record(&path).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse document"));
    }
}
