//! Integration tests for the processor module
//!
//! Runs whole batches over temporary raw directories.


use crate::config::PipelineConfig;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Config rooted in a temp dir with the raw directory created
pub(crate) fn test_config(temp_dir: &TempDir) -> PipelineConfig {
    let config = PipelineConfig::rooted_at(temp_dir.path());
    fs::create_dir_all(&config.raw_dir).unwrap();
    config
}

pub(crate) fn write_raw(config: &PipelineConfig, name: &str, rows: &[(&str, &str)]) {
    let mut content = String::from("timestamp,value\n");
    for (ts, value) in rows {
        content.push_str(&format!("{},{}\n", ts, value));
    }
    fs::write(config.raw_dir.join(name), content).unwrap();
}

pub(crate) fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
