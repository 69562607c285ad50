use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use directories::BaseDirs;
use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::markup::RunStyle;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the stored log and remote settings.
    pub data_dir: PathBuf,
    /// Preferred editor binary. Optional; the CLI falls back to $VISUAL/$EDITOR.
    pub editor: Option<String>,
    /// "Today" for new days and the year list.
    pub reference_date: NaiveDate,
    /// Exported workbooks are named `{export_prefix}_{YYYY-MM-DD}.xlsx`.
    pub export_prefix: String,
    pub sheet_name: String,
    /// Generated reports are named `{report_prefix}_{YYYY-MM-DD}.docx`.
    pub report_prefix: String,
    pub document_style: RunStyle,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    editor: Option<String>,
    export_prefix: Option<String>,
    sheet_name: Option<String>,
    report_prefix: Option<String>,
    /// Optional table:
    /// [document]
    /// font = "標楷體"
    /// font_size = 12
    document: Option<DocumentConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentConfig {
    font: Option<String>,
    /// In points.
    font_size: Option<u32>,
}

impl Config {
    /// Load config from disk (first XDG path, then native) and apply defaults.
    pub fn load() -> Result<Self> {
        let file_config = Self::read_file_config()?;
        Ok(Self::from_file_config(file_config, Local::now().date_naive()))
    }

    fn from_file_config(file_config: FileConfig, reference_date: NaiveDate) -> Self {
        let default_style = RunStyle::default();
        let document = file_config.document.unwrap_or_default();
        let document_style = RunStyle {
            font: document
                .font
                .filter(|font| !font.trim().is_empty())
                .unwrap_or(default_style.font),
            size_half_points: document
                .font_size
                .filter(|size| *size > 0)
                .map_or(default_style.size_half_points, |points| points * 2),
        };

        Self {
            data_dir: file_config.data_dir.unwrap_or_else(Self::default_data_dir),
            editor: file_config.editor,
            reference_date,
            export_prefix: file_config
                .export_prefix
                .unwrap_or_else(|| "工作日誌資料庫".to_string()),
            sheet_name: file_config
                .sheet_name
                .unwrap_or_else(|| "工作日誌資料庫".to_string()),
            report_prefix: file_config
                .report_prefix
                .unwrap_or_else(|| "工作日誌彙整".to_string()),
            document_style,
        }
    }

    /// Default data root: `{data_dir}/worklog`
    /// - macOS:   `~/Library/Application Support/worklog`
    /// - Linux:   `$XDG_DATA_HOME/worklog` or `~/.local/share/worklog`
    /// - Windows: `%APPDATA%\worklog`
    fn default_data_dir() -> PathBuf {
        match BaseDirs::new() {
            Some(base) => base.data_dir().join("worklog"),
            None => PathBuf::from("./worklog"),
        }
    }

    fn config_file_paths() -> Vec<PathBuf> {
        let mut v = Vec::new();
        if let Some(b) = BaseDirs::new() {
            v.push(b.home_dir().join(".config").join("worklog").join("config.toml"));
            v.push(b.config_dir().join("worklog").join("config.toml"));
        }
        v
    }

    /// Read the first existing config file and parse it.
    fn read_file_config() -> Result<FileConfig> {
        for path in Self::config_file_paths() {
            if !path.exists() {
                continue;
            }
            let s =
                fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            return Self::parse_file(&s).with_context(|| format!("parsing {}", path.display()));
        }
        Ok(FileConfig::default())
    }

    fn parse_file(s: &str) -> Result<FileConfig> {
        Ok(toml::from_str::<FileConfig>(s)?)
    }
}
