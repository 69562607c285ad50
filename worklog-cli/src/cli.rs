use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use worklog_core::{
    Direction, MonthFilter, NodePath, ReportFilter, RocDate, WorkLogError, markup::TagStyle,
};

use crate::render::ColorMode;

/// wlog: daily work log with projects, items and sub-items
///
/// Nodes are addressed by dotted indices as printed by `wlog show`:
/// `0` is the first day, `0.1` its second project, `0.1.2` an item,
/// `0.1.2.0` a sub-item and `0.1.2.0.3` a sub-sub-item.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Control ANSI colors in output.
    /// By default, colors are disabled when output is redirected (e.g with `>` or `|`).
    #[arg(long, value_enum, global = true, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Prints the data directory
    Path,
    /// Lists days, optionally filtered by search text or year and month
    Show(ShowArgs),
    /// Adds a new day at the top of the log
    New {
        /// Date of the day, `115.02.13` or `2026-02-13`. Defaults to today,
        /// or to the 1st of `--month` when that is not the current month.
        #[arg(long, value_parser = parse_date)]
        date: Option<RocDate>,
        /// Gregorian year the new day belongs to.
        #[arg(long, conflicts_with = "date")]
        year: Option<i32>,
        /// Month the new day belongs to (1-12 or `all`).
        #[arg(long, conflicts_with = "date")]
        month: Option<MonthFilter>,
    },
    /// Adds a child to a node: a project to a day, an item to a project, and so on
    Add {
        parent: NodePath,
        /// Text of the new node. New projects also get one empty item.
        text: Vec<String>,
    },
    /// Replaces the text of a node (the date of a day, the name of a project)
    Set {
        path: NodePath,
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Opens the text of a node in your $EDITOR
    Edit { path: NodePath },
    /// Marks part of a node's text as red `((..))` or highlighted `{{..}}`
    Mark(MarkArgs),
    /// Moves a node up or down among its siblings
    Move {
        path: NodePath,
        /// `up` or `down`.
        direction: Direction,
    },
    /// Removes a node and everything below it
    Remove {
        path: NodePath,
        /// Keep the remote copies of the removed images.
        #[arg(long)]
        keep_images: bool,
    },
    /// Replaces the projects of a day with a copy of another day's projects
    CopyFrom {
        /// Index of the day to fill.
        day: usize,
        /// Date of the day to copy from, e.g. `115.02.12`.
        source_date: String,
    },
    /// Sorts days by date, newest first
    Sort,
    /// Deletes the whole log and starts over with one new day
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Shows one project's entries within a date range
    Report {
        #[command(flatten)]
        filter: ReportArgs,
        /// Write the report as an HTML page instead of printing it.
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Writes the log to a file
    Export {
        #[command(subcommand)]
        format: ExportFormat,
    },
    /// Replaces the log with the contents of a file
    Import {
        #[command(subcommand)]
        format: ImportFormat,
    },
    /// Attaches or removes images
    Image {
        #[command(subcommand)]
        action: ImageAction,
    },
    /// Synchronizes with the remote endpoint
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
    /// Shows or changes the remote endpoint settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Case-insensitive text to look for in dates, project names and contents.
    /// Ignores `--year` and `--month`.
    #[arg(long, short)]
    pub search: Option<String>,
    /// Gregorian year to show.
    #[arg(long, short)]
    pub year: Option<i32>,
    /// Month to show (1-12 or `all`). Without `--year`, the current year is used.
    #[arg(long, short)]
    pub month: Option<MonthFilter>,
    /// Prints the project names used across the log.
    #[arg(long, conflicts_with_all = ["search", "year", "month", "years"])]
    pub projects: bool,
    /// Prints the years present in the log.
    #[arg(long, conflicts_with_all = ["search", "year", "month"])]
    pub years: bool,
}

#[derive(Args, Debug)]
pub struct MarkArgs {
    pub path: NodePath,
    /// Text to mark; its first occurrence is wrapped.
    #[arg(long, required_unless_present = "start", conflicts_with_all = ["start", "end"])]
    pub text: Option<String>,
    /// First character of the selection (0-based).
    #[arg(long, requires = "end")]
    pub start: Option<usize>,
    /// Character after the selection.
    #[arg(long, requires = "start")]
    pub end: Option<usize>,
    /// `red` or `highlight`.
    #[arg(long, default_value = "red")]
    pub style: TagStyle,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Project name, as listed by `wlog show --projects`.
    #[arg(long, short)]
    pub project: String,
    /// First date to include, e.g. `115.01.01`.
    #[arg(long, value_parser = parse_date)]
    pub from: Option<RocDate>,
    /// Last date to include.
    #[arg(long, value_parser = parse_date)]
    pub to: Option<RocDate>,
}

impl ReportArgs {
    pub fn to_filter(&self) -> ReportFilter {
        ReportFilter {
            project: self.project.clone(),
            start: self.from.map(|date| date.to_string()),
            end: self.to.map(|date| date.to_string()),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ExportFormat {
    /// Spreadsheet, one row per leaf node
    Xlsx {
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Word document filled from a template
    Docx {
        /// The .docx template with `{#logs}` … `{/logs}` loops.
        #[arg(long, short, env = "WLOG_TEMPLATE")]
        template: Option<PathBuf>,
        /// Only include one project (see `wlog report`).
        #[arg(long, short)]
        project: Option<String>,
        #[arg(long, value_parser = parse_date, requires = "project")]
        from: Option<RocDate>,
        #[arg(long, value_parser = parse_date, requires = "project")]
        to: Option<RocDate>,
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Printable HTML page
    Html {
        #[arg(long, short)]
        out: Option<PathBuf>,
        #[arg(long, default_value = "工作日誌")]
        title: String,
    },
    /// The raw log as JSON, on stdout unless `--out` is given
    Json {
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ImportFormat {
    /// Spreadsheet in the layout written by `wlog export xlsx`
    Xlsx {
        file: PathBuf,
        /// Keep the remote copies of images the imported log no longer uses.
        #[arg(long)]
        keep_images: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ImageAction {
    /// Compresses an image file, attaches it to a node and uploads it
    Attach {
        path: NodePath,
        file: PathBuf,
        /// Keep the remote copy of the image being replaced.
        #[arg(long)]
        keep_images: bool,
    },
    /// Removes a node's image, deleting the remote copy
    Remove { path: NodePath },
}

#[derive(Subcommand, Debug)]
pub enum SyncAction {
    /// Uploads the whole log
    Push,
    /// Replaces the local log with the remote one
    Pull {
        /// Keep the remote copies of images the downloaded log no longer uses.
        #[arg(long)]
        keep_images: bool,
    },
    /// Lists remote images no day refers to, and deletes them with `--yes`
    Clean {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Prints the remote settings (the token is masked)
    Show,
    /// Changes remote settings; omitted ones stay as they are
    Set {
        #[arg(long)]
        script_url: Option<String>,
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        folder_id: Option<String>,
    },
}

fn parse_date(s: &str) -> Result<RocDate, WorkLogError> {
    RocDate::from_user_input(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_paths_dates_and_styles() {
        let cli = Cli::parse_from(["wlog", "mark", "0.1.2", "--text", "north", "--style", "yellow"]);
        let Command::Mark(args) = cli.command else {
            panic!("expected mark");
        };
        assert_eq!(args.path, "0.1.2".parse::<NodePath>().unwrap());
        assert_eq!(args.style, TagStyle::Highlight);

        let cli = Cli::parse_from(["wlog", "new", "--date", "2026-02-13"]);
        let Command::New { date, .. } = cli.command else {
            panic!("expected new");
        };
        assert_eq!(date.map(|d| d.to_string()).as_deref(), Some("115.02.13"));
    }

    #[test]
    fn rejects_bad_paths() {
        assert!(Cli::try_parse_from(["wlog", "remove", "0.x"]).is_err());
        assert!(Cli::try_parse_from(["wlog", "move", "0.1", "sideways"]).is_err());
    }
}
