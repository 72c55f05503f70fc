use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterArg {
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormatArg {
    /// DD/MM/YYYY
    Dmy,
    /// MM/DD/YYYY
    Mdy,
    /// YYYY-MM-DD
    Ymd,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortFieldArg {
    Title,
    Company,
    Location,
    PublicationDate,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// Optional path to config file (YAML)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show one sorted page of the filtered records
    Preview {
        #[command(flatten)]
        filters: FilterArgs,

        /// Sort field
        #[arg(long, value_enum, default_value_t = SortFieldArg::PublicationDate)]
        sort: SortFieldArg,

        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page (overrides config when set)
        #[arg(long)]
        page_size: Option<usize>,

        /// Free-text search over title, company, location and description
        #[arg(long)]
        search: Option<String>,
    },
    /// Export the filtered records to CSV and log the export
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Comma-separated field keys (default: all)
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,

        /// Column delimiter (overrides config when set)
        #[arg(long, value_enum)]
        delimiter: Option<DelimiterArg>,

        /// Omit the header row
        #[arg(long)]
        no_headers: bool,

        /// Publication date format (overrides config when set)
        #[arg(long, value_enum)]
        date_format: Option<DateFormatArg>,

        /// Output directory for the CSV file
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Inspect or edit the export history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List past exports, newest first
    List {
        /// Case-insensitive search over filename, date and keywords
        #[arg(long)]
        search: Option<String>,
    },
    /// Remove one entry by id
    Remove { id: String },
    /// Delete the whole history
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// JSON file holding an array of job offers
    #[arg(short, long)]
    pub input: PathBuf,

    /// Title contains
    #[arg(long)]
    pub title: Option<String>,

    /// Company contains
    #[arg(long)]
    pub company: Option<String>,

    /// Location contains
    #[arg(long)]
    pub location: Option<String>,

    /// Age window in days, as MIN-MAX (0-30)
    #[arg(long)]
    pub days: Option<String>,

    /// Keyword (repeatable, any may match)
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_export_with_fields_list() {
        let opts = CliOptions::try_parse_from([
            "offerexport",
            "export",
            "--input",
            "offers.json",
            "--fields",
            "title,company",
            "--delimiter",
            "semicolon",
            "--no-headers",
        ])
        .expect("parse");
        let Command::Export {
            fields,
            delimiter,
            no_headers,
            ..
        } = opts.command
        else {
            panic!("expected export");
        };
        assert_eq!(fields.expect("fields"), vec!["title", "company"]);
        assert_eq!(delimiter, Some(DelimiterArg::Semicolon));
        assert!(no_headers);
    }

    #[test]
    fn parses_repeated_keywords() {
        let opts = CliOptions::try_parse_from([
            "offerexport",
            "preview",
            "-i",
            "offers.json",
            "--keyword",
            "react",
            "--keyword",
            "rust",
            "--sort",
            "title",
        ])
        .expect("parse");
        let Command::Preview { filters, sort, .. } = opts.command else {
            panic!("expected preview");
        };
        assert_eq!(filters.keywords, vec!["react", "rust"]);
        assert_eq!(sort, SortFieldArg::Title);
    }

    #[test]
    fn parses_history_clear() {
        let opts = CliOptions::try_parse_from(["offerexport", "history", "clear", "--yes"])
            .expect("parse");
        assert!(matches!(
            opts.command,
            Command::History {
                action: HistoryAction::Clear { yes: true }
            }
        ));
    }
}
