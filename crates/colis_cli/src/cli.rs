//! Command-line interface definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// colis - shipment desk: records, labels and modification history.
#[derive(Parser, Debug)]
#[command(name = "colis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the SQLite database file (created when missing)
    #[arg(long, global = true, default_value = "colis.sqlite3")]
    pub db: PathBuf,

    /// Directory for rolling log files; logging is off when omitted
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account
    Signup(SignupArgs),

    /// Check credentials
    Login(LoginArgs),

    /// Add a shipment record from `--set field=value` pairs
    Add(AddArgs),

    /// List all records, most recent first
    List,

    /// Search records by id or sender name
    Search(SearchArgs),

    /// Show one record
    Show(RecordIdArg),

    /// Edit a record; unspecified fields keep their stored value
    Edit(EditArgs),

    /// Delete a record (its history is kept)
    Delete(RecordIdArg),

    /// Show the modification history of a record
    History(RecordIdArg),

    /// Print the QR label payload of a record
    Label(RecordIdArg),

    /// Read a scanned QR payload
    Scan(ScanArgs),

    /// Send a record's label to the spool printer
    Print(PrintArgs),
}

/// Shared argument for commands that target one record.
#[derive(Args, Debug)]
pub struct RecordIdArg {
    /// Record id
    pub id: i64,
}

#[derive(Args, Debug)]
pub struct SignupArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long)]
    pub password: String,

    /// Password confirmation; must match `--password`
    #[arg(short, long)]
    pub confirm: String,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Field assignment, e.g. `--set name_exp=Alice`; repeat for each field
    #[arg(short, long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Record id
    pub id: i64,

    /// Field assignment, e.g. `--set nmbr_package=3`
    #[arg(
        short,
        long = "set",
        value_name = "FIELD=VALUE",
        value_parser = parse_assignment,
        required = true
    )]
    pub set: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Text matched against record ids and sender names
    pub text: String,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// File holding the scanned text; stdin when omitted
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PrintArgs {
    /// Record id
    pub id: i64,

    /// Directory receiving print jobs
    #[arg(long, default_value = "spool")]
    pub spool_dir: PathBuf,
}

/// Parses `FIELD=VALUE`; the value may itself contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got `{raw}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_assignment, Cli, Commands};
    use clap::Parser;

    #[test]
    fn assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("gender_package=a=b").unwrap(),
            ("gender_package".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_assignment(" kilos =").unwrap(),
            ("kilos".to_string(), String::new())
        );
        assert!(parse_assignment("kilos").is_err());
        assert!(parse_assignment("=3").is_err());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "colis",
            "edit",
            "4",
            "--set",
            "nmbr_package=3",
            "--db",
            "/tmp/x.sqlite3",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.db.to_str(), Some("/tmp/x.sqlite3"));
        match cli.command {
            Commands::Edit(args) => {
                assert_eq!(args.id, 4);
                assert_eq!(
                    args.set,
                    vec![("nmbr_package".to_string(), "3".to_string())]
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn edit_requires_at_least_one_assignment() {
        assert!(Cli::try_parse_from(["colis", "edit", "4"]).is_err());
    }
}
