use std::path::PathBuf;

use clap::Parser;
use sieve::Dir;

#[derive(Parser, Debug)]
#[command(name = "sieve-cli")]
#[command(about = "Filter, search and sort a JSON collection", long_about = None)]
pub struct Cli {
    /// JSON file holding an array of records
    pub records: PathBuf,

    /// Settings file (.json, .yaml or .yml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Additional filterable attribute
    #[arg(long = "filterable", value_name = "ATTR")]
    pub filterable: Vec<String>,

    /// Additional searchable field
    #[arg(long = "searchable", value_name = "FIELD")]
    pub searchable: Vec<String>,

    /// Toggle a filter value (repeatable)
    #[arg(short, long = "filter", value_name = "GROUP=VALUE", value_parser = parse_assignment)]
    pub filters: Vec<(String, String)>,

    /// Make a value the only selection of its group (repeatable)
    #[arg(long = "only", value_name = "GROUP=VALUE", value_parser = parse_assignment)]
    pub only: Vec<(String, String)>,

    /// Clear one group's selection (repeatable)
    #[arg(long = "clear", value_name = "GROUP")]
    pub clear: Vec<String>,

    /// Clear every group's selection
    #[arg(long)]
    pub clear_all: bool,

    /// Keyword to search for
    #[arg(short, long, value_name = "KEYWORD")]
    pub search: Option<String>,

    /// Apply a registered sort by id
    #[arg(long, value_name = "ID")]
    pub sort: Option<String>,

    /// Sort by a field directly, e.g. `year` or `year:desc`
    #[arg(long = "sort-by", value_name = "FIELD[:DIR]", value_parser = parse_sort_by)]
    pub sort_by: Option<(String, Dir)>,

    /// Print the whole published state instead of only the visible records
    #[arg(long)]
    pub full: bool,
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((group, value)) if !group.is_empty() => Ok((group.to_string(), value.to_string())),
        _ => Err(format!("expected GROUP=VALUE, got '{}'", s)),
    }
}

fn parse_sort_by(s: &str) -> Result<(String, Dir), String> {
    let (field, dir) = match s.rsplit_once(':') {
        Some((field, "asc")) => (field, Dir::Asc),
        Some((field, "desc")) => (field, Dir::Desc),
        Some((_, other)) => return Err(format!("unknown direction '{}', use asc or desc", other)),
        None => (s, Dir::Asc),
    };
    if field.is_empty() {
        return Err("missing field name".to_string());
    }
    Ok((field.to_string(), dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn program_name_matches_binary() {
        let mut command = Cli::command();
        assert_eq!(command.get_name(), "sieve-cli");
        assert!(command.render_usage().to_string().contains("sieve-cli"));
    }

    #[test]
    fn assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("type=a=b"),
            Ok(("type".to_string(), "a=b".to_string()))
        );
        assert_eq!(
            parse_assignment("type="),
            Ok(("type".to_string(), String::new()))
        );
        assert!(parse_assignment("type").is_err());
        assert!(parse_assignment("=foo").is_err());
    }

    #[test]
    fn sort_by_direction() {
        assert_eq!(parse_sort_by("year"), Ok(("year".to_string(), Dir::Asc)));
        assert_eq!(
            parse_sort_by("year:desc"),
            Ok(("year".to_string(), Dir::Desc))
        );
        assert!(parse_sort_by("year:sideways").is_err());
        assert!(parse_sort_by(":desc").is_err());
    }

    #[test]
    fn parses_full_command_line() {
        let cli = Cli::try_parse_from([
            "sieve-cli",
            "data.json",
            "-f",
            "type=book",
            "--only",
            "lang=fr",
            "--clear",
            "year",
            "--clear-all",
            "-s",
            "dune",
            "--sort",
            "newest",
            "--full",
        ])
        .unwrap();

        assert_eq!(cli.records, PathBuf::from("data.json"));
        assert_eq!(cli.filters, vec![("type".to_string(), "book".to_string())]);
        assert_eq!(cli.only, vec![("lang".to_string(), "fr".to_string())]);
        assert_eq!(cli.clear, vec!["year"]);
        assert!(cli.clear_all);
        assert_eq!(cli.search.as_deref(), Some("dune"));
        assert_eq!(cli.sort.as_deref(), Some("newest"));
        assert!(cli.full);
    }
}
