use clap::{Parser, Subcommand};

use techno_beacon::config::{CATALOG_VAR, DEBUG_VAR, NAMESPACE_VAR, STORE_VAR};
use techno_beacon::SortMode;

#[derive(Debug, Parser)]
#[command(name = "beacon", version, about = "Follow techno legends on tour")]
pub struct CliArgs {
    /// Override the key-value store file
    #[arg(long, value_name = "PATH", global = true)]
    pub store: Option<String>,

    /// Override the storage key prefix
    #[arg(long, value_name = "NS", global = true)]
    pub namespace: Option<String>,

    /// Load legends and events from a JSON file instead of the built-in roster
    #[arg(long, value_name = "PATH", global = true)]
    pub catalog: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the legends, optionally fuzzy-searched
    Legends {
        #[arg(long, value_name = "QUERY")]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Toggle legends in the followed set
    Select {
        #[arg(value_name = "LEGEND_ID", required_unless_present_any = ["detroit", "clear"])]
        ids: Vec<String>,
        /// Toggle every Detroit founder at once
        #[arg(long, conflicts_with_all = ["ids", "clear"])]
        detroit: bool,
        /// Follow nobody
        #[arg(long, conflicts_with = "ids")]
        clear: bool,
    },
    /// Show the dates of the followed legends
    Events {
        #[arg(long, value_name = "date|legend", default_value = "date", value_parser = parse_sort)]
        sort: SortMode,
        /// Narrow to these followed legends
        #[arg(long, value_name = "ID,...", value_delimiter = ',')]
        only: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Saved events
    Radar {
        #[command(subcommand)]
        action: RadarCommand,
    },
    /// Print the home city, or set it to VALUE
    HomeCity { value: Option<String> },
    /// Flight and hotel links for an event
    Trip {
        event_id: String,
        /// Travel from here instead of the home city
        #[arg(long, value_name = "CITY")]
        from: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Summarise selection, feed and radar
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Follow home-city edits made by other processes until Ctrl-C
    Watch {
        #[arg(long, value_name = "N", default_value_t = 1000)]
        interval_ms: u64,
    },
}

#[derive(Debug, Subcommand)]
pub enum RadarCommand {
    List {
        #[arg(long)]
        json: bool,
    },
    Add {
        event_id: String,
    },
    Remove {
        event_id: String,
    },
}

fn parse_sort(value: &str) -> Result<SortMode, String> {
    SortMode::parse(value).ok_or_else(|| format!("unknown sort mode '{value}', expected date or legend"))
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(store) = &self.store {
            std::env::set_var(STORE_VAR, store);
        }
        if let Some(namespace) = &self.namespace {
            std::env::set_var(NAMESPACE_VAR, namespace);
        }
        if let Some(catalog) = &self.catalog {
            std::env::set_var(CATALOG_VAR, catalog);
        }
        if self.debug {
            std::env::set_var(DEBUG_VAR, "1");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() -> Result<(), clap::Error> {
        let args = CliArgs::try_parse_from([
            "beacon",
            "events",
            "--sort",
            "legend",
            "--only",
            "jeff-mills,robert-hood",
            "--store",
            "state.json",
        ])?;

        assert_eq!(args.store.as_deref(), Some("state.json"));
        match args.command {
            Command::Events { sort, only, json } => {
                assert_eq!(sort, SortMode::Legend);
                assert_eq!(only, ["jeff-mills", "robert-hood"]);
                assert!(!json);
            }
            other => panic!("parsed {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn rejects_unknown_sort_mode() {
        assert!(CliArgs::try_parse_from(["beacon", "events", "--sort", "venue"]).is_err());
    }

    #[test]
    fn select_needs_ids_or_a_shortcut() {
        assert!(CliArgs::try_parse_from(["beacon", "select"]).is_err());
        assert!(CliArgs::try_parse_from(["beacon", "select", "--detroit"]).is_ok());
        assert!(CliArgs::try_parse_from(["beacon", "select", "--clear", "jeff-mills"]).is_err());
    }

    #[test]
    fn radar_subcommands() -> Result<(), clap::Error> {
        let args = CliArgs::try_parse_from(["beacon", "radar", "add", "jeff-mills-2"])?;
        assert!(matches!(
            args.command,
            Command::Radar { action: RadarCommand::Add { ref event_id } } if event_id == "jeff-mills-2"
        ));
        Ok(())
    }
}
