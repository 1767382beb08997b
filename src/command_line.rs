use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::types::MAX_SEED_ORDER_SIZE;

/// Seeded single elimination brackets
///
/// Builds bracket documents from a list of names and records results into
/// them. Documents are plain JSON and can be handed to any renderer.
#[derive(Parser, Debug)]
#[command(version, about = "Seeded single elimination brackets")]
pub struct Args {
    /// Path to a config.json, overrides BRACKET_CONFIG_PATH
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Whether to log on the debug level
    #[arg(long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the seed pairing order for a field of SIZE slots
    Seeds {
        #[arg(value_parser = clap::value_parser!(u32).range(0..=MAX_SEED_ORDER_SIZE as i64))]
        size: u32,
    },

    /// Create a bracket; entrants are seeded in the order given
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        created_by: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Write the document here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(required = true)]
        participants: Vec<String>,
    },

    /// Record the winner of a match and move them on
    Advance {
        #[arg(long)]
        file: PathBuf,

        #[arg(long = "match")]
        match_id: String,

        /// Entrant id or name
        #[arg(long)]
        winner: String,

        #[arg(long)]
        score1: Option<u32>,

        #[arg(long)]
        score2: Option<u32>,

        #[arg(long)]
        dry_run: bool,
    },

    /// Undo a result and everything decided from it
    Reset {
        #[arg(long)]
        file: PathBuf,

        #[arg(long = "match")]
        match_id: String,

        #[arg(long)]
        dry_run: bool,
    },

    /// Print the rounds, open matches and champion
    Show {
        #[arg(long)]
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_advance() {
        let args = Args::try_parse_from([
            "bracket-engine", "advance", "--file", "cup.json", "--match", "r1m0", "--winner", "A", "--score1", "2",
        ])
        .unwrap();
        match args.command {
            Command::Advance { match_id, winner, score1, score2, dry_run, .. } => {
                assert_eq!(match_id, "r1m0");
                assert_eq!(winner, "A");
                assert_eq!(score1, Some(2));
                assert_eq!(score2, None);
                assert!(!dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_seeds_size_is_capped() {
        let args = Args::try_parse_from(["bracket-engine", "seeds", "65536"]).unwrap();
        assert!(matches!(args.command, Command::Seeds { size: 65536 }));
        assert!(Args::try_parse_from(["bracket-engine", "seeds", "65537"]).is_err());
        assert!(Args::try_parse_from(["bracket-engine", "seeds", "4294967295"]).is_err());
    }

    #[test]
    fn test_create_needs_participants() {
        assert!(Args::try_parse_from(["bracket-engine", "create", "--name", "Cup"]).is_err());
    }
}
