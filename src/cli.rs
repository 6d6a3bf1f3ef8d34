use crate::classify::QuadrantMapping;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "eisenmatrix", version, about = "Eisenhower priority matrix in the terminal")]
pub struct Cli {
    /// Save file to load from and write to
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,
    /// Keep tasks in memory only for this run
    #[arg(long, global = true)]
    pub no_save: bool,
    /// Which quadrant the off-diagonal flag combinations go to
    #[arg(long, global = true, value_enum)]
    pub mapping: Option<QuadrantMapping>,
    /// Log target: off, stderr, or a file path
    #[arg(long, global = true)]
    pub log: Option<String>,
    /// Log at debug level
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch the interactive matrix
    Tui,
    /// Add a task without opening the matrix
    Add {
        /// Task text
        text: String,
        /// Mark the task urgent
        #[arg(long, short)]
        urgent: bool,
        /// Mark the task important
        #[arg(long, short)]
        important: bool,
    },
    /// List tasks by quadrant
    List {
        /// Only show one quadrant (e.g. urgent-important)
        #[arg(long)]
        category: Option<String>,
    },
    /// Flip a task between open and completed
    Toggle {
        /// Quadrant of the task (e.g. not-urgent-important)
        category: String,
        /// Position of the task within its quadrant, as shown by `list`
        index: usize,
    },
    /// Remove every task and delete the save file
    Clear,
    /// Print the save file and config file locations
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["eisenmatrix"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.no_save);
    }

    #[test]
    fn add_takes_flags_and_global_options() {
        let cli = Cli::try_parse_from([
            "eisenmatrix",
            "add",
            "Finish report",
            "-u",
            "--important",
            "--file",
            "tasks.json",
            "--mapping",
            "transposed",
        ])
        .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("tasks.json")));
        assert_eq!(cli.mapping, Some(QuadrantMapping::Transposed));
        match cli.command {
            Some(Command::Add {
                text,
                urgent,
                important,
            }) => {
                assert_eq!(text, "Finish report");
                assert!(urgent && important);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn toggle_requires_index() {
        assert!(Cli::try_parse_from(["eisenmatrix", "toggle", "urgent-important"]).is_err());
        let cli = Cli::try_parse_from(["eisenmatrix", "toggle", "urgent-important", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Toggle { index: 2, .. })
        ));
    }
}
