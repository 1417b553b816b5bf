use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "verso", about = "Verso: document version history", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Structurally compare two document files
    Diff(DiffArgs),
    /// Print the patch turning one file into another
    Patch(PatchArgs),
    /// Apply a patch file to a base file
    Apply(ApplyArgs),
    /// Save files as successive versions and verify every reconstruction
    Replay(ReplayArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,
}

#[derive(Args)]
pub struct PatchArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    /// Unchanged lines kept around each hunk
    #[arg(short = 'U', long, default_value = "3")]
    pub context: usize,
}

#[derive(Args)]
pub struct ApplyArgs {
    pub base: PathBuf,
    pub patch: PathBuf,
}

#[derive(Args)]
pub struct ReplayArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// TOML file with versioning settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
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
    fn parse_diff_json() {
        let cli = Cli::try_parse_from(["verso", "diff", "a.json", "b.json", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        if let Command::Diff(args) = cli.command {
            assert_eq!(args.old, PathBuf::from("a.json"));
            assert_eq!(args.new, PathBuf::from("b.json"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_patch_context() {
        let cli = Cli::try_parse_from(["verso", "patch", "-U", "0", "a", "b"]).unwrap();
        if let Command::Patch(args) = cli.command {
            assert_eq!(args.context, 0);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_replay_with_config() {
        let cli = Cli::try_parse_from(["verso", "-v", "replay", "v1", "v2", "v3", "--config", "verso.toml"]).unwrap();
        assert!(cli.verbose);
        if let Command::Replay(args) = cli.command {
            assert_eq!(args.files.len(), 3);
            assert_eq!(args.config, Some(PathBuf::from("verso.toml")));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn replay_needs_files() {
        assert!(Cli::try_parse_from(["verso", "replay"]).is_err());
    }
}
