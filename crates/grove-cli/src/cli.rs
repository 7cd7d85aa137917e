use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "grove",
    about = "Grove — hierarchical typed-array container store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the group/dataset tree of a container file
    Ls(LsArgs),
    /// Show one dataset: description and decoded values
    Show(ShowArgs),
    /// Open a container eagerly and report what was loaded
    Check(CheckArgs),
    /// Write a small reference container file
    Sample(SampleArgs),
}

#[derive(Args)]
pub struct LsArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ShowArgs {
    pub file: PathBuf,
    /// Dataset path, segments separated by '/'
    pub path: String,
}

#[derive(Args)]
pub struct CheckArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct SampleArgs {
    #[arg(default_value = "sample.grvc")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ls() {
        let cli = Cli::try_parse_from(["grove", "ls", "data.grvc"]).unwrap();
        if let Command::Ls(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("data.grvc"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_show() {
        let cli = Cli::try_parse_from(["grove", "show", "data.grvc", "g/b"]).unwrap();
        if let Command::Show(args) = cli.command {
            assert_eq!(args.path, "g/b");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_check() {
        let cli = Cli::try_parse_from(["grove", "check", "data.grvc"]).unwrap();
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn parse_sample_default_output() {
        let cli = Cli::try_parse_from(["grove", "sample"]).unwrap();
        if let Command::Sample(args) = cli.command {
            assert_eq!(args.out, PathBuf::from("sample.grvc"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["grove", "--verbose", "check", "x.grvc"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["grove", "--format", "json", "ls", "x.grvc"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn show_requires_path() {
        assert!(Cli::try_parse_from(["grove", "show", "data.grvc"]).is_err());
    }
}
