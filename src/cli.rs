use clap::{Parser, Subcommand};
use gallery_catalog::{Filter, MediaType};
use std::path::PathBuf;

/// Store and browse images, videos and audio in a hosted git repository.
///
/// The access token is read from the configuration (`github.token`) or the
/// `GALLERY_GITHUB__TOKEN` environment variable, never from the command line.
#[derive(Debug, Parser)]
#[command(name = "gallery", version, about)]
pub struct Cli {
    /// Configuration file [default: config.toml in the platform config directory]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Account name; overrides `github.username`
    #[arg(long, short, global = true)]
    pub username: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check credentials and create the gallery repository if it is missing
    Login {
        /// Don't create anything on the remote
        #[arg(long)]
        dry_run: bool,
    },
    /// Upload files as one media type
    Upload {
        /// Media type of every file in the batch
        #[arg(long = "type", short = 't', value_parser = parse_media_type)]
        media_type: MediaType,
        /// Show what would be uploaded without writing anything
        #[arg(long)]
        dry_run: bool,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the gallery, newest first
    List {
        /// One of all, image, video, audio
        #[arg(long, short, default_value = "all", value_parser = parse_filter)]
        filter: Filter,
    },
}

fn parse_media_type(value: &str) -> Result<MediaType, String> {
    value.parse().map_err(|_| format!("expected image, video or audio, got {value:?}"))
}

fn parse_filter(value: &str) -> Result<Filter, String> {
    value.parse().map_err(|_| format!("expected all, image, video or audio, got {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_upload_args() {
        let cli = Cli::parse_from(["gallery", "-vv", "upload", "--type", "audio", "--dry-run", "a.mp3", "b.mp3"]);
        assert_eq!(cli.verbose, 2);
        let Command::Upload { media_type, dry_run, files } = cli.command else {
            panic!("expected upload");
        };
        assert_eq!(media_type, MediaType::Audio);
        assert!(dry_run);
        assert_eq!(files, vec![PathBuf::from("a.mp3"), PathBuf::from("b.mp3")]);
    }

    #[test]
    fn test_upload_requires_files() {
        assert!(Cli::try_parse_from(["gallery", "upload", "--type", "image"]).is_err());
    }

    #[rstest]
    #[case(&["gallery", "list"], Filter::All)]
    #[case(&["gallery", "list", "--filter", "video"], Filter::Only(MediaType::Video))]
    #[case(&["gallery", "list", "-f", "image"], Filter::Only(MediaType::Image))]
    fn test_list_filter(#[case] args: &[&str], #[case] expected: Filter) {
        let Command::List { filter } = Cli::parse_from(args).command else {
            panic!("expected list");
        };
        assert_eq!(filter, expected);
    }

    #[test]
    fn test_list_rejects_unknown_filter() {
        assert!(Cli::try_parse_from(["gallery", "list", "--filter", "documents"]).is_err());
    }
}
