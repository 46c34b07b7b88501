use ammg::configuration::{
    CacheAction, ConfigFolder, GetOptions, SidecarOptions, DEFAULT_SIDECAR_TEXT,
};
use ammg::startup::{run_cache, run_get};
use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = build_cli().get_matches();
    let cfg_folder = ConfigFolder::new();

    match args.subcommand() {
        Some(("get", sub_args)) => {
            let options = get_options(sub_args);
            match run_get(&cfg_folder, &options).await {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("{}", e);
                    ExitCode::from(e.exit_code())
                }
            }
        }
        Some(("cache", sub_args)) => match cache_command(&cfg_folder, sub_args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{:#}", e);
                ExitCode::FAILURE
            }
        },
        _ => {
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn build_cli() -> Command {
    Command::new("ammg")
        .about("Apple Music metadata for downloaded audio files")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(
            Command::new("get")
                .about("Download album metadata, embed it into matching files and organize them")
                .arg(
                    Arg::new("directory")
                        .help("Directory holding the downloaded audio files")
                        .value_name("path/to/directory")
                        .value_parser(value_parser!(PathBuf))
                        .required(true),
                )
                .arg(
                    Arg::new("album-id")
                        .short('i')
                        .long("album-id")
                        .help("Album id from Apple Music")
                        .value_parser(value_parser!(u64))
                        .required(true),
                )
                .arg(
                    Arg::new("output-directory")
                        .short('o')
                        .long("output-directory")
                        .help("Directory the organized files are moved to")
                        .value_name("path/to/output_directory")
                        .value_parser(value_parser!(PathBuf))
                        .required(true),
                )
                .arg(
                    Arg::new("storefront")
                        .short('s')
                        .long("storefront")
                        .help("Storefront used when querying metadata")
                        .default_value("us"),
                )
                .arg(
                    Arg::new("tracks")
                        .short('t')
                        .long("tracks")
                        .help("Only process these track numbers")
                        .num_args(1..)
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("clean-request")
                        .short('c')
                        .long("clean-request")
                        .help("Don't use cached responses")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("cover-width")
                        .long("cover-width")
                        .help("Cover width")
                        .value_parser(value_parser!(u32))
                        .default_value("500"),
                )
                .arg(
                    Arg::new("cover-height")
                        .long("cover-height")
                        .help("Cover height")
                        .value_parser(value_parser!(u32))
                        .default_value("500"),
                )
                .arg(
                    Arg::new("do-not-check-token")
                        .long("do-not-check-token")
                        .help("Use the stored token without validating it first")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("duration-error")
                        .long("duration-error")
                        .help("Accepted duration difference in seconds")
                        .value_parser(value_parser!(u64))
                        .default_value("5"),
                )
                .arg(
                    Arg::new("create-lrc-file")
                        .long("create-lrc-file")
                        .help("Create a .lrc file next to each track")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("lrc-file-text")
                        .long("lrc-file-text")
                        .help("Text written in the .lrc file")
                        .default_value(DEFAULT_SIDECAR_TEXT),
                )
                .arg(
                    Arg::new("create-txt-file")
                        .long("create-txt-file")
                        .help("Create a .txt file next to each track")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("txt-file-text")
                        .long("txt-file-text")
                        .help("Text written in the .txt file")
                        .default_value(DEFAULT_SIDECAR_TEXT),
                ),
        )
        .subcommand(
            Command::new("cache")
                .about("Inspect or clean the response cache")
                .arg(
                    Arg::new("get-cache-size")
                        .long("get-cache-size")
                        .help("Print the cache size")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("clean-cache")
                        .long("clean-cache")
                        .help("Delete the cached responses and covers")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("get-cache-path")
                        .long("get-cache-path")
                        .help("Print the cache directory")
                        .action(ArgAction::SetTrue),
                )
                .group(
                    ArgGroup::new("action")
                        .args(["get-cache-size", "clean-cache", "get-cache-path"])
                        .multiple(false),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("With --clean-cache, only list what would be deleted")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn get_options(args: &ArgMatches) -> GetOptions {
    let directory = args
        .get_one::<PathBuf>("directory")
        .cloned()
        .unwrap_or_default();
    let album_id = args
        .get_one::<u64>("album-id")
        .map(u64::to_string)
        .unwrap_or_default();
    let output_directory = args
        .get_one::<PathBuf>("output-directory")
        .cloned()
        .unwrap_or_default();

    let mut options = GetOptions::new(directory, &album_id, output_directory);

    if let Some(storefront) = args.get_one::<String>("storefront") {
        options.storefront = storefront.clone();
    }
    options.tracks = args
        .get_many::<u32>("tracks")
        .map(|tracks| tracks.copied().collect());
    options.clean_request = args.get_flag("clean-request");
    options.cover_width = args.get_one::<u32>("cover-width").copied().unwrap_or(500);
    options.cover_height = args.get_one::<u32>("cover-height").copied().unwrap_or(500);
    options.check_token = !args.get_flag("do-not-check-token");
    options.duration_tolerance = args.get_one::<u64>("duration-error").copied().unwrap_or(5);
    options.sidecars = SidecarOptions {
        lrc: sidecar_text(args, "create-lrc-file", "lrc-file-text"),
        txt: sidecar_text(args, "create-txt-file", "txt-file-text"),
    };

    options
}

fn sidecar_text(args: &ArgMatches, flag: &str, text: &str) -> Option<String> {
    if !args.get_flag(flag) {
        return None;
    }
    Some(
        args.get_one::<String>(text)
            .cloned()
            .unwrap_or_else(|| DEFAULT_SIDECAR_TEXT.to_string()),
    )
}

fn cache_action(args: &ArgMatches) -> Option<CacheAction> {
    let dry_run = args.get_flag("dry-run");

    if args.get_flag("get-cache-size") {
        Some(CacheAction::Size)
    } else if args.get_flag("get-cache-path") {
        Some(CacheAction::Path)
    } else if args.get_flag("clean-cache") {
        Some(CacheAction::Clean { dry_run })
    } else if dry_run {
        Some(CacheAction::DryRunHint)
    } else {
        None
    }
}

/// Runs the selected cache action. Without one there is nothing to do.
fn cache_command(cfg_folder: &ConfigFolder, args: &ArgMatches) -> anyhow::Result<()> {
    let Some(action) = cache_action(args) else {
        return Ok(());
    };
    run_cache(cfg_folder, action)
        .with_context(|| format!("cache at {}", cfg_folder.cache_dir.display()))
}

fn print_usage() {
    println!("Invalid command!\n");
    println!("Available Commands:");
    println!("  ammg get <directory> -i <album id> -o <output directory>");
    println!("  ammg cache [--get-cache-size | --clean-cache | --get-cache-path] [--dry-run]");
    println!("Run 'ammg help <command>' for all options.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches {
        build_cli().try_get_matches_from(args).unwrap()
    }

    #[test]
    fn test_get_defaults() {
        let args = parse(&["ammg", "get", "downloads", "-i", "1440857781", "-o", "Music"]);
        let (_, sub_args) = args.subcommand().unwrap();
        let options = get_options(sub_args);

        assert_eq!(options.directory, PathBuf::from("downloads"));
        assert_eq!(options.album_id, "1440857781");
        assert_eq!(options.output_directory, PathBuf::from("Music"));
        assert_eq!(options.storefront, "us");
        assert_eq!(options.tracks, None);
        assert!(!options.clean_request);
        assert_eq!((options.cover_width, options.cover_height), (500, 500));
        assert!(options.check_token);
        assert_eq!(options.duration_tolerance, 5);
        assert_eq!(options.sidecars, SidecarOptions::default());
    }

    #[test]
    fn test_get_all_options() {
        let args = parse(&[
            "ammg",
            "get",
            "downloads",
            "--album-id",
            "42",
            "--output-directory",
            "out",
            "-s",
            "jp",
            "-t",
            "1",
            "3",
            "-c",
            "--cover-width",
            "1000",
            "--do-not-check-token",
            "--duration-error",
            "2",
            "--create-lrc-file",
            "--create-txt-file",
            "--txt-file-text",
            "Instrumental",
        ]);
        let (_, sub_args) = args.subcommand().unwrap();
        let options = get_options(sub_args);

        assert_eq!(options.storefront, "jp");
        assert_eq!(options.tracks, Some(vec![1, 3]));
        assert!(options.clean_request);
        assert_eq!((options.cover_width, options.cover_height), (1000, 500));
        assert!(!options.check_token);
        assert_eq!(options.duration_tolerance, 2);
        assert_eq!(options.sidecars.lrc.as_deref(), Some("No Lyrics."));
        assert_eq!(options.sidecars.txt.as_deref(), Some("Instrumental"));
    }

    #[test]
    fn test_album_id_must_be_numeric() {
        assert!(build_cli()
            .try_get_matches_from(["ammg", "get", "d", "-i", "abc", "-o", "out"])
            .is_err());
    }

    #[test]
    fn test_cache_actions() {
        let action = |args: &[&str]| {
            let matches = parse(args);
            let (_, sub_args) = matches.subcommand().unwrap();
            cache_action(sub_args)
        };

        assert_eq!(action(&["ammg", "cache", "--get-cache-size"]), Some(CacheAction::Size));
        assert_eq!(action(&["ammg", "cache", "--get-cache-path"]), Some(CacheAction::Path));
        assert_eq!(
            action(&["ammg", "cache", "--clean-cache", "--dry-run"]),
            Some(CacheAction::Clean { dry_run: true })
        );
        assert_eq!(action(&["ammg", "cache", "--dry-run"]), Some(CacheAction::DryRunHint));
        assert_eq!(action(&["ammg", "cache"]), None);
    }

    #[test]
    fn test_cache_without_action_does_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cfg_folder = ConfigFolder::with_dirs(
            temp_dir.path().join("config"),
            temp_dir.path().join("cache"),
        );

        let matches = parse(&["ammg", "cache"]);
        let (_, sub_args) = matches.subcommand().unwrap();

        assert!(cache_command(&cfg_folder, sub_args).is_ok());
        assert!(!cfg_folder.cache_dir.exists());
    }

    #[test]
    fn test_cache_actions_are_exclusive() {
        assert!(build_cli()
            .try_get_matches_from(["ammg", "cache", "--get-cache-size", "--clean-cache"])
            .is_err());
    }
}
