use stratafs_cli::{Cli, Commands, Parser};

#[test]
fn parses_accessed() {
    let cli = Cli::try_parse_from(["strata", "accessed", "team/scratch"]).unwrap();
    assert!(cli.api.is_none());
    match cli.command {
        Commands::Accessed { workspace } => assert_eq!(workspace, "team/scratch"),
        _ => panic!("wrong subcommand"),
    }
}

#[test]
fn parses_global_api_flag_after_subcommand() {
    let cli =
        Cli::try_parse_from(["strata", "accessed", "team/scratch", "--api", "/mnt/fs/api"])
            .unwrap();
    assert_eq!(cli.api.as_deref(), Some(std::path::Path::new("/mnt/fs/api")));
}

#[test]
fn parses_branch() {
    let cli = Cli::try_parse_from(["strata", "branch", "team/base", "team/feature"]).unwrap();
    match cli.command {
        Commands::Branch { src, dst } => {
            assert_eq!(src, "team/base");
            assert_eq!(dst, "team/feature");
        }
        _ => panic!("wrong subcommand"),
    }
}

#[test]
fn parses_merge_with_optional_base() {
    let cli = Cli::try_parse_from(["strata", "merge", "team/remote", "team/local"]).unwrap();
    match cli.command {
        Commands::Merge { base, .. } => assert!(base.is_none()),
        _ => panic!("wrong subcommand"),
    }

    let cli = Cli::try_parse_from([
        "strata",
        "merge",
        "team/remote",
        "team/local",
        "--base",
        "team/base",
    ])
    .unwrap();
    match cli.command {
        Commands::Merge { base, .. } => assert_eq!(base.as_deref(), Some("team/base")),
        _ => panic!("wrong subcommand"),
    }
}

#[test]
fn parses_insert_with_defaults() {
    let cli = Cli::try_parse_from(["strata", "insert", "team/ws/file", "SOMEKEY"]).unwrap();
    match cli.command {
        Commands::Insert {
            dst,
            key,
            permissions,
            uid,
            gid,
        } => {
            assert_eq!(dst, "team/ws/file");
            assert_eq!(key, "SOMEKEY");
            assert_eq!(permissions, 0o644);
            assert_eq!(uid, 0);
            assert_eq!(gid, 0);
        }
        _ => panic!("wrong subcommand"),
    }
}

#[test]
fn parses_block_commands() {
    let cli = Cli::try_parse_from(["strata", "get-block", "AQI="]).unwrap();
    assert!(matches!(cli.command, Commands::GetBlock { .. }));

    let cli = Cli::try_parse_from(["strata", "set-block", "AQI=", "/tmp/block.bin"]).unwrap();
    assert!(matches!(cli.command, Commands::SetBlock { .. }));
}

#[test]
fn missing_arguments_are_rejected() {
    assert!(Cli::try_parse_from(["strata", "branch", "team/base"]).is_err());
    assert!(Cli::try_parse_from(["strata", "accessed"]).is_err());
    assert!(Cli::try_parse_from(["strata"]).is_err());
}
