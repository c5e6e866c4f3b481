use clap::{CommandFactory, Parser};
use treemend::tooling::cli::{Cli, Commands};

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["treemend", "dump", "/srv/ocis"],
        vec!["treemend", "dump", "/srv/ocis", "--user", "proj", "--info"],
        vec!["treemend", "dump", "--username", "marie", "--list", "--deep"],
        vec!["treemend", "dump", "/srv/ocis", "--output", "/tmp/out", "--prefix", "r1-"],
        vec!["treemend", "verify", "/srv/ocis", "--data"],
        vec!["treemend", "verify", "/srv/ocis", "--metadata", "--fix"],
        vec!["treemend", "view", "node.mpk"],
        vec!["treemend", "view", "nodes/", "--search", "--output", "out.json"],
        vec!["treemend", "--log-format", "json", "view", "node.mpk"],
    ];
    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_invalid_verify_area() {
    assert!(Cli::try_parse_from(["treemend", "verify", "/srv/ocis"]).is_err());
    assert!(
        Cli::try_parse_from(["treemend", "verify", "/srv/ocis", "--data", "--metadata"]).is_err()
    );
}

#[test]
fn dump_flags_are_carried() {
    let cli = Cli::try_parse_from(["treemend", "dump", "/srv", "--list", "--username", "m"])
        .unwrap();
    match cli.command {
        Commands::Dump {
            list,
            info,
            username,
            ..
        } => {
            assert!(list);
            assert!(!info);
            assert_eq!(username.as_deref(), Some("m"));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}
