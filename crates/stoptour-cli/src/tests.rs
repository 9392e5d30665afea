use stoptour_core::BlockKind;

use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["stoptour-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_new_with_negative_longitude() {
    let cli = Cli::try_parse_from([
        "stoptour-cli",
        "new",
        "square.yaml",
        "--title",
        "Town Square",
        "--lat",
        "40.0",
        "--lon",
        "-74.0",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::New {
            path,
            title,
            lat,
            lon,
            radius,
            force,
        }) => {
            assert_eq!(path, PathBuf::from("square.yaml"));
            assert_eq!(title, "Town Square");
            assert!((lat - 40.0).abs() < f64::EPSILON);
            assert!((lon + 74.0).abs() < f64::EPSILON);
            assert!(radius.is_none());
            assert!(!force);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_block_add_with_wire_name() {
    let cli = Cli::try_parse_from(["stoptour-cli", "block", "add", "p.json", "openingTimes"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Block {
            command: BlockCommands::Add {
                kind: BlockKind::OpeningTimes,
                ..
            }
        })
    ));
}

#[test]
fn block_add_rejects_unknown_kind() {
    let result = Cli::try_parse_from(["stoptour-cli", "block", "add", "p.json", "carousel"]);
    assert!(result.is_err());
}

#[test]
fn parses_block_move() {
    let cli = Cli::try_parse_from(["stoptour-cli", "block", "move", "p.json", "abc", "0"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Block {
            command: BlockCommands::Move { ref id, index: 0, .. }
        }) if id == "abc"
    ));
}

#[test]
fn parses_simulate_samples_in_order() {
    let cli = Cli::try_parse_from([
        "stoptour-cli",
        "simulate",
        "p.json",
        "--at",
        "40.01,-74.0",
        "--at",
        "-33.86, 151.21",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Simulate { samples, .. }) = cli.command else {
        panic!("expected simulate");
    };
    assert_eq!(
        samples,
        vec![
            Coordinate::new(40.01, -74.0),
            Coordinate::new(-33.86, 151.21),
        ]
    );
}

#[test]
fn simulate_requires_a_sample() {
    assert!(Cli::try_parse_from(["stoptour-cli", "simulate", "p.json"]).is_err());
}

#[test]
fn parses_store_commands() {
    assert!(matches!(
        Cli::try_parse_from(["stoptour-cli", "migrate"])
            .unwrap()
            .command,
        Some(Commands::Migrate)
    ));
    assert!(matches!(
        Cli::try_parse_from(["stoptour-cli", "pull", "stop-1", "out.json"]).unwrap().command,
        Some(Commands::Pull { ref id, .. }) if id == "stop-1"
    ));
    assert!(matches!(
        Cli::try_parse_from(["stoptour-cli", "upload-hero", "p.json", "hero.jpg"])
            .unwrap()
            .command,
        Some(Commands::UploadHero { .. })
    ));
}

#[test]
fn parse_coordinate_rejects_malformed_input() {
    assert!(parse_coordinate("40.0").is_err());
    assert!(parse_coordinate("north,-74").is_err());
    assert_eq!(
        parse_coordinate(" 1.5 , 2.5 ").unwrap(),
        Coordinate::new(1.5, 2.5)
    );
}
