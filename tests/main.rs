use clidef::{Arg, Cli, Opt, ScanError, ValidationError};

fn copy_cli() -> Cli {
    Cli::build("copy")
        .summary("Copy files.")
        .option(
            Opt::new()
                .long("directory")
                .short('R')
                .flag()
                .description("Recurse into directories."),
        )
        .argument(Arg::new().name("source"))
        .argument(Arg::new().name("target"))
        .build()
        .unwrap()
}

#[test]
fn copy_flag_and_positionals() {
    let cli = copy_cli();

    let line = cli.parse(["-R", "a.txt", "b.txt"]).unwrap();

    assert!(line.is_valid());
    assert!(line.is_flag_enabled("directory").unwrap());
    assert_eq!(line.argument_value_by_name("source").unwrap(), Some("a.txt"));
    assert_eq!(line.argument_value_by_name("target").unwrap(), Some("b.txt"));
}

#[test]
fn color_default_and_choices() {
    let cli = Cli::build("paint")
        .option(
            Opt::new()
                .long("color")
                .short('c')
                .default_value("green")
                .choices(["blue", "red", "green"]),
        )
        .build()
        .unwrap();

    let line = cli.parse(Vec::<&str>::new()).unwrap();
    assert!(line.is_valid());
    assert_eq!(line.option_value("color").unwrap(), Some("green"));

    let line = cli.parse(["--color", "red"]).unwrap();
    assert!(line.is_valid());
    assert_eq!(line.option_value("color").unwrap(), Some("red"));

    let line = cli.parse(["--color", "purple"]).unwrap();
    assert!(!line.is_valid());
    assert_eq!(
        line.violations(),
        &[ValidationError::InvalidValue {
            name: "color".to_string(),
            value: "purple".to_string(),
        }]
    );
}

#[test]
fn help_short_circuits_validation() {
    let cli = Cli::build("tool")
        .option(Opt::new().long("help").short('h').flag().help())
        .option(Opt::new().long("input").required())
        .argument(Arg::new().name("target").required())
        .build()
        .unwrap();

    let line = cli.parse(["-h"]).unwrap();

    assert!(!line.is_valid());
    assert!(line.is_asking_for_help());
}

#[test]
fn equivalent_value_syntaxes() {
    let cli = Cli::build("tool")
        .option(Opt::new().long("optimize").short('O'))
        .build()
        .unwrap();
    let forms: Vec<Vec<&str>> = vec![
        vec!["--optimize", "2"],
        vec!["--optimize=2"],
        vec!["-O", "2"],
        vec!["-O2"],
        vec!["-O=2"],
        vec!["-optimize", "2"],
        vec!["-optimize=2"],
    ];

    for form in forms {
        let line = cli.parse(form.clone()).unwrap();
        assert_eq!(
            line.option_value("optimize").unwrap(),
            Some("2"),
            "failed for {form:?}"
        );
    }
}

#[test]
fn short_cluster_expands() {
    let cli = Cli::build("tar")
        .option(Opt::new().long("extract").short('x').flag())
        .option(Opt::new().long("verbose").short('v').flag())
        .option(Opt::new().long("file").short('f'))
        .build()
        .unwrap();

    let line = cli.parse(["-xvf", "archive.tar"]).unwrap();

    assert!(line.is_flag_enabled("extract").unwrap());
    assert!(line.is_flag_enabled("verbose").unwrap());
    assert_eq!(line.option_value("file").unwrap(), Some("archive.tar"));
}

#[test]
fn double_hyphen_ends_option_parsing() {
    let cli = Cli::build("tool")
        .option(Opt::new().long("verbose").short('v').flag())
        .argument(Arg::new().name("items").multi_valued())
        .build()
        .unwrap();

    let line = cli.parse(["-v", "--", "-v", "--color"]).unwrap();

    assert!(line.is_flag_enabled("verbose").unwrap());
    assert_eq!(line.argument_values_by_name("items").unwrap(), &["-v", "--color"]);
}

#[test]
fn properties_accumulate() {
    let cli = Cli::build("java")
        .option(Opt::new().short('D').property())
        .build()
        .unwrap();

    let line = cli
        .parse(["-Dcolor=red", "-D", "size=10", "-Dverbose"])
        .unwrap();

    assert_eq!(
        line.properties("D").unwrap(),
        vec![("color", "red"), ("size", "10"), ("verbose", "")]
    );
}

#[test]
fn unknown_option_aborts() {
    let cli = copy_cli();

    let error = cli.parse(["--colour", "a.txt", "b.txt"]).unwrap_err();

    assert_eq!(error, ScanError::UnknownOption("colour".to_string()));
}

#[test]
fn permissive_preserves_unmatched() {
    let cli = Cli::build("wrapper")
        .permissive()
        .option(Opt::new().long("verbose").short('v').flag())
        .build()
        .unwrap();

    let line = cli.parse(["-v", "--inner-flag", "--inner=5"]).unwrap();

    assert!(line.is_flag_enabled("verbose").unwrap());
    assert_eq!(line.unmatched(), &["--inner-flag", "--inner=5"]);
}

#[test]
fn missing_value_attributed_to_option() {
    let cli = Cli::build("tool")
        .option(Opt::new().long("input").short('i'))
        .build()
        .unwrap();

    let error = cli.parse(["--input"]).unwrap_err();

    assert_eq!(error, ScanError::MissingValue("input".to_string()));
}

#[test]
fn repeated_parses_are_independent() {
    let cli = copy_cli();

    let first = cli.parse(["-R", "a.txt", "b.txt"]).unwrap();
    let second = cli.parse(["c.txt", "d.txt"]).unwrap();

    assert!(first.is_flag_enabled("directory").unwrap());
    assert!(!second.is_flag_enabled("directory").unwrap());
    assert_eq!(second.argument_value(0).unwrap(), Some("c.txt"));
}

#[test]
fn json_defined_cli_parses() {
    let cli = Cli::build("paint")
        .option(
            Opt::from_json(
                r#"{"longName": "color", "shortName": "c", "defaultValue": "green"}"#,
            )
            .unwrap(),
        )
        .argument(Arg::from_json(r#"{"argName": "canvas", "required": true}"#).unwrap())
        .build()
        .unwrap();

    let line = cli.parse(["wall"]).unwrap();

    assert!(line.is_valid());
    assert_eq!(line.option_value("c").unwrap(), Some("green"));
    assert_eq!(line.argument_value_by_name("canvas").unwrap(), Some("wall"));
}
