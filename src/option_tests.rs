//! Unit tests for the option grammar and parser.

use super::*;
use rstest::{fixture, rstest};

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|token| (*token).to_owned()).collect()
}

#[fixture]
fn parser() -> OptionParser {
    OptionParser::new(&[
        "-h, --help       :  help",
        "-v, --version    :  version",
        "-B               :  not append '-boilerpl8' to github repo name",
        "-o FILE          :  output file",
        "--longname=PARAM :  long option with argument",
        "-d, --dir=DIR    :  directory",
    ])
    .expect("valid option table")
}

#[rstest]
#[case::short_and_long("-h, --help : help", Some('h'), Some("help"), None)]
#[case::short_and_long_with_param("-d, --dir=DIR : directory", Some('d'), Some("dir"), Some("DIR"))]
#[case::short_only("-B : no suffix", Some('B'), None, None)]
#[case::short_with_param("-o FILE : output", Some('o'), None, Some("FILE"))]
#[case::long_only("--quiet : quiet", None, Some("quiet"), None)]
#[case::long_with_param("--format=NAME : format", None, Some("format"), Some("NAME"))]
fn definitions_parse_into_specs(
    #[case] definition: &str,
    #[case] short: Option<char>,
    #[case] long: Option<&str>,
    #[case] param: Option<&str>,
) {
    let spec = OptionSpec::parse(definition).expect("definition should parse");
    assert_eq!(spec.short, short);
    assert_eq!(spec.long.as_deref(), long);
    assert_eq!(spec.param.as_deref(), param);
}

#[test]
fn definition_keeps_description() {
    let spec = OptionSpec::parse("-v, --version    :  show version").expect("valid");
    assert_eq!(spec.description, "show version");
}

#[rstest]
#[case::no_dash("help : help")]
#[case::clustered_definition("-ab : two flags")]
#[case::missing_colon("-h, --help")]
#[case::empty("")]
fn malformed_definitions_are_rejected(#[case] definition: &str) {
    let err = OptionParser::new(&[definition]).expect_err("definition should be rejected");
    assert_eq!(err.definition, definition);
}

#[test]
fn key_prefers_long_name() {
    let spec = OptionSpec::parse("-h, --help : help").expect("valid");
    assert_eq!(spec.key(), "help");
    let short = OptionSpec::parse("-B : flag").expect("valid");
    assert_eq!(short.key(), "B");
}

#[rstest]
fn boolean_flag_leaves_positionals(parser: OptionParser) {
    let mut argv = args(&["-B", "github:alice/tmpl", "out"]);
    let options = parser.parse(&mut argv).expect("parse");
    assert_eq!(options.get("B"), Some(&OptionValue::Flag));
    assert_eq!(options.len(), 1);
    assert_eq!(argv, ["github:alice/tmpl", "out"]);
}

#[rstest]
fn long_option_with_value(parser: OptionParser) {
    let mut argv = args(&["--longname=value", "x"]);
    let options = parser.parse(&mut argv).expect("parse");
    assert_eq!(options.value("longname"), Some("value"));
    assert_eq!(argv, ["x"]);
}

#[rstest]
fn long_option_without_required_value_fails(parser: OptionParser) {
    let mut argv = args(&["--longname", "x"]);
    let err = parser.parse(&mut argv).expect_err("should fail");
    assert_eq!(
        err,
        OptionError::MissingArgument {
            option: "--longname".to_owned()
        }
    );
}

#[rstest]
fn boolean_long_option_rejects_value(parser: OptionParser) {
    let mut argv = args(&["--help=yes"]);
    let err = parser.parse(&mut argv).expect_err("should fail");
    assert!(matches!(err, OptionError::UnexpectedArgument { .. }));
    assert_eq!(err.to_string(), "--help=yes: unexpected argument.");
}

#[rstest]
#[case::long(&["--nope"], "--nope: unknown option.")]
#[case::short(&["-z"], "-z: unknown option.")]
#[case::in_cluster(&["-Bz"], "-z: unknown option.")]
fn unknown_options_are_reported(
    parser: OptionParser,
    #[case] tokens: &[&str],
    #[case] message: &str,
) {
    let mut argv = args(tokens);
    let err = parser.parse(&mut argv).expect_err("should fail");
    assert_eq!(err.to_string(), message);
}

#[rstest]
fn malformed_long_token_is_reported(parser: OptionParser) {
    let mut argv = args(&["--"]);
    let err = parser.parse(&mut argv).expect_err("should fail");
    assert!(matches!(err, OptionError::InvalidOptionFormat { .. }));
}

#[rstest]
fn clustered_flags_are_all_recorded(parser: OptionParser) {
    let mut argv = args(&["-hvB", "rest"]);
    let options = parser.parse(&mut argv).expect("parse");
    assert!(options.is_set("help"));
    assert!(options.is_set("version"));
    assert!(options.is_set("B"));
    assert_eq!(argv, ["rest"]);
}

#[rstest]
fn short_argument_attached_to_token(parser: OptionParser) {
    let mut argv = args(&["-ofile.txt", "rest"]);
    let options = parser.parse(&mut argv).expect("parse");
    assert_eq!(options.value("o"), Some("file.txt"));
    assert_eq!(argv, ["rest"]);
}

#[rstest]
fn short_argument_taken_from_next_token(parser: OptionParser) {
    let mut argv = args(&["-o", "file.txt", "rest"]);
    let options = parser.parse(&mut argv).expect("parse");
    assert_eq!(options.value("o"), Some("file.txt"));
    assert_eq!(argv, ["rest"]);
}

#[rstest]
fn short_argument_stops_cluster(parser: OptionParser) {
    let mut argv = args(&["-Boh", "rest"]);
    let options = parser.parse(&mut argv).expect("parse");
    assert!(options.is_set("B"));
    assert_eq!(options.value("o"), Some("h"));
    assert!(!options.is_set("help"));
    assert_eq!(argv, ["rest"]);
}

#[rstest]
fn short_argument_missing_at_end(parser: OptionParser) {
    let mut argv = args(&["-o"]);
    let err = parser.parse(&mut argv).expect_err("should fail");
    assert_eq!(err.to_string(), "-o: argument required.");
}

#[rstest]
fn short_argument_is_stored_under_long_name(parser: OptionParser) {
    let mut argv = args(&["-d", "build"]);
    let options = parser.parse(&mut argv).expect("parse");
    assert_eq!(options.value("dir"), Some("build"));
    assert!(!options.is_set("d"));
}

#[rstest]
fn repeated_options_overwrite(parser: OptionParser) {
    let mut argv = args(&["-o", "first", "-o", "second", "-B", "-B"]);
    let options = parser.parse(&mut argv).expect("parse");
    assert_eq!(options.value("o"), Some("second"));
    assert_eq!(options.get("B"), Some(&OptionValue::Flag));
    assert!(argv.is_empty());
}

#[rstest]
fn parsing_stops_at_first_positional(parser: OptionParser) {
    let mut argv = args(&["file:/tmp/a.zip", "-B"]);
    let options = parser.parse(&mut argv).expect("parse");
    assert!(options.is_empty());
    assert_eq!(argv, ["file:/tmp/a.zip", "-B"]);
}

#[test]
fn help_lines_render_every_definition() {
    let parser = OptionParser::new(&["-h, --help  :  help", "-B  :  no suffix"]).expect("valid");
    assert_eq!(parser.help_lines(), "  -h, --help  :  help\n  -B  :  no suffix\n");
}
