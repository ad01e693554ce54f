use super::*;

#[test]
fn cli_parse_exec_trailing_command() {
    match parse(&["retrier", "exec", "--", "curl", "-fsS", "https://example.com"]) {
        CliCommand::Exec {
            timeout,
            max_attempts,
            command,
        } => {
            assert!(timeout.is_none());
            assert!(max_attempts.is_none());
            assert_eq!(command, vec!["curl", "-fsS", "https://example.com"]);
        }
        _ => panic!("expected Exec"),
    }
}

#[test]
fn cli_parse_exec_timeout() {
    match parse(&["retrier", "exec", "--timeout", "2.5", "--", "make", "test"]) {
        CliCommand::Exec {
            timeout, command, ..
        } => {
            assert_eq!(timeout, Some(2.5));
            assert_eq!(command, vec!["make", "test"]);
        }
        _ => panic!("expected Exec"),
    }
}

#[test]
fn cli_parse_exec_max_attempts() {
    match parse(&["retrier", "exec", "--max-attempts", "4", "--", "ping", "-c1", "host"]) {
        CliCommand::Exec { max_attempts, .. } => assert_eq!(max_attempts, Some(4)),
        _ => panic!("expected Exec"),
    }
}

#[test]
fn cli_parse_exec_timeout_conflicts_with_max_attempts() {
    let res = Cli::try_parse_from([
        "retrier",
        "exec",
        "--timeout",
        "1",
        "--max-attempts",
        "3",
        "--",
        "true",
    ]);
    assert!(res.is_err());
}

#[test]
fn cli_parse_exec_requires_command() {
    assert!(Cli::try_parse_from(["retrier", "exec"]).is_err());
}

#[test]
fn cli_parse_config() {
    match parse(&["retrier", "config"]) {
        CliCommand::Config => {}
        _ => panic!("expected Config"),
    }
}
