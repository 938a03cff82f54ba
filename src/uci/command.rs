#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position(Vec<String>),
    Go(Vec<String>),
    SetOption(Vec<String>),
    Stop,
    Quit,
    Unknown(String),
}

pub fn parse_uci_command(line: &str) -> Option<UciCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.is_empty() {
        return None;
    }

    let owned_parts = || parts.iter().map(|p| (*p).to_string()).collect::<Vec<String>>();

    let cmd = match parts[0] {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "position" => UciCommand::Position(owned_parts()),
        "go" => UciCommand::Go(owned_parts()),
        "setoption" => UciCommand::SetOption(owned_parts()),
        "stop" => UciCommand::Stop,
        "quit" => UciCommand::Quit,
        _ => UciCommand::Unknown(trimmed.to_string()),
    };

    Some(cmd)
}

/// Depth requested by `go depth N`, if present and numeric.
#[must_use]
pub fn parse_go_depth(parts: &[&str]) -> Option<u32> {
    parts
        .iter()
        .position(|p| *p == "depth")
        .and_then(|i| parts.get(i + 1))
        .and_then(|v| v.parse::<u32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_uci_command("uci"), Some(UciCommand::Uci));
        assert_eq!(parse_uci_command("  isready \n"), Some(UciCommand::IsReady));
        assert_eq!(parse_uci_command(""), None);
        assert_eq!(
            parse_uci_command("go depth 4"),
            Some(UciCommand::Go(vec!["go".into(), "depth".into(), "4".into()]))
        );
        assert_eq!(
            parse_uci_command("xyzzy 1"),
            Some(UciCommand::Unknown("xyzzy 1".into()))
        );
    }

    #[test]
    fn test_parse_go_depth() {
        assert_eq!(parse_go_depth(&["go", "depth", "5"]), Some(5));
        assert_eq!(parse_go_depth(&["go", "wtime", "1000", "depth", "2"]), Some(2));
        assert_eq!(parse_go_depth(&["go", "infinite"]), None);
        assert_eq!(parse_go_depth(&["go", "depth", "x"]), None);
        assert_eq!(parse_go_depth(&["go", "depth"]), None);
    }
}
