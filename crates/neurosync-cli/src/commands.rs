//! Slash commands for interactive mode

/// Result of executing a slash command
pub enum CommandResult {
    /// Reset the conversation to the seed banner
    Clear,
    /// Show a message to the user (not sent to the model)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(input: &str) -> Option<CommandResult> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = input[1..].splitn(2, ' ').collect();
    let command = parts[0].to_lowercase();

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "clear" | "c" => CommandResult::Clear,

        "quit" | "exit" | "q" => CommandResult::Exit,

        _ => CommandResult::Unknown(command),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /clear, /c           Reset the transcript to the boot banner
  /quit, /exit, /q     Exit neurosync

Keys:
  Enter                Transmit
  Ctrl+R               Voice capture (fills the input line)
  PgUp/PgDn, Up/Down   Scroll transcript
  Ctrl+L               Jump to latest
  Ctrl+C, Ctrl+Q       Quit"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert!(execute_command("hello there").is_none());
        assert!(execute_command("").is_none());
    }

    #[test]
    fn test_aliases_resolve() {
        assert!(matches!(execute_command("/clear"), Some(CommandResult::Clear)));
        assert!(matches!(execute_command("/c"), Some(CommandResult::Clear)));
        assert!(matches!(execute_command("/quit"), Some(CommandResult::Exit)));
        assert!(matches!(execute_command("/exit"), Some(CommandResult::Exit)));
        assert!(matches!(execute_command("/q"), Some(CommandResult::Exit)));
        assert!(matches!(
            execute_command("/help"),
            Some(CommandResult::Message(_))
        ));
    }

    #[test]
    fn test_unknown_command_is_reported() {
        match execute_command("/warp 9") {
            Some(CommandResult::Unknown(cmd)) => assert_eq!(cmd, "warp"),
            _ => panic!("expected unknown command"),
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_tolerated() {
        assert!(matches!(
            execute_command("  /clear  "),
            Some(CommandResult::Clear)
        ));
    }
}
