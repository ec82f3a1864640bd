//! Formatting of kiosk replies for the terminal.

use kiosk_server::{config::DEFAULT_ACK_PREFIX, domain::Command};

/// A line received from the kiosk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Acknowledgement of a command we sent
    Ack(String),
    /// Session ended by the kiosk
    Error(String),
    /// Anything the kiosk pushed on its own
    Push(String),
}

impl Reply {
    pub fn parse(line: &str) -> Self {
        if let Some(command) = line
            .strip_prefix(DEFAULT_ACK_PREFIX)
            .and_then(|rest| rest.strip_prefix(' '))
        {
            Reply::Ack(command.to_string())
        } else if let Some(message) = line.strip_prefix("ERROR: ") {
            Reply::Error(message.to_string())
        } else {
            Reply::Push(line.to_string())
        }
    }
}

pub struct ReplyFormatter;

impl ReplyFormatter {
    pub fn format(reply: &Reply) -> String {
        match reply {
            Reply::Ack(command) => format!("  ✓ {}\n", command),
            Reply::Error(message) => format!("  ✗ {}\n", message),
            Reply::Push(text) => format!("  ← {}\n", text),
        }
    }

    /// Note shown before sending text the kiosk has no meaning for.
    pub fn unknown_command_hint(command: &str) -> Option<String> {
        if Command::parse(command).is_some() {
            return None;
        }
        let known: Vec<&str> = Command::ALL.iter().map(Command::as_str).collect();
        Some(format!(
            "  (kiosk does not know {:?}; known commands: {})\n",
            command,
            known.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ack() {
        // テスト項目: "ACK <command>" は Ack として解釈される
        assert_eq!(Reply::parse("ACK sorteo"), Reply::Ack("sorteo".to_string()));
        assert_eq!(Reply::parse("ACK  spaced"), Reply::Ack(" spaced".to_string()));
    }

    #[test]
    fn test_parse_error_and_push() {
        // テスト項目: ERROR 行とそれ以外の行を区別する
        assert_eq!(
            Reply::parse("ERROR: controller replaced by a new connection"),
            Reply::Error("controller replaced by a new connection".to_string())
        );
        assert_eq!(Reply::parse("GANADOR"), Reply::Push("GANADOR".to_string()));
        assert_eq!(Reply::parse("ACKNOWLEDGED"), Reply::Push("ACKNOWLEDGED".to_string()));
    }

    #[test]
    fn test_format_reply() {
        let formatted = ReplyFormatter::format(&Reply::Ack("publicidad".to_string()));
        assert_eq!(formatted, "  ✓ publicidad\n");
    }

    #[test]
    fn test_unknown_command_hint() {
        // テスト項目: 未知のコマンドにだけヒントを表示する
        assert_eq!(ReplyFormatter::unknown_command_hint("sorteo"), None);
        assert_eq!(ReplyFormatter::unknown_command_hint("1"), None);
        let hint = ReplyFormatter::unknown_command_hint("apagar").unwrap();
        assert!(hint.contains("\"apagar\""));
        assert!(hint.contains("sorteo, publicidad, button, salir"));
    }
}
