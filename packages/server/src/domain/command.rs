//! Command vocabulary understood by the kiosk.
//!
//! Commands travel as plain text lines. Anything a controller sends is
//! recorded as the last command, but only the spellings listed here have a
//! meaning for the kiosk itself.

use std::fmt;

/// A recognized controller command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Switch to the slot machine (`"sorteo"`, legacy `"2"`)
    Draw,
    /// Switch to the advertising loop (`"publicidad"`, legacy `"1"`)
    Advertise,
    /// Physical button notification (`"button"`), reserved
    Button,
    /// Shut the kiosk down (`"salir"`)
    Exit,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::Draw,
        Command::Advertise,
        Command::Button,
        Command::Exit,
    ];

    /// Parse the exact wire text of a command.
    ///
    /// Matching is case and whitespace sensitive: `"Sorteo"` or `" sorteo"`
    /// are not recognized.
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.wire_names().iter().any(|name| *name == text))
    }

    /// Canonical wire spelling.
    pub fn as_str(&self) -> &'static str {
        self.wire_names()[0]
    }

    /// Every spelling accepted on the wire, canonical first.
    pub fn wire_names(&self) -> &'static [&'static str] {
        match self {
            Command::Draw => &["sorteo", "2"],
            Command::Advertise => &["publicidad", "1"],
            Command::Button => &["button"],
            Command::Exit => &["salir"],
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        // テスト項目: 正式なコマンド名が対応する Command に変換される
        // given (前提条件):
        let inputs = ["sorteo", "publicidad", "button", "salir"];

        // when (操作):
        let parsed: Vec<Option<Command>> = inputs.iter().map(|s| Command::parse(s)).collect();

        // then (期待する結果):
        assert_eq!(
            parsed,
            vec![
                Some(Command::Draw),
                Some(Command::Advertise),
                Some(Command::Button),
                Some(Command::Exit),
            ]
        );
    }

    #[test]
    fn test_parse_legacy_digits() {
        // テスト項目: 旧形式の数字コマンドも受け付ける
        // given (前提条件):

        // when (操作):
        let one = Command::parse("1");
        let two = Command::parse("2");

        // then (期待する結果): "1" は広告、"2" はスロットマシン
        assert_eq!(one, Some(Command::Advertise));
        assert_eq!(two, Some(Command::Draw));
    }

    #[test]
    fn test_parse_is_case_and_whitespace_sensitive() {
        // テスト項目: 大文字小文字や空白が異なる場合は認識しない
        // given (前提条件):
        let inputs = ["Sorteo", " sorteo", "sorteo ", "SALIR", "3", ""];

        // when (操作) / then (期待する結果):
        for input in inputs {
            assert_eq!(Command::parse(input), None, "input {:?}", input);
        }
    }

    #[test]
    fn test_canonical_name_round_trips() {
        // テスト項目: as_str の結果を parse すると元の Command に戻る
        for command in Command::ALL {
            assert_eq!(Command::parse(command.as_str()), Some(command));
            assert_eq!(command.to_string(), command.as_str());
        }
    }
}
