//! UseCase: interface switching
//!
//! Decides which view the kiosk shows. Switching is idempotent, so the frame
//! loop can feed it the latest command on every tick.

use crate::domain::{Command, Interface};

#[derive(Debug, Default)]
pub struct InterfaceManager {
    current: Interface,
}

impl InterfaceManager {
    /// Start on the advertising loop.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interface(current: Interface) -> Self {
        Self { current }
    }

    pub fn current(&self) -> Interface {
        self.current
    }

    /// Apply `command`, returning the new interface if it changed.
    pub fn apply(&mut self, command: Command) -> Option<Interface> {
        let target = match command {
            Command::Draw => Interface::SlotMachine,
            Command::Advertise => Interface::Advertising,
            Command::Button | Command::Exit => return None,
        };

        if target == self.current {
            return None;
        }
        self.current = target;
        Some(target)
    }

    /// Apply raw command text; unrecognized text leaves the view unchanged.
    pub fn apply_text(&mut self, text: &str) -> Option<Interface> {
        Command::parse(text).and_then(|command| self.apply(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_advertising() {
        let manager = InterfaceManager::new();
        assert_eq!(manager.current(), Interface::Advertising);
    }

    #[test]
    fn test_switches_between_interfaces() {
        // テスト項目: sorteo と publicidad で画面が切り替わる
        // given (前提条件):
        let mut manager = InterfaceManager::new();

        // when (操作) / then (期待する結果):
        assert_eq!(manager.apply(Command::Draw), Some(Interface::SlotMachine));
        assert_eq!(manager.current(), Interface::SlotMachine);
        assert_eq!(manager.apply(Command::Advertise), Some(Interface::Advertising));
        assert_eq!(manager.current(), Interface::Advertising);
    }

    #[test]
    fn test_repeated_command_is_idempotent() {
        // テスト項目: 同じ画面への切り替えは何もしない
        // given (前提条件):
        let mut manager = InterfaceManager::with_interface(Interface::SlotMachine);

        // when (操作):
        let switched = manager.apply_text("sorteo");

        // then (期待する結果):
        assert_eq!(switched, None);
        assert_eq!(manager.current(), Interface::SlotMachine);
    }

    #[test]
    fn test_other_commands_leave_interface_unchanged() {
        // テスト項目: button / salir / 未知のコマンドでは画面は変わらない
        // given (前提条件):
        let mut manager = InterfaceManager::new();

        // when (操作):
        let results = [
            manager.apply(Command::Button),
            manager.apply(Command::Exit),
            manager.apply_text("reiniciar"),
        ];

        // then (期待する結果):
        assert!(results.iter().all(Option::is_none));
        assert_eq!(manager.current(), Interface::Advertising);
    }

    #[test]
    fn test_legacy_digits_switch_interfaces() {
        // テスト項目: 旧形式 "2" でスロット、"1" で広告に切り替わる
        let mut manager = InterfaceManager::new();
        assert_eq!(manager.apply_text("2"), Some(Interface::SlotMachine));
        assert_eq!(manager.apply_text("1"), Some(Interface::Advertising));
    }
}
