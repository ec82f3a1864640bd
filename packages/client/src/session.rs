//! Controller session over one TCP connection.

use std::io::Write;

use futures_util::{SinkExt, StreamExt};
use kiosk_server::domain::Command;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_util::codec::{Framed, LinesCodec};

use crate::{
    error::ControllerError,
    formatter::{Reply, ReplyFormatter},
};

/// How a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The terminal input closed (Ctrl+C / Ctrl+D)
    InputClosed,
    /// We sent `salir` and the kiosk closed the connection
    KioskShutdown,
}

/// Run one session: forward input lines, print replies.
///
/// # Errors
///
/// * [`ControllerError::Rejected`] when the kiosk ends the session with an
///   error, e.g. because another controller took over
/// * [`ControllerError::ConnectionError`] when connecting fails or the
///   connection drops unexpectedly
pub async fn run_controller_session(
    addr: &str,
    input: &mut mpsc::UnboundedReceiver<String>,
) -> Result<SessionEnd, ControllerError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| ControllerError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to kiosk at {}", addr);
    println!("\nType commands and press Enter to send. Press Ctrl+C to exit.\n");

    let mut framed = Framed::new(stream, LinesCodec::new());
    let mut exit_sent = false;

    loop {
        tokio::select! {
            line = input.recv() => {
                let Some(line) = line else {
                    return Ok(SessionEnd::InputClosed);
                };
                if let Some(hint) = ReplyFormatter::unknown_command_hint(&line) {
                    print_flush(&hint);
                }
                if let Err(e) = framed.send(line.as_str()).await {
                    return Err(ControllerError::ConnectionError(e.to_string()));
                }
                exit_sent |= Command::parse(&line) == Some(Command::Exit);
            }
            frame = framed.next() => match frame {
                Some(Ok(line)) => {
                    let reply = Reply::parse(&line);
                    if let Reply::Error(message) = &reply {
                        return Err(ControllerError::Rejected(message.clone()));
                    }
                    print_flush(&ReplyFormatter::format(&reply));
                }
                Some(Err(e)) => {
                    return Err(ControllerError::ConnectionError(e.to_string()));
                }
                None if exit_sent => {
                    tracing::info!("Kiosk shut down");
                    return Ok(SessionEnd::KioskShutdown);
                }
                None => {
                    return Err(ControllerError::ConnectionError(
                        "Connection closed by kiosk".to_string(),
                    ));
                }
            },
        }
    }
}

fn print_flush(text: &str) {
    print!("{}", text);
    std::io::stdout().flush().ok();
}

#[cfg(test)]
mod tests {
    use kiosk_server::{config::ServerConfig, ui::CommandServer, usecase::Dispatcher};

    use super::*;

    async fn start_kiosk() -> (CommandServer, String) {
        let server = CommandServer::new(ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..ServerConfig::default()
        });
        let mut dispatcher = Dispatcher::new();
        let shutdown = server.shutdown_handle();
        dispatcher.register_command(Command::Exit, move || {
            shutdown.stop();
            Ok(())
        });
        let addr = server.start(dispatcher).await.unwrap();
        (server, addr.to_string())
    }

    #[tokio::test]
    async fn test_session_ends_when_input_closes() {
        // テスト項目: 入力が閉じられるとセッションは正常終了する
        // given (前提条件):
        let (server, addr) = start_kiosk().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send("sorteo".to_string()).unwrap();
        drop(tx);

        // when (操作):
        let result = run_controller_session(&addr, &mut rx).await;

        // then (期待する結果):
        assert_eq!(result.unwrap(), SessionEnd::InputClosed);
        server.stop();
    }

    #[tokio::test]
    async fn test_session_reports_kiosk_shutdown_after_exit() {
        // テスト項目: salir を送ってサーバが閉じた場合は KioskShutdown で終了する
        // given (前提条件):
        let (server, addr) = start_kiosk().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send("salir".to_string()).unwrap();

        // when (操作):
        let result = run_controller_session(&addr, &mut rx).await;

        // then (期待する結果):
        assert_eq!(result.unwrap(), SessionEnd::KioskShutdown);
        server.wait().await;
        drop(tx);
    }

    #[tokio::test]
    async fn test_session_fails_when_kiosk_unreachable() {
        // テスト項目: 接続できない場合は ConnectionError になる
        // given (前提条件):
        let (server, addr) = start_kiosk().await;
        server.stop();
        server.wait().await;
        let (_tx, mut rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = run_controller_session(&addr, &mut rx).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ControllerError::ConnectionError(_))));
    }

    #[tokio::test]
    async fn test_session_ends_when_replaced_by_another_controller() {
        // テスト項目: 別のコントローラが接続すると、元のセッションは Rejected で終了する
        // given (前提条件):
        let (server, addr) = start_kiosk().await;
        let client = server.client();
        let (_tx, mut rx) = mpsc::unbounded_channel();
        let session_addr = addr.clone();
        let session =
            tokio::spawn(async move { run_controller_session(&session_addr, &mut rx).await });
        while !client.is_connected() {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        // when (操作):
        let _other = TcpStream::connect(&addr).await.unwrap();

        // then (期待する結果):
        let result = tokio::time::timeout(std::time::Duration::from_secs(2), session)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(ControllerError::Rejected(_))));
        server.stop();
    }
}
