//! CLI channel: interactive terminal chat for one guest.
//!
//! Reads lines from stdin and writes replies to stdout.
//! Used by `partybot chat`.

use async_trait::async_trait;
use partybot_core::channel::{Channel, ChannelId, ChannelMessage};
use partybot_core::error::ChannelError;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

/// Interactive CLI channel bound to a single guest.
pub struct CliChannel {
    id: ChannelId,
    guest: String,
}

impl CliChannel {
    pub fn new(guest: impl Into<String>) -> Self {
        Self {
            id: ChannelId("cli".into()),
            guest: guest.into(),
        }
    }

    pub fn guest(&self) -> &str {
        &self.guest
    }
}

/// Lines that end the chat.
pub fn is_exit_command(line: &str) -> bool {
    matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q")
}

/// Forward each non-empty line from `reader` until EOF, an exit command, or
/// the receiver going away.
async fn relay_lines<R>(
    reader: R,
    tx: mpsc::Sender<Result<ChannelMessage, ChannelError>>,
    channel_id: ChannelId,
    guest: String,
) where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }

                if is_exit_command(&line) {
                    debug!(guest = %guest, "Guest left the chat");
                    break;
                }

                let msg = ChannelMessage {
                    channel_id: channel_id.clone(),
                    guest: guest.clone(),
                    content: line,
                };

                if tx.send(Ok(msg)).await.is_err() {
                    break;
                }
            }
            Ok(None) => break, // EOF (Ctrl+D)
            Err(e) => {
                let _ = tx.send(Err(ChannelError::ConnectionLost(e.to_string()))).await;
                break;
            }
        }
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    fn id(&self) -> &ChannelId {
        &self.id
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        let (tx, rx) = mpsc::channel(32);
        let channel_id = self.id.clone();
        let guest = self.guest.clone();

        tokio::spawn(async move {
            let reader = BufReader::new(io::stdin());
            relay_lines(reader, tx, channel_id, guest).await;
        });

        Ok(rx)
    }

    async fn send(&self, content: &str) -> Result<(), ChannelError> {
        println!("🤖 {content}\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn relay(input: &'static [u8]) -> Vec<Result<ChannelMessage, ChannelError>> {
        let (tx, mut rx) = mpsc::channel(32);
        relay_lines(input, tx, ChannelId("cli".into()), "Asha".into()).await;

        let mut out = Vec::new();
        while let Some(msg) = rx.recv().await {
            out.push(msg);
        }
        out
    }

    #[test]
    fn cli_channel_properties() {
        let ch = CliChannel::new("Asha");
        assert_eq!(ch.name(), "cli");
        assert_eq!(ch.id().0, "cli");
        assert_eq!(ch.guest(), "Asha");
    }

    #[test]
    fn exit_commands() {
        for cmd in ["exit", "quit", "/exit", "/quit", ":q"] {
            assert!(is_exit_command(cmd));
        }
        assert!(!is_exit_command("exiting at 11"));
    }

    #[tokio::test]
    async fn relays_trimmed_lines_for_the_guest() {
        let messages = relay(b"  around 8  \n\nbiryani\n").await;
        let contents: Vec<String> = messages
            .into_iter()
            .map(|m| {
                let m = m.unwrap();
                assert_eq!(m.guest, "Asha");
                m.content
            })
            .collect();
        assert_eq!(contents, vec!["around 8", "biryani"]);
    }

    #[tokio::test]
    async fn stops_at_exit_command() {
        let messages = relay(b"hi\nquit\nnever sent\n").await;
        assert_eq!(messages.len(), 1);
    }
}
