//! CLI front end: stdin/stdout REPL for local testing.

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt, stream};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::companion::{Companion, UserInput};

/// Conversation thread used by the REPL.
pub const CLI_THREAD_ID: &str = "cli";

const QUIT_COMMAND: &str = "/quit";

type LineStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Non-empty trimmed lines from stdin, until EOF.
fn stdin_lines() -> LineStream {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

    tokio::spawn(async move {
        let reader = BufReader::new(tokio::io::stdin());
        let mut lines = reader.lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        eprint!("> ");
                        continue;
                    }
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });

    Box::pin(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|line| (line, rx))
    }))
}

/// Chat with Ava on stdin/stdout until EOF or `/quit`.
pub async fn run_repl(companion: Arc<Companion>) {
    let mut lines = stdin_lines();
    eprint!("> ");

    while let Some(line) = lines.next().await {
        if line == QUIT_COMMAND {
            break;
        }

        match companion.handle_turn(CLI_THREAD_ID, UserInput::text(line)).await {
            Ok(out) => {
                println!("\n{}\n", out.reply);
                if out.audio.is_some() {
                    eprintln!("   (voice message)");
                }
                if out.image.is_some() {
                    eprintln!("   (image attached)");
                }
            }
            Err(e) => eprintln!("\n   Error: {e}\n"),
        }
        eprint!("> ");
    }
}
