//! Interactive command console on stdin.
//!
//! Each line is parsed as one command; replies go to the channel sink,
//! parse errors straight back to the terminal. Debug lookups reuse the
//! monitoring stock client.

use tokio::io::{AsyncBufReadExt, BufReader};

use restockd_engine::{dispatch, Command};

use crate::monitor::MonitorContext;

/// Reads commands from stdin until end of file.
pub async fn run_console(ctx: MonitorContext) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::info!("console input closed");
                return;
            }
            Err(error) => {
                tracing::error!(error = %error, "failed to read console input");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match Command::parse(&line) {
            Ok(command) => {
                let replies = dispatch(command, &ctx.catalog, &ctx.store, &ctx.client).await;
                for reply in replies {
                    if let Err(error) = ctx.sink.send(&reply).await {
                        tracing::error!(error = %error, "failed to send command reply");
                    }
                }
            }
            Err(error) => println!("{error} (type 'commands' for help)"),
        }
    }
}
