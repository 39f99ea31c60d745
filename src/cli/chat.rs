//! Line-oriented interactive chat

use std::error::Error;
use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::core::turn::{RejectReason, SubmitOutcome, TurnController};
use crate::ui::render::{render_turn, RenderOptions};
use crate::utils::logging::TranscriptLog;

fn is_quit_command(line: &str) -> bool {
    matches!(line.trim(), "/quit" | "/exit")
}

/// Write every appended turn to `log` until the transcript goes away.
pub fn spawn_transcript_logger(controller: &TurnController, log: TranscriptLog) {
    let mut events = controller.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(turn) => {
                    if let Err(err) = log.log_turn(&turn) {
                        warn!("failed to write {}: {err}", log.path().display());
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("transcript log skipped {skipped} turns");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// Print the outcome of a submission. Returns false when the chat should end.
pub fn print_outcome(outcome: &SubmitOutcome, options: RenderOptions) -> bool {
    match outcome {
        SubmitOutcome::Replied(turn) => {
            println!("{}\n", render_turn(turn, options));
            true
        }
        SubmitOutcome::Failed(turn) => {
            eprintln!("❌ {}\n", turn.content());
            true
        }
        SubmitOutcome::Ignored(RejectReason::Empty) => true,
        SubmitOutcome::Ignored(RejectReason::Busy) => {
            eprintln!("⏳ Still waiting for the previous reply");
            true
        }
        SubmitOutcome::Ignored(RejectReason::Closed) | SubmitOutcome::Abandoned => false,
    }
}

pub async fn run_chat(
    controller: Arc<TurnController>,
    options: RenderOptions,
    log: Option<TranscriptLog>,
) -> Result<(), Box<dyn Error>> {
    if let Some(log) = log {
        spawn_transcript_logger(&controller, log);
    }

    println!("Type a message and press Enter. /quit to leave.\n");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };
        if is_quit_command(&line) {
            break;
        }

        let outcome = tokio::select! {
            outcome = controller.submit(&line) => outcome,
            _ = tokio::signal::ctrl_c() => {
                controller.abandon();
                eprintln!("\nRequest abandoned.");
                break;
            }
        };
        if !print_outcome(&outcome, options) {
            break;
        }
    }

    controller.abandon();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_commands_are_recognized() {
        assert!(is_quit_command("/quit"));
        assert!(is_quit_command("  /exit \n"));
        assert!(!is_quit_command("/quitter"));
        assert!(!is_quit_command("quit"));
    }

    #[test]
    fn closed_and_abandoned_outcomes_end_the_chat() {
        let options = RenderOptions::default();
        assert!(!print_outcome(&SubmitOutcome::Abandoned, options));
        assert!(!print_outcome(
            &SubmitOutcome::Ignored(RejectReason::Closed),
            options
        ));
        assert!(print_outcome(
            &SubmitOutcome::Ignored(RejectReason::Empty),
            options
        ));
    }
}
