//! Non-interactive "say" command

use std::error::Error;
use std::sync::Arc;

use tracing::warn;

use crate::core::turn::{SubmitOutcome, TurnController};
use crate::ui::render::{render_turn, RenderOptions};
use crate::utils::logging::TranscriptLog;

fn write_log(controller: &TurnController, log: Option<&TranscriptLog>) {
    let Some(log) = log else {
        return;
    };
    for turn in controller.transcript() {
        if let Err(err) = log.log_turn(&turn) {
            warn!("failed to write {}: {err}", log.path().display());
            return;
        }
    }
}

pub async fn run_say(
    controller: Arc<TurnController>,
    prompt: &str,
    options: RenderOptions,
    log: Option<TranscriptLog>,
) -> Result<(), Box<dyn Error>> {
    if prompt.trim().is_empty() {
        eprintln!("Usage: deekseep say <prompt>");
        std::process::exit(1);
    }

    let outcome = controller.submit(prompt).await;
    write_log(&controller, log.as_ref());

    match outcome {
        SubmitOutcome::Replied(turn) => {
            println!("{}", render_turn(&turn, options));
            Ok(())
        }
        SubmitOutcome::Failed(turn) => {
            eprintln!("❌ {}", turn.content());
            std::process::exit(1);
        }
        other => Err(format!("request was not sent: {other:?}").into()),
    }
}
