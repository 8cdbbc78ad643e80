use std::io::Write;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::chat::history::HistoryStore;
use crate::chat::turn::{FALLBACK_REPLY, TurnError, process_turn};
use crate::core::config::AppConfig;
use crate::speech::SpeechNotifier;

pub async fn run(config: &AppConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut rl = DefaultEditor::new().expect("Editor failed");
    let store = HistoryStore::new(&config.history_path);
    let notifier = SpeechNotifier::new(config);

    println!(
        "{} is running in Professional Mode. Type 'exit' to quit.\n",
        config.assistant_name
    );

    loop {
        let readline = rl.readline("You: ");
        match readline {
            Ok(line) => {
                let query = line.trim();
                if query.is_empty() {
                    continue;
                }
                if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
                    println!("Session ended.");
                    break;
                }

                print!("{}: ", config.assistant_name);
                std::io::stdout().flush()?;

                let reply = match process_turn(config, &store, query).await {
                    Ok(answer) => {
                        println!("\n");
                        answer
                    }
                    Err(TurnError::Completion(e)) => {
                        tracing::error!("Completion request failed: {:#}", e);
                        println!("{}\n", FALLBACK_REPLY);
                        FALLBACK_REPLY.to_string()
                    }
                    // A history write failure ends the session
                    Err(TurnError::Persist(e)) => return Err(e),
                };

                // At most one outstanding speech task: awaited before
                // the next prompt, playback itself is detached
                notifier.notify(&reply).await;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\nSession interrupted. Exiting safely.");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
