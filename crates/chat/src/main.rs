use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use synthia_chat::config::{ChatConfig, DEFAULT_LOG_FILTER};
use synthia_chat::gear_profile::load_gear_profile;
use synthia_chat::input::{parse_line, Command};
use synthia_chat::{build_engine, ChatSession};
use synthia_core::ImageAnalyzer;
use synthia_vision::{VisionClient, VisionConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ChatConfig::from_env();

    // Logs go to stderr so they never interleave with replies on stdout.
    let text_layer = (!config.log_json)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(text_layer)
        .with(json_layer)
        .init();

    tracing::info!(skill_level = %config.skill_level, "Synthia chat starting");

    let engine = build_engine(&config);
    let gear = match &config.gear_profile_path {
        Some(path) => load_gear_profile(path)?,
        None => Vec::new(),
    };

    let vision_config = VisionConfig::from_env();
    if !vision_config.is_configured() {
        tracing::warn!("OPENAI_API_KEY is unset; /image requests will fail");
    }
    let analyzer = VisionClient::new(vision_config)?;

    let session = ChatSession::new(engine, analyzer, config.skill_level, gear)
        .with_specialization(config.specialization.clone());

    repl(session).await
}

async fn repl<A: ImageAnalyzer>(mut session: ChatSession<A>) -> anyhow::Result<()> {
    println!("Synthia is ready. Describe the shot you want, or try /image <path> [message], /state, /reset, /quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("! {e}");
                continue;
            }
        };

        let outcome = match command {
            Command::Quit => break,
            Command::Reset => {
                session.reset();
                println!("(session reset)");
                continue;
            }
            Command::State => {
                println!("{}", serde_json::to_string_pretty(&session.store().to_json())?);
                continue;
            }
            Command::Message(message) => session.send(&message).await,
            Command::Image { path, message } => session.send_image(&path, &message).await,
        };

        match outcome {
            Ok(result) => println!("\n{}\n", result.content),
            Err(e) => println!("! {e}"),
        }
    }

    tracing::info!("Synthia chat exiting");
    Ok(())
}
