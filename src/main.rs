// This is the entry point of the context builder.
//
// This file's job is to:
// 1. Load configuration (.env, environment, CLI flags)
// 2. Initialize logging
// 3. Wire the conversation source and the assembler together
// 4. Print the assembled context for the prompt builder

use anyhow::{bail, Context, Result};
use clap::Parser;
use reply_context::core::conversation::{ContextAssembler, ContextConfig, ConversationSource};
use reply_context::infra::conversation::JsonConversationSource;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "reply-context",
    version,
    about = "Builds AI reply context from an exported conversation"
)]
struct Cli {
    /// Conversation export: a JSON object of chat id -> messages
    file: PathBuf,

    /// Chat to build context for (optional when the file holds one chat)
    #[arg(short, long)]
    chat: Option<String>,

    /// Topic hint used for relevance scoring
    #[arg(short, long)]
    topic: Option<String>,

    /// Maximum number of selected messages
    #[arg(long)]
    target: Option<usize>,

    /// Topic change window size
    #[arg(long)]
    window: Option<usize>,

    /// List chat ids in the file and exit
    #[arg(long)]
    list: bool,

    /// Print the full assembled context as JSON
    #[arg(long)]
    json: bool,
}

/// Environment first, then CLI flags on top.
fn load_config(cli: &Cli) -> ContextConfig {
    let mut config = ContextConfig::from_env();
    if let Some(target) = cli.target {
        config.target_count = target;
    }
    if let Some(window) = cli.window {
        config.topic_window = window;
    }
    if let Some(topic) = &cli.topic {
        config.topic_hint = Some(topic.clone());
    }
    config
}

async fn pick_chat(source: &JsonConversationSource, requested: Option<String>) -> Result<String> {
    if let Some(chat) = requested {
        return Ok(chat);
    }

    let chats = source
        .list_chats()
        .await
        .context("Failed to read conversation file")?;
    match chats.as_slice() {
        [only] => Ok(only.clone()),
        [] => bail!("The conversation file contains no chats"),
        _ => bail!(
            "The file holds {} chats, pick one with --chat: {}",
            chats.len(),
            chats.join(", ")
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Logs go to stderr so stdout stays clean for the context itself
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source = JsonConversationSource::new(cli.file.clone());

    if cli.list {
        for chat in source
            .list_chats()
            .await
            .context("Failed to read conversation file")?
        {
            println!("{}", chat);
        }
        return Ok(());
    }

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let assembler = ContextAssembler::new(load_config(&cli));
    tracing::debug!(config = ?assembler.config(), "Loaded context configuration");

    let chat_id = pick_chat(&source, cli.chat.clone()).await?;
    let messages = source
        .load_messages(&chat_id)
        .await
        .with_context(|| format!("Failed to load chat '{}'", chat_id))?;

    let context = assembler.assemble(&messages, None);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&context)?);
    } else {
        for line in &context.lines {
            println!("{}", line);
        }
    }

    Ok(())
}
