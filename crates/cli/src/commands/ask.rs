//! `sunbae ask` — Run one chat turn and print the response envelope.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use sunbae_agent::ChatPipeline;
use sunbae_core::{Clock, ConversationTurn, FixedClock, SystemClock};
use sunbae_knowledge::DatasetStore;

pub async fn run(
    config_path: Option<&Path>,
    character_id: &str,
    today: Option<NaiveDate>,
    message: String,
) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let store = Arc::new(DatasetStore::from_config(&config.datasets).context("Failed to load datasets")?);

    let Some(character) = store.get_character(character_id).cloned() else {
        let known: Vec<&str> = store.characters().iter().map(|c| c.id.as_str()).collect();
        anyhow::bail!("Unknown character '{character_id}'. Known: {}", known.join(", "));
    };

    let clock: Arc<dyn Clock> = match today {
        Some(date) => Arc::new(FixedClock::new(date)),
        None => Arc::new(SystemClock),
    };
    let pipeline = ChatPipeline::from_config(&config, store, clock)?;

    let outcome = pipeline.respond(&ConversationTurn { message, character }).await?;
    tracing::debug!(source = ?outcome.reply_source, augmentation = %outcome.augmentation, "Turn details");

    println!("{}", serde_json::to_string_pretty(&outcome.envelope)?);
    Ok(())
}
