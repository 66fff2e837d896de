//! Catalog commands.

use super::{CliError, context};

/// List the event catalog in the collaborator's order.
pub async fn events() -> Result<(), CliError> {
    let ctx = context()?;
    let events = ctx.api.list_events().await?;

    if events.is_empty() {
        tracing::info!("No events on sale");
        return Ok(());
    }

    for event in &events {
        tracing::info!(
            "#{} {} - {} @ {} - {}{}",
            event.id,
            event.title,
            event.date.format("%Y-%m-%d"),
            event.location,
            event.price,
            if event.status { "" } else { " (not on sale)" }
        );
    }
    Ok(())
}
