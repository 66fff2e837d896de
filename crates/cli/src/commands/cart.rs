//! Cart commands.

use ticketlive_core::EventId;

use super::{CliError, context};

/// Show the cart lines, total, and ticket count.
pub fn show() -> Result<(), CliError> {
    let ctx = context()?;
    let lines = ctx.cart.lines();

    if lines.is_empty() {
        tracing::info!("Cart is empty");
        return Ok(());
    }

    for line in &lines {
        tracing::info!(
            "#{} {} x{} = {}",
            line.event.id,
            line.event.title,
            line.quantity,
            line.line_total()
        );
    }
    tracing::info!(
        "{} tickets, total {}",
        ctx.cart.item_count(),
        ctx.cart.total()
    );
    Ok(())
}

/// Add one ticket for a catalog event.
pub async fn add(event_id: i32) -> Result<(), CliError> {
    let ctx = context()?;

    let events = ctx.api.list_events().await?;
    let event = events
        .iter()
        .find(|event| event.id == EventId::new(event_id))
        .ok_or(CliError::EventNotFound(event_id))?;

    let notice = ctx.cart.add_to_cart(event);
    tracing::info!("{notice}");
    Ok(())
}

/// Add one ticket to an existing line.
pub fn increase(event_id: i32) -> Result<(), CliError> {
    let ctx = context()?;
    match ctx.cart.increase_quantity(EventId::new(event_id)) {
        Some(notice) => tracing::info!("{notice}"),
        None => tracing::info!("Event #{event_id} is not in the cart"),
    }
    Ok(())
}

/// Remove one ticket from a line.
pub fn decrease(event_id: i32) -> Result<(), CliError> {
    let ctx = context()?;
    ctx.cart.decrease_quantity(EventId::new(event_id));
    tracing::info!("Cart holds {} tickets", ctx.cart.item_count());
    Ok(())
}

/// Remove a line entirely.
pub fn remove(event_id: i32) -> Result<(), CliError> {
    let ctx = context()?;
    ctx.cart.remove_from_cart(EventId::new(event_id));
    tracing::info!("Cart holds {} tickets", ctx.cart.item_count());
    Ok(())
}

/// Empty the cart and clear its persisted record.
pub fn clear() -> Result<(), CliError> {
    let ctx = context()?;
    ctx.cart.clear_cart();
    tracing::info!("Cart cleared");
    Ok(())
}
