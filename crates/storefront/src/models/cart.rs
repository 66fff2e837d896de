//! Cart lines and the quantity state machine.
//!
//! [`Cart`] is the pure core: ordered lines keyed by event id, the
//! per-event quantity ceiling, and the derived views. Session coupling and
//! persistence live in the cart manager, which wraps this type.

use serde::{Deserialize, Serialize};

use ticketlive_core::{EventId, Price};

use super::event::Event;

/// Maximum tickets a user may hold for one event.
pub const MAX_TICKETS_PER_EVENT: u32 = 6;

/// One cart entry: an event snapshot plus a ticket count.
///
/// The event fields are flattened so persisted lines keep the shape earlier
/// clients wrote (event record with a `quantity` field alongside).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub event: Event,
    pub quantity: u32,
}

impl CartLine {
    /// The line total (`price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.event.price.times(self.quantity)
    }
}

/// Outcome of a quantity mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    /// A new line was created with quantity 1.
    Added,
    /// An existing line was incremented.
    Incremented,
    /// The line already holds [`MAX_TICKETS_PER_EVENT`]; nothing changed.
    LimitReached,
}

/// Ordered ticket selections, at most one line per event.
///
/// Insertion order is display order. Totals and counts are always
/// recomputed from the lines - they are views, never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Rebuild a cart from persisted lines, re-establishing invariants that
    /// a hand-edited or stale record may have lost: zero-quantity lines are
    /// dropped, quantities are clamped to the ceiling, and only the first
    /// line per event id survives.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for mut line in lines {
            if line.quantity == 0 || cart.find(line.event.id).is_some() {
                continue;
            }
            line.quantity = line.quantity.min(MAX_TICKETS_PER_EVENT);
            cart.lines.push(line);
        }
        cart
    }

    /// Add one ticket for `event`.
    ///
    /// Creates a quantity-1 line for a new event, increments an existing
    /// line below the ceiling, and reports [`CartOutcome::LimitReached`]
    /// (leaving state untouched) at the ceiling.
    pub fn add(&mut self, event: &Event) -> CartOutcome {
        match self.find_mut(event.id) {
            Some(line) if line.quantity >= MAX_TICKETS_PER_EVENT => CartOutcome::LimitReached,
            Some(line) => {
                line.quantity += 1;
                CartOutcome::Incremented
            }
            None => {
                self.lines.push(CartLine {
                    event: event.clone(),
                    quantity: 1,
                });
                CartOutcome::Added
            }
        }
    }

    /// Increment the line for `event_id`, if present and below the ceiling.
    ///
    /// Returns `None` when no such line exists (a no-op).
    pub fn increase(&mut self, event_id: EventId) -> Option<CartOutcome> {
        let line = self.find_mut(event_id)?;
        if line.quantity >= MAX_TICKETS_PER_EVENT {
            return Some(CartOutcome::LimitReached);
        }
        line.quantity += 1;
        Some(CartOutcome::Incremented)
    }

    /// Decrement the line for `event_id`; a line reaching zero is removed.
    ///
    /// Returns whether anything changed (`false` when no such line exists).
    pub fn decrease(&mut self, event_id: EventId) -> bool {
        let Some(line) = self.find_mut(event_id) else {
            return false;
        };
        line.quantity -= 1;
        self.lines.retain(|line| line.quantity > 0);
        true
    }

    /// Remove the line for `event_id` unconditionally, if present.
    ///
    /// Returns whether a line was removed.
    pub fn remove(&mut self, event_id: EventId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.event.id != event_id);
        self.lines.len() != before
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// The event ids currently in the cart, in display order.
    #[must_use]
    pub fn line_ids(&self) -> Vec<EventId> {
        self.lines.iter().map(|line| line.event.id).collect()
    }

    fn find(&self, event_id: EventId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.event.id == event_id)
    }

    fn find_mut(&mut self, event_id: EventId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.event.id == event_id)
    }
}
