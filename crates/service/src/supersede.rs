//! Last-request-wins tracking per form field
//!
//! Each field keeps a generation counter. Starting a request bumps it and hands
//! out a ticket; when the request finishes its result is kept only if no newer
//! request for the same field has started in the meantime.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Handle for one in-flight request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
	field: String,
	generation: u64,
}

impl RequestTicket {
	pub fn field(&self) -> &str {
		&self.field
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}
}

#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
	generations: Arc<DashMap<String, u64>>,
}

impl RequestTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Start a request for `field`, superseding any earlier one
	pub fn begin(&self, field: &str) -> RequestTicket {
		let mut entry = self.generations.entry(field.to_string()).or_insert(0);
		*entry += 1;
		RequestTicket {
			field: field.to_string(),
			generation: *entry,
		}
	}

	pub fn is_current(&self, ticket: &RequestTicket) -> bool {
		self.generations
			.get(&ticket.field)
			.map(|generation| *generation == ticket.generation)
			.unwrap_or(false)
	}

	/// Keep `result` only if `ticket` is still the newest for its field
	pub fn complete<T>(&self, ticket: &RequestTicket, result: T) -> Option<T> {
		if self.is_current(ticket) {
			Some(result)
		} else {
			debug!(
				"Discarding stale result for '{}' (generation {})",
				ticket.field, ticket.generation
			);
			None
		}
	}

	/// Invalidate whatever is in flight for `field`
	pub fn cancel(&self, field: &str) {
		if let Some(mut generation) = self.generations.get_mut(field) {
			*generation += 1;
		}
	}
}
