// Kanban history: rebuilds what a board looked like over a week or month by
// replaying its append-only event log.

pub mod grouping;
pub mod handlers;
pub mod period;
pub mod reducer;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
