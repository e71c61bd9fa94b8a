//! These models represent the objects passed around by the agent
//!
//! The conversation is the only state a run carries. Messages are immutable once
//! created and the conversation only ever grows while the run is live. Providers
//! convert these into their own wire format at the request boundary.
pub mod conversation;
pub mod message;
pub mod role;
pub mod tool;
