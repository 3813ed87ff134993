//! Editorial tasting notes and search embeddings through an
//! OpenAI-compatible API.

pub mod client;
pub mod embeddings;
pub mod error;
pub mod prompt;
pub mod response;

pub use client::NotesClient;
pub use embeddings::{embedding_text, EmbeddingsClient};
pub use error::NotesError;
pub use prompt::{brief_description, steep_time_label, TeaBrief};
pub use response::{extract_notes, match_notes, GeneratedNote, RawNote};

/// Attribution stored with every generated note.
pub const NOTE_ATTRIBUTION: &str = "Resteeped editorial";
