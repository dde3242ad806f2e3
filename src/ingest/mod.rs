pub mod decode;
mod errors;
pub mod fields;
pub mod models;
mod sanitize;

pub use decode::{decode_log, normalize_players};
pub use errors::IngestError;
pub use models::*;
pub use sanitize::sanitize_log_text;

use tracing::instrument;

/// Raw bytes to a decoded log: sanitize, parse, validate, decode.
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn ingest_bytes(bytes: &[u8]) -> Result<LogData, IngestError> {
    let text = sanitize_log_text(bytes);
    let root: serde_json::Value = serde_json::from_str(&text)?;
    decode_log(&root)
}
