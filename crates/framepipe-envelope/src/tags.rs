//! Envelope tags.
//!
//! The payload shape of an envelope is determined solely by its tag.

/// Human-readable log line, worker to supervisor. Payload: `[message]`.
pub const LOG: i64 = 0;

/// Frame request, worker to supervisor. Payload: `[count]`.
pub const FRAME_REQUEST: i64 = 1;

/// Frame data, supervisor to worker. Payload: `[metadata_map, ...]`.
///
/// Conventional only: the worker accepts whatever envelope arrives in the
/// frame slot without checking this tag.
pub const FRAME_DATA: i64 = 2;

/// Analysis result, worker to supervisor. Payload: `[tag, image_bytes]`.
pub const FRAME_RESULT: i64 = 3;

/// Returns a human-readable name for a tag.
pub fn tag_name(tag: i64) -> &'static str {
    match tag {
        LOG => "LOG",
        FRAME_REQUEST => "FRAME_REQUEST",
        FRAME_DATA => "FRAME_DATA",
        FRAME_RESULT => "FRAME_RESULT",
        _ => "UNKNOWN",
    }
}
