const BYTE_ORDER_MARK: char = '\u{feff}';

/// Decodes raw bytes and strips a leading byte-order mark and every NUL character.
pub fn sanitize_log_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let stripped = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&*text);
    stripped.replace('\u{0}', "")
}
