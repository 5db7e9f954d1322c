//! PDF extraction — an ordered fallback chain, first acceptable outcome wins.
//!
//! 1. readable-text extraction via `pdf-extract`
//! 2. content-stream dump + `BT`/`ET` scan via `lopdf`
//!    (falling back to the raw dumped streams when the scan comes up short)
//! 3. heuristic byte scan over the raw file
//!
//! Later strategies trade quality for coverage; the byte scan in particular
//! exists so a mangled or exotic PDF still yields *something* for the
//! analysis prompt rather than a hard failure.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::ExtractError;

/// Minimum characters the content-stream scan must produce before we trust
/// it over the raw dump.
const MIN_PARSED_CHARS: usize = 100;
const SCAN_WINDOW: usize = 100;
const SCAN_TEXT_RATIO: f64 = 0.6;

pub fn extract(path: &Path) -> Result<String, ExtractError> {
    fs::metadata(path).map_err(|source| ExtractError::io(path, source))?;

    let strategies: [(&str, fn(&Path) -> Result<String, ExtractError>); 3] = [
        ("readable-text", extract_readable_text),
        ("content-stream", extract_content_streams),
        ("byte-scan", extract_byte_scan),
    ];

    for (name, strategy) in strategies {
        match strategy(path) {
            Ok(text) if !text.trim().is_empty() => {
                debug!(strategy = name, chars = text.len(), "PDF text extracted");
                return Ok(text);
            }
            Ok(_) => {
                warn!(strategy = name, "strategy produced no text, falling back");
            }
            Err(err) => {
                warn!(strategy = name, error = %err, "strategy failed, falling back");
            }
        }
    }

    Err(ExtractError::NoText(path.to_path_buf()))
}

fn extract_readable_text(path: &Path) -> Result<String, ExtractError> {
    pdf_extract::extract_text(path).map_err(|e| ExtractError::PdfText(e.to_string()))
}

/// Dumps every page's decompressed content stream into a scratch directory,
/// reads the dump back, and scans it for text-showing operators. When the
/// scan yields too little, the raw dump itself is sometimes usable.
fn extract_content_streams(path: &Path) -> Result<String, ExtractError> {
    let doc = lopdf::Document::load(path)?;

    // TempDir is removed on drop, so the scratch files go away even when we
    // bail out through an error below.
    let workdir = tempfile::tempdir().map_err(|source| ExtractError::io(path, source))?;

    for (page_num, page_id) in doc.get_pages() {
        let content = match doc.get_page_content(page_id) {
            Ok(content) => content,
            Err(err) => {
                warn!(page = page_num, error = %err, "skipping unreadable content stream");
                continue;
            }
        };
        let out = workdir.path().join(format!("page_{page_num}"));
        fs::write(&out, &content).map_err(|source| ExtractError::io(&out, source))?;
    }

    let raw = read_dumped_streams(workdir.path())?;
    let parsed = scan_content_streams(&raw);
    if parsed.len() > MIN_PARSED_CHARS {
        return Ok(parsed);
    }
    if !raw.is_empty() {
        debug!("content-stream scan below threshold, returning raw stream dump");
        return Ok(raw);
    }
    Err(ExtractError::NoText(path.to_path_buf()))
}

fn read_dumped_streams(dir: &Path) -> Result<String, ExtractError> {
    let entries = fs::read_dir(dir).map_err(|source| ExtractError::io(dir, source))?;
    let mut paths: Vec<_> = entries.filter_map(Result::ok).map(|e| e.path()).collect();
    paths.sort();

    let mut combined = String::new();
    for path in paths {
        if let Ok(bytes) = fs::read(&path) {
            combined.push_str(&String::from_utf8_lossy(&bytes));
            combined.push('\n');
        }
    }
    Ok(combined)
}

/// Scans dumped content streams for `BT`…`ET` text objects, collecting the
/// operands of `Tj`/`TJ` show-text operators. Runs are joined with a single
/// space; each `ET` emits a newline.
fn scan_content_streams(content: &str) -> String {
    let mut result = String::new();
    let mut in_text_object = false;

    for line in content.lines() {
        let line = line.trim();

        if line.contains("BT") {
            in_text_object = true;
            continue;
        }
        if line.contains("ET") {
            in_text_object = false;
            result.push('\n');
            continue;
        }
        if in_text_object && (line.contains("Tj") || line.contains("TJ")) {
            result.push_str(&show_text_operand(line));
            result.push(' ');
        }
    }

    result
}

/// Pulls the operand out of a show-text line: `(Hello) Tj` yields `Hello`.
/// Hex strings like `<48656C6C6F> Tj` are not decoded; they come back as a
/// `[HEX:…]` placeholder so downstream consumers can at least see that text
/// was present.
fn show_text_operand(line: &str) -> String {
    if let (Some(start), Some(end)) = (line.find('('), line.rfind(')')) {
        if end > start {
            return line[start + 1..end].to_string();
        }
    }
    if let (Some(start), Some(end)) = (line.find('<'), line.rfind('>')) {
        if end > start {
            return format!("[HEX:{}]", &line[start + 1..end]);
        }
    }
    String::new()
}

/// Last resort: slide a fixed window over the raw bytes and keep the chunks
/// that look like prose. Output quality is poor (overlapping windows repeat
/// text) but it beats returning nothing for a PDF the parsers choke on.
fn extract_byte_scan(path: &Path) -> Result<String, ExtractError> {
    warn!("falling back to heuristic byte scan; extraction quality may be low");

    let data = fs::read(path).map_err(|source| ExtractError::io(path, source))?;

    let mut result = String::new();
    for window in data.windows(SCAN_WINDOW) {
        if is_likely_text(window) {
            result.push_str(&clean_window(window));
            result.push(' ');
        }
    }

    if result.is_empty() {
        return Err(ExtractError::NoText(path.to_path_buf()));
    }
    Ok(result)
}

/// A window qualifies when more than 60% of its bytes are ASCII
/// letters/digits/space/period/comma.
fn is_likely_text(window: &[u8]) -> bool {
    let text_bytes = window
        .iter()
        .filter(|&&b| b.is_ascii_alphanumeric() || b == b' ' || b == b'.' || b == b',')
        .count();
    text_bytes as f64 / window.len() as f64 > SCAN_TEXT_RATIO
}

/// Keeps printable ASCII and CJK Unified Ideographs; everything else
/// becomes a space.
fn clean_window(window: &[u8]) -> String {
    let cleaned: String = String::from_utf8_lossy(window)
        .chars()
        .map(|c| {
            if (' '..='~').contains(&c) || ('\u{4E00}'..='\u{9FFF}').contains(&c) {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.trim().to_string()
}
