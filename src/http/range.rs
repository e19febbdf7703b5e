//! HTTP Range request parsing module
//!
//! Single byte-range requests (RFC 7233) for frontend assets.

/// Inclusive byte range resolved against a known file size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    /// `Content-Range` header value, e.g. `bytes 0-99/1000`
    pub fn content_range(&self, file_size: usize) -> String {
        format!("bytes {}-{}/{file_size}", self.start, self.end)
    }
}

/// Range header outcome
#[derive(Debug, PartialEq, Eq)]
pub enum RangeOutcome {
    /// Serve the selected bytes with 206
    Partial(ByteRange),
    /// Range cannot be satisfied - respond with 416
    NotSatisfiable,
    /// No Range header, foreign unit or malformed - serve the full body
    Full,
}

/// Parse HTTP Range header (single range only, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end`
/// - `bytes=start-`
/// - `bytes=-suffix`
///
/// # Examples
/// ```
/// use search_server::http::range::{parse_range_header, ByteRange, RangeOutcome};
///
/// assert_eq!(
///     parse_range_header(Some("bytes=0-99"), 1000),
///     RangeOutcome::Partial(ByteRange { start: 0, end: 99 })
/// );
/// assert_eq!(parse_range_header(None, 1000), RangeOutcome::Full);
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: usize) -> RangeOutcome {
    let Some(ranges) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeOutcome::Full;
    };

    // Multi-range responses are not produced
    if ranges.contains(',') {
        return RangeOutcome::Full;
    }

    let Some((start_str, end_str)) = ranges.split_once('-') else {
        return RangeOutcome::Full;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        suffix_range(end_str, file_size)
    } else {
        bounded_range(start_str, end_str, file_size)
    }
}

/// Last N bytes, e.g. `-500`
fn suffix_range(suffix_str: &str, file_size: usize) -> RangeOutcome {
    let Ok(suffix) = suffix_str.parse::<usize>() else {
        return RangeOutcome::Full;
    };

    if suffix == 0 || file_size == 0 {
        return RangeOutcome::NotSatisfiable;
    }

    RangeOutcome::Partial(ByteRange {
        start: file_size.saturating_sub(suffix),
        end: file_size - 1,
    })
}

/// `start-` or `start-end`
fn bounded_range(start_str: &str, end_str: &str, file_size: usize) -> RangeOutcome {
    let Ok(start) = start_str.parse::<usize>() else {
        return RangeOutcome::Full;
    };

    if start >= file_size {
        return RangeOutcome::NotSatisfiable;
    }

    let end = if end_str.is_empty() {
        file_size - 1
    } else {
        let Ok(e) = end_str.parse::<usize>() else {
            return RangeOutcome::Full;
        };
        e.min(file_size - 1)
    };

    if start > end {
        return RangeOutcome::NotSatisfiable;
    }

    RangeOutcome::Partial(ByteRange { start, end })
}
