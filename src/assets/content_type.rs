//! Content type resolution.
//!
//! Extension lookup goes through an explicit table first, then `mime_guess`.
//! Files with an unknown extension are classified from their leading bytes.

use std::path::Path;

use mime_guess::mime::{self, Mime};
use tokio::io::AsyncReadExt;

use crate::assets::error::AssetError;
use crate::assets::locator::LocatedFile;

/// Bytes inspected when sniffing.
pub const SNIFF_LEN: usize = 512;

/// Content type for a file extension, `None` when the extension is unmapped.
pub fn by_extension(path: &str) -> Option<Mime> {
    let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    let known = match ext.as_str() {
        "js" | "mjs" | "cjs" => mime::APPLICATION_JAVASCRIPT,
        "svg" => mime::IMAGE_SVG,
        "html" | "htm" => mime::TEXT_HTML_UTF_8,
        "css" => mime::TEXT_CSS_UTF_8,
        "json" => mime::APPLICATION_JSON,
        "txt" => mime::TEXT_PLAIN_UTF_8,
        "wasm" => "application/wasm".parse().ok()?,
        "webmanifest" => "application/manifest+json".parse().ok()?,
        _ => return mime_guess::from_ext(&ext).first(),
    };
    Some(known)
}

/// Read up to [`SNIFF_LEN`] bytes from `located` and classify them.
pub async fn sniff_file(located: &mut LocatedFile) -> Result<Mime, AssetError> {
    let mut buf = [0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        let n = located
            .file
            .read(&mut buf[filled..])
            .await
            .map_err(|e| AssetError::from_io(&located.path, e))?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(sniff(&buf[..filled]))
}

/// Classify content from its leading bytes.
pub fn sniff(data: &[u8]) -> Mime {
    let data = &data[..data.len().min(SNIFF_LEN)];

    if let Some(known) = sniff_signature(data) {
        return known;
    }

    let text = skip_whitespace(data);
    if looks_like_html(text) {
        return mime::TEXT_HTML_UTF_8;
    }
    if starts_with_ignore_case(text, b"<?xml") {
        return mime::TEXT_XML;
    }

    if data.is_empty() || !data.iter().any(|&b| is_binary_byte(b)) {
        return mime::TEXT_PLAIN_UTF_8;
    }

    mime::APPLICATION_OCTET_STREAM
}

fn sniff_signature(data: &[u8]) -> Option<Mime> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"%PDF-", "application/pdf"),
        (b"\x00asm", "application/wasm"),
        (b"wOFF", "font/woff"),
        (b"wOF2", "font/woff2"),
        (b"\x1f\x8b\x08", "application/x-gzip"),
        (b"PK\x03\x04", "application/zip"),
        (b"\xef\xbb\xbf", "text/plain; charset=utf-8"),
    ];

    for (magic, kind) in SIGNATURES {
        if data.starts_with(magic) {
            return kind.parse().ok();
        }
    }

    if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return "image/webp".parse().ok();
    }

    None
}

fn looks_like_html(text: &[u8]) -> bool {
    const TAGS: &[&[u8]] = &[
        b"<!DOCTYPE HTML",
        b"<HTML",
        b"<HEAD",
        b"<SCRIPT",
        b"<IFRAME",
        b"<H1",
        b"<DIV",
        b"<FONT",
        b"<TABLE",
        b"<A",
        b"<STYLE",
        b"<TITLE",
        b"<B",
        b"<BODY",
        b"<BR",
        b"<P",
        b"<!--",
    ];

    TAGS.iter().any(|tag| {
        starts_with_ignore_case(text, tag)
            && matches!(text.get(tag.len()), Some(b' ') | Some(b'>'))
    })
}

fn starts_with_ignore_case(data: &[u8], prefix: &[u8]) -> bool {
    data.len() >= prefix.len() && data[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0c' | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

/// Control bytes that never appear in text.
fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f)
}
