//! Minimal magnet URI parsing: `xt=urn:btih:` identity plus the display-name
//! and exact-length hints. Trackers and the other optional topics are left to
//! the session backend.

use std::borrow::Cow;

use riptide_core::InfoHash;
use thiserror::Error;

/// Errors raised while parsing a magnet URI.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MagnetError {
    /// The URI does not use the `magnet:?` scheme.
    #[error("magnet URI must start with 'magnet:?'")]
    InvalidScheme,
    /// No `xt=urn:btih:` parameter was present.
    #[error("magnet URI is missing a btih info hash")]
    MissingInfoHash,
}

/// Fields extracted from a magnet URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMagnet {
    /// Torrent identity hash (hex or base32 form, case-folded).
    pub info_hash: InfoHash,
    /// Display name (`dn`) when present.
    pub display_name: Option<String>,
    /// Exact payload length (`xl`) when present.
    pub exact_length: Option<u64>,
}

/// Parse a magnet URI.
///
/// # Errors
///
/// Returns an error when the scheme is wrong or no info hash is present.
pub fn parse_magnet(uri: &str) -> Result<ParsedMagnet, MagnetError> {
    let query = uri
        .strip_prefix("magnet:?")
        .ok_or(MagnetError::InvalidScheme)?;

    let mut info_hash = None;
    let mut display_name = None;
    let mut exact_length = None;

    for param in query.split('&') {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = decode_component(value);
        match key {
            "xt" => {
                if let Some(hash) = value.strip_prefix("urn:btih:")
                    && !hash.is_empty()
                {
                    info_hash = Some(InfoHash::new(hash));
                }
            }
            "dn" => display_name = Some(value.replace('+', " ")),
            "xl" => exact_length = value.parse().ok(),
            _ => {}
        }
    }

    Ok(ParsedMagnet {
        info_hash: info_hash.ok_or(MagnetError::MissingInfoHash)?,
        display_name,
        exact_length,
    })
}

fn decode_component(value: &str) -> String {
    urlencoding::decode(value).map_or_else(|_| value.to_owned(), Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "c12fe1c06bde254f72ab59b87c5f0288a6b95a20";

    #[test]
    fn parses_hash_name_and_length() {
        let uri = format!("magnet:?xt=urn:btih:{HASH}&dn=Some%20Movie+(2024)&xl=1000");
        let parsed = parse_magnet(&uri).unwrap();
        assert_eq!(parsed.info_hash, InfoHash::new(HASH));
        assert_eq!(parsed.display_name.as_deref(), Some("Some Movie (2024)"));
        assert_eq!(parsed.exact_length, Some(1_000));
    }

    #[test]
    fn hash_case_is_folded() {
        let uri = format!("magnet:?xt=urn:btih:{}", HASH.to_uppercase());
        let parsed = parse_magnet(&uri).unwrap();
        assert_eq!(parsed.info_hash.as_str(), HASH);
    }

    #[test]
    fn rejects_non_magnet_uris() {
        assert_eq!(
            parse_magnet("https://example.com/file.torrent"),
            Err(MagnetError::InvalidScheme)
        );
    }

    #[test]
    fn rejects_missing_info_hash() {
        assert_eq!(
            parse_magnet("magnet:?dn=NoHash"),
            Err(MagnetError::MissingInfoHash)
        );
    }

    #[test]
    fn ignores_malformed_parameters() {
        let uri = format!("magnet:?garbage&xt=urn:btih:{HASH}&xl=not-a-number");
        let parsed = parse_magnet(&uri).unwrap();
        assert_eq!(parsed.exact_length, None);
    }
}
