//! Storage path convention.
//!
//! Every media file lives at `{folder}/{epoch-millis}_{original-name}` where
//! `folder` is one of `images`, `videos` or `audio`. The path is the only
//! place a file's type and upload time are recorded, so writer and reader
//! must agree on it exactly.

use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use std::fmt;
use std::str::FromStr;

/// Kind of media, which also decides the top-level folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl MediaType {
    /// Listing order used by the per-folder fallback.
    pub const ALL: [Self; 3] = [Self::Image, Self::Video, Self::Audio];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    /// Top-level folder for this type. Audio is irregular: `audio`, not `audios`.
    pub fn folder(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
            Self::Audio => "audio",
        }
    }

    /// Inverse of [`folder()`](Self::folder). Only the exact folder names
    /// are accepted.
    pub fn from_folder(folder: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|media_type| media_type.folder() == folder)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|media_type| media_type.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_raise(|| ErrorKind::UnknownMediaType(s.to_string()))
    }
}

/// Everything recoverable from a stored path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPath {
    pub media_type: MediaType,
    pub created_at: i64,
    /// Final path segment as stored, timestamp prefix included.
    pub file_name: String,
    /// Original filename, timestamp prefix stripped.
    pub display_name: String,
}

/// Build the storage path for a file uploaded at `now_millis`.
///
/// Two files with the same name encoded in the same millisecond get the same
/// path; what happens then is up to the remote store.
///
/// ```
/// use gallery_catalog::{MediaType, codec::encode_path};
/// assert_eq!(encode_path(MediaType::Audio, "song.mp3", 1700000000000), "audio/1700000000000_song.mp3");
/// ```
pub fn encode_path(media_type: MediaType, file_name: &str, now_millis: i64) -> String {
    format!("{}/{now_millis}_{file_name}", media_type.folder())
}

/// Recover type, timestamp and original name from a storage path.
///
/// Fails with [`MalformedPath`](ErrorKind::MalformedPath) unless the path is
/// exactly one known folder and one file whose name starts with an integer
/// timestamp followed by `_` and a non-empty name.
///
/// ```
/// use gallery_catalog::{MediaType, codec::decode_path};
/// let decoded = decode_path("images/1700000000000_holiday_1.png").unwrap();
/// assert_eq!(decoded.media_type, MediaType::Image);
/// assert_eq!(decoded.created_at, 1700000000000);
/// assert_eq!(decoded.display_name, "holiday_1.png");
/// assert!(decode_path("photos/1700000000000_x.png").is_err());
/// ```
pub fn decode_path(path: &str) -> Result<DecodedPath> {
    let malformed = || ErrorKind::MalformedPath(path.to_string());
    let (folder, file_name) = path.split_once('/').ok_or_raise(malformed)?;
    if file_name.contains('/') {
        exn::bail!(malformed());
    }
    let media_type = MediaType::from_folder(folder).ok_or_raise(malformed)?;
    let (created_at, display_name) = split_file_name(file_name).ok_or_raise(malformed)?;
    Ok(DecodedPath {
        media_type,
        created_at,
        file_name: file_name.to_string(),
        display_name: display_name.to_string(),
    })
}

/// Split a stored filename into its timestamp and original name.
///
/// Splits once on the first `_`; everything after it is the original name,
/// underscores included.
pub fn split_file_name(file_name: &str) -> Option<(i64, &str)> {
    let (prefix, display_name) = file_name.split_once('_')?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) || display_name.is_empty() {
        return None;
    }
    Some((prefix.parse().ok()?, display_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MediaType::Image, "cat.png", 1700000000000)]
    #[case(MediaType::Video, "clip_final_v2.mp4", 5)]
    #[case(MediaType::Audio, "song.mp3", 1700000000123)]
    #[case(MediaType::Image, "no extension", 0)]
    fn test_round_trip(#[case] media_type: MediaType, #[case] name: &str, #[case] now: i64) {
        let decoded = decode_path(&encode_path(media_type, name, now)).unwrap();
        assert_eq!(decoded.media_type, media_type);
        assert_eq!(decoded.created_at, now);
        assert_eq!(decoded.display_name, name);
        assert_eq!(decoded.file_name, format!("{now}_{name}"));
    }

    #[rstest]
    #[case(MediaType::Image, "images/1_a.png")]
    #[case(MediaType::Video, "videos/1_a.png")]
    #[case(MediaType::Audio, "audio/1_a.png")]
    fn test_folders(#[case] media_type: MediaType, #[case] expected: &str) {
        assert_eq!(encode_path(media_type, "a.png", 1), expected);
    }

    #[rstest]
    #[case::no_folder("1700000000000_cat.png")]
    #[case::unknown_folder("photos/1700000000000_cat.png")]
    #[case::regular_plural_audio("audios/1700000000000_song.mp3")]
    #[case::singular_folder("image/1700000000000_cat.png")]
    #[case::non_numeric("images/abc_cat.png")]
    #[case::signed("images/-5_cat.png")]
    #[case::no_separator("images/1700000000000.png")]
    #[case::empty_prefix("images/_cat.png")]
    #[case::empty_name("images/1700000000000_")]
    #[case::nested("images/2024/1700000000000_cat.png")]
    #[case::overflow("images/99999999999999999999999_cat.png")]
    #[case::empty("")]
    fn test_malformed(#[case] path: &str) {
        let err = decode_path(path).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MalformedPath(p) if p == path));
    }

    #[rstest]
    #[case("image", MediaType::Image)]
    #[case("Video", MediaType::Video)]
    #[case(" audio ", MediaType::Audio)]
    fn test_parse_media_type(#[case] input: &str, #[case] expected: MediaType) {
        assert_eq!(input.parse::<MediaType>().unwrap(), expected);
    }

    #[test]
    fn test_parse_media_type_invalid() {
        assert!("images".parse::<MediaType>().is_err());
        assert!("document".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_from_folder_is_exact() {
        assert_eq!(MediaType::from_folder("audio"), Some(MediaType::Audio));
        assert_eq!(MediaType::from_folder("audios"), None);
        assert_eq!(MediaType::from_folder("Images"), None);
    }
}
