//! Release name parsing.
//!
//! Pure functions over a release name; no I/O.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

static QUALITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(2160p|1080p|720p|576p|480p|4k|uhd)\b").unwrap());

static SOURCE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\bweb-?dl\b", "WEB-DL"),
        (r"(?i)\bweb-?rip\b", "WEBRip"),
        (r"(?i)\b(?:blu-?ray|bdrip|brrip|bdremux)\b", "BluRay"),
        (r"(?i)\bhdtv\b", "HDTV"),
        (r"(?i)\bdvd-?rip\b", "DVDRip"),
        (r"(?i)\bhdrip\b", "HDRip"),
        (r"(?i)\b(?:hdcam|cam|telesync)\b", "CAM"),
    ]
    .into_iter()
    .map(|(pattern, label)| (Regex::new(pattern).unwrap(), label))
    .collect()
});

static LANGUAGE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\bdual[\s._-]?audio\b", "Dual Audio"),
        (r"(?i)\bmulti\b", "Multi"),
        (r"(?i)\b(?:eng|english)\b", "English"),
        (r"(?i)\b(?:jap|japanese)\b", "Japanese"),
    ]
    .into_iter()
    .map(|(pattern, label)| (Regex::new(pattern).unwrap(), label))
    .collect()
});

static AV1_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bav1\b").unwrap());
static HEVC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:hevc|[hx]\.?265)\b").unwrap());
static H264_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b[hx]\.?264\b").unwrap());
static AAC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\baac").unwrap());
static MP3_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bmp3").unwrap());
// Audio tags are often glued to a channel count ("DTS5.1", "FLAC2.0").
static DTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bdts(?:-?hd|-?x)?(?:\b|\d)").unwrap());
static AC3_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bac-?3(?:\b|\d)").unwrap());
static TRUEHD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\btrue-?hd(?:\b|\d)").unwrap());
static ATMOS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\batmos\b").unwrap());
static FLAC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bflac(?:\b|\d)").unwrap());
static MP4_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bmp4\b").unwrap());
static MKV_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bmkv\b").unwrap());

/// Codec and container mentions in a release name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecFlags {
    pub av1: bool,
    pub hevc: bool,
    pub h264: bool,
    pub aac: bool,
    pub mp3: bool,
    pub dts: bool,
    pub ac3: bool,
    pub truehd: bool,
    pub atmos: bool,
    pub flac: bool,
    pub mp4: bool,
    pub mkv: bool,
}

impl CodecFlags {
    pub fn parse(name: &str) -> Self {
        Self {
            av1: AV1_RE.is_match(name),
            hevc: HEVC_RE.is_match(name),
            h264: H264_RE.is_match(name),
            aac: AAC_RE.is_match(name),
            mp3: MP3_RE.is_match(name),
            dts: DTS_RE.is_match(name),
            ac3: AC3_RE.is_match(name),
            truehd: TRUEHD_RE.is_match(name),
            atmos: ATMOS_RE.is_match(name),
            flac: FLAC_RE.is_match(name),
            mp4: MP4_RE.is_match(name),
            mkv: MKV_RE.is_match(name),
        }
    }

    /// Explicit browser-friendly audio (AAC or MP3).
    pub fn has_compatible_audio(&self) -> bool {
        self.aac || self.mp3
    }

    /// Any audio codec a browser video element cannot decode.
    pub fn has_incompatible_audio(&self) -> bool {
        self.dts || self.ac3 || self.truehd || self.atmos || self.flac
    }

    /// Display label for the most specific audio codec mentioned.
    pub fn audio_label(&self) -> Option<&'static str> {
        [
            (self.atmos, "Atmos"),
            (self.truehd, "TrueHD"),
            (self.dts, "DTS"),
            (self.ac3, "AC3"),
            (self.flac, "FLAC"),
            (self.aac, "AAC"),
            (self.mp3, "MP3"),
        ]
        .into_iter()
        .find_map(|(present, label)| present.then_some(label))
    }
}

/// Labels and codec flags derived from a release name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub quality: Option<String>,
    pub source: Option<String>,
    pub audio_language: Option<String>,
    pub codecs: CodecFlags,
}

impl ReleaseInfo {
    pub fn parse(name: &str) -> Self {
        let quality = QUALITY_RE.captures(name).and_then(|caps| caps.get(1)).map(|m| {
            match m.as_str().to_ascii_lowercase().as_str() {
                "4k" | "uhd" => "2160p".to_string(),
                other => other.to_string(),
            }
        });

        Self {
            quality,
            source: first_label(&SOURCE_PATTERNS, name),
            audio_language: first_label(&LANGUAGE_PATTERNS, name),
            codecs: CodecFlags::parse(name),
        }
    }
}

fn first_label(patterns: &[(Regex, &'static str)], name: &str) -> Option<String> {
    patterns
        .iter()
        .find(|(re, _)| re.is_match(name))
        .map(|(_, label)| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_web_release() {
        let info = ReleaseInfo::parse("Game.of.Thrones.S01E01.1080p.WEB-DL.AAC2.0.H.264.mp4");
        assert_eq!(info.quality.as_deref(), Some("1080p"));
        assert_eq!(info.source.as_deref(), Some("WEB-DL"));
        assert!(info.codecs.aac);
        assert!(info.codecs.h264);
        assert!(info.codecs.mp4);
        assert!(!info.codecs.mkv);
        assert!(info.codecs.has_compatible_audio());
        assert!(!info.codecs.has_incompatible_audio());
        assert_eq!(info.codecs.audio_label(), Some("AAC"));
    }

    #[test]
    fn test_parse_remux_release() {
        let info = ReleaseInfo::parse("Dune.2021.2160p.UHD.BluRay.REMUX.HEVC.TrueHD.Atmos.7.1.mkv");
        assert_eq!(info.quality.as_deref(), Some("2160p"));
        assert_eq!(info.source.as_deref(), Some("BluRay"));
        assert!(info.codecs.hevc);
        assert!(info.codecs.truehd);
        assert!(info.codecs.atmos);
        assert!(info.codecs.mkv);
        assert!(info.codecs.has_incompatible_audio());
        assert_eq!(info.codecs.audio_label(), Some("Atmos"));
    }

    #[test]
    fn test_parse_anime_release() {
        let info = ReleaseInfo::parse("[SubsPlease] Frieren - 05 (1080p) [Dual Audio] x264 AAC");
        assert_eq!(info.quality.as_deref(), Some("1080p"));
        assert_eq!(info.audio_language.as_deref(), Some("Dual Audio"));
        assert!(info.codecs.h264);
        assert!(info.source.is_none());
    }

    #[test]
    fn test_codec_detection() {
        assert!(CodecFlags::parse("Show.S01E01.AV1.mkv").av1);
        assert!(!CodecFlags::parse("Show.S01E01.AV10.mkv").av1);
        assert!(CodecFlags::parse("Movie.DTS-HD.MA.mkv").dts);
        assert!(CodecFlags::parse("Movie.AC-3.avi").ac3);
        assert!(CodecFlags::parse("Movie.AC3.avi").ac3);
        assert!(CodecFlags::parse("Album FLAC").flac);
        assert!(CodecFlags::parse("Movie.x264.mp3").mp3);
        assert!(CodecFlags::parse("Movie.H264").h264);
        assert!(!CodecFlags::parse("Movie.H265").h264);
    }

    #[test]
    fn test_audio_glued_to_channel_count() {
        assert!(CodecFlags::parse("Some.Movie.1080p.BluRay.DTS5.1.x264.mkv").dts);
        assert!(CodecFlags::parse("Some.Movie.2160p.DTS-X7.1.mkv").dts);
        assert!(CodecFlags::parse("Some.Movie.1080p.BluRay.TrueHD7.1.mkv").truehd);
        assert!(CodecFlags::parse("Some.Movie.1080p.FLAC2.0.x264.mkv").flac);
        assert!(CodecFlags::parse("Some.Movie.1080p.AC35.1.mkv").ac3);
        assert!(!CodecFlags::parse("Some.Movie.1080p.DTSound.mkv").dts);
    }

    #[test]
    fn test_parse_bare_name() {
        let info = ReleaseInfo::parse("Something");
        assert_eq!(info, ReleaseInfo::default());
    }
}
