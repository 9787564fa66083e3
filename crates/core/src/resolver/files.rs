//! Video file selection inside an added torrent.

use std::path::Path;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::warn;

use crate::matcher::episode_patterns;
use crate::media::MediaKind;
use crate::stream_client::StreamFile;

use super::EpisodeTarget;

/// Extensions treated as playable video.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v"];

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

static SXXEYY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bs(\d{1,2})[\s._-]?e(\d{1,3})\b").unwrap());

static NXEE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})x(\d{2,3})\b").unwrap());

pub fn is_video_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            VIDEO_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Pick the file to stream.
///
/// In order: the backend's own pick (if it is a video file), an anime
/// episode match, a show `SxxEyy`/`NxEE` match, then the largest video.
/// Returns `None` when the torrent has no video files.
pub fn select_file<'a>(
    files: &'a [StreamFile],
    backend_pick: Option<usize>,
    target: &EpisodeTarget,
) -> Option<&'a StreamFile> {
    let videos: Vec<&StreamFile> = files.iter().filter(|f| is_video_file(&f.name)).collect();
    if videos.is_empty() {
        return None;
    }

    if let Some(index) = backend_pick {
        if let Some(file) = videos.iter().copied().find(|f| f.index == index) {
            return Some(file);
        }
    }

    let by_episode = match (target.kind, target.season, target.episode) {
        (MediaKind::Anime, _, Some(ep)) => anime_episode_file(&videos, ep),
        (MediaKind::Show, season, Some(ep)) => {
            show_episode_file(&videos, season.unwrap_or(1), ep)
        }
        _ => None,
    };

    by_episode.or_else(|| videos.iter().copied().max_by_key(|f| f.size_bytes))
}

fn anime_episode_file<'a>(videos: &[&'a StreamFile], episode: u32) -> Option<&'a StreamFile> {
    let patterns = match episode_patterns(episode) {
        Ok(patterns) => patterns,
        Err(e) => {
            warn!(error = %e, "Skipping episode file matching");
            return None;
        }
    };

    videos.iter().copied().find(|f| {
        let stem = file_stem(&f.name);
        patterns.iter().any(|re| re.is_match(stem))
            && NUMBER_RE
                .find_iter(stem)
                .any(|m| m.as_str().parse::<u32>().ok() == Some(episode))
    })
}

fn show_episode_file<'a>(
    videos: &[&'a StreamFile],
    season: u32,
    episode: u32,
) -> Option<&'a StreamFile> {
    videos.iter().copied().find(|f| {
        let name = file_stem(&f.name);
        [&*SXXEYY_RE, &*NXEE_RE].iter().any(|re| {
            re.captures_iter(name).any(|caps| {
                caps[1].parse::<u32>().ok() == Some(season)
                    && caps[2].parse::<u32>().ok() == Some(episode)
            })
        })
    })
}

/// Last path component without its extension.
fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: u64, index: usize) -> StreamFile {
        StreamFile {
            name: name.to_string(),
            size_bytes: size,
            index,
        }
    }

    fn target(kind: MediaKind, season: Option<u32>, episode: Option<u32>) -> EpisodeTarget {
        EpisodeTarget {
            kind,
            season,
            episode,
        }
    }

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file("Movie.2020.MP4"));
        assert!(is_video_file("dir/Show.S01E01.mkv"));
        assert!(is_video_file("clip.m4v"));
        assert!(!is_video_file("Movie.2020.nfo"));
        assert!(!is_video_file("subs.srt"));
        assert!(!is_video_file("no_extension"));
    }

    #[test]
    fn test_no_video_files() {
        let files = vec![file("readme.txt", 10, 0), file("cover.jpg", 20, 1)];
        assert!(select_file(&files, None, &target(MediaKind::Movie, None, None)).is_none());
    }

    #[test]
    fn test_largest_file_fallback() {
        let files = vec![
            file("sample.mkv", 50, 0),
            file("Movie.2020.1080p.mkv", 5000, 1),
            file("extras.txt", 99999, 2),
        ];
        let picked = select_file(&files, None, &target(MediaKind::Movie, None, None)).unwrap();
        assert_eq!(picked.index, 1);
    }

    #[test]
    fn test_backend_pick_wins_when_video() {
        let files = vec![file("Ep01.mkv", 500, 0), file("Ep02.mkv", 400, 1), file("info.nfo", 1, 2)];
        let t = target(MediaKind::Anime, None, Some(1));
        assert_eq!(select_file(&files, Some(1), &t).unwrap().index, 1);
        // Not a video file: ignored.
        assert_eq!(select_file(&files, Some(2), &t).unwrap().index, 0);
        // Unknown index: ignored.
        assert_eq!(select_file(&files, Some(9), &t).unwrap().index, 0);
    }

    #[test]
    fn test_anime_episode_match_checks_numbers() {
        let files = vec![
            file("[Group] Frieren - 04 (1080p).mkv", 900, 0),
            file("[Group] Frieren - 05 (1080p).mkv", 800, 1),
            file("[Group] Frieren - 15 (1080p).mkv", 1000, 2),
        ];
        let picked = select_file(&files, None, &target(MediaKind::Anime, None, Some(5))).unwrap();
        assert_eq!(picked.index, 1);
    }

    #[test]
    fn test_anime_episode_without_match_uses_largest() {
        let files = vec![file("Frieren Vol 1.mkv", 900, 0), file("Frieren Vol 2.mkv", 1000, 1)];
        let picked = select_file(&files, None, &target(MediaKind::Anime, None, Some(5))).unwrap();
        assert_eq!(picked.index, 1);
    }

    #[test]
    fn test_show_season_pack_episode_match() {
        let files = vec![
            file("Game.of.Thrones.S01E01.mkv", 1000, 0),
            file("Game.of.Thrones.S01E02.mkv", 900, 1),
            file("Game.of.Thrones.S01E03.mkv", 1100, 2),
        ];
        let picked = select_file(&files, None, &target(MediaKind::Show, Some(1), Some(2))).unwrap();
        assert_eq!(picked.index, 1);

        let files = vec![file("show.1x09.mp4", 10, 0), file("show.1x10.mp4", 20, 1)];
        let picked = select_file(&files, None, &target(MediaKind::Show, Some(1), Some(9))).unwrap();
        assert_eq!(picked.index, 0);
    }

    #[test]
    fn test_show_episode_without_season_reads_as_season_one() {
        let files = vec![
            file("Show.S01E04.mkv", 1000, 0),
            file("Show.S01E05.mkv", 900, 1),
            file("Show.S02E05.mkv", 1200, 2),
        ];
        let picked = select_file(&files, None, &target(MediaKind::Show, None, Some(5))).unwrap();
        assert_eq!(picked.index, 1);
    }
}
