//! The `get` pipeline: token, catalog lookup, then match, tag and move each track.

use crate::album::{analyze_response, AlbumRecord, TrackRecord};
use crate::api_client::{CatalogClient, CatalogEndpoints, HttpTransport, TokenProvider};
use crate::configuration::GetOptions;
use crate::foundation::cache::CacheStore;
use crate::process::embed::{embed_metadata, CoverArt, EmbedError, TrackTags};
use crate::process::matcher::{find_match, scan_candidates};
use crate::process::organizer::{move_into_place, write_sidecars, AlbumLayout};
use crate::process::RunError;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

/// Outcome counts of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Tracks tagged and moved.
    pub organized: usize,
    /// Tracks without a matching file.
    pub not_found: usize,
    /// Tracks whose file could not be tagged or moved.
    pub failed: usize,
}

enum TrackOutcome {
    Organized,
    NotFound,
    Failed,
}

/// Runs the whole `get` command for one album.
///
/// A missing file for a track, or a failure to tag or move it, only skips that
/// track. Catalog errors and files in an unsupported container end the run.
///
/// # Arguments
///
/// * `options` - What to fetch and where files live.
/// * `tokens` - Source of the bearer token.
/// * `transport` - HTTP access.
/// * `cache` - Catalog response and cover cache.
/// * `endpoints` - Catalog API location.
///
pub async fn process_album(
    options: &GetOptions,
    tokens: &dyn TokenProvider,
    transport: &dyn HttpTransport,
    cache: &dyn CacheStore,
    endpoints: &CatalogEndpoints,
) -> Result<RunSummary, RunError> {
    let token = tokens.bearer_token().await?;
    let client = CatalogClient::new(transport, cache, endpoints, &token, &options.storefront)
        .clean_request(options.clean_request);

    let response = client.fetch_album(&options.album_id).await?;
    let album = analyze_response(&response)?;
    println!(
        "Album: {} by {} ({} tracks)",
        album.name,
        album.artist,
        album.tracks.len()
    );

    let cover_data = client
        .fetch_cover(
            &options.album_id,
            &album.cover_url,
            options.cover_width,
            options.cover_height,
        )
        .await?;
    let cover = CoverArt::new(cover_data, options.cover_width, options.cover_height);

    let layout = AlbumLayout::new(&options.output_directory, &album);
    fs::create_dir_all(layout.album_dir())?;

    let tracks: Vec<&TrackRecord> = album
        .tracks
        .iter()
        .filter(|track| options.wants_track(track.track_number))
        .collect();

    let progress = create_progress_bar(tracks.len() as u64);
    let mut summary = RunSummary::default();

    for track in tracks {
        progress.set_message(track.title.clone());
        let outcome = process_track(options, &album, track, &cover, &layout, &progress);

        match outcome {
            Ok(TrackOutcome::Organized) => summary.organized += 1,
            Ok(TrackOutcome::NotFound) => summary.not_found += 1,
            Ok(TrackOutcome::Failed) => summary.failed += 1,
            Err(e) => {
                progress.abandon();
                return Err(e);
            }
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(summary)
}

fn process_track(
    options: &GetOptions,
    album: &AlbumRecord,
    track: &TrackRecord,
    cover: &CoverArt,
    layout: &AlbumLayout,
    progress: &ProgressBar,
) -> Result<TrackOutcome, RunError> {
    report(
        progress,
        format!(
            "Looking for {} in {}.",
            track.title,
            options.directory.display()
        ),
    );

    // Rescanned for every track, earlier tracks may have moved files away.
    let candidates = scan_candidates(&options.directory)?;
    let Some(candidate) = find_match(track, &candidates, options.duration_tolerance) else {
        report(progress, "\tNo music found.".to_string());
        return Ok(TrackOutcome::NotFound);
    };
    let source = candidate.path.as_path();
    report(progress, format!("\tFound {}", source.display()));

    let tags = TrackTags::new(album, track);
    match embed_metadata(source, &tags, Some(cover)) {
        Ok(_) => report(progress, "\tEmbedded metadata.".to_string()),
        Err(EmbedError::UnsupportedFormat(reason)) => {
            return Err(RunError::UnsupportedFormat(reason));
        }
        Err(e) => {
            report(progress, format!("\tFailed to embed metadata: {}", e));
            return Ok(TrackOutcome::Failed);
        }
    }

    let destination = layout.track_path(track, source);
    report(progress, format!("\tMoving to {}.", destination.display()));
    if let Err(e) = move_into_place(source, &destination) {
        report(progress, format!("\tFailed to move {}: {}", source.display(), e));
        return Ok(TrackOutcome::Failed);
    }

    match write_sidecars(layout, track, &options.sidecars) {
        Ok(written) => {
            for path in written {
                report(progress, format!("\tCreated {}.", display_name(&path)));
            }
        }
        Err(e) => log::warn!("Failed to write sidecar files for {}: {}", track.title, e),
    }

    Ok(TrackOutcome::Organized)
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{elapsed_precise} [{bar:40.cyan/blue}] {pos}/{len} tracks {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    progress
}

/// Prints a status line above the progress bar.
fn report(progress: &ProgressBar, line: String) {
    progress.suspend(|| println!("{}", line));
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::{ApiError, HttpReply, MockHttpTransport, MockTokenProvider};
    use crate::configuration::SidecarOptions;
    use crate::foundation::cache::MemoryCacheStore;
    use crate::process::embed::tests::fixture;
    use lofty::config::ParseOptions;
    use lofty::file::AudioFile;
    use lofty::ogg::OpusFile;
    use serde_json::{json, Value};
    use std::fs::File;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    fn track_json(name: &str, number: u32, duration_ms: u64) -> Value {
        json!({
            "attributes": {
                "name": name,
                "artistName": "Daft Punk",
                "genreNames": ["Electronic"],
                "durationInMillis": duration_ms,
                "trackNumber": number,
                "discNumber": 1,
                "releaseDate": "2013-05-17"
            }
        })
    }

    fn album_reply(tracks: Vec<Value>) -> HttpReply {
        HttpReply {
            status: 200,
            body: Some(json!({
                "data": [{
                    "attributes": {
                        "name": "Random Access Memories",
                        "artistName": "Daft Punk",
                        "releaseDate": "2013-05-17",
                        "copyright": "℗ 2013 Daft Life Limited",
                        "recordLabel": "Columbia",
                        "trackCount": 13,
                        "artwork": { "url": "https://example.com/{w}x{h}bb.jpg" },
                        "playParams": { "kind": "album" },
                        "isSingle": false
                    },
                    "relationships": { "tracks": { "data": tracks } }
                }]
            })),
        }
    }

    fn token_provider() -> MockTokenProvider {
        let mut tokens = MockTokenProvider::new();
        tokens
            .expect_bearer_token()
            .returning(|| Ok("token".to_string()));
        tokens
    }

    fn transport(reply: HttpReply) -> MockHttpTransport {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get_catalog()
            .times(1)
            .returning(move |_, _| Ok(reply.clone()));
        transport
            .expect_get_bytes()
            .returning(|_| Ok(fs::read(fixture("cover.jpg")).unwrap()));
        transport
    }

    /// Input directory holding fixture copies under the given names, plus an
    /// empty output directory.
    fn workspace(files: &[(&str, &str)]) -> (TempDir, GetOptions) {
        let temp_dir = tempdir().unwrap();
        let input = temp_dir.path().join("downloads");
        fs::create_dir(&input).unwrap();
        for (fixture_name, file_name) in files {
            fs::copy(fixture(fixture_name), input.join(file_name)).unwrap();
        }

        let options = GetOptions::new(input, "617154241", temp_dir.path().join("music"));
        (temp_dir, options)
    }

    fn album_dir(options: &GetOptions) -> PathBuf {
        options
            .output_directory
            .join("D")
            .join("Daft Punk")
            .join("Random Access Memories")
    }

    #[tokio::test]
    async fn test_tracks_are_tagged_and_organized() {
        let (_temp_dir, mut options) = workspace(&[
            ("silence.opus", "Get Lucky.opus"),
            ("silence.m4a", "contact.m4a"),
        ]);
        options.sidecars = SidecarOptions {
            lrc: Some("No Lyrics.".to_string()),
            txt: None,
        };

        let transport = transport(album_reply(vec![
            track_json("Give Life Back to Music", 1, 274_000),
            track_json("Get Lucky", 8, 3_000),
            track_json("Contact", 13, 4_900),
        ]));
        let cache = MemoryCacheStore::new();

        let summary = process_album(
            &options,
            &token_provider(),
            &transport,
            &cache,
            &CatalogEndpoints::default(),
        )
        .await
        .unwrap();

        assert_eq!(
            summary,
            RunSummary {
                organized: 2,
                not_found: 1,
                failed: 0
            }
        );

        let album_dir = album_dir(&options);
        let get_lucky = album_dir.join("08 Get Lucky.opus");
        assert!(get_lucky.is_file());
        assert!(album_dir.join("08 Get Lucky.lrc").is_file());
        assert!(album_dir.join("13 Contact.m4a").is_file());
        assert!(!album_dir.join("13 Contact.txt").exists());
        assert!(!options.directory.join("Get Lucky.opus").exists());
        assert!(!options.directory.join("contact.m4a").exists());

        let mut reader = File::open(&get_lucky).unwrap();
        let opus = OpusFile::read_from(&mut reader, ParseOptions::new()).unwrap();
        assert_eq!(opus.vorbis_comments().get("TRACKNUMBER"), Some("8"));
        assert_eq!(opus.vorbis_comments().get("TRACKTOTAL"), Some("13"));
        assert_eq!(opus.vorbis_comments().get("LABEL"), Some("Columbia"));

        assert!(cache.read_response("617154241").unwrap().is_some());
        assert!(cache.read_cover("617154241").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_track_filter_leaves_other_files() {
        let (_temp_dir, mut options) = workspace(&[
            ("silence.opus", "get lucky.opus"),
            ("silence.m4a", "contact.m4a"),
        ]);
        options.tracks = Some(vec![13]);

        let transport = transport(album_reply(vec![
            track_json("Get Lucky", 8, 3_000),
            track_json("Contact", 13, 3_000),
        ]));

        let summary = process_album(
            &options,
            &token_provider(),
            &transport,
            &MemoryCacheStore::new(),
            &CatalogEndpoints::default(),
        )
        .await
        .unwrap();

        assert_eq!(summary.organized, 1);
        assert!(album_dir(&options).join("13 Contact.m4a").is_file());
        assert!(options.directory.join("get lucky.opus").is_file());
    }

    #[tokio::test]
    async fn test_unsupported_container_stops_the_run() {
        let (_temp_dir, options) = workspace(&[("silence.wav", "get lucky.wav")]);
        let source = options.directory.join("get lucky.wav");
        let before = fs::read(&source).unwrap();

        let transport = transport(album_reply(vec![track_json("Get Lucky", 8, 3_000)]));

        let err = process_album(
            &options,
            &token_provider(),
            &transport,
            &MemoryCacheStore::new(),
            &CatalogEndpoints::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RunError::UnsupportedFormat(_)));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(fs::read(&source).unwrap(), before);
        assert!(!album_dir(&options).join("08 Get Lucky.wav").exists());
    }

    #[tokio::test]
    async fn test_failed_catalog_request_is_fatal() {
        let (_temp_dir, options) = workspace(&[]);

        let mut transport = MockHttpTransport::new();
        transport.expect_get_catalog().returning(|_, _| {
            Ok(HttpReply {
                status: 401,
                body: None,
            })
        });
        transport.expect_get_bytes().never();

        let err = process_album(
            &options,
            &token_provider(),
            &transport,
            &MemoryCacheStore::new(),
            &CatalogEndpoints::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            RunError::Api(ApiError::HttpFailure { status: 401 })
        ));
        assert_eq!(err.exit_code(), 1);
        assert!(!options.output_directory.exists());
    }
}
