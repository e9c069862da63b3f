//! Mapping of stored album documents to the display model, and the fixed
//! ordering of the collection.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::warn;

use crate::discogs::EnrichedRelease;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedAlbum {
    pub id: u64,
    pub artist: String,
    pub title: String,
    pub printed_year: i32,
    pub released_year: Option<i32>,
    pub thumbnail: String,
    pub cover_image: String,
    pub format: String,
    pub number_of_discs: String,
    pub label: String,
    pub label_category_number: String,
    pub genres: Vec<String>,
    pub tracks: Vec<Track>,
    pub videos: Vec<Video>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub position: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub url: String,
    pub title: String,
}

/// Map a single record. Only the first artist, format and label are shown;
/// a record missing any of them gets empty strings for those fields.
pub fn format_album(record: &EnrichedRelease) -> FormattedAlbum {
    let info = &record.release.basic_information;

    let artist = info.artists.first();
    let format = info.formats.first();
    let label = info.labels.first();
    if artist.is_none() || format.is_none() || label.is_none() {
        warn!(
            "Release {} is missing artist, format or label information",
            record.id()
        );
    }

    let (tracks, videos) = match &record.master_data {
        Some(master) => (
            master
                .tracklist
                .iter()
                .map(|track| Track {
                    title: track.title.clone(),
                    position: track.position.clone(),
                    duration: track.duration.clone(),
                })
                .collect(),
            master
                .videos
                .iter()
                .map(|video| Video {
                    url: video.uri.clone(),
                    title: video.title.clone(),
                })
                .collect(),
        ),
        None => (vec![], vec![]),
    };

    FormattedAlbum {
        id: record.id(),
        artist: artist.map(|a| a.name.clone()).unwrap_or_default(),
        title: info.title.clone(),
        printed_year: info.year,
        released_year: record.master_data.as_ref().map(|master| master.year),
        thumbnail: info.thumb.clone(),
        cover_image: info.cover_image.clone(),
        format: format.map(|f| f.name.clone()).unwrap_or_default(),
        number_of_discs: format.map(|f| f.qty.clone()).unwrap_or_default(),
        label: label.map(|l| l.name.clone()).unwrap_or_default(),
        label_category_number: label.map(|l| l.catno.clone()).unwrap_or_default(),
        genres: info.genres.clone(),
        tracks,
        videos,
    }
}

/// Map every record and sort the result.
///
/// Ordering: simplified artist name ascending, then released year ascending
/// (unknown counts as 0), then simplified title descending. Albums equal on
/// all three keys keep their input order.
pub fn format_albums(records: &[EnrichedRelease]) -> Vec<FormattedAlbum> {
    let mut albums: Vec<FormattedAlbum> = records.iter().map(format_album).collect();
    // sort_by_cached_key is stable.
    albums.sort_by_cached_key(|album| {
        (
            simplify_artist_name(&album.artist),
            album.released_year.unwrap_or(0),
            Reverse(simplify_title(&album.title)),
        )
    });
    albums
}

/// Upper-case the name, drop every "THE" substring and trim.
///
/// The substring is removed anywhere, including inside words
/// ("OTHELLO" becomes "OLLO").
pub fn simplify_artist_name(name: &str) -> String {
    name.to_uppercase().replace("THE", "").trim().to_string()
}

/// Lower-case the title and drop every "the" substring.
pub fn simplify_title(title: &str) -> String {
    title.to_lowercase().replace("the", "")
}
