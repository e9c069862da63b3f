//! Wire models for the Discogs collection and master endpoints.
//!
//! Only the fields the pipeline reads are required; everything else is
//! defaulted so that partial payloads (and older cached documents) still decode.

use serde::{Deserialize, Serialize};

/// Envelope returned by the collection endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectionPage {
    pub releases: Vec<RawRelease>,
}

/// One entry of the user's collection.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawRelease {
    pub id: u64,
    #[serde(default)]
    pub instance_id: Option<u64>,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub folder_id: Option<u64>,
    pub basic_information: BasicInformation,
}

impl RawRelease {
    /// Master data reference, ignoring the empty strings Discogs sends for
    /// releases that have no master.
    pub fn master_url(&self) -> Option<&str> {
        self.basic_information
            .master_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BasicInformation {
    pub id: u64,
    pub master_id: Option<u64>,
    pub master_url: Option<String>,
    pub resource_url: String,
    pub thumb: String,
    pub cover_image: String,
    pub title: String,
    pub year: i32,
    pub formats: Vec<RawFormat>,
    pub labels: Vec<RawLabel>,
    pub artists: Vec<RawArtist>,
    pub genres: Vec<String>,
    pub styles: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawFormat {
    pub name: String,
    pub qty: String,
    pub text: Option<String>,
    pub descriptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawLabel {
    pub name: String,
    pub catno: String,
    pub entity_type: String,
    pub entity_type_name: String,
    pub id: u64,
    pub resource_url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawArtist {
    pub name: String,
    pub anv: String,
    pub join: String,
    pub role: String,
    pub tracks: String,
    pub id: u64,
    pub resource_url: String,
}

/// Supplementary data of the master release a collection entry belongs to.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawMasterData {
    pub id: u64,
    pub main_release: Option<u64>,
    pub resource_url: String,
    pub uri: String,
    pub title: String,
    /// Year the master was first released, as opposed to the printed year of
    /// the pressing in the collection.
    pub year: i32,
    pub genres: Vec<String>,
    pub styles: Option<Vec<String>>,
    pub tracklist: Vec<RawTrack>,
    pub videos: Vec<RawVideo>,
    pub notes: Option<String>,
    pub data_quality: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawTrack {
    pub position: String,
    pub type_: String,
    pub title: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawVideo {
    pub uri: String,
    pub title: String,
    pub description: String,
    pub duration: u32,
    pub embed: bool,
}

/// A collection entry merged with its master data. This is the document
/// persisted in the album store.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnrichedRelease {
    #[serde(flatten)]
    pub release: RawRelease,
    #[serde(rename = "masterData", default)]
    pub master_data: Option<RawMasterData>,
}

impl EnrichedRelease {
    pub fn new(release: RawRelease, master_data: Option<RawMasterData>) -> Self {
        Self {
            release,
            master_data,
        }
    }

    pub fn id(&self) -> u64 {
        self.release.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELEASE_JSON: &str = r#"{
        "id": 2,
        "instance_id": 99,
        "date_added": "2021-03-01T10:00:00-08:00",
        "rating": 0,
        "folder_id": 1,
        "basic_information": {
            "id": 2,
            "master_id": 24047,
            "master_url": "https://api.discogs.com/masters/24047",
            "resource_url": "https://api.discogs.com/releases/2",
            "thumb": "https://img/thumb.jpg",
            "cover_image": "https://img/cover.jpg",
            "title": "Abbey Road",
            "year": 1987,
            "formats": [{"name": "Vinyl", "qty": "1", "descriptions": ["LP", "Album"]}],
            "labels": [{"name": "Apple", "catno": "PCS 7088", "entity_type": "1", "entity_type_name": "Label", "id": 25, "resource_url": "x"}],
            "artists": [{"name": "The Beatles", "anv": "", "join": "", "role": "", "tracks": "", "id": 82730, "resource_url": "y"}],
            "genres": ["Rock"],
            "styles": ["Pop Rock"]
        }
    }"#;

    #[test]
    fn test_decode_release() {
        let release: RawRelease = serde_json::from_str(RELEASE_JSON).unwrap();
        assert_eq!(release.id, 2);
        assert_eq!(release.basic_information.title, "Abbey Road");
        assert_eq!(release.basic_information.artists[0].name, "The Beatles");
        assert_eq!(release.basic_information.formats[0].qty, "1");
        assert_eq!(
            release.master_url(),
            Some("https://api.discogs.com/masters/24047")
        );
    }

    #[test]
    fn test_master_url_absent_or_empty() {
        let mut release: RawRelease = serde_json::from_str(RELEASE_JSON).unwrap();
        release.basic_information.master_url = None;
        assert_eq!(release.master_url(), None);

        release.basic_information.master_url = Some(String::new());
        assert_eq!(release.master_url(), None);
    }

    #[test]
    fn test_decode_partial_master_data() {
        let master: RawMasterData =
            serde_json::from_str(r#"{"year": 1969, "tracklist": [], "videos": []}"#).unwrap();
        assert_eq!(master.year, 1969);
        assert!(master.tracklist.is_empty());
        assert!(master.videos.is_empty());
    }

    #[test]
    fn test_enriched_release_document_shape() {
        let release: RawRelease = serde_json::from_str(RELEASE_JSON).unwrap();
        let enriched = EnrichedRelease::new(
            release,
            Some(RawMasterData {
                year: 1969,
                ..Default::default()
            }),
        );

        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(value["id"], 2);
        assert_eq!(value["basic_information"]["title"], "Abbey Road");
        assert_eq!(value["masterData"]["year"], 1969);

        let decoded: EnrichedRelease = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, enriched);
    }

    #[test]
    fn test_enriched_release_without_master_data_key() {
        let enriched: EnrichedRelease = serde_json::from_str(RELEASE_JSON).unwrap();
        assert_eq!(enriched.id(), 2);
        assert!(enriched.master_data.is_none());
    }
}
