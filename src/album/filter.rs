use super::FormattedAlbum;

/// Free-text filter applied to the formatted collection.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumFilter {
    pub query: String,
    pub include_tracks: bool,
}

impl Default for AlbumFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            include_tracks: true,
        }
    }
}

impl AlbumFilter {
    pub fn new(query: impl Into<String>, include_tracks: bool) -> Self {
        Self {
            query: query.into(),
            include_tracks,
        }
    }

    /// Only the empty string counts as no filter; whitespace is matched
    /// like any other text.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Case-insensitive substring match on artist and title, and on track
    /// titles when `include_tracks` is set.
    pub fn matches(&self, album: &FormattedAlbum) -> bool {
        if self.is_empty() {
            return true;
        }
        let needle = self.query.to_lowercase();
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

        contains(&album.artist)
            || contains(&album.title)
            || (self.include_tracks && album.tracks.iter().any(|track| contains(&track.title)))
    }

    /// Keep the matching albums, preserving their order.
    pub fn apply(&self, albums: Vec<FormattedAlbum>) -> Vec<FormattedAlbum> {
        if self.is_empty() {
            return albums;
        }
        albums
            .into_iter()
            .filter(|album| self.matches(album))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::album::Track;

    fn album(id: u64, artist: &str, title: &str, tracks: &[&str]) -> FormattedAlbum {
        FormattedAlbum {
            id,
            artist: artist.to_string(),
            title: title.to_string(),
            printed_year: 0,
            released_year: None,
            thumbnail: String::new(),
            cover_image: String::new(),
            format: String::new(),
            number_of_discs: String::new(),
            label: String::new(),
            label_category_number: String::new(),
            genres: vec![],
            tracks: tracks
                .iter()
                .map(|title| Track {
                    title: title.to_string(),
                    position: String::new(),
                    duration: String::new(),
                })
                .collect(),
            videos: vec![],
        }
    }

    fn collection() -> Vec<FormattedAlbum> {
        vec![
            album(1, "The Beatles", "Abbey Road", &["Come Together", "Something"]),
            album(2, "Miles Davis", "Kind Of Blue", &["So What"]),
            album(3, "Nina Simone", "Pastel Blues", &["Sinnerman"]),
        ]
    }

    fn ids(albums: &[FormattedAlbum]) -> Vec<u64> {
        albums.iter().map(|a| a.id).collect()
    }

    #[test]
    fn empty_query_keeps_everything() {
        let filter = AlbumFilter::default();
        assert!(filter.is_empty());
        assert_eq!(ids(&filter.apply(collection())), vec![1, 2, 3]);
    }

    #[test]
    fn whitespace_is_part_of_the_query() {
        let blank = AlbumFilter::new("   ", false);
        assert!(!blank.is_empty());
        assert!(blank.apply(collection()).is_empty());

        assert_eq!(ids(&AlbumFilter::new(" road", false).apply(collection())), vec![1]);
        assert!(AlbumFilter::new(" abbey", false).apply(collection()).is_empty());
    }

    #[test]
    fn matches_artist_and_title_case_insensitively() {
        assert_eq!(ids(&AlbumFilter::new("BEATLES", false).apply(collection())), vec![1]);
        assert_eq!(ids(&AlbumFilter::new("blue", false).apply(collection())), vec![2, 3]);
    }

    #[test]
    fn track_titles_only_searched_when_enabled() {
        assert!(AlbumFilter::new("sinnerman", false)
            .apply(collection())
            .is_empty());
        assert_eq!(
            ids(&AlbumFilter::new("sinnerman", true).apply(collection())),
            vec![3]
        );
    }

    #[test]
    fn default_searches_tracks() {
        let filter = AlbumFilter {
            query: "so what".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(collection())), vec![2]);
    }
}
