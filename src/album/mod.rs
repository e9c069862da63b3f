//! Display model of the collection.

mod filter;
mod format;

pub use filter::AlbumFilter;
pub use format::{
    format_album, format_albums, simplify_artist_name, simplify_title, FormattedAlbum, Track,
    Video,
};
