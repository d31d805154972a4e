/// A playlist as listed by a backend.
///
/// Only identity and display data; tracks are fetched separately through
/// the owning service's URL grammar.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub track_count: Option<u32>,
    pub owner_id: Option<String>,
}
