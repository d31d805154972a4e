use std::fmt;
use std::sync::Arc;

use crate::service::MusicService;

/// Immutable artist value: a name, an optional backend id and an optional
/// back-reference to the owning service (lookup only, never ownership).
#[derive(Clone, Default)]
pub struct Artist {
    pub name: String,
    pub id: Option<String>,
    pub service: Option<Arc<dyn MusicService>>,
}

impl Artist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            service: None,
        }
    }

    pub fn with_id(
        name: impl Into<String>,
        id: impl Into<String>,
        service: Option<Arc<dyn MusicService>>,
    ) -> Self {
        Self {
            name: name.into(),
            id: Some(id.into()),
            service,
        }
    }
}

impl fmt::Debug for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artist")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("service", &self.service.as_ref().map(|s| s.key()))
            .finish()
    }
}
