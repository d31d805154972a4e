//! # AriaMusic
//!
//! The application facade wiring configuration, engine, player, services
//! and URL dispatch together.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ariamusic::Aria;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Arc::new(ariaconfig::Config::load_config("")?);
//! let aria = Aria::new(config).await?;
//! aria.initialize().await?;
//! aria.run().await?;
//!
//! let tracks = aria.get_tracks_from_url("https://music.yandex.ru/album/1193829").await?;
//! aria.player().play(Some(tracks), None).await?;
//! # Ok(())
//! # }
//! ```

pub mod config_ext;

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use ariaconfig::Config;
use ariaengine::MpvEngine;
use ariaplayer::{Player, PlayerConfigExt};
use ariasource::{MusicService, ServiceManager, Track, UrlHandler};
use ariavk::VkService;
use ariayam::YamService;
use ariayt::YtService;

pub use config_ext::{EngineConfigExt, ServicesConfigExt};

/// The assembled application: engine-backed player, service manager and
/// URL dispatch, all built from one [`Config`].
pub struct Aria {
    config: Arc<Config>,
    player: Arc<Player>,
    service_manager: Arc<ServiceManager>,
    url_handler: UrlHandler,
}

impl Aria {
    /// Spawn the engine and wire every component together.
    ///
    /// The engine process starts here; nothing touches the network until
    /// [`Aria::initialize`].
    pub async fn new(config: Arc<Config>) -> Result<Self> {
        let engine = Arc::new(
            MpvEngine::spawn(
                &config.engine_binary(),
                &config.engine_socket_path(),
                &config.engine_options(),
            )
            .await?,
        );
        let player = Arc::new(Player::new(config.player_settings(), engine));

        let services: Vec<Arc<dyn MusicService>> = vec![
            Arc::new(VkService::new(&config)),
            Arc::new(YamService::new(&config)),
            Arc::new(YtService::new(&config)),
        ];
        let service_manager = Arc::new(ServiceManager::new(
            services,
            &config.default_service(),
            &config.fallback_service(),
        )?);
        let url_handler = UrlHandler::new(service_manager.clone());

        Ok(Self {
            config,
            player,
            service_manager,
            url_handler,
        })
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn player(&self) -> &Arc<Player> {
        &self.player
    }

    pub fn service_manager(&self) -> &Arc<ServiceManager> {
        &self.service_manager
    }

    /// Initialize the player and every enabled service; failed services
    /// are logged and disabled, not fatal
    pub async fn initialize(&self) -> Result<()> {
        info!("Initializing Aria");
        self.player.initialize().await;
        self.service_manager.initialize().await?;
        for service in self.service_manager.visible_services() {
            if let Some(warning) = service.status().warning() {
                warn!(service = service.key(), "{warning}");
            }
        }
        info!("Aria was initialized");
        Ok(())
    }

    /// Start the player event loop and the services; service failures
    /// here are fatal
    pub async fn run(&self) -> Result<()> {
        info!("Running Aria");
        self.player.clone().run();
        self.service_manager.run().await?;
        info!("Aria was started");
        Ok(())
    }

    pub async fn close(&self) -> Result<()> {
        info!("Closing Aria");
        self.player.close().await?;
        self.service_manager.close().await;
        info!("Aria was closed");
        Ok(())
    }

    /// Resolve a URL into tracks through the service dispatch
    pub async fn get_tracks_from_url(&self, url: &str) -> ariasource::Result<Vec<Track>> {
        self.url_handler.get_tracks(url).await
    }

    /// Free-text search on the current service, or on a specific one
    pub async fn search(
        &self,
        query: &str,
        service_key: Option<&str>,
    ) -> ariasource::Result<Vec<Track>> {
        let service = match service_key {
            Some(key) => self.service_manager.get(key)?,
            None => self.service_manager.current(),
        };
        if !service.status().is_enabled() {
            return Err(ariasource::Error::ServiceIsDisabled(
                service.key().to_string(),
            ));
        }
        service
            .search(query, Default::default(), Default::default())
            .await
    }

    /// User-facing services
    pub fn services(&self) -> Vec<Arc<dyn MusicService>> {
        self.service_manager.visible_services()
    }
}
