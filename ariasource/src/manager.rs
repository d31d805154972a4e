//! Ownership and lifecycle of the registered streaming backends

use std::sync::Arc;
use std::sync::RwLock;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::service::MusicService;

/// Owns every service instance for the process lifetime, tracks which are
/// enabled, and selects the current default.
///
/// Exactly one service is current at a time. When the configured default
/// fails to initialize, current switches to the fallback service — an
/// explicit construction parameter, fixed for the manager's lifetime.
/// Registration order is preserved; the URL handler dispatches in that
/// order.
pub struct ServiceManager {
    services: IndexMap<&'static str, Arc<dyn MusicService>>,
    current: RwLock<&'static str>,
    fallback: &'static str,
}

impl ServiceManager {
    pub fn new(
        services: Vec<Arc<dyn MusicService>>,
        default_service: &str,
        fallback_service: &str,
    ) -> Result<Self> {
        let services: IndexMap<&'static str, Arc<dyn MusicService>> =
            services.into_iter().map(|s| (s.key(), s)).collect();

        let current = services
            .get_key_value(default_service)
            .map(|(key, _)| *key)
            .ok_or_else(|| Error::ServiceNotFound(default_service.to_string()))?;
        let fallback = services
            .get_key_value(fallback_service)
            .map(|(key, _)| *key)
            .ok_or_else(|| Error::ServiceNotFound(fallback_service.to_string()))?;

        Ok(Self {
            services,
            current: RwLock::new(current),
            fallback,
        })
    }

    /// The currently selected default service
    pub fn current(&self) -> Arc<dyn MusicService> {
        let key = *self.current.read().unwrap();
        self.services[key].clone()
    }

    pub fn current_key(&self) -> &'static str {
        *self.current.read().unwrap()
    }

    pub fn fallback_key(&self) -> &'static str {
        self.fallback
    }

    pub fn get(&self, key: &str) -> Result<Arc<dyn MusicService>> {
        self.services
            .get(key)
            .cloned()
            .ok_or_else(|| Error::ServiceNotFound(key.to_string()))
    }

    /// All services in registration order
    pub fn services(&self) -> impl Iterator<Item = (&'static str, &Arc<dyn MusicService>)> {
        self.services.iter().map(|(key, service)| (*key, service))
    }

    /// Services meant to be shown to the user
    pub fn visible_services(&self) -> Vec<Arc<dyn MusicService>> {
        self.services
            .values()
            .filter(|service| !service.is_hidden())
            .cloned()
            .collect()
    }

    /// Initialize every enabled service.
    ///
    /// A service-level failure disables that service, records the error
    /// message, and — when the failed service was the current default —
    /// switches current to the fallback. Other services keep
    /// initializing. Unexpected errors propagate.
    pub async fn initialize(&self) -> Result<()> {
        debug!("Initializing services");
        for (key, service) in &self.services {
            if !service.status().is_enabled() {
                continue;
            }
            match service.initialize().await {
                Ok(()) => {}
                Err(err) if err.is_service_error() => {
                    warn!(service = *key, error = %err, "Service failed to initialize");
                    service.status().disable(err.to_string());
                    let mut current = self.current.write().unwrap();
                    if *current == *key {
                        *current = self.fallback;
                    }
                }
                Err(err) => return Err(err),
            }
        }
        debug!("Services have been initialized");
        Ok(())
    }

    /// Start every enabled service; any failure here is fatal to the
    /// whole process
    pub async fn run(&self) -> Result<()> {
        debug!("Running services");
        for (_, service) in &self.services {
            if service.status().is_enabled() {
                service.run().await?;
            }
        }
        debug!("Services have been started");
        Ok(())
    }

    /// Close every service unconditionally
    pub async fn close(&self) {
        debug!("Closing services");
        for (_, service) in &self.services {
            service.close().await;
        }
        debug!("Services have been closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InitReply, MockService};
    use std::sync::atomic::Ordering;

    fn manager_with(
        services: Vec<Arc<MockService>>,
        default_service: &str,
        fallback_service: &str,
    ) -> ServiceManager {
        let services = services
            .into_iter()
            .map(|s| s as Arc<dyn MusicService>)
            .collect();
        ServiceManager::new(services, default_service, fallback_service).unwrap()
    }

    #[test]
    fn unknown_default_service_is_rejected() {
        let services: Vec<Arc<dyn MusicService>> = vec![Arc::new(MockService::new("a"))];
        assert!(matches!(
            ServiceManager::new(services, "nope", "a"),
            Err(Error::ServiceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn failed_default_switches_current_to_fallback() {
        let a = Arc::new(MockService::new("a").with_init(InitReply::ServiceError));
        let b = Arc::new(MockService::new("b"));
        let manager = manager_with(vec![a.clone(), b.clone()], "a", "b");

        manager.initialize().await.unwrap();

        assert_eq!(manager.current_key(), "b");
        assert!(!a.status().is_enabled());
        assert!(a.status().warning().is_some());
        assert_eq!(b.init_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_non_default_keeps_current() {
        let a = Arc::new(MockService::new("a"));
        let b = Arc::new(MockService::new("b").with_init(InitReply::ServiceError));
        let manager = manager_with(vec![a, b.clone()], "a", "a");

        manager.initialize().await.unwrap();

        assert_eq!(manager.current_key(), "a");
        assert!(!b.status().is_enabled());
    }

    #[tokio::test]
    async fn disabled_services_are_not_initialized() {
        let a = Arc::new(MockService::new("a"));
        let b = Arc::new(MockService::new("b").disabled());
        let manager = manager_with(vec![a.clone(), b.clone()], "a", "a");

        manager.initialize().await.unwrap();

        assert_eq!(a.init_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.init_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unexpected_init_error_propagates() {
        let a = Arc::new(MockService::new("a").with_init(InitReply::Unexpected));
        let manager = manager_with(vec![a], "a", "a");
        assert!(manager.initialize().await.is_err());
    }

    #[tokio::test]
    async fn run_starts_enabled_services_and_close_reaches_all() {
        let a = Arc::new(MockService::new("a"));
        let b = Arc::new(MockService::new("b").disabled());
        let manager = manager_with(vec![a.clone(), b.clone()], "a", "a");

        manager.run().await.unwrap();
        assert!(a.ran.load(Ordering::SeqCst));
        assert!(!b.ran.load(Ordering::SeqCst));

        manager.close().await;
        assert!(a.closed.load(Ordering::SeqCst));
        assert!(b.closed.load(Ordering::SeqCst));
    }
}
