use log::debug;
use std::collections::HashMap;

use super::{LoginHandler, YouTubeLoginHandler};

/// Registry mapping normalized site keys to login handlers.
///
/// Populated once at startup; lookups are pure and side-effect free. Adding
/// support for a new site means implementing [`LoginHandler`] and
/// registering it here — nothing else in the flow changes.
pub struct LoginHandlerRegistry {
    handlers: HashMap<String, Box<dyn LoginHandler>>,
}

impl LoginHandlerRegistry {
    /// An empty registry, for callers that assemble their own handler set.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry with the built-in handlers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(YouTubeLoginHandler::new()));
        registry
    }

    pub fn register(&mut self, handler: Box<dyn LoginHandler>) {
        let site = handler.site_name().to_string();
        debug!("registered login handler for {}", site);
        self.handlers.insert(site, handler);
    }

    pub fn handler_for(&self, site: &str) -> Option<&dyn LoginHandler> {
        self.handlers
            .get(&site.trim().to_lowercase())
            .map(|h| h.as_ref())
    }

    pub fn supported_sites(&self) -> Vec<String> {
        let mut sites: Vec<String> = self.handlers.keys().cloned().collect();
        sites.sort();
        sites
    }

    pub fn is_supported(&self, site: &str) -> bool {
        self.handlers.contains_key(&site.trim().to_lowercase())
    }
}

impl Default for LoginHandlerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
