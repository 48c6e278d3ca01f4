use std::sync::Arc;

use crate::dictionaries::ReferenceDictionaries;
use crate::providers::{DataFetcher, Geocoder, LanguageAnalyzer};
use crate::resolver::{LocationResolver, ResolverSettings};

pub const DEFAULT_MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone, Copy)]
pub struct DialogueSettings {
    pub max_retries: u32,
    pub resolver: ResolverSettings,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            resolver: ResolverSettings::default(),
        }
    }
}

/// Read-only dependencies shared by every dialogue session.
pub struct AssistantService {
    dictionaries: Arc<ReferenceDictionaries>,
    analyzer: Arc<dyn LanguageAnalyzer>,
    resolver: LocationResolver,
    fetcher: Arc<dyn DataFetcher>,
    max_retries: u32,
}

impl AssistantService {
    pub fn new(
        dictionaries: Arc<ReferenceDictionaries>,
        analyzer: Arc<dyn LanguageAnalyzer>,
        geocoder: Arc<dyn Geocoder>,
        fetcher: Arc<dyn DataFetcher>,
        settings: DialogueSettings,
    ) -> Self {
        let resolver = LocationResolver::new(Arc::clone(&dictionaries), geocoder, settings.resolver);

        Self {
            dictionaries,
            analyzer,
            resolver,
            fetcher,
            max_retries: settings.max_retries,
        }
    }

    pub fn dictionaries(&self) -> &ReferenceDictionaries {
        &self.dictionaries
    }

    pub fn analyzer(&self) -> &dyn LanguageAnalyzer {
        self.analyzer.as_ref()
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    pub fn fetcher(&self) -> &dyn DataFetcher {
        self.fetcher.as_ref()
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}
