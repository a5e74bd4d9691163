use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use application::scope::CallScope;
use driver::database::PostgresDatabase;
use kernel::interface::normalize::{DependOnUrlNormalizer, StandardUrlNormalizer};
use kernel::KernelError;
use vodca::References;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppModule(Arc<Handler>);

impl AppModule {
    pub async fn new(config: &ServerConfig) -> error_stack::Result<Self, KernelError> {
        Ok(Self::from(Handler::init(config).await?))
    }
}

impl From<Handler> for AppModule {
    fn from(handler: Handler) -> Self {
        Self(Arc::new(handler))
    }
}

impl Deref for AppModule {
    type Target = Handler;
    fn deref(&self) -> &Self::Target {
        Deref::deref(&self.0)
    }
}

#[derive(References)]
pub struct Handler {
    pgpool: PostgresDatabase,
    normalizer: StandardUrlNormalizer,
    request_timeout: Duration,
}

impl Handler {
    pub async fn init(config: &ServerConfig) -> error_stack::Result<Self, KernelError> {
        let pgpool = PostgresDatabase::new().await?;
        Ok(Self::new(pgpool, config))
    }

    pub fn new(pgpool: PostgresDatabase, config: &ServerConfig) -> Self {
        Self {
            pgpool,
            normalizer: StandardUrlNormalizer::new(config.canonical_host.clone()),
            request_timeout: config.request_timeout,
        }
    }

    /// Deadline applied to every store-touching request.
    pub fn scope(&self) -> CallScope {
        CallScope::with_timeout(self.request_timeout)
    }
}

impl DependOnUrlNormalizer for Handler {
    type UrlNormalizer = StandardUrlNormalizer;
    fn url_normalizer(&self) -> &Self::UrlNormalizer {
        &self.normalizer
    }
}
