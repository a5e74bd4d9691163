use std::str::FromStr;
use std::time::Duration;

use error_stack::ResultExt;
use kernel::interface::normalize::DEFAULT_CANONICAL_HOST;
use kernel::KernelError;

static SERVER_PORT: &str = "SERVER_PORT";
static REQUEST_TIMEOUT_MS: &str = "REQUEST_TIMEOUT_MS";
static CANONICAL_HOST: &str = "CANONICAL_HOST";

const DEFAULT_PORT: u16 = 4748;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub request_timeout: Duration,
    pub canonical_host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            canonical_host: DEFAULT_CANONICAL_HOST.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> error_stack::Result<Self, KernelError> {
        let defaults = Self::default();
        let port = parse_var::<u16>(SERVER_PORT)?.unwrap_or(defaults.port);
        let request_timeout = parse_var::<u64>(REQUEST_TIMEOUT_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.request_timeout);
        let canonical_host = driver::env_opt(CANONICAL_HOST)?
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .unwrap_or(defaults.canonical_host);
        Ok(Self {
            port,
            request_timeout,
            canonical_host,
        })
    }
}

fn parse_var<T>(key: &str) -> error_stack::Result<Option<T>, KernelError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    driver::env_opt(key)?
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .change_context(KernelError::Internal)
                .attach_printable_lazy(|| format!("Invalid value {value:?} for {key}"))
        })
        .transpose()
}
