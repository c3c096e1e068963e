use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// wxtoken - WeChat access token and jsapi ticket relay
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// WeChat appid
    #[arg(long, env = "WXTOKEN_APPID", default_value = "")]
    pub app_id: String,

    /// WeChat appsecret
    #[arg(long, env = "WXTOKEN_APPSECRET", default_value = "", hide_env_values = true)]
    pub app_secret: String,

    /// Listen address; a bare ":port" listens on all interfaces
    #[arg(short, long, env = "WXTOKEN_ADDR", default_value = ":3001")]
    pub addr: String,

    /// Base URL of the WeChat API
    #[arg(long, env = "WXTOKEN_API_BASE", default_value = "https://api.weixin.qq.com")]
    pub api_base: String,

    /// Seconds to wait before retrying a failed refresh
    #[arg(long, env = "WXTOKEN_RETRY_INTERVAL", default_value = "1")]
    pub retry_interval: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "WXTOKEN_HTTP_TIMEOUT", default_value = "30")]
    pub http_timeout: u64,

    /// HTTP connect timeout in seconds
    #[arg(long, env = "WXTOKEN_CONNECT_TIMEOUT", default_value = "10")]
    pub connect_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Provider credentials
    pub app_id: String,
    pub app_secret: String,
    pub api_base: String,

    // Server settings
    pub addr: String,

    // Refresh
    pub retry_interval: Duration,

    // HTTP client
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,

    // Logging
    pub log_level: String,
}

impl Config {
    /// Load configuration with priority: CLI > ENV (.env included) > defaults
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self::from_args(CliArgs::parse()))
    }

    pub fn from_args(args: CliArgs) -> Self {
        Config {
            app_id: args.app_id,
            app_secret: args.app_secret,
            api_base: args.api_base,
            addr: args.addr,
            retry_interval: Duration::from_secs(args.retry_interval),
            http_connect_timeout: args.connect_timeout,
            http_request_timeout: args.http_timeout,
            log_level: args.log_level,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;

        if self.retry_interval.is_zero() {
            anyhow::bail!("WXTOKEN_RETRY_INTERVAL must be at least 1 second");
        }

        if self.app_id.is_empty() || self.app_secret.is_empty() {
            tracing::warn!(
                "WXTOKEN_APPID or WXTOKEN_APPSECRET is empty, token refresh will keep failing"
            );
        }

        Ok(())
    }

    /// Socket address to bind
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_listen_addr(&self.addr)
    }
}

/// Parse a listen address, treating a missing host as all interfaces
fn parse_listen_addr(addr: &str) -> Result<SocketAddr> {
    let full = if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    };

    full.parse()
        .with_context(|| format!("Invalid listen address: {}", addr))
}
