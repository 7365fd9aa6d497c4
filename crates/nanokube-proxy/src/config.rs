//! Startup configuration for the proxy bin. Follows the same `Config`/
//! `Opts` split as the other binaries in this workspace.

use std::net::IpAddr;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    /// The address NodePort listeners bind to — normally this node's own
    /// `hostIP`. **[ADDED]**, not part of spec.md §6's documented
    /// environment variables.
    pub bind_ip: IpAddr,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_host: "localhost".to_string(),
            api_port: 8080,
            bind_ip: "0.0.0.0".parse().expect("hardcoded address parses"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Ok(host) = std::env::var("API_HOST") {
            config.api_host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            if let Ok(parsed) = port.parse() {
                config.api_port = parsed;
            }
        }
        if let Ok(addr) = std::env::var("PROXY_BIND_ADDR") {
            if let Ok(parsed) = addr.parse() {
                config.bind_ip = parsed;
            }
        }
        config
    }

    #[cfg(feature = "cli")]
    pub fn new_from_flags() -> Self {
        use structopt::StructOpt;
        let opts = Opts::from_args();
        Config {
            api_host: opts.api_host,
            api_port: opts.api_port,
            bind_ip: opts.bind_ip,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(structopt::StructOpt, Clone, Debug)]
#[structopt(name = "nanokube-proxy", about = "The nanokube NodePort load balancer")]
struct Opts {
    #[structopt(long, env = "API_HOST", default_value = "localhost")]
    api_host: String,

    #[structopt(long, env = "API_PORT", default_value = "8080")]
    api_port: u16,

    #[structopt(long, env = "PROXY_BIND_ADDR", default_value = "0.0.0.0")]
    bind_ip: IpAddr,
}
