//! Startup configuration for the API server bin. Follows the teacher's
//! `Config`/`Opts` split (`crates/kubelet/src/config.rs`): a plain struct
//! usable from tests via [`Config::from_env`], and — behind the `cli`
//! feature — a `structopt`-derived CLI layered with env-var fallbacks.

use std::net::IpAddr;

const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: IpAddr,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            addr: "0.0.0.0".parse().expect("hardcoded address parses"),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Builds a `Config` from environment variables, with the same
    /// defaults `new_from_flags` would fall back to. Used directly by
    /// tests and by the `cli`-less binary build.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Ok(port) = std::env::var("API_PORT") {
            if let Ok(parsed) = port.parse() {
                config.port = parsed;
            }
        }
        if let Ok(addr) = std::env::var("API_ADDR") {
            if let Ok(parsed) = addr.parse() {
                config.addr = parsed;
            }
        }
        config
    }

    #[cfg(feature = "cli")]
    pub fn new_from_flags() -> Self {
        use structopt::StructOpt;
        let opts = Opts::from_args();
        Config {
            addr: opts.addr,
            port: opts.port,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(structopt::StructOpt, Clone, Debug)]
#[structopt(name = "nanokube-apiserver", about = "The nanokube control plane API server")]
struct Opts {
    #[structopt(long, env = "API_ADDR", default_value = "0.0.0.0")]
    addr: IpAddr,

    #[structopt(long, env = "API_PORT", default_value = "8080")]
    port: u16,
}
