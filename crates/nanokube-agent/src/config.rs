//! Startup configuration for the node agent bin. Follows the same
//! `Config`/`Opts` split as `nanokube-apiserver::config` and
//! `nanokube-scheduler::config`, but `NODE_NAME`/`NODE_IP` are required:
//! per spec.md §6, an agent with no identity has nothing to register.

use std::net::IpAddr;

use crate::error::AgentError;

const DEFAULT_AGENT_PORT: u16 = 8081;

#[derive(Clone, Debug)]
pub struct Config {
    pub node_name: String,
    pub node_ip: String,
    pub api_host: String,
    pub api_port: u16,
    /// Bind address for the local debugging surface (**[ADDED]**, not part
    /// of spec.md §6's documented environment variables).
    pub agent_addr: IpAddr,
    pub agent_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, AgentError> {
        let node_name =
            std::env::var("NODE_NAME").map_err(|_| AgentError::MissingEnv("NODE_NAME".to_string()))?;
        let node_ip = std::env::var("NODE_IP").map_err(|_| AgentError::MissingEnv("NODE_IP".to_string()))?;
        let api_host = std::env::var("API_HOST").unwrap_or_else(|_| "localhost".to_string());
        let api_port = std::env::var("API_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);
        let agent_addr = std::env::var("AGENT_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| "0.0.0.0".parse().expect("hardcoded address parses"));
        let agent_port = std::env::var("AGENT_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_AGENT_PORT);
        Ok(Config {
            node_name,
            node_ip,
            api_host,
            api_port,
            agent_addr,
            agent_port,
        })
    }

    /// `structopt`'s own required-argument handling already exits with
    /// code 2 and a usage message when `NODE_NAME`/`NODE_IP` are absent, so
    /// unlike [`Config::from_env`] this never needs to return a `Result`.
    #[cfg(feature = "cli")]
    pub fn new_from_flags() -> Self {
        use structopt::StructOpt;
        let opts = Opts::from_args();
        Config {
            node_name: opts.node_name,
            node_ip: opts.node_ip,
            api_host: opts.api_host,
            api_port: opts.api_port,
            agent_addr: opts.agent_addr,
            agent_port: opts.agent_port,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(structopt::StructOpt, Clone, Debug)]
#[structopt(name = "nanokube-agent", about = "The nanokube per-node Pod reconciler")]
struct Opts {
    #[structopt(long, env = "NODE_NAME")]
    node_name: String,

    #[structopt(long, env = "NODE_IP")]
    node_ip: String,

    #[structopt(long, env = "API_HOST", default_value = "localhost")]
    api_host: String,

    #[structopt(long, env = "API_PORT", default_value = "8080")]
    api_port: u16,

    #[structopt(long, env = "AGENT_ADDR", default_value = "0.0.0.0")]
    agent_addr: IpAddr,

    #[structopt(long, env = "AGENT_PORT", default_value = "8081")]
    agent_port: u16,
}
