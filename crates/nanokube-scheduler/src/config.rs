//! Startup configuration for the scheduler bin, following the same
//! `Config`/`Opts` split as `nanokube-apiserver::config`.

#[derive(Clone, Debug)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_host: "localhost".to_string(),
            api_port: 8080,
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
        config
    }

    #[cfg(feature = "cli")]
    pub fn new_from_flags() -> Self {
        use structopt::StructOpt;
        let opts = Opts::from_args();
        Config {
            api_host: opts.api_host,
            api_port: opts.api_port,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(structopt::StructOpt, Clone, Debug)]
#[structopt(name = "nanokube-scheduler", about = "The nanokube pod placement loop")]
struct Opts {
    #[structopt(long, env = "API_HOST", default_value = "localhost")]
    api_host: String,

    #[structopt(long, env = "API_PORT", default_value = "8080")]
    api_port: u16,
}
