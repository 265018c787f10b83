//! The party configuration.

use basic_types::PartyRole;
use config::ConfigError;
use protocols::Seed;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use std::{net::SocketAddr, path::Path, time::Duration};

/// The main config type.
#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// This party's role.
    pub role: PartyRole,

    /// The network configuration.
    pub network: NetworkConfig,

    /// The seed both parties' triplet dealers replay.
    #[serde_as(as = "DisplayFromStr")]
    pub dealer_seed: Seed,

    /// The seeds each party shares its input with, indexed by role.
    ///
    /// The peer derives its share of an input from the owner's seed, so these must be agreed upon and
    /// must not be zero.
    #[serde_as(as = "[DisplayFromStr; 2]")]
    pub input_seeds: [Seed; 2],

    /// This party's input.
    pub input: InputConfig,

    /// The shape of the peer's input.
    pub peer_shape: Vec<usize>,

    /// The operation to run.
    ///
    /// Binary operations take the primary party's input on the left and the secondary party's input on
    /// the right. Unary operations take the primary party's input.
    pub operation: Operation,
}

impl Config {
    /// Load the configuration from a path.
    ///
    /// Any of the configuration properties can also be overridden by using environment variables, e.g.
    /// `NETWORK__PEER_ADDRESS=10.0.0.2:7100`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = config::File::from(path).format(config::FileFormat::Yaml);
        let config = config::Config::builder()
            .add_source(source)
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        config.try_deserialize()
    }
}

/// The network configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct NetworkConfig {
    /// The address the primary party listens on.
    pub listen_address: Option<SocketAddr>,

    /// The address the secondary party connects to.
    pub peer_address: Option<SocketAddr>,

    /// How many times the secondary party retries connecting.
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,

    /// The delay between connection attempts.
    #[serde(with = "humantime_serde", default = "default_retry_delay")]
    pub retry_delay: Duration,

    /// How long to wait for a message from the peer before giving up.
    #[serde(with = "humantime_serde", default)]
    pub read_timeout: Option<Duration>,
}

/// A plaintext input.
#[derive(Clone, Debug, Deserialize)]
pub struct InputConfig {
    /// The tensor's shape.
    pub shape: Vec<usize>,

    /// The tensor's values, in row-major order.
    pub values: Vec<f64>,
}

/// The operation to run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Elementwise addition.
    Add,

    /// Elementwise subtraction.
    Sub,

    /// Elementwise multiplication.
    Mul,

    /// Matrix multiplication.
    MatMul,

    /// Sum of all elements.
    Sum,

    /// Elementwise division by a public divisor.
    Div {
        /// The divisor, shaped like the primary party's input.
        divisor: Vec<f64>,
    },

    /// Exponential approximation.
    Exp {
        /// The number of squarings.
        iterations: u32,
    },
}

fn default_connect_retries() -> u32 {
    20
}

fn default_retry_delay() -> Duration {
    Duration::from_millis(500)
}
