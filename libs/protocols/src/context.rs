//! The per-party protocol context.

use basic_types::PartyRole;
use math_lib::{RingElement, Tensor};
use rand::{rngs::OsRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::{fmt, str::FromStr};

/// The ChaCha stream used for private correlated randomness.
const PRIVATE_STREAM: u64 = 2;

/// A 128 bit seed for a correlated random stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Seed(pub [u8; 16]);

impl Seed {
    /// The all-zero seed.
    ///
    /// When sharing, this asks for a fresh seed drawn from the operating system instead.
    pub const ZERO: Seed = Seed([0; 16]);

    /// Draws a seed from the operating system's entropy source.
    pub fn from_entropy() -> Self {
        let mut bytes = [0; 16];
        OsRng.fill_bytes(&mut bytes);
        Seed(bytes)
    }

    /// Whether this is [`Seed::ZERO`].
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Builds a ChaCha20 generator keyed by this seed, positioned at the start of `stream`.
    pub fn rng(&self, stream: u64) -> ChaCha20Rng {
        let mut key = [0; 32];
        for (target, byte) in key.iter_mut().zip(self.0) {
            *target = byte;
        }
        let mut rng = ChaCha20Rng::from_seed(key);
        rng.set_stream(stream);
        rng
    }
}

impl From<u64> for Seed {
    fn from(value: u64) -> Self {
        let mut bytes = [0; 16];
        for (target, byte) in bytes.iter_mut().zip(value.to_le_bytes()) {
            *target = byte;
        }
        Seed(bytes)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Seed {
    type Err = InvalidSeed;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; 16];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| InvalidSeed(e.to_string()))?;
        Ok(Seed(bytes))
    }
}

/// A seed isn't 32 hex characters.
#[derive(Debug, thiserror::Error)]
#[error("invalid seed: {0}")]
pub struct InvalidSeed(String);

/// Everything a party needs to run protocols: its role, a transport to its peer, a source of Beaver
/// triplets and a private random stream.
pub struct PartyContext<Tr, Tp> {
    role: PartyRole,
    transport: Tr,
    triplets: Tp,
    private_rng: ChaCha20Rng,
}

impl<Tr, Tp> PartyContext<Tr, Tp> {
    /// Constructs a new context.
    ///
    /// The private stream starts from fresh entropy until [`PartyContext::set_random_seed`] is called.
    pub fn new(role: PartyRole, transport: Tr, triplets: Tp) -> Self {
        Self { role, transport, triplets, private_rng: Seed::from_entropy().rng(PRIVATE_STREAM) }
    }

    /// This party's role.
    pub fn role(&self) -> PartyRole {
        self.role
    }

    /// The other party's role.
    pub fn peer(&self) -> PartyRole {
        self.role.peer()
    }

    /// The transport to the peer.
    pub fn transport_mut(&mut self) -> &mut Tr {
        &mut self.transport
    }

    /// The triplet source.
    pub fn triplets_mut(&mut self) -> &mut Tp {
        &mut self.triplets
    }

    /// Reseeds the private random stream.
    pub fn set_random_seed(&mut self, seed: Seed) {
        self.private_rng = seed.rng(PRIVATE_STREAM);
    }

    /// Fills `tensor` with uniformly random ring elements from the private stream.
    pub fn gen_random_private<T: RingElement>(&mut self, tensor: &mut Tensor<T>) {
        for element in tensor.data_mut() {
            *element = T::random(&mut self.private_rng);
        }
    }
}
