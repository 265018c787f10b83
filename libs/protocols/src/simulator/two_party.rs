//! Two-party protocol simulator.
//!
//! Runs the same closure for both parties, each on its own thread, connected through an in-process
//! [`ChannelTransport`] and given a [`SeededDealer`] replaying a common seed. The closure branches on
//! [`PartyContext::role`] wherever the parties differ, such as which of them owns an input.

use crate::{
    context::{PartyContext, Seed},
    transport::ChannelTransport,
    triplets::SeededDealer,
};
use anyhow::{anyhow, Context, Error};
use basic_types::PartyRole;
use std::{thread, time::Instant};
use tracing::info;

/// The context each simulated party runs with.
pub type SimulatorContext = PartyContext<ChannelTransport, SeededDealer>;

/// A two-party protocol simulator.
#[derive(Clone, Debug)]
pub struct TwoPartySimulator {
    dealer_seed: Seed,
}

impl TwoPartySimulator {
    /// Constructs a new simulator whose parties draw triplets from a dealer seeded with `dealer_seed`.
    pub fn new(dealer_seed: Seed) -> Self {
        Self { dealer_seed }
    }

    /// Runs `party` for both roles and returns their outputs, indexed by role.
    ///
    /// If either party fails or panics the run fails. The other party then observes a disconnected
    /// transport rather than blocking forever.
    pub fn run<F, O>(&self, party: F) -> Result<[O; 2], Error>
    where
        F: Fn(&mut SimulatorContext) -> Result<O, Error> + Sync,
        O: Send,
    {
        let start_time = Instant::now();
        let (primary, secondary) = ChannelTransport::pair();
        let outputs = thread::scope(|scope| {
            let party = &party;
            let handles = [primary, secondary].map(|transport| {
                let role = transport.role();
                let dealer = SeededDealer::new(role, self.dealer_seed);
                scope.spawn(move || {
                    let mut ctx = PartyContext::new(role, transport, dealer);
                    party(&mut ctx)
                })
            });
            handles.map(|handle| handle.join())
        });

        let [primary, secondary] = outputs;
        let primary = Self::party_output(PartyRole::Primary, primary)?;
        let secondary = Self::party_output(PartyRole::Secondary, secondary)?;
        info!("Protocol execution took {}ms", start_time.elapsed().as_millis());
        Ok([primary, secondary])
    }

    fn party_output<O>(role: PartyRole, output: thread::Result<Result<O, Error>>) -> Result<O, Error> {
        output.map_err(|_| anyhow!("party {role} panicked"))?.with_context(|| format!("party {role} failed"))
    }
}
