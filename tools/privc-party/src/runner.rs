//! Runs the configured computation.

use crate::config::{Config, InputConfig, NetworkConfig, Operation};
use anyhow::{bail, Context, Result};
use basic_types::PartyRole;
use math_lib::Tensor;
use protocols::{
    fixed_point::DEFAULT_FRACTIONAL_BITS,
    transport::{RetryPolicy, TcpTransport, Transport},
    triplets::SeededDealer,
    FixedPointTensor, PartyContext, Seed,
};
use tracing::info;

const N: u32 = DEFAULT_FRACTIONAL_BITS;

type Fixed<'a> = FixedPointTensor<'a, i64, N>;

/// Connects to the peer and runs the configured computation, returning the revealed result.
pub fn run(config: &Config) -> Result<Tensor<i64>> {
    let transport = connect(config.role, &config.network).context("failed to connect to peer")?;
    let mut ctx = PartyContext::new(config.role, transport, SeededDealer::new(config.role, config.dealer_seed));
    run_party(&mut ctx, config)
}

/// Connects to the peer, listening if this is the primary party and connecting otherwise.
pub fn connect(role: PartyRole, network: &NetworkConfig) -> Result<TcpTransport> {
    let mut transport = if role.is_primary() {
        let address = network.listen_address.context("primary party needs 'network.listen_address'")?;
        TcpTransport::listen(role, address)?
    } else {
        let address = network.peer_address.context("secondary party needs 'network.peer_address'")?;
        let retry = RetryPolicy { retries: network.connect_retries, delay: network.retry_delay };
        TcpTransport::connect(role, address, retry)?
    };
    transport.set_read_timeout(network.read_timeout)?;
    Ok(transport)
}

/// Shares both inputs, runs the operation and reveals its result.
pub fn run_party<Tr: Transport>(ctx: &mut PartyContext<Tr, SeededDealer>, config: &Config) -> Result<Tensor<i64>> {
    let [primary_seed, secondary_seed] = config.input_seeds;
    if primary_seed.is_zero() || secondary_seed.is_zero() || primary_seed == secondary_seed {
        bail!("input seeds must be distinct and non-zero");
    }
    check_operands(ctx.role(), config)?;
    let input = encode(&config.input).context("invalid input")?;
    info!("{} sharing input of shape {:?}", ctx.role(), input.shape());

    let (own_share, peer_share) = share_inputs(ctx, &input, &config.peer_shape, config.input_seeds);
    let (lhs, rhs) = if ctx.role().is_primary() { (&own_share, &peer_share) } else { (&peer_share, &own_share) };
    let (lhs, rhs) = (Fixed::new(lhs), Fixed::new(rhs));

    info!("{} running {:?}", ctx.role(), config.operation);
    let output = match &config.operation {
        Operation::Add => {
            let mut out = Tensor::zeros(lhs.shape());
            lhs.add(&rhs, &mut out);
            out
        }
        Operation::Sub => {
            let mut out = Tensor::zeros(lhs.shape());
            lhs.sub(&rhs, &mut out);
            out
        }
        Operation::Mul => {
            let mut out = Tensor::zeros(lhs.shape());
            lhs.mul(ctx, &rhs, &mut out)?;
            out
        }
        Operation::MatMul => {
            let rows = lhs.shape().first().copied().unwrap_or_default();
            let cols = rhs.shape().get(1).copied().unwrap_or_default();
            let mut out = Tensor::zeros(&[rows, cols]);
            lhs.mat_mul(ctx, &rhs, &mut out)?;
            out
        }
        Operation::Sum => {
            let mut out = Tensor::zeros(&[1]);
            lhs.sum(&mut out);
            out
        }
        Operation::Div { divisor } => {
            let divisor = Tensor::from_f64s(lhs.shape().to_vec(), divisor, N).context("invalid divisor")?;
            if divisor.data().contains(&0) {
                bail!("divisor must not contain zeros");
            }
            let mut out = Tensor::zeros(lhs.shape());
            lhs.div(ctx, &divisor, &mut out);
            out
        }
        Operation::Exp { iterations } => {
            if *iterations > N {
                bail!("exp supports at most {N} iterations");
            }
            let mut out = Tensor::zeros(lhs.shape());
            lhs.exp(ctx, *iterations, &mut out)?;
            out
        }
    };

    let mut revealed = Tensor::zeros(output.shape());
    Fixed::new(&output).reveal(ctx, &mut revealed)?;
    Ok(revealed)
}

/// Checks that both inputs have shapes the operation accepts.
fn check_operands(role: PartyRole, config: &Config) -> Result<()> {
    let (lhs, rhs) = if role.is_primary() {
        (config.input.shape.as_slice(), config.peer_shape.as_slice())
    } else {
        (config.peer_shape.as_slice(), config.input.shape.as_slice())
    };
    match &config.operation {
        Operation::Add | Operation::Sub | Operation::Mul => {
            if lhs != rhs {
                bail!("{:?} needs inputs of the same shape, got {lhs:?} and {rhs:?}", config.operation);
            }
        }
        Operation::MatMul => match (lhs, rhs) {
            ([_, inner], [rhs_rows, _]) if inner == rhs_rows => {}
            _ => bail!("mat_mul needs [a, b] and [b, c] inputs, got {lhs:?} and {rhs:?}"),
        },
        Operation::Sum | Operation::Div { .. } | Operation::Exp { .. } => {}
    }
    Ok(())
}

/// Shares this party's input and derives its share of the peer's, primary input first.
fn share_inputs<Tr>(
    ctx: &mut PartyContext<Tr, SeededDealer>,
    input: &Tensor<i64>,
    peer_shape: &[usize],
    seeds: [Seed; 2],
) -> (Tensor<i64>, Tensor<i64>) {
    let mut own_share = Tensor::zeros(input.shape());
    let mut peer_share = Tensor::zeros(peer_shape);
    for owner in PartyRole::ALL {
        let seed = seeds.get(owner.index()).copied().unwrap_or_default();
        if owner == ctx.role() {
            // The peer derives the first share from the seed, this party keeps the second one.
            let mut derived = Tensor::zeros(input.shape());
            Fixed::share(ctx, input, [&mut derived, &mut own_share], seed);
        } else {
            Fixed::share_from_seed(ctx, seed, &mut peer_share);
        }
    }
    (own_share, peer_share)
}

fn encode(input: &InputConfig) -> Result<Tensor<i64>> {
    Ok(Tensor::from_f64s(input.shape.clone(), &input.values, N)?)
}
