//! End-to-end tests for the fixed-point protocols.

#![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use super::FixedPointTensor;
use crate::{
    context::{PartyContext, Seed},
    simulator::{SimulatorContext, TwoPartySimulator},
    transport::ChannelTransport,
    triplets::SeededDealer,
};
use anyhow::Error;
use basic_types::PartyRole;
use math_lib::{RingElement, Tensor};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rstest::rstest;

const N: u32 = 16;
const ULP: f64 = 1.0 / 65536.0;
const DEALER_SEED: u64 = 0x5eed;

type Fixed<'a> = FixedPointTensor<'a, i64, N>;

fn encode(shape: &[usize], values: &[f64]) -> Tensor<i64> {
    Tensor::from_f64s(shape.to_vec(), values, N).expect("encoding failed")
}

fn random_values(count: usize, bound: f64, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    (0..count).map(|_| rng.gen_range(-bound..bound)).collect()
}

/// Shares a plaintext outside of any protocol run.
fn share<T: RingElement, const B: u32>(plaintext: &Tensor<T>, seed: Seed) -> [Tensor<T>; 2] {
    let mut ctx = PartyContext::new(PartyRole::Primary, (), ());
    let mut share0 = Tensor::zeros(plaintext.shape());
    let mut share1 = Tensor::zeros(plaintext.shape());
    FixedPointTensor::<T, B>::share(&mut ctx, plaintext, [&mut share0, &mut share1], seed);
    [share0, share1]
}

/// Runs `party` for both parties, reveals its output and checks both parties see the same plaintext.
fn run_revealed<T, const B: u32, F>(party: F) -> Tensor<T>
where
    T: RingElement,
    F: Fn(&mut SimulatorContext) -> Result<Tensor<T>, Error> + Sync,
{
    test_logger::init();
    let simulator = TwoPartySimulator::new(Seed::from(DEALER_SEED));
    let [primary, secondary] = simulator
        .run(|ctx| {
            let share = party(ctx)?;
            let mut revealed = Tensor::zeros(share.shape());
            FixedPointTensor::<T, B>::new(&share).reveal(ctx, &mut revealed)?;
            Ok(revealed)
        })
        .expect("protocol run failed");
    assert_eq!(primary, secondary, "parties revealed different values");
    primary
}

fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len());
    for (index, (actual, expected)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (actual - expected).abs() <= tolerance,
            "element {index}: got {actual}, expected {expected} (tolerance {tolerance})"
        );
    }
}

/// A context for checking preconditions that fail before any message is sent.
fn lone_context() -> SimulatorContext {
    let (transport, _) = ChannelTransport::pair();
    PartyContext::new(PartyRole::Primary, transport, SeededDealer::new(PartyRole::Primary, Seed::from(1u64)))
}

#[rstest]
#[case::fixed_seed(Seed::from(7u64))]
#[case::other_seed(Seed::from(8u64))]
#[case::fresh_entropy(Seed::ZERO)]
fn shares_recombine(#[case] seed: Seed) {
    let plaintext = encode(&[2, 3], &[0.0, 1.0, -1.0, 1234.5, -0.001, 42.0]);
    let [share0, share1] = share::<i64, N>(&plaintext, seed);
    assert_ne!(share0.data(), plaintext.data());
    assert_eq!(share0.scaling_factor(), N);
    assert_eq!(share1.scaling_factor(), N);

    let mut recombined = Tensor::zeros(&[2, 3]);
    share0.add(&share1, &mut recombined);
    assert_eq!(recombined, plaintext);
}

#[test]
fn zero_seed_draws_fresh_shares() {
    let plaintext = encode(&[4], &[1.0, 2.0, 3.0, 4.0]);
    let [first, _] = share::<i64, N>(&plaintext, Seed::ZERO);
    let [second, _] = share::<i64, N>(&plaintext, Seed::ZERO);
    assert_ne!(first, second);
}

#[test]
fn reveal_is_exact() {
    let plaintext = encode(&[3], &[-3.25, 0.0, 1e6]);
    let shares = share::<i64, N>(&plaintext, Seed::from(11u64));
    let revealed = run_revealed::<i64, N, _>(|ctx| Ok(shares[ctx.role().index()].clone()));
    assert_eq!(revealed, plaintext);
}

#[test]
fn reveal_to_one_leaves_other_party_untouched() {
    test_logger::init();
    let plaintext = encode(&[2], &[5.5, -6.0]);
    let shares = share::<i64, N>(&plaintext, Seed::from(12u64));
    let simulator = TwoPartySimulator::new(Seed::from(DEALER_SEED));
    let [primary, secondary] = simulator
        .run(|ctx| {
            let mut out = Tensor::filled(&[2], 7);
            Fixed::new(&shares[ctx.role().index()]).reveal_to_one(ctx, PartyRole::Secondary, &mut out)?;
            Ok(out)
        })
        .expect("protocol run failed");
    assert_eq!(primary, Tensor::filled(&[2], 7));
    assert_eq!(secondary, plaintext);
}

#[test]
fn share_between_parties() {
    let x = encode(&[3], &[1.5, -2.0, 10.0]);
    let y = encode(&[3], &[0.25, 4.0, -10.5]);
    let seeds = [Seed::from(21u64), Seed::from(22u64)];
    let revealed = run_revealed::<i64, N, _>(|ctx| {
        // Each party shares its own input and derives its share of the peer's input from the peer's seed.
        let own_input = if ctx.role().is_primary() { &x } else { &y };
        let mut own = [Tensor::zeros(&[3]), Tensor::zeros(&[3])];
        let [discarded, kept] = &mut own;
        Fixed::share(ctx, own_input, [discarded, kept], seeds[ctx.role().index()]);
        let mut derived = Tensor::zeros(&[3]);
        Fixed::share_from_seed(ctx, seeds[ctx.peer().index()], &mut derived);

        let mut sum = Tensor::zeros(&[3]);
        Fixed::new(&own[1]).add(&Fixed::new(&derived), &mut sum);
        Ok(sum)
    });
    assert_eq!(revealed.to_f64s(), vec![1.75, 2.0, -0.5]);
}

#[test]
fn wraps_borrowed_share() {
    let share = encode(&[2, 2], &[1.0, 2.0, 3.0, 4.0]);
    let tensor = Fixed::new(&share);
    assert!(std::ptr::eq(tensor.local_share(), &share));
    assert_eq!(tensor.shape(), &[2, 2]);
    assert_eq!(tensor.numel(), 4);
}

#[test]
#[should_panic(expected = "zero seed")]
fn share_from_zero_seed() {
    let mut ctx = PartyContext::new(PartyRole::Secondary, (), ());
    let mut out = Tensor::<i64>::zeros(&[1]);
    Fixed::share_from_seed(&mut ctx, Seed::ZERO, &mut out);
}

#[test]
fn linear_operations() {
    let x = encode(&[4], &[1.0, -2.5, 300.0, 0.0]);
    let y = encode(&[4], &[0.5, 0.5, -300.0, -7.0]);
    let public = encode(&[4], &[10.0, 20.0, 30.0, 40.0]);
    let x_shares = share::<i64, N>(&x, Seed::from(31u64));
    let y_shares = share::<i64, N>(&y, Seed::from(32u64));

    let revealed = run_revealed::<i64, N, _>(|ctx| {
        let index = ctx.role().index();
        let (x, y) = (Fixed::new(&x_shares[index]), Fixed::new(&y_shares[index]));
        let mut outputs: Vec<Tensor<i64>> = (0..6).map(|_| Tensor::zeros(&[4])).collect();
        x.add(&y, &mut outputs[0]);
        x.sub(&y, &mut outputs[1]);
        x.negative(&mut outputs[2]);
        x.add_public(ctx, &public, &mut outputs[3]);
        x.sub_public(ctx, &public, &mut outputs[4]);
        y.add_public(ctx, &public, &mut outputs[5]);
        let outputs: Vec<&Tensor<i64>> = outputs.iter().collect();
        Ok(Tensor::stack(&outputs))
    });

    let expected = [
        [1.5, -2.0, 0.0, -7.0],
        [0.5, -3.0, 600.0, 7.0],
        [-1.0, 2.5, -300.0, 0.0],
        [11.0, 17.5, 330.0, 40.0],
        [-9.0, -22.5, 270.0, -40.0],
        [10.5, 20.5, -270.0, 33.0],
    ];
    let expected: Vec<f64> = expected.iter().flatten().copied().collect();
    assert_eq!(revealed.to_f64s(), expected);
}

#[test]
#[should_panic(expected = "add: operand shape mismatch")]
fn add_shape_mismatch() {
    let (x, y) = (Tensor::<i64>::zeros(&[2, 2]), Tensor::<i64>::zeros(&[4]));
    let mut out = Tensor::zeros(&[4]);
    Fixed::new(&x).add(&Fixed::new(&y), &mut out);
}

#[rstest]
#[case(1, 1.0)]
#[case(2, 10.0)]
#[case(3, 100.0)]
fn mul_within_one_ulp(#[case] seed: u64, #[case] bound: f64) {
    let count = 32;
    let x = encode(&[4, 8], &random_values(count, bound, seed));
    let y = encode(&[4, 8], &random_values(count, bound, seed + 100));
    let x_shares = share::<i64, N>(&x, Seed::from(seed + 200));
    let y_shares = share::<i64, N>(&y, Seed::from(seed + 300));

    let revealed = run_revealed::<i64, N, _>(|ctx| {
        let index = ctx.role().index();
        let mut product = Tensor::zeros(&[4, 8]);
        Fixed::new(&x_shares[index]).mul(ctx, &Fixed::new(&y_shares[index]), &mut product)?;
        assert_eq!(ctx.triplets_mut().issued(), count as u64);
        Ok(product)
    });

    assert_eq!(revealed.scaling_factor(), N);
    for ((x, y), product) in x.data().iter().zip(y.data()).zip(revealed.data()) {
        let floor = ((i128::from(*x) * i128::from(*y)) >> N) as i64;
        let delta = product - floor;
        assert!((0..=1).contains(&delta), "{x} * {y}: got {product}, expected {floor} or one more");
    }
}

#[test]
fn mul_i32_ring() {
    const BITS: u32 = 8;
    let x = Tensor::<i32>::from_f64s(vec![5], &[1.5, -2.0, 0.25, 1.0, -1.75], BITS).unwrap();
    let y = Tensor::<i32>::from_f64s(vec![5], &[2.0, 1.5, -1.0, 0.0, -1.25], BITS).unwrap();
    let x_shares = share::<i32, BITS>(&x, Seed::from(41u64));
    let y_shares = share::<i32, BITS>(&y, Seed::from(42u64));

    let revealed = run_revealed::<i32, BITS, _>(|ctx| {
        let index = ctx.role().index();
        let mut product = Tensor::zeros(&[5]);
        FixedPointTensor::<i32, BITS>::new(&x_shares[index]).mul(
            ctx,
            &FixedPointTensor::new(&y_shares[index]),
            &mut product,
        )?;
        Ok(product)
    });
    assert_close(&revealed.to_f64s(), &[3.0, -3.0, -0.25, 0.0, 2.1875], 1.0 / 256.0);
}

#[test]
fn mul_failure_rate_at_large_magnitudes() {
    // 1000 * 1000 truncates v = 10^6 * 2^32, which fails with probability v / 2^64, about 2^-12.
    let count = 1 << 13;
    let x = encode(&[count], &vec![1000.0; count]);
    let x_shares = share::<i64, N>(&x, Seed::from(51u64));
    let y_shares = share::<i64, N>(&x, Seed::from(52u64));

    let revealed = run_revealed::<i64, N, _>(|ctx| {
        let index = ctx.role().index();
        let mut product = Tensor::zeros(&[count]);
        Fixed::new(&x_shares[index]).mul(ctx, &Fixed::new(&y_shares[index]), &mut product)?;
        Ok(product)
    });

    let expected = 1_000_000i64 << N;
    let mut failures = 0;
    for product in revealed.data() {
        let delta = product.wrapping_sub(expected);
        if !(0..=1).contains(&delta) {
            failures += 1;
            // A failed element is off by 2^(64 - 16) raw, 2^32 in plaintext.
            assert!((0..=1).contains(&(delta & ((1 << 48) - 1))), "unexpected error {delta}");
        }
    }
    assert!(failures <= 16, "{failures} of {count} products failed, expected about 2");
}

#[test]
fn mul_public() {
    let x = encode(&[3], &[1.5, -4.0, 100.0]);
    let public = encode(&[3], &[2.0, 0.5, -0.125]);
    let shares = share::<i64, N>(&x, Seed::from(51u64));
    let revealed = run_revealed::<i64, N, _>(|ctx| {
        let mut product = Tensor::zeros(&[3]);
        Fixed::new(&shares[ctx.role().index()]).mul_public(ctx, &public, &mut product);
        assert_eq!(ctx.triplets_mut().issued(), 0);
        Ok(product)
    });
    assert_close(&revealed.to_f64s(), &[3.0, -2.0, -12.5], ULP);
}

#[test]
fn mat_mul() {
    let a = encode(&[2, 3], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let b = encode(&[3, 2], &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    let a_shares = share::<i64, N>(&a, Seed::from(61u64));
    let b_shares = share::<i64, N>(&b, Seed::from(62u64));

    let revealed = run_revealed::<i64, N, _>(|ctx| {
        let index = ctx.role().index();
        let mut product = Tensor::zeros(&[2, 2]);
        Fixed::new(&a_shares[index]).mat_mul(ctx, &Fixed::new(&b_shares[index]), &mut product)?;
        // One triplet element per term of every dot product.
        assert_eq!(ctx.triplets_mut().issued(), 2 * 2 * 3);
        Ok(product)
    });
    assert_eq!(revealed.shape(), &[2, 2]);
    assert_close(&revealed.to_f64s(), &[4.0, 5.0, 10.0, 11.0], 3.0 * ULP);
}

#[test]
fn mat_mul_random() {
    let (rows, inner, cols) = (3, 4, 5);
    let a_values = random_values(rows * inner, 5.0, 71);
    let b_values = random_values(inner * cols, 5.0, 72);
    let a = encode(&[rows, inner], &a_values);
    let b = encode(&[inner, cols], &b_values);
    let a_shares = share::<i64, N>(&a, Seed::from(73u64));
    let b_shares = share::<i64, N>(&b, Seed::from(74u64));

    let revealed = run_revealed::<i64, N, _>(|ctx| {
        let index = ctx.role().index();
        let mut product = Tensor::zeros(&[rows, cols]);
        Fixed::new(&a_shares[index]).mat_mul(ctx, &Fixed::new(&b_shares[index]), &mut product)?;
        Ok(product)
    });

    let (a, b) = (a.to_f64s(), b.to_f64s());
    let mut expected = vec![0.0; rows * cols];
    for row in 0..rows {
        for col in 0..cols {
            expected[row * cols + col] = (0..inner).map(|k| a[row * inner + k] * b[k * cols + col]).sum();
        }
    }
    assert_close(&revealed.to_f64s(), &expected, (inner + 1) as f64 * ULP);
}

#[test]
#[should_panic(expected = "mat_mul: lhs has 3 columns but rhs has 2 rows")]
fn mat_mul_inner_dimension_mismatch() {
    let mut ctx = lone_context();
    let (a, b) = (Tensor::<i64>::zeros(&[2, 3]), Tensor::<i64>::zeros(&[2, 2]));
    let mut out = Tensor::zeros(&[2, 2]);
    let _ = Fixed::new(&a).mat_mul(&mut ctx, &Fixed::new(&b), &mut out);
}

#[test]
#[should_panic(expected = "mat_mul: output must have shape [2, 4]")]
fn mat_mul_output_mismatch() {
    let mut ctx = lone_context();
    let (a, b) = (Tensor::<i64>::zeros(&[2, 3]), Tensor::<i64>::zeros(&[3, 4]));
    let mut out = Tensor::zeros(&[4, 2]);
    let _ = Fixed::new(&a).mat_mul(&mut ctx, &Fixed::new(&b), &mut out);
}

#[test]
fn div_by_public() {
    let x = encode(&[4], &[1.0, -7.5, 100.0, 0.3]);
    let divisor = encode(&[4], &[4.0, 2.5, -3.0, 0.1]);
    let shares = share::<i64, N>(&x, Seed::from(81u64));
    let revealed = run_revealed::<i64, N, _>(|ctx| {
        let mut quotient = Tensor::zeros(&[4]);
        Fixed::new(&shares[ctx.role().index()]).div(ctx, &divisor, &mut quotient);
        Ok(quotient)
    });
    assert_close(&revealed.to_f64s(), &[0.25, -3.0, -100.0 / 3.0, 3.0], 1e-3);
}

#[test]
#[should_panic(expected = "division by zero")]
fn div_by_zero() {
    let ctx = lone_context();
    let x = encode(&[2], &[1.0, 2.0]);
    let divisor = encode(&[2], &[1.0, 0.0]);
    let mut out = Tensor::zeros(&[2]);
    Fixed::new(&x).div(&ctx, &divisor, &mut out);
}

#[test]
fn sum() {
    let x = encode(&[2, 2], &[1.5, -2.25, 3.0, 4.0]);
    let shares = share::<i64, N>(&x, Seed::from(91u64));
    let revealed = run_revealed::<i64, N, _>(|ctx| {
        let mut total = Tensor::zeros(&[1]);
        Fixed::new(&shares[ctx.role().index()]).sum(&mut total);
        Ok(total)
    });
    assert_eq!(revealed.to_f64s(), vec![6.25]);
}

#[test]
#[should_panic(expected = "sum: output must have exactly one element")]
fn sum_into_wrong_shape() {
    let x = Tensor::<i64>::zeros(&[3]);
    let mut out = Tensor::zeros(&[2]);
    Fixed::new(&x).sum(&mut out);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(4)]
#[case(8)]
#[case(16)]
fn exp_of_zero(#[case] iterations: u32) {
    let x = encode(&[4], &[0.0; 4]);
    let shares = share::<i64, N>(&x, Seed::from(100 + u64::from(iterations)));
    let revealed = run_revealed::<i64, N, _>(|ctx| {
        let mut out = Tensor::zeros(&[4]);
        Fixed::new(&shares[ctx.role().index()]).exp(ctx, iterations, &mut out)?;
        assert_eq!(ctx.triplets_mut().issued(), 4 * u64::from(iterations));
        Ok(out)
    });
    let tolerance = f64::from(2u32.pow(iterations + 1)) * ULP;
    assert_close(&revealed.to_f64s(), &[1.0; 4], tolerance);
}

#[rstest]
#[case(0.5)]
#[case(-1.0)]
#[case(1.25)]
fn exp_approximation(#[case] value: f64) {
    let iterations = 4;
    let x = encode(&[1], &[value]);
    let shares = share::<i64, N>(&x, Seed::from(111u64));
    let revealed = run_revealed::<i64, N, _>(|ctx| {
        let mut out = Tensor::zeros(&[1]);
        Fixed::new(&shares[ctx.role().index()]).exp(ctx, iterations, &mut out)?;
        Ok(out)
    });
    let expected = (1.0 + value / 16.0).powi(16);
    assert_close(&revealed.to_f64s(), &[expected], 2e-3);
}

#[test]
fn exp_converges() {
    let x = encode(&[2], &[0.5, -0.5]);
    let shares = share::<i64, N>(&x, Seed::from(121u64));
    let revealed = run_revealed::<i64, N, _>(|ctx| {
        let mut out = Tensor::zeros(&[2]);
        Fixed::new(&shares[ctx.role().index()]).exp(ctx, 8, &mut out)?;
        Ok(out)
    });
    assert_close(&revealed.to_f64s(), &[0.5f64.exp(), (-0.5f64).exp()], 0.02);
}

#[test]
#[should_panic(expected = "exp: 17 iterations exceed the 16 fractional bits")]
fn exp_too_many_iterations() {
    let mut ctx = lone_context();
    let x = Tensor::<i64>::zeros(&[1]);
    let mut out = Tensor::zeros(&[1]);
    let _ = Fixed::new(&x).exp(&mut ctx, 17, &mut out);
}
