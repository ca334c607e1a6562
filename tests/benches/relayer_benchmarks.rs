//! # Relayer Benchmarks
//!
//! | Subsystem | Operation | Target |
//! |-----------|-----------|--------|
//! | rl-03 Vote Aggregation | aggregate one sequence, 100 relayers | < 5ms |
//! | rl-03 Vote Aggregation | bitset to Chain A integer | < 1μs |
//! | rl-02 Light Client | verify and apply one header, 21 validators | < 10ms |

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rl_02_light_client::testing::TestChain;
use rl_02_light_client::{apply_light_block, TrustThreshold};
use rl_03_vote_aggregation::{ParticipantBitset, VoteAggregator, VoteSigner};
use shared_types::{ChannelId, RelayerRecord, Vote};

fn committee(size: u8) -> (Vec<RelayerRecord>, Vec<Vote>) {
    let payload = b"oracle package".to_vec();
    let signers: Vec<VoteSigner> = (1..=size)
        .map(|seed| VoteSigner::from_seed(&[seed; 32]).expect("seeded key"))
        .collect();
    let roster = signers
        .iter()
        .enumerate()
        .map(|(i, signer)| RelayerRecord {
            address: [i as u8; 20],
            bls_public_key: signer.public_key(),
        })
        .collect();
    let votes = signers
        .iter()
        .map(|signer| signer.sign_vote(ChannelId::ORACLE, 7, payload.clone(), 1_700_000_000))
        .collect();
    (roster, votes)
}

fn bench_vote_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("rl-03-vote-aggregation");
    group.measurement_time(Duration::from_secs(10));
    let aggregator = VoteAggregator::new();

    for size in [4u8, 21, 100] {
        let (roster, votes) = committee(size);
        group.bench_with_input(BenchmarkId::new("aggregate", size), &size, |b, _| {
            b.iter(|| aggregator.aggregate(black_box(&votes), black_box(&roster)))
        });
    }

    let mut bitset = ParticipantBitset::new();
    for position in (0..256).step_by(3) {
        bitset.set(position);
    }
    group.bench_function("bitset_to_u256", |b| b.iter(|| black_box(&bitset).to_u256()));
    group.finish();
}

fn bench_light_block_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("rl-02-light-client");

    for size in [4u8, 21] {
        let seeds: Vec<u8> = (1..=size).collect();
        let chain = TestChain::new("chain-b_1017-1", &seeds, 10);
        let state = chain.consensus_state(100);
        let adjacent = chain.light_block(101, &chain.validator_set());
        let skipping = chain.light_block(150, &chain.validator_set());

        for (label, block) in [("adjacent", &adjacent), ("skipping", &skipping)] {
            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter_batched(
                    || state.clone(),
                    |mut state| apply_light_block(&mut state, black_box(block), TrustThreshold::ONE_THIRD),
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_vote_aggregation, bench_light_block_apply);
criterion_main!(benches);
