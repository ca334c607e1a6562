//! # Shared Scenario Fixtures
//!
//! A `Network` is one direction of the bridge as several relayers see it:
//! one relay store, one destination ledger, one source chain, one roster
//! and one clock, all shared. Each relayer gets its own assembler signing
//! with its own account on the shared ledger.

use std::sync::Arc;

use rl_01_validator_cache::{MockRosterSource, ValidatorCacheConfig, ValidatorSetCache};
use rl_03_vote_aggregation::VoteSigner;
use rl_04_assembler::{
    Assembler, AssemblerConfig, ClaimOnlyPlanner, DestinationClient, Direction, InMemoryDestinationLedger,
    InMemoryRelayStore, MockSourceChain, SubmissionAction, SubmissionPlanner,
};
use shared_types::{
    BlsPublicKey, ChannelId, ControllableTimeSource, InturnRelayer, RelayEntry, RelayStatus, RelayerRecord,
};

/// Wall clock every scenario starts at.
pub const NOW: i64 = 1_700_000_000;

/// Roster cache every relayer of a network shares.
pub type SharedRoster = ValidatorSetCache<MockRosterSource<RelayerRecord>>;

/// Assembler of one relayer in a network.
pub type RelayerAssembler = Assembler<InMemoryRelayStore, DestinationClient, MockSourceChain, SharedRoster>;

/// One direction of the bridge, shared by every relayer.
pub struct Network {
    /// Direction delivered.
    pub direction: Direction,
    /// Channel the scenarios use.
    pub channel: ChannelId,
    /// Relayer keys in roster order.
    pub signers: Vec<VoteSigner>,
    /// Relay store fed by the (simulated) listener and voting pipeline.
    pub store: Arc<InMemoryRelayStore>,
    /// Destination chain.
    pub ledger: Arc<InMemoryDestinationLedger>,
    /// Source chain.
    pub source: Arc<MockSourceChain>,
    /// Shared wall clock.
    pub clock: Arc<ControllableTimeSource>,
    /// Roster cache.
    pub roster: Arc<SharedRoster>,
}

impl Network {
    /// Network of `size` relayers, relayer 0 in turn.
    pub fn new(direction: Direction, size: u8) -> Self {
        let signers: Vec<VoteSigner> = (1..=size)
            .map(|seed| VoteSigner::from_seed(&[seed; 32]).expect("seeded key"))
            .collect();
        let records: Vec<RelayerRecord> = signers
            .iter()
            .enumerate()
            .map(|(i, signer)| RelayerRecord {
                address: [i as u8 + 1; 20],
                bls_public_key: signer.public_key(),
            })
            .collect();

        let channel = AssemblerConfig::new(direction, BlsPublicKey([0; 48])).channels[0];
        let network = Self {
            direction,
            channel,
            signers,
            store: Arc::new(InMemoryRelayStore::new()),
            ledger: InMemoryDestinationLedger::new(),
            source: Arc::new(MockSourceChain::new()),
            clock: Arc::new(ControllableTimeSource::new(NOW)),
            roster: Arc::new(ValidatorSetCache::new(
                Arc::new(MockRosterSource::new(records)),
                ValidatorCacheConfig::for_testing(),
                "shared",
            )),
        };
        network.rotate_to(0, NOW - 100, NOW + 1_000);
        network
    }

    /// Key of relayer `index`.
    pub fn key(&self, index: usize) -> BlsPublicKey {
        self.signers[index].public_key()
    }

    /// Makes relayer `index` in turn for `[start, end]`.
    pub fn rotate_to(&self, index: usize, start: i64, end: i64) {
        self.ledger.set_inturn(InturnRelayer {
            bls_public_key: self.key(index),
            interval_start: start as u64,
            interval_end: end as u64,
        });
    }

    /// Assembler of relayer `index` with test defaults.
    pub fn relayer(&self, index: usize) -> RelayerAssembler {
        self.relayer_with(index, Arc::new(ClaimOnlyPlanner), |_| {})
    }

    /// Assembler of relayer `index` with a custom planner and config.
    pub fn relayer_with(
        &self,
        index: usize,
        planner: Arc<dyn SubmissionPlanner>,
        tweak: impl FnOnce(&mut AssemblerConfig),
    ) -> RelayerAssembler {
        let mut config = AssemblerConfig::for_testing(self.direction, self.key(index));
        tweak(&mut config);
        Assembler::new(
            config,
            self.store.clone(),
            Arc::new(self.ledger.client(self.key(index))),
            self.source.clone(),
            self.roster.clone(),
            planner,
            self.clock.clone(),
        )
    }

    /// Stores a fully voted entry observed at `height` and every relayer's vote.
    pub fn add_entry(&self, sequence: u64, tx_time: i64, height: u64) {
        let payload = format!("{}-package-{sequence}", self.direction).into_bytes();
        self.add_entry_with_payload(sequence, tx_time, height, payload);
    }

    /// Same as [`Network::add_entry`] with an explicit payload.
    pub fn add_entry_with_payload(&self, sequence: u64, tx_time: i64, height: u64, payload: Vec<u8>) {
        self.store.save_entry(RelayEntry {
            id: 0,
            channel_id: self.channel,
            sequence,
            status: RelayStatus::AllVoted,
            tx_time,
            height,
            payload: payload.clone(),
            claimed_tx_hash: None,
        });
        for signer in &self.signers {
            self.store
                .save_vote(signer.sign_vote(self.channel, sequence, payload.clone(), tx_time));
        }
    }

    /// `(sequence, claimer)` of every accepted claim, in ledger order.
    pub fn claims(&self) -> Vec<(u64, BlsPublicKey)> {
        self.ledger
            .accepted()
            .into_iter()
            .filter_map(|accepted| match accepted.action {
                SubmissionAction::Claim(claim) => Some((claim.sequence, accepted.account)),
                SubmissionAction::AckMinted { .. } => None,
            })
            .collect()
    }

    /// Status of the entry at `sequence`.
    pub fn status(&self, sequence: u64) -> RelayStatus {
        self.store.entries_at(self.channel, sequence)[0].status
    }
}
