//! # End-to-End Relay Flows
//!
//! Votes in the store become claims a destination chain would accept:
//! the aggregate verifies against the roster keys the bitset selects, the
//! Chain A light client is brought up to the Chain B height first, and
//! oracle acknowledgements carry their ack-minted prelude.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rl_01_validator_cache::RosterProvider;
    use rl_02_light_client::testing::TestChain;
    use rl_02_light_client::{
        InMemoryLightClientContract, LightClientConfig, LightClientContract, LightClientSyncer,
        MockLightBlockSource,
    };
    use rl_03_vote_aggregation::{compute_event_hash, verify_aggregate};
    use rl_04_assembler::{AckMintedPlanner, AssemblerApi, Direction, SubmissionAction};
    use relayer_runtime::{Relayer, RelayerConfig, RelayerTasks};
    use shared_types::{BlsPublicKey, ChannelId, RelayStatus};

    use crate::integration::fixtures::{Network, NOW};

    const CHAIN_B: &str = "chain-b_1017-1";

    #[tokio::test(start_paused = true)]
    async fn test_claims_verify_against_roster_positions() {
        let net = Network::new(Direction::AToB, 5);
        let leader = net.relayer(0);
        for sequence in 0..2 {
            net.add_entry(sequence, NOW - 5, 100);
        }

        leader.tick().await.unwrap();

        let roster = net.roster.roster().await.unwrap();
        for accepted in net.ledger.accepted() {
            let SubmissionAction::Claim(claim) = accepted.action else {
                panic!("unexpected ack");
            };
            assert_eq!(claim.bitset.count(), 5);
            let keys: Vec<BlsPublicKey> = claim
                .bitset
                .positions()
                .into_iter()
                .map(|position| roster[position].bls_public_key)
                .collect();
            let event_hash = compute_event_hash(claim.channel_id, claim.sequence, &claim.payload);
            verify_aggregate(&keys, &event_hash, &claim.signature).unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_light_client_follows_chain_b_heights() {
        let chain = TestChain::new(CHAIN_B, &[1, 2, 3, 4], 10);
        let blocks = Arc::new(MockLightBlockSource::new());
        for height in 200..=220 {
            blocks.insert(chain.light_block(height, &chain.validator_set()));
        }
        let contract = Arc::new(InMemoryLightClientContract::new(&chain.consensus_state(150)).unwrap());
        let syncer = Arc::new(LightClientSyncer::new(
            blocks,
            contract.clone(),
            LightClientConfig::for_testing(CHAIN_B),
        ));

        let net = Network::new(Direction::BToA, 3);
        let leader = net.relayer(0).with_light_client(syncer);
        net.add_entry(0, NOW - 5, 205);
        net.add_entry(1, NOW - 5, 203);
        net.add_entry(2, NOW - 5, 212);

        let report = leader.tick().await.unwrap();
        assert_eq!(report.delivered(net.channel), vec![0, 1, 2]);

        // 203 is already covered by 205; only two headers are submitted.
        let heights: Vec<u64> = contract.submissions().into_iter().map(|(h, _)| h).collect();
        assert_eq!(heights, vec![205, 212]);
        assert_eq!(contract.latest_height().await.unwrap(), 212);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unverifiable_header_blocks_delivery() {
        let chain = TestChain::new(CHAIN_B, &[1, 2, 3, 4], 10);
        let impostor = TestChain::new(CHAIN_B, &[9, 10, 11, 12], 10);
        let blocks = Arc::new(MockLightBlockSource::new());
        blocks.insert(impostor.light_block(205, &impostor.validator_set()));
        let contract = Arc::new(InMemoryLightClientContract::new(&chain.consensus_state(150)).unwrap());
        let syncer = Arc::new(LightClientSyncer::new(
            blocks,
            contract.clone(),
            LightClientConfig::for_testing(CHAIN_B),
        ));

        let net = Network::new(Direction::BToA, 3);
        let leader = net.relayer(0).with_light_client(syncer);
        net.add_entry(0, NOW - 5, 205);

        for _ in 0..2 {
            let report = leader.tick().await.unwrap();
            assert!(matches!(report.outcome(net.channel), Some(Err(_))));
        }
        assert!(net.claims().is_empty());
        assert!(contract.submissions().is_empty());
        assert_eq!(net.status(0), RelayStatus::AllVoted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_minted_ack_prelude_shares_nonce_sequence() {
        let net = Network::new(Direction::AToB, 3);
        let leader = net.relayer_with(0, Arc::new(AckMintedPlanner::new(56)), |_| {});

        // Oracle ack: 9-byte package header, 8-byte prefix, operation 5, then
        // ((address[] recipients, uint32 status)) with one recipient.
        let mut payload = vec![0u8; 17];
        payload.push(5);
        for word in [0x20u64, 0x40, 0, 1] {
            let mut encoded = [0u8; 32];
            encoded[24..].copy_from_slice(&word.to_be_bytes());
            payload.extend_from_slice(&encoded);
        }
        let mut recipient = [0u8; 32];
        recipient[12..].copy_from_slice(&[0xab; 20]);
        payload.extend_from_slice(&recipient);

        net.add_entry_with_payload(0, NOW - 5, 100, payload);
        net.add_entry(1, NOW - 5, 101);

        let report = leader.tick().await.unwrap();
        assert_eq!(report.delivered(net.channel), vec![0, 1]);

        let accepted = net.ledger.accepted();
        let plan: Vec<(&str, u64)> = accepted.iter().map(|a| (a.action.kind(), a.nonce)).collect();
        assert_eq!(plan, vec![("ack_minted", 0), ("claim", 1), ("claim", 2)]);
        match &accepted[0].action {
            SubmissionAction::AckMinted { recipient, status, .. } => {
                assert_eq!(recipient, &[0xab; 20]);
                assert_eq!(*status, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_relayer_processes_share_the_bridge() {
        let a_to_b = Network::new(Direction::AToB, 2);
        let b_to_a = Network::new(Direction::BToA, 2);
        a_to_b.add_entry(0, NOW - 5, 100);
        b_to_a.add_entry(0, NOW - 5, 100);
        a_to_b.source.set_next_send(ChannelId::ORACLE, 1);
        b_to_a.source.set_next_send(ChannelId::SBT, 1);

        let process = |index: usize| {
            let config = RelayerConfig::for_testing(a_to_b.key(index));
            let tasks = RelayerTasks {
                a_to_b: Arc::new(a_to_b.relayer(index)),
                b_to_a: Arc::new(b_to_a.relayer(index)),
                relayer_roster: b_to_a.roster.clone(),
                validator_roster: a_to_b.roster.clone(),
            };
            Relayer::new(config, tasks)
        };
        let processes = [process(0), process(1)];
        for relayer in &processes {
            relayer.start().unwrap();
        }

        tokio::time::sleep(Duration::from_secs(2)).await;
        for relayer in &processes {
            relayer.shutdown().await;
        }

        for net in [&a_to_b, &b_to_a] {
            assert_eq!(net.claims(), vec![(0, net.key(0))]);
            assert_eq!(net.status(0), RelayStatus::Delivered);
        }
    }
}
