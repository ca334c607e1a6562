//! # Leader and Follower Scenarios
//!
//! Several relayers racing on one destination ledger:
//!
//! 1. The in-turn relayer delivers; followers stay out of its way.
//! 2. A silent leader is replaced by followers after `inturn_relayer_timeout`.
//! 3. A leader whose cached cursor went stale recovers from the conflict.
//! 4. Concurrent ticks never claim a sequence twice.
//! 5. Rotation honours the grace period; a closed window demotes.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rl_04_assembler::{AssemblerApi, AssemblerError, ClaimOnlyPlanner, Direction, Role, StopReason};
    use shared_types::RelayStatus;

    use crate::integration::fixtures::{Network, NOW};

    #[tokio::test(start_paused = true)]
    async fn test_follower_defers_to_active_leader() {
        let net = Network::new(Direction::AToB, 3);
        let leader = net.relayer(0);
        let follower = net.relayer(1);
        for sequence in 0..3 {
            net.add_entry(sequence, NOW - 5, 100);
        }
        net.source.set_next_send(net.channel, 3);

        let report = follower.tick().await.unwrap();
        assert_eq!(report.role, Role::Follower);
        assert!(matches!(
            report.outcome(net.channel),
            Some(Ok(outcome)) if outcome.stop == StopReason::AwaitingLeader(0)
        ));

        let report = leader.tick().await.unwrap();
        assert_eq!(report.delivered(net.channel), vec![0, 1, 2]);

        follower.tick().await.unwrap();
        let claims = net.claims();
        assert_eq!(claims.len(), 3);
        assert!(claims.iter().all(|(_, account)| *account == net.key(0)));
        assert!((0..3).all(|sequence| net.status(sequence) == RelayStatus::Delivered));
    }

    #[tokio::test(start_paused = true)]
    async fn test_follower_takes_over_silent_leader() {
        let net = Network::new(Direction::AToB, 3);
        let follower = net.relayer(1);
        net.add_entry(0, NOW, 100);
        net.add_entry(1, NOW, 101);
        net.source.set_next_send(net.channel, 2);

        let report = follower.tick().await.unwrap();
        assert!(report.delivered(net.channel).is_empty());

        net.clock.advance(31);
        let report = follower.tick().await.unwrap();
        assert_eq!(report.delivered(net.channel), vec![0, 1]);
        assert_eq!(net.claims(), vec![(0, net.key(1)), (1, net.key(1))]);
        // Followers never mark delivery; only the claim hash is recorded.
        assert_eq!(net.status(0), RelayStatus::AllVoted);

        // The leader comes back, reads the cursor fresh and finds nothing to do.
        let leader = net.relayer(0);
        let report = leader.tick().await.unwrap();
        assert!(report.delivered(net.channel).is_empty());
        assert_eq!(net.claims().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_leader_cache_recovers_after_follower_claim() {
        let net = Network::new(Direction::AToB, 3);
        let leader = net.relayer(0);
        let follower = net.relayer(1);

        // Caches cursor 0 and nonce 0.
        leader.tick().await.unwrap();

        net.add_entry(0, NOW, 100);
        net.source.set_next_send(net.channel, 1);
        net.clock.advance(31);
        follower.tick().await.unwrap();
        assert_eq!(net.claims(), vec![(0, net.key(1))]);

        let report = leader.tick().await.unwrap();
        let outcome = report.outcome(net.channel).unwrap();
        assert!(matches!(outcome, Err(AssemblerError::SequenceConflict { sequence: 0, .. })));
        assert!(outcome.as_ref().unwrap_err().is_conflict());

        net.add_entry(1, NOW + 31, 101);
        let report = leader.tick().await.unwrap();
        assert_eq!(report.delivered(net.channel), vec![1]);
        assert_eq!(net.claims(), vec![(0, net.key(1)), (1, net.key(0))]);
        assert_eq!(net.ledger.nonce(&net.key(0)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_ticks_never_double_claim() {
        let net = Network::new(Direction::AToB, 4);
        let relayers: Vec<_> = (0..4).map(|i| net.relayer(i)).collect();
        for sequence in 0..6 {
            net.add_entry(sequence, NOW - 60, 100 + sequence);
        }
        net.source.set_next_send(net.channel, 6);

        for _ in 0..3 {
            let reports = futures::future::join_all(relayers.iter().map(|r| r.tick())).await;
            for report in reports {
                let report = report.unwrap();
                if let Some(Err(e)) = report.outcome(net.channel) {
                    assert!(e.is_conflict(), "unexpected error: {e}");
                }
            }
        }

        let mut sequences: Vec<u64> = net.claims().into_iter().map(|(sequence, _)| sequence).collect();
        sequences.sort_unstable();
        assert_eq!(sequences, (0..6).collect::<Vec<_>>());
        assert_eq!(net.ledger.next_delivery(net.channel), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rotation_waits_out_grace_period() {
        let net = Network::new(Direction::AToB, 3);
        let first = net.relayer(0);
        let second = net.relayer_with(1, Arc::new(ClaimOnlyPlanner), |c| {
            c.sequence_update_latency = Duration::from_secs(8);
        });

        net.add_entry(0, NOW - 5, 100);
        first.tick().await.unwrap();
        assert_eq!(net.claims(), vec![(0, net.key(0))]);

        net.rotate_to(1, NOW, NOW + 1_000);
        net.add_entry(1, NOW, 101);
        net.source.set_next_send(net.channel, 2);

        let report = first.tick().await.unwrap();
        assert_eq!(report.role, Role::Follower);
        assert!(!first.coordinator().sequence_status(net.channel).has_retrieved);

        let report = second.tick().await.unwrap();
        assert_eq!(report.role, Role::Leader);
        assert!(matches!(
            report.outcome(net.channel),
            Some(Ok(outcome)) if outcome.stop == StopReason::GracePeriod
        ));

        net.clock.advance(8);
        let report = second.tick().await.unwrap();
        assert_eq!(report.delivered(net.channel), vec![1]);
        assert_eq!(net.claims(), vec![(0, net.key(0)), (1, net.key(1))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_window_demotes_in_turn_key() {
        let net = Network::new(Direction::BToA, 2);
        net.rotate_to(0, NOW - 100, NOW - 1);
        let relayer = net.relayer(0);
        net.add_entry(0, NOW - 5, 100);
        net.source.set_next_send(net.channel, 1);

        let report = relayer.tick().await.unwrap();
        assert_eq!(report.role, Role::Follower);
        assert!(net.claims().is_empty());
    }
}
