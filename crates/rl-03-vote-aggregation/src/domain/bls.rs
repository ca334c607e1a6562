//! # BLS Primitives (BLS12-381, min-pk)
//!
//! Public keys are G1 points (48 bytes compressed), signatures are G2 points
//! (96 bytes compressed). All relayers sign the same event hash, so an
//! aggregate verifies against the sum of the contributing public keys.

use blst::min_pk::{AggregatePublicKey, AggregateSignature, PublicKey, Signature};
use blst::BLST_ERROR;
use shared_types::{BlsPublicKey, BlsSignature};

use crate::error::{AggregationError, AggregationResult};

/// Domain separation tag shared by every relayer.
pub const BLS_DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

pub(crate) fn parse_public_key(key: &BlsPublicKey) -> AggregationResult<PublicKey> {
    PublicKey::from_bytes(key.as_bytes()).map_err(|_| AggregationError::InvalidPublicKey {
        key: key.to_hex(),
    })
}

pub(crate) fn parse_signature(sig: &BlsSignature, signer: &BlsPublicKey) -> AggregationResult<Signature> {
    Signature::from_bytes(sig.as_bytes()).map_err(|_| AggregationError::InvalidSignature {
        signer: signer.to_hex(),
    })
}

/// Verifies one signature over `message`.
pub fn verify_signature(
    public_key: &BlsPublicKey,
    message: &[u8],
    signature: &BlsSignature,
) -> AggregationResult<()> {
    let pk = parse_public_key(public_key)?;
    let sig = parse_signature(signature, public_key)?;
    match sig.verify(true, message, BLS_DST, &[], &pk, true) {
        BLST_ERROR::BLST_SUCCESS => Ok(()),
        _ => Err(AggregationError::InvalidSignature {
            signer: public_key.to_hex(),
        }),
    }
}

/// Verifies an aggregate of signatures that all cover `message`.
pub fn verify_aggregate(
    public_keys: &[BlsPublicKey],
    message: &[u8],
    signature: &BlsSignature,
) -> AggregationResult<()> {
    if public_keys.is_empty() {
        return Err(AggregationError::NoVotes);
    }
    let parsed = public_keys
        .iter()
        .map(parse_public_key)
        .collect::<AggregationResult<Vec<_>>>()?;
    let refs: Vec<&PublicKey> = parsed.iter().collect();
    let combined = AggregatePublicKey::aggregate(&refs, true)
        .map_err(|_| AggregationError::InvalidPublicKey {
            key: "aggregate".into(),
        })?
        .to_public_key();

    let sig = Signature::from_bytes(signature.as_bytes()).map_err(|_| {
        AggregationError::InvalidSignature {
            signer: "aggregate".into(),
        }
    })?;
    match sig.verify(true, message, BLS_DST, &[], &combined, false) {
        BLST_ERROR::BLST_SUCCESS => Ok(()),
        _ => Err(AggregationError::InvalidSignature {
            signer: "aggregate".into(),
        }),
    }
}

/// Point-adds signatures into one fixed-size signature.
pub(crate) fn aggregate_signatures(signatures: &[Signature]) -> AggregationResult<BlsSignature> {
    let refs: Vec<&Signature> = signatures.iter().collect();
    let aggregate = AggregateSignature::aggregate(&refs, true).map_err(|_| {
        AggregationError::InvalidSignature {
            signer: "aggregate".into(),
        }
    })?;
    Ok(BlsSignature(aggregate.to_signature().to_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use blst::min_pk::SecretKey;

    fn keypair(seed: u8) -> (SecretKey, BlsPublicKey) {
        let sk = SecretKey::key_gen(&[seed; 32], &[]).unwrap();
        let pk = BlsPublicKey(sk.sk_to_pk().to_bytes());
        (sk, pk)
    }

    fn sign(sk: &SecretKey, msg: &[u8]) -> BlsSignature {
        BlsSignature(sk.sign(msg, BLS_DST, &[]).to_bytes())
    }

    #[test]
    fn test_sign_and_verify() {
        let (sk, pk) = keypair(1);
        let sig = sign(&sk, b"event");
        assert!(verify_signature(&pk, b"event", &sig).is_ok());
        assert!(verify_signature(&pk, b"other", &sig).is_err());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let (sk, _) = keypair(1);
        let (_, other) = keypair(2);
        let sig = sign(&sk, b"event");
        assert!(matches!(
            verify_signature(&other, b"event", &sig),
            Err(AggregationError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn test_garbage_key_rejected() {
        let (sk, _) = keypair(1);
        let sig = sign(&sk, b"event");
        assert!(matches!(
            verify_signature(&BlsPublicKey([0xff; 48]), b"event", &sig),
            Err(AggregationError::InvalidPublicKey { .. })
        ));
    }

    #[test]
    fn test_aggregate_verifies_against_all_signers() {
        let pairs: Vec<_> = (1..=3).map(keypair).collect();
        let sigs: Vec<Signature> = pairs
            .iter()
            .map(|(sk, _)| sk.sign(b"event", BLS_DST, &[]))
            .collect();
        let agg = aggregate_signatures(&sigs).unwrap();
        let keys: Vec<BlsPublicKey> = pairs.iter().map(|(_, pk)| *pk).collect();

        assert!(verify_aggregate(&keys, b"event", &agg).is_ok());
        assert!(verify_aggregate(&keys[..2], b"event", &agg).is_err());
    }
}
