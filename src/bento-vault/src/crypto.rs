//! Signer recovery for approval signatures.
//!
//! Pure functions: `secp256k1` public-key recovery from a prehashed digest, then
//! `address = keccak256(pubkey)[12..]`.
//!
//! Like `ecrecover`, both `s` halves are accepted: a high-`s` signature is folded onto its low-`s`
//! twin `(r, n - s, v ^ 1)` before recovery, so the two forms recover the same signer.

use alloy_primitives::{keccak256, Address, B256};
use bento_vault_types::Signature;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};

use crate::errors::SignatureError;

/// Recover the EOA that signed `digest`.
///
/// Accepts `v` in {0, 1, 27, 28}; anything else is rejected rather than guessed.
pub fn recover_signer(digest: B256, signature: &Signature) -> Result<Address, SignatureError> {
    let (sig, recovery_id) = parse(signature)?;

    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    let recovered = address_of(&key);
    if recovered == Address::ZERO {
        return Err(SignatureError::ZeroAddress);
    }
    Ok(recovered)
}

/// Low-`s` form of `signature` with `v` in {27, 28}.
pub fn canonicalize(signature: &Signature) -> Result<Signature, SignatureError> {
    let (sig, recovery_id) = parse(signature)?;
    let (r, s) = sig.split_bytes();
    Ok(Signature::new(
        27 + recovery_id.to_byte(),
        B256::from_slice(r.as_slice()),
        B256::from_slice(s.as_slice()),
    ))
}

fn parse(signature: &Signature) -> Result<(EcdsaSignature, RecoveryId), SignatureError> {
    let recovery_id = parse_recovery_id(signature.v)?;

    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(signature.r.as_slice());
    rs[32..].copy_from_slice(signature.s.as_slice());
    let sig = EcdsaSignature::from_slice(&rs).map_err(|_| SignatureError::InvalidFormat)?;

    Ok(match sig.normalize_s() {
        Some(low) => (
            low,
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
        ),
        None => (sig, recovery_id),
    })
}

/// Ethereum address of a public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 SEC1 tag.
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };
    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use k256::ecdsa::SigningKey;

    const DIGEST: B256 = b256!("0981b5803c7923ea3940755e2af27f58cd59e4fc060ad19705f701cc706a74aa");
    const R: B256 = b256!("f973a0b87062c389d125d8199e803b832b6ac6bf7867a4f6cd87506060fc4c58");
    const S: B256 = b256!("67fe9f4e764df0a9b81cac75b100ed49e37b216e91bb8e3167aa4c771863b142");
    const S_HIGH: B256 = b256!("980160b189b20f5647e3538a4eff12b4d733bb781d8d120a58281215b7d28fff");
    const SIGNER: Address = address!("7e5f4552091a69125d5dfcb7b8c2659029395bdf");

    #[test]
    fn test_recover_known_vector() {
        let signature = Signature::new(27, R, S);
        assert_eq!(recover_signer(DIGEST, &signature).unwrap(), SIGNER);
    }

    #[test]
    fn test_recover_accepts_normalized_v() {
        let signature = Signature::new(0, R, S);
        assert_eq!(recover_signer(DIGEST, &signature).unwrap(), SIGNER);
    }

    #[test]
    fn test_wrong_parity_recovers_someone_else() {
        let signature = Signature::new(28, R, S);
        let recovered = recover_signer(DIGEST, &signature);
        assert_ne!(recovered, Ok(SIGNER));
    }

    #[test]
    fn test_high_s_twin_recovers_same_signer() {
        let twin = Signature::new(28, R, S_HIGH);
        assert_eq!(recover_signer(DIGEST, &twin).unwrap(), SIGNER);
        assert_eq!(canonicalize(&twin).unwrap(), Signature::new(27, R, S));
        assert_eq!(canonicalize(&Signature::new(0, R, S)).unwrap(), Signature::new(27, R, S));
        // Same s half, wrong parity: still someone else.
        assert_ne!(recover_signer(DIGEST, &Signature::new(27, R, S_HIGH)), Ok(SIGNER));
    }

    #[test]
    fn test_rejects_bad_recovery_id() {
        for v in [2u8, 26, 29, 35, 255] {
            let signature = Signature::new(v, R, S);
            assert_eq!(
                recover_signer(DIGEST, &signature),
                Err(SignatureError::InvalidRecoveryId(v))
            );
        }
    }

    #[test]
    fn test_rejects_zero_scalars() {
        let signature = Signature::new(27, B256::ZERO, S);
        assert_eq!(
            recover_signer(DIGEST, &signature),
            Err(SignatureError::InvalidFormat)
        );
        let signature = Signature::new(27, R, B256::ZERO);
        assert_eq!(
            recover_signer(DIGEST, &signature),
            Err(SignatureError::InvalidFormat)
        );
    }

    #[test]
    fn test_tampered_digest_does_not_recover_signer() {
        let mut tampered = DIGEST;
        tampered.0[0] ^= 1;
        let signature = Signature::new(27, R, S);
        assert_ne!(recover_signer(tampered, &signature), Ok(SIGNER));
    }

    #[test]
    fn test_address_of_known_keys() {
        let mut one = [0u8; 32];
        one[31] = 1;
        let key = SigningKey::from_slice(&one).unwrap();
        assert_eq!(address_of(key.verifying_key()), SIGNER);

        let mut two = [0u8; 32];
        two[31] = 2;
        let key = SigningKey::from_slice(&two).unwrap();
        assert_eq!(
            address_of(key.verifying_key()),
            address!("2b5ad5c4795c026514f8317c7a215e218dccd6cf")
        );
    }
}
