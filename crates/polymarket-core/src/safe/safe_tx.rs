//! Signing of Safe transactions.

use alloy_primitives::{Address, U256};

use crate::signing::signer::{request_signature, SigningCapability};
use crate::signing::SafeTxMessage;
use crate::types::SafeTransaction;
use crate::{Error, Result};

/// Normalise `v` of a 65-byte `r ‖ s ‖ v` signature for a Safe and return it
/// as `0x`-prefixed hex.
///
/// `v` of 0/1 becomes 27/28. A `v` of 27/28 becomes 31/32, which tells the
/// Safe the signature covers an `eth_sign`-prefixed hash.
#[allow(clippy::result_large_err)]
pub fn split_and_pack_signature(signature: &[u8]) -> Result<String> {
    if signature.len() != 65 {
        return Err(Error::validation(format!(
            "signature must be 65 bytes, got {}",
            signature.len()
        )));
    }

    let v = match signature[64] {
        v @ (0 | 1) => v + 27,
        v @ (27 | 28) => v + 4,
        other => {
            return Err(Error::validation(format!(
                "invalid signature v value {}",
                other
            )))
        }
    };

    let mut packed = [0u8; 65];
    packed[..64].copy_from_slice(&signature[..64]);
    packed[64] = v;
    Ok(format!("0x{}", hex::encode(packed)))
}

/// Build the `SafeTx` message for `transaction` with relayer-paid gas.
#[allow(clippy::result_large_err)]
pub fn safe_tx_message(transaction: &SafeTransaction, nonce: U256) -> Result<SafeTxMessage> {
    Ok(SafeTxMessage::relayed(
        transaction.to,
        transaction.value_u256()?,
        transaction.data_bytes()?,
        transaction.operation.as_u8(),
        nonce,
    ))
}

/// Sign `transaction` for execution by `safe`, returning the packed signature.
pub async fn sign_safe_transaction(
    capability: &dyn SigningCapability,
    signer: Address,
    chain_id: u64,
    safe: Address,
    transaction: &SafeTransaction,
    nonce: U256,
) -> Result<String> {
    let digest = safe_tx_message(transaction, nonce)?.signing_digest(chain_id, safe);
    let signature = request_signature(capability, signer, digest).await?;
    split_and_pack_signature(&signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::signer::MockSigningCapability;
    use crate::signing::LocalSigner;
    use alloy_primitives::{eip191_hash_message, Signature, B256};

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn raw_with_v(v: u8) -> Vec<u8> {
        let mut raw = vec![0x11u8; 32];
        raw.extend_from_slice(&[0x22u8; 32]);
        raw.push(v);
        raw
    }

    #[test]
    fn test_v_normalisation() {
        for (input, expected) in [(0u8, 27u8), (1, 28), (27, 31), (28, 32)] {
            let packed = split_and_pack_signature(&raw_with_v(input)).unwrap();
            assert_eq!(packed.len(), 132);
            assert!(packed.starts_with(&format!("0x{}{}", "11".repeat(32), "22".repeat(32))));
            assert!(packed.ends_with(&hex::encode([expected])));
        }
    }

    #[test]
    fn test_other_v_rejected() {
        for v in [2u8, 26, 29, 31, 35, 255] {
            let err = split_and_pack_signature(&raw_with_v(v)).unwrap_err();
            assert!(err.is_validation(), "v={} should be rejected", v);
        }
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(split_and_pack_signature(&[0u8; 64]).unwrap_err().is_validation());
        assert!(split_and_pack_signature(&[0u8; 66]).unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_signature_recovers_from_prefixed_hash() {
        let signer = LocalSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let safe = Address::repeat_byte(0x55);
        let tx = SafeTransaction::call(Address::repeat_byte(0x66), &[1, 2, 3]);

        let packed = sign_safe_transaction(&signer, signer.address(), 137, safe, &tx, U256::from(2u64))
            .await
            .unwrap();
        let mut raw = hex::decode(&packed[2..]).unwrap();
        assert!(raw[64] == 31 || raw[64] == 32);

        // Undo the Safe offset and recover against the eth_sign hash.
        raw[64] -= 4;
        let typed = safe_tx_message(&tx, U256::from(2u64))
            .unwrap()
            .typed_data_hash(137, safe);
        let recovered = Signature::from_raw(&raw)
            .unwrap()
            .recover_address_from_prehash(&eip191_hash_message(typed))
            .unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[tokio::test]
    async fn test_signer_output_checked() {
        let mut capability = MockSigningCapability::new();
        capability
            .expect_sign_digest()
            .returning(|_, _: B256| Ok(vec![0u8; 65]));

        // v = 0 is normalised to 27.
        let tx = SafeTransaction::call(Address::ZERO, &[]);
        let packed = sign_safe_transaction(&capability, Address::ZERO, 137, Address::ZERO, &tx, U256::ZERO)
            .await
            .unwrap();
        assert!(packed.ends_with("1b"));
    }
}
