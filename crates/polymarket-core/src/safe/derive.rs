//! Counterfactual Safe address derivation (CREATE2).

use alloy_primitives::{b256, keccak256, Address, B256};

/// Hash of the proxy creation code deployed by the Safe factory.
pub const SAFE_INIT_CODE_HASH: B256 =
    b256!("2bce2127ff07fb632d16c8347c4ebf501f4841168bed00d9e6ef715ddb6fcecf");

/// Address of the Safe the factory deploys for `owner`.
///
/// The salt is `keccak256(abi.encode(owner))`. The Safe does not need to
/// exist yet.
pub fn derive_safe_address(owner: Address, factory: Address) -> Address {
    let salt = keccak256(B256::left_padding_from(owner.as_slice()));
    factory.create2(salt, SAFE_INIT_CODE_HASH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const FACTORY: Address = address!("aacFeEa03eb1561C4e67d661e40682Bd20E3541b");
    const OWNER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    #[test]
    fn test_derivation_is_deterministic() {
        assert_eq!(
            derive_safe_address(OWNER, FACTORY),
            derive_safe_address(OWNER, FACTORY)
        );
    }

    #[test]
    fn test_derivation_depends_on_inputs() {
        let base = derive_safe_address(OWNER, FACTORY);
        assert_ne!(base, derive_safe_address(Address::repeat_byte(0x01), FACTORY));
        assert_ne!(base, derive_safe_address(OWNER, Address::repeat_byte(0x02)));
        assert_ne!(base, OWNER);
    }

    #[test]
    fn test_matches_create2_preimage() {
        let salt = keccak256(B256::left_padding_from(OWNER.as_slice()));
        let mut preimage = vec![0xff];
        preimage.extend_from_slice(FACTORY.as_slice());
        preimage.extend_from_slice(salt.as_slice());
        preimage.extend_from_slice(SAFE_INIT_CODE_HASH.as_slice());

        assert_eq!(
            derive_safe_address(OWNER, FACTORY),
            Address::from_slice(&keccak256(&preimage)[12..])
        );
    }
}
