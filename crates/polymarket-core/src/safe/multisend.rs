//! Batching several Safe calls into one `multiSend(bytes)` delegate call.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};

use crate::types::{OperationType, SafeTransaction};
use crate::{Error, Result};

sol! {
    function multiSend(bytes transactions);
}

/// Bytes of a packed call before its calldata: operation, to, value, length.
pub const PACKED_HEADER_LEN: usize = 1 + 20 + 32 + 32;

/// Pack calls back to back as `operation ‖ to ‖ value ‖ len(data) ‖ data`.
#[allow(clippy::result_large_err)]
pub fn pack_transactions(transactions: &[SafeTransaction]) -> Result<Vec<u8>> {
    let mut packed = Vec::new();
    for tx in transactions {
        let data = tx.data_bytes()?;
        packed.push(tx.operation.as_u8());
        packed.extend_from_slice(tx.to.as_slice());
        packed.extend_from_slice(&tx.value_u256()?.to_be_bytes::<32>());
        packed.extend_from_slice(&U256::from(data.len()).to_be_bytes::<32>());
        packed.extend_from_slice(&data);
    }
    Ok(packed)
}

/// Calldata of `multiSend(packed)`.
pub fn encode_multisend(packed: &[u8]) -> Vec<u8> {
    multiSendCall {
        transactions: Bytes::copy_from_slice(packed),
    }
    .abi_encode()
}

/// Collapse calls into the single transaction a Safe executes.
///
/// One call is returned as is. Several become a delegate call to the
/// multisend contract. An empty list is rejected.
#[allow(clippy::result_large_err)]
pub fn aggregate_transactions(
    transactions: &[SafeTransaction],
    multisend: Address,
) -> Result<SafeTransaction> {
    match transactions {
        [] => Err(Error::validation("no transactions to execute")),
        [single] => Ok(single.clone()),
        many => {
            let packed = pack_transactions(many)?;
            Ok(SafeTransaction {
                to: multisend,
                operation: OperationType::DelegateCall,
                data: format!("0x{}", hex::encode(encode_multisend(&packed))),
                value: "0".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multisend() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn sample(len: usize, value: &str) -> SafeTransaction {
        SafeTransaction {
            value: value.to_string(),
            ..SafeTransaction::call(Address::repeat_byte(len as u8), &vec![0xab; len])
        }
    }

    #[test]
    fn test_packed_length() {
        let txs = vec![sample(0, "0"), sample(4, "1"), sample(68, "0"), sample(33, "7")];
        let packed = pack_transactions(&txs).unwrap();
        let expected: usize = [0, 4, 68, 33].iter().map(|l| PACKED_HEADER_LEN + l).sum();
        assert_eq!(packed.len(), expected);
    }

    #[test]
    fn test_packed_layout() {
        let tx = SafeTransaction {
            operation: OperationType::DelegateCall,
            ..sample(2, "258")
        };
        let packed = pack_transactions(&[tx.clone()]).unwrap();

        assert_eq!(packed[0], 1);
        assert_eq!(&packed[1..21], tx.to.as_slice());
        assert_eq!(&packed[21..53], &U256::from(258u64).to_be_bytes::<32>());
        assert_eq!(&packed[53..85], &U256::from(2u64).to_be_bytes::<32>());
        assert_eq!(&packed[85..], &[0xab, 0xab]);
    }

    #[test]
    fn test_encoding_layout() {
        let packed = pack_transactions(&[sample(4, "0"), sample(5, "0")]).unwrap();
        let encoded = encode_multisend(&packed);

        assert_eq!(&encoded[..4], &[0x8d, 0x80, 0xff, 0x0a]);
        // offset of the only dynamic argument, then its length
        assert_eq!(&encoded[4..36], &U256::from(32u64).to_be_bytes::<32>());
        assert_eq!(&encoded[36..68], &U256::from(packed.len()).to_be_bytes::<32>());
        assert_eq!(&encoded[68..68 + packed.len()], packed.as_slice());
        assert_eq!((encoded.len() - 4) % 32, 0);
        assert!(encoded[68 + packed.len()..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_single_transaction_passes_through() {
        let tx = sample(4, "0");
        assert_eq!(aggregate_transactions(&[tx.clone()], multisend()).unwrap(), tx);
    }

    #[test]
    fn test_many_transactions_become_delegate_call() {
        let txs = vec![sample(4, "0"), sample(8, "0")];
        let aggregated = aggregate_transactions(&txs, multisend()).unwrap();

        assert_eq!(aggregated.to, multisend());
        assert_eq!(aggregated.operation, OperationType::DelegateCall);
        assert_eq!(aggregated.value, "0");
        assert!(aggregated.data.starts_with("0x8d80ff0a"));
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(aggregate_transactions(&[], multisend())
            .unwrap_err()
            .is_validation());
    }
}
