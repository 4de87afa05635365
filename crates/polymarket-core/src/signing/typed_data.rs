//! EIP-712 struct hashes for the non-order messages: `ClobAuth` (L1 API
//! authentication), `CreateProxy` (Safe deployment) and `SafeTx`.
//!
//! Each hash is `keccak256(typeHash ‖ encodeData)` with every field padded to
//! a full 32-byte word; dynamic values (`string`, `bytes`) are hashed first.

use alloy_primitives::{eip191_hash_message, keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;

use super::domain::Eip712Domain;
use super::signer::{request_signature, SigningCapability};
use crate::Result;

/// Fixed message attested by every L1 authentication signature.
pub const CLOB_AUTH_MESSAGE: &str = "This message attests that I control the given wallet";

const CLOB_AUTH_TYPE: &str = "ClobAuth(address address,string timestamp,uint256 nonce,string message)";

const CREATE_PROXY_TYPE: &str =
    "CreateProxy(address paymentToken,uint256 payment,address paymentReceiver)";

const SAFE_TX_TYPE: &str = "SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)";

/// Compute the EIP-712 typed data hash:
/// `keccak256("\x19\x01" ‖ domainSeparator ‖ structHash)`.
pub fn typed_data_hash(domain_separator: B256, struct_hash: B256) -> B256 {
    let mut data = [0u8; 66];
    data[0] = 0x19;
    data[1] = 0x01;
    data[2..34].copy_from_slice(domain_separator.as_slice());
    data[34..].copy_from_slice(struct_hash.as_slice());
    keccak256(data)
}

/// Struct hash of a `ClobAuth` message.
///
/// The timestamp is signed as a decimal string, not as an integer.
pub fn clob_auth_struct_hash(address: Address, timestamp: &str, nonce: U256) -> B256 {
    let encoded = (
        keccak256(CLOB_AUTH_TYPE.as_bytes()),
        pad_address(address),
        keccak256(timestamp.as_bytes()),
        nonce,
        keccak256(CLOB_AUTH_MESSAGE.as_bytes()),
    )
        .abi_encode_packed();

    keccak256(&encoded)
}

/// Digest signed for L1 authentication.
pub fn clob_auth_digest(chain_id: u64, address: Address, timestamp: &str, nonce: U256) -> B256 {
    typed_data_hash(
        Eip712Domain::clob_auth(chain_id).separator(),
        clob_auth_struct_hash(address, timestamp, nonce),
    )
}

/// Struct hash of a `CreateProxy` message.
pub fn create_proxy_struct_hash(
    payment_token: Address,
    payment: U256,
    payment_receiver: Address,
) -> B256 {
    let encoded = (
        keccak256(CREATE_PROXY_TYPE.as_bytes()),
        pad_address(payment_token),
        payment,
        pad_address(payment_receiver),
    )
        .abi_encode_packed();

    keccak256(&encoded)
}

/// Digest signed to request deployment of a Safe through the proxy factory.
pub fn create_proxy_digest(
    chain_id: u64,
    factory: Address,
    payment_token: Address,
    payment: U256,
    payment_receiver: Address,
) -> B256 {
    typed_data_hash(
        Eip712Domain::proxy_factory(chain_id, factory).separator(),
        create_proxy_struct_hash(payment_token, payment, payment_receiver),
    )
}

/// The `SafeTx` message of a Gnosis Safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeTxMessage {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: u8,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: U256,
}

impl SafeTxMessage {
    /// A relayed transaction: the relayer pays gas, so every gas field is
    /// zero and there is no refund.
    pub fn relayed(to: Address, value: U256, data: Bytes, operation: u8, nonce: U256) -> Self {
        Self {
            to,
            value,
            data,
            operation,
            safe_tx_gas: U256::ZERO,
            base_gas: U256::ZERO,
            gas_price: U256::ZERO,
            gas_token: Address::ZERO,
            refund_receiver: Address::ZERO,
            nonce,
        }
    }

    pub fn struct_hash(&self) -> B256 {
        let encoded = (
            keccak256(SAFE_TX_TYPE.as_bytes()),
            pad_address(self.to),
            self.value,
            keccak256(&self.data),
            U256::from(self.operation),
            self.safe_tx_gas,
            self.base_gas,
            self.gas_price,
            pad_address(self.gas_token),
            pad_address(self.refund_receiver),
            self.nonce,
        )
            .abi_encode_packed();

        keccak256(&encoded)
    }

    /// Typed data hash of this transaction for the given Safe.
    pub fn typed_data_hash(&self, chain_id: u64, safe: Address) -> B256 {
        typed_data_hash(
            Eip712Domain::safe(chain_id, safe).separator(),
            self.struct_hash(),
        )
    }

    /// Digest handed to the signer: the typed data hash wrapped again with
    /// the `"\x19Ethereum Signed Message:\n32"` prefix. Safes accept such
    /// signatures when `v` is shifted by 4.
    pub fn signing_digest(&self, chain_id: u64, safe: Address) -> B256 {
        eip191_hash_message(self.typed_data_hash(chain_id, safe))
    }
}

/// Sign a `ClobAuth` message, returning the `0x`-prefixed signature.
pub async fn sign_clob_auth(
    capability: &dyn SigningCapability,
    chain_id: u64,
    address: Address,
    timestamp: &str,
    nonce: U256,
) -> Result<String> {
    let digest = clob_auth_digest(chain_id, address, timestamp, nonce);
    let signature = request_signature(capability, address, digest).await?;
    Ok(format!("0x{}", hex::encode(signature)))
}

/// Sign a `CreateProxy` message as `signer`, returning the `0x`-prefixed
/// signature.
pub async fn sign_create_proxy(
    capability: &dyn SigningCapability,
    chain_id: u64,
    factory: Address,
    signer: Address,
    payment_token: Address,
    payment: U256,
    payment_receiver: Address,
) -> Result<String> {
    let digest = create_proxy_digest(chain_id, factory, payment_token, payment, payment_receiver);
    let signature = request_signature(capability, signer, digest).await?;
    Ok(format!("0x{}", hex::encode(signature)))
}

fn pad_address(address: Address) -> B256 {
    B256::left_padding_from(address.as_slice())
}
