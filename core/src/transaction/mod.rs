use crate::block::{Hash, sha256};
use crate::error::{ChainError, Result};
use std::fmt;

/// Capability a block needs from anything it carries.
pub trait Transaction: fmt::Debug + Send + Sync {
    /// Content-addressed identifier; the merkle root commits to it.
    fn id(&self) -> Hash;

    /// Canonical byte form, used for block size accounting.
    fn serialize(&self) -> Vec<u8>;

    /// Stateless well-formedness check.
    fn validate(&self) -> Result<()>;

    fn signature(&self) -> &Signature;

    /// One-line human description for display layers.
    fn summary(&self) -> String;
}

/// Signature slot of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Signature {
    #[default]
    Unsigned,
    Attached(Vec<u8>),
}

impl Signature {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Signature::Unsigned => &[],
            Signature::Attached(bytes) => bytes,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Signature::Attached(_))
    }
}

/// Value transfer between two opaque account identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct BankTransaction {
    /// Caller-chosen reference bytes, part of the identifier preimage.
    pub id: Vec<u8>,
    pub sender: Vec<u8>,
    pub recipient: Vec<u8>,
    pub amount: f64,
    pub signature: Signature,
}

fn write_var_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
    buf.extend_from_slice(data);
}

impl BankTransaction {
    pub fn new(
        id: impl Into<Vec<u8>>,
        sender: impl Into<Vec<u8>>,
        recipient: impl Into<Vec<u8>>,
        amount: f64,
    ) -> Self {
        BankTransaction {
            id: id.into(),
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
            signature: Signature::Unsigned,
        }
    }

    /// Bytes covered by the identifier and by any future signature:
    /// length-prefixed (u32 LE) reference, sender and recipient, then the
    /// amount as little-endian f64 bits.
    pub fn serialize_for_hash(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            12 + self.id.len() + self.sender.len() + self.recipient.len() + 8,
        );
        write_var_bytes(&mut buf, &self.id);
        write_var_bytes(&mut buf, &self.sender);
        write_var_bytes(&mut buf, &self.recipient);
        buf.extend_from_slice(&self.amount.to_le_bytes());
        buf
    }

    pub fn attach_signature(&mut self, signature: Vec<u8>) {
        self.signature = Signature::Attached(signature);
    }

    /// No signature scheme is wired in, so nothing verifies: unsigned
    /// transactions and attached signatures are both reported as invalid.
    pub fn verify_signature(&self) -> Result<()> {
        match &self.signature {
            Signature::Unsigned => Err(ChainError::invalid_signature(format!(
                "transaction {} is unsigned",
                hex::encode(self.id())
            ))),
            Signature::Attached(_) => Err(ChainError::invalid_signature(
                "no signature scheme configured",
            )),
        }
    }
}

impl Transaction for BankTransaction {
    fn id(&self) -> Hash {
        sha256(&self.serialize_for_hash())
    }

    fn serialize(&self) -> Vec<u8> {
        let mut buf = self.serialize_for_hash();
        write_var_bytes(&mut buf, self.signature.as_bytes());
        buf
    }

    fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ChainError::invalid_transaction("amount must be positive"));
        }
        if self.sender.is_empty() || self.recipient.is_empty() {
            return Err(ChainError::invalid_transaction(
                "sender and recipient cannot be empty",
            ));
        }
        Ok(())
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn summary(&self) -> String {
        format!(
            "{} -> {}: {}",
            String::from_utf8_lossy(&self.sender),
            String::from_utf8_lossy(&self.recipient),
            self.amount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sample() -> BankTransaction {
        BankTransaction::new("tx-1", "alice", "bob", 12.5)
    }

    #[test]
    fn valid_transaction_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn non_positive_amount_rejected() {
        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut tx = sample();
            tx.amount = amount;
            let err = tx.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidTransaction);
            assert_eq!(err.message(), "amount must be positive");
        }
    }

    #[test]
    fn empty_parties_rejected() {
        let mut tx = sample();
        tx.sender.clear();
        assert!(tx.validate().is_err());

        let mut tx = sample();
        tx.recipient.clear();
        assert_eq!(
            tx.validate().unwrap_err().message(),
            "sender and recipient cannot be empty"
        );
    }

    #[test]
    fn id_tracks_content() {
        let tx = sample();
        let mut changed = tx.clone();
        changed.amount = 99.0;
        assert_eq!(tx.id(), sample().id());
        assert_ne!(tx.id(), changed.id());
    }

    #[test]
    fn id_ignores_signature() {
        let mut tx = sample();
        let before = tx.id();
        let unsigned_len = tx.serialize().len();

        tx.attach_signature(vec![0xAB; 64]);
        assert_eq!(tx.id(), before);
        assert_eq!(tx.serialize().len(), unsigned_len + 64);
    }

    #[test]
    fn serialize_layout() {
        let tx = BankTransaction::new("x", "a", "b", 1.0);
        let bytes = tx.serialize();
        // 3 x (4 + 1) + 8 + 4 (empty signature)
        assert_eq!(bytes.len(), 27);
        assert_eq!(&bytes[0..5], &[1, 0, 0, 0, b'x']);
        assert_eq!(&bytes[15..23], &1.0f64.to_le_bytes());
    }

    #[test]
    fn signatures_never_verify() {
        let mut tx = sample();
        assert_eq!(
            tx.verify_signature().unwrap_err().kind(),
            ErrorKind::InvalidSignature
        );
        assert!(!tx.signature().is_signed());

        tx.attach_signature(vec![1, 2, 3]);
        assert!(tx.signature().is_signed());
        assert_eq!(
            tx.verify_signature().unwrap_err().kind(),
            ErrorKind::InvalidSignature
        );
    }
}
