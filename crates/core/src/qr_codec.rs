//! Tamper-evident QR payload codec.
//!
//! A ticket's identifying fields are serialized to JSON, encrypted with
//! AES-256-GCM, and the resulting bytes are tagged with HMAC-SHA256
//! (encrypt-then-MAC). The QR symbol carries a small JSON envelope:
//!
//! ```text
//! {"ciphertext":"<base64(nonce || aes-gcm output)>","tag":"<base64(hmac)>"}
//! ```
//!
//! Decoding verifies the tag in constant time *before* any decryption is
//! attempted. Both keys are derived from one configured shared secret; there
//! is no compiled-in default.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum accepted length of the shared secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// AES-GCM nonce length (96 bits).
const NONCE_LEN: usize = 12;

/// Derivation labels. Changing either invalidates every issued ticket.
const ENC_KEY_LABEL: &[u8] = b"ticketgate/qr/enc/v1";
const MAC_KEY_LABEL: &[u8] = b"ticketgate/qr/mac/v1";

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The seven fields sealed into every ticket's QR code.
///
/// Field order is the serialization order; `timestamp` is the caller-supplied
/// issuance time in milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub ticket_id: String,
    pub reservation_id: String,
    pub event_id: String,
    pub participant_name: String,
    pub ticket_number: u32,
    pub event_date: String,
    pub timestamp: i64,
}

/// Wire container embedded in the QR symbol.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QrEnvelope {
    pub ciphertext: String,
    pub tag: String,
}

/// Why a QR string was refused.
///
/// Callers must not show operators which variant occurred; the scanner
/// reports both as an unknown ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QrCodecError {
    #[error("QR content is not a well-formed ticket envelope")]
    InvalidFormat,
    #[error("QR content failed integrity verification")]
    TamperedOrForged,
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Encoder/verifier bound to one shared secret.
#[derive(Clone)]
pub struct QrCodec {
    cipher: Aes256Gcm,
    mac_key: [u8; 32],
}

impl std::fmt::Debug for QrCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrCodec").finish_non_exhaustive()
    }
}

impl QrCodec {
    /// Build a codec from the deployment's shared secret.
    ///
    /// Rejects secrets shorter than [`MIN_SECRET_LEN`] bytes.
    pub fn new(secret: &str) -> Result<Self, CoreError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(CoreError::Validation(format!(
                "QR signing secret must be at least {MIN_SECRET_LEN} bytes (got {})",
                secret.len()
            )));
        }

        let enc_key = derive_key(secret.as_bytes(), ENC_KEY_LABEL);
        let mac_key = derive_key(secret.as_bytes(), MAC_KEY_LABEL);
        let cipher = Aes256Gcm::new_from_slice(&enc_key)
            .map_err(|e| CoreError::Internal(format!("AES key setup failed: {e}")))?;

        Ok(Self { cipher, mac_key })
    }

    /// Seal a payload into an opaque, QR-safe string.
    ///
    /// Output differs between calls for the same payload (random nonce).
    pub fn encode(&self, payload: &QrPayload) -> Result<String, CoreError> {
        let plaintext = serde_json::to_vec(payload)
            .map_err(|e| CoreError::Internal(format!("QR payload serialization failed: {e}")))?;

        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let encrypted = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_ref())
            .map_err(|_| CoreError::Internal("QR payload encryption failed".into()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + encrypted.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&encrypted);

        let mut mac = self.mac();
        mac.update(&sealed);
        let tag = mac.finalize().into_bytes();

        let envelope = QrEnvelope {
            ciphertext: STANDARD.encode(&sealed),
            tag: STANDARD.encode(tag),
        };
        serde_json::to_string(&envelope)
            .map_err(|e| CoreError::Internal(format!("QR envelope serialization failed: {e}")))
    }

    /// Verify and open a string produced by [`QrCodec::encode`].
    pub fn decode(&self, content: &str) -> Result<QrPayload, QrCodecError> {
        let envelope: QrEnvelope =
            serde_json::from_str(content).map_err(|_| QrCodecError::InvalidFormat)?;
        let sealed = STANDARD
            .decode(envelope.ciphertext.as_bytes())
            .map_err(|_| QrCodecError::InvalidFormat)?;
        let tag = STANDARD
            .decode(envelope.tag.as_bytes())
            .map_err(|_| QrCodecError::InvalidFormat)?;

        let mut mac = self.mac();
        mac.update(&sealed);
        mac.verify_slice(&tag)
            .map_err(|_| QrCodecError::TamperedOrForged)?;

        if sealed.len() < NONCE_LEN {
            return Err(QrCodecError::TamperedOrForged);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| QrCodecError::TamperedOrForged)?;

        serde_json::from_slice(&plaintext).map_err(|_| QrCodecError::InvalidFormat)
    }

    fn mac(&self) -> HmacSha256 {
        <HmacSha256 as Mac>::new_from_slice(&self.mac_key).expect("HMAC accepts any key length")
    }
}

/// HMAC-SHA256(secret, label) as a 32-byte subkey.
fn derive_key(secret: &[u8], label: &[u8]) -> [u8; 32] {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(label);
    let mut key = [0u8; 32];
    key.copy_from_slice(&mac.finalize().into_bytes());
    key
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
