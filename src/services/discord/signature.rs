use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

#[derive(Debug, thiserror::Error)]
pub enum InteractionError {
    #[error("Invalid public key: {0}")]
    InvalidKey(String),
    #[error("Missing signature headers")]
    MissingHeaders,
    #[error("Invalid request signature")]
    InvalidSignature,
    #[error("Malformed interaction: {0}")]
    Malformed(String),
}

/// Checks the Ed25519 signature Discord puts on every interaction request
#[derive(Debug, Clone)]
pub struct InteractionVerifier {
    key: VerifyingKey,
}

impl InteractionVerifier {
    pub fn from_hex(public_key: &str) -> Result<Self, InteractionError> {
        let bytes = hex::decode(public_key.trim()).map_err(|e| InteractionError::InvalidKey(e.to_string()))?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| InteractionError::InvalidKey(format!("expected {} bytes", PUBLIC_KEY_LENGTH)))?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|e| InteractionError::InvalidKey(e.to_string()))?;

        Ok(Self { key })
    }

    /// The signed message is the timestamp header followed by the raw body
    pub fn verify(&self, signature_hex: &str, timestamp: &str, body: &[u8]) -> Result<(), InteractionError> {
        let bytes = hex::decode(signature_hex).map_err(|_| InteractionError::InvalidSignature)?;
        let bytes: [u8; SIGNATURE_LENGTH] = bytes.try_into().map_err(|_| InteractionError::InvalidSignature)?;
        let signature = Signature::from_bytes(&bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify(&message, &signature)
            .map_err(|_| InteractionError::InvalidSignature)
    }
}
