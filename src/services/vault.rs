//! Credential vault
//!
//! Encrypts per-user provider secrets before they reach storage and produces
//! display-safe masked forms for read paths.
//!
//! Tokens have the form `<hex-nonce>:<hex-ciphertext>`. New tokens use
//! AES-256-GCM with a 12-byte nonce. Tokens with a 16-byte IV are legacy
//! AES-256-CBC/PKCS#7 tokens; they still decrypt but carry no MAC, so a
//! wrong key is only detected through padding or UTF-8 failures.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

const TOKEN_DELIMITER: char = ':';
const GCM_NONCE_LEN: usize = 12;
const LEGACY_CBC_IV_LEN: usize = 16;

/// Secrets longer than this keep a 10-character prefix when masked
const MASK_THRESHOLD: usize = 14;
const MASK_HEAD_CHARS: usize = 10;
const MASK_TAIL_CHARS: usize = 4;

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Vault errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// Malformed token, wrong key or tampered ciphertext
    #[error("Malformed or undecryptable credential: {0}")]
    Decode(String),

    #[error("Credential encryption failed: {0}")]
    Encrypt(String),
}

/// Symmetric vault keyed by SHA-256 of the configured master secret
#[derive(Clone)]
pub struct CredentialVault {
    key: [u8; 32],
}

impl fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVault")
            .field("key", &"[redacted]")
            .finish()
    }
}

impl CredentialVault {
    /// Derive the vault key from a master secret
    pub fn new(master_secret: &str) -> Self {
        let key: [u8; 32] = Sha256::digest(master_secret.as_bytes()).into();
        Self { key }
    }

    /// Encrypt a secret with a fresh random nonce
    pub fn encrypt(&self, plaintext: &str) -> Result<String, VaultError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| VaultError::Encrypt("AES-GCM encryption failed".to_string()))?;

        Ok(format!(
            "{}{}{}",
            hex::encode(nonce),
            TOKEN_DELIMITER,
            hex::encode(ciphertext)
        ))
    }

    /// Decrypt a token produced by [`CredentialVault::encrypt`] or the legacy CBC scheme
    pub fn decrypt(&self, token: &str) -> Result<String, VaultError> {
        let (iv_hex, body_hex) = token
            .split_once(TOKEN_DELIMITER)
            .ok_or_else(|| VaultError::Decode("missing delimiter".to_string()))?;

        let iv = hex::decode(iv_hex)
            .map_err(|e| VaultError::Decode(format!("invalid nonce encoding: {}", e)))?;
        let body = hex::decode(body_hex)
            .map_err(|e| VaultError::Decode(format!("invalid ciphertext encoding: {}", e)))?;
        if body.is_empty() {
            return Err(VaultError::Decode("empty ciphertext".to_string()));
        }

        let plaintext = match iv.len() {
            GCM_NONCE_LEN => self.open_gcm(&iv, &body)?,
            LEGACY_CBC_IV_LEN => self.open_legacy_cbc(&iv, &body)?,
            other => {
                return Err(VaultError::Decode(format!("unexpected nonce length {}", other)));
            }
        };

        String::from_utf8(plaintext)
            .map_err(|_| VaultError::Decode("plaintext is not valid UTF-8".to_string()))
    }

    fn open_gcm(&self, nonce: &[u8], body: &[u8]) -> Result<Vec<u8>, VaultError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        cipher
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|_| VaultError::Decode("authentication failed".to_string()))
    }

    fn open_legacy_cbc(&self, iv: &[u8], body: &[u8]) -> Result<Vec<u8>, VaultError> {
        if body.len() % LEGACY_CBC_IV_LEN != 0 {
            return Err(VaultError::Decode("ciphertext is not block aligned".to_string()));
        }
        let decryptor = Aes256CbcDec::new_from_slices(&self.key, iv)
            .map_err(|e| VaultError::Decode(e.to_string()))?;
        decryptor
            .decrypt_padded_vec_mut::<Pkcs7>(body)
            .map_err(|_| VaultError::Decode("invalid padding".to_string()))
    }
}

/// Mask a secret for display
///
/// Longer than 14 characters: first 10 + `...` + last 4. Otherwise `***` + last 4.
pub fn mask(plaintext: &str) -> String {
    let chars: Vec<char> = plaintext.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(MASK_TAIL_CHARS)..]
        .iter()
        .collect();

    if chars.len() > MASK_THRESHOLD {
        let head: String = chars[..MASK_HEAD_CHARS].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        format!("***{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbc::cipher::BlockEncryptMut;

    type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

    fn legacy_token(master: &str, iv: [u8; 16], plaintext: &str) -> String {
        let key: [u8; 32] = Sha256::digest(master.as_bytes()).into();
        let ciphertext = Aes256CbcEnc::new_from_slices(&key, &iv)
            .unwrap()
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        format!("{}:{}", hex::encode(iv), hex::encode(ciphertext))
    }

    #[test]
    fn test_round_trip() {
        let vault = CredentialVault::new("master-secret");
        for secret in ["sk-ant-api03-abcdef", "x", "http://localhost:11434", "密钥-ключ"] {
            let token = vault.encrypt(secret).unwrap();
            assert_eq!(vault.decrypt(&token).unwrap(), secret);
        }
    }

    #[test]
    fn test_encrypt_is_not_deterministic() {
        let vault = CredentialVault::new("master-secret");
        let first = vault.encrypt("sk-same").unwrap();
        let second = vault.encrypt("sk-same").unwrap();

        assert_ne!(first, second);
        assert_eq!(vault.decrypt(&first).unwrap(), "sk-same");
        assert_eq!(vault.decrypt(&second).unwrap(), "sk-same");
    }

    #[test]
    fn test_token_shape() {
        let vault = CredentialVault::new("master-secret");
        let token = vault.encrypt("sk-test").unwrap();
        let (nonce, body) = token.split_once(':').unwrap();

        assert_eq!(nonce.len(), GCM_NONCE_LEN * 2);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(body.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!token.contains("sk-test"));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let vault = CredentialVault::new("master-secret");
        for token in [
            "not-a-valid-token",
            "",
            ":",
            "zz:00",
            "000102030405060708090a0b:",
            "0001:abcd",
            "000102030405060708090a0b:nothex",
        ] {
            assert!(
                matches!(vault.decrypt(token), Err(VaultError::Decode(_))),
                "token {:?} should be rejected",
                token
            );
        }
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = CredentialVault::new("key-one").encrypt("sk-secret").unwrap();
        let result = CredentialVault::new("key-two").decrypt(&token);
        assert!(matches!(result, Err(VaultError::Decode(_))));
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let vault = CredentialVault::new("master-secret");
        let token = vault.encrypt("sk-secret").unwrap();
        let (nonce, body) = token.split_once(':').unwrap();
        let mut bytes = hex::decode(body).unwrap();
        bytes[0] ^= 0x01;
        let tampered = format!("{}:{}", nonce, hex::encode(bytes));

        assert!(matches!(vault.decrypt(&tampered), Err(VaultError::Decode(_))));
    }

    #[test]
    fn test_legacy_cbc_tokens_decrypt() {
        let token = legacy_token("master-secret", [7u8; 16], "sk-ant-legacy-key-123");
        let vault = CredentialVault::new("master-secret");
        assert_eq!(vault.decrypt(&token).unwrap(), "sk-ant-legacy-key-123");
    }

    #[test]
    fn test_legacy_cbc_bad_padding_rejected() {
        let vault = CredentialVault::new("master-secret");
        let token = format!("{}:{}", hex::encode([1u8; 16]), hex::encode([0u8; 15]));
        assert!(matches!(vault.decrypt(&token), Err(VaultError::Decode(_))));
    }

    #[test]
    fn test_mask_long_secret() {
        assert_eq!(mask("sk-ant-abcdefghijklmnop"), "sk-ant-abc...mnop");
    }

    #[test]
    fn test_mask_short_secret() {
        assert_eq!(mask("sk-short"), "***hort");
        assert_eq!(mask("abc"), "***abc");
        assert_eq!(mask(""), "***");
    }

    #[test]
    fn test_mask_boundary() {
        // 14 characters is still "short"
        assert_eq!(mask("abcdefghijklmn"), "***klmn");
        assert_eq!(mask("abcdefghijklmno"), "abcdefghij...lmno");
    }

    #[test]
    fn test_debug_hides_key() {
        let vault = CredentialVault::new("master-secret");
        assert_eq!(format!("{:?}", vault), "CredentialVault { key: \"[redacted]\" }");
    }
}
