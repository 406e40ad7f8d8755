//! Secure one-time code generation

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use vg_shared::CodeCharset;

use crate::errors::{DomainError, DomainResult};

const NUMERIC: &[u8] = b"0123456789";
const ALPHANUMERIC: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generates fixed-length codes from the operating system CSPRNG
///
/// Bytes are drawn in batches and rejection-sampled so every symbol of the
/// alphabet is equally likely. A failing random source is fatal: there is
/// no fallback to a weaker generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeGenerator;

impl CodeGenerator {
    /// Generate a code of `length` characters from `charset`
    pub fn generate(length: usize, charset: CodeCharset) -> DomainResult<String> {
        Self::generate_with(&mut OsRng, length, charset)
    }

    /// Generate a code using the given cryptographic RNG
    pub fn generate_with<R>(rng: &mut R, length: usize, charset: CodeCharset) -> DomainResult<String>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let alphabet = alphabet(charset);
        let radix = alphabet.len() as u16;
        // Largest multiple of the radix that fits in a byte
        let zone = 256 - (256 % radix);

        let mut code = String::with_capacity(length);
        let mut buf = [0u8; 32];

        while code.len() < length {
            rng.try_fill_bytes(&mut buf)
                .map_err(|e| DomainError::EntropySourceUnavailable {
                    message: e.to_string(),
                })?;

            for &byte in buf.iter().filter(|&&b| u16::from(b) < zone) {
                code.push(char::from(alphabet[usize::from(u16::from(byte) % radix)]));
                if code.len() == length {
                    break;
                }
            }
        }

        Ok(code)
    }

    /// Canonical form of user input: trimmed, letters upper-cased for
    /// alphanumeric codes
    pub fn normalize(candidate: &str, charset: CodeCharset) -> String {
        match charset {
            CodeCharset::Numeric => candidate.trim().to_string(),
            CodeCharset::Alphanumeric => candidate.trim().to_ascii_uppercase(),
        }
    }

    /// Whether `candidate` could have been produced for these parameters
    pub fn is_well_formed(candidate: &str, length: usize, charset: CodeCharset) -> bool {
        let alphabet = alphabet(charset);
        candidate.len() == length && candidate.bytes().all(|b| alphabet.contains(&b))
    }
}

fn alphabet(charset: CodeCharset) -> &'static [u8] {
    match charset {
        CodeCharset::Numeric => NUMERIC,
        CodeCharset::Alphanumeric => ALPHANUMERIC,
    }
}
