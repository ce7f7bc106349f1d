//! Content hashes
//!
//! A [`Hash`] is a digest tagged with the algorithm that produced it. Its
//! textual forms are self-describing: `<algo>:<digest>` with the digest in
//! base16, nix-base32 or base64 (told apart by length), or SRI
//! `<algo>-<base64>`. Lock files always store the SRI form.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::core::nix_base32;
use crate::error::HashError;

/// Supported hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Digest size in bytes
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }

    /// Lowercase algorithm name as it appears in hash strings
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Look up an algorithm by name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "md5" => Some(Self::Md5),
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }

    const fn base16_len(self) -> usize {
        self.size() * 2
    }

    const fn base32_len(self) -> usize {
        nix_base32::encoded_len(self.size())
    }

    const fn base64_len(self) -> usize {
        ((4 * self.size() / 3) + 3) & !3
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Textual encodings of a hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `<algo>:<hex>`
    Base16,
    /// `<algo>:<nix-base32>`
    Base32,
    /// `<algo>:<base64>`
    Base64,
    /// `<algo>-<base64>`
    Sri,
}

/// A digest together with its algorithm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hash {
    algorithm: HashAlgorithm,
    digest: Vec<u8>,
}

impl Hash {
    /// Wrap a raw digest
    pub fn new(algorithm: HashAlgorithm, digest: Vec<u8>) -> Result<Self, HashError> {
        if digest.len() != algorithm.size() {
            return Err(HashError::WrongLength {
                hash: hex::encode(&digest),
                algorithm: algorithm.to_string(),
            });
        }
        Ok(Self { algorithm, digest })
    }

    /// SHA-256 of `data`
    #[must_use]
    pub fn sha256(data: &[u8]) -> Self {
        Self {
            algorithm: HashAlgorithm::Sha256,
            digest: Sha256::digest(data).to_vec(),
        }
    }

    /// The algorithm that produced this digest
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Raw digest bytes
    #[must_use]
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Format the hash in the given encoding, always with the algorithm tag
    #[must_use]
    pub fn to_string_with(&self, encoding: Encoding) -> String {
        let algo = self.algorithm.name();
        match encoding {
            Encoding::Base16 => format!("{algo}:{}", hex::encode(&self.digest)),
            Encoding::Base32 => format!("{algo}:{}", nix_base32::encode(&self.digest)),
            Encoding::Base64 => format!("{algo}:{}", STANDARD.encode(&self.digest)),
            Encoding::Sri => format!("{algo}-{}", STANDARD.encode(&self.digest)),
        }
    }

    fn decode_base64(input: &str) -> Result<Vec<u8>, HashError> {
        STANDARD.decode(input).map_err(|_| HashError::BadEncoding {
            hash: input.to_string(),
            encoding: "base64".to_string(),
        })
    }

    fn decode_digest(input: &str, algorithm: HashAlgorithm) -> Result<Vec<u8>, HashError> {
        let len = input.len();
        if len == algorithm.base16_len() {
            hex::decode(input).map_err(|_| HashError::BadEncoding {
                hash: input.to_string(),
                encoding: "base16".to_string(),
            })
        } else if len == algorithm.base32_len() {
            nix_base32::decode(input, algorithm.size()).ok_or_else(|| HashError::BadEncoding {
                hash: input.to_string(),
                encoding: "base32".to_string(),
            })
        } else if len == algorithm.base64_len() {
            Self::decode_base64(input)
        } else {
            Err(HashError::WrongLength {
                hash: input.to_string(),
                algorithm: algorithm.to_string(),
            })
        }
    }
}

impl fmt::Display for Hash {
    /// SRI form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(Encoding::Sri))
    }
}

impl FromStr for Hash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (algo_name, rest, is_sri) = if let Some((algo, rest)) = s.split_once(':') {
            (algo, rest, false)
        } else if let Some((algo, rest)) = s.split_once('-') {
            (algo, rest, true)
        } else {
            return Err(HashError::UnknownAlgorithm {
                hash: s.to_string(),
            });
        };

        let algorithm =
            HashAlgorithm::from_name(algo_name).ok_or_else(|| HashError::UnknownAlgorithm {
                hash: s.to_string(),
            })?;

        let digest = if is_sri {
            Self::decode_base64(rest)?
        } else {
            Self::decode_digest(rest, algorithm)?
        };

        if digest.len() != algorithm.size() {
            return Err(HashError::WrongLength {
                hash: s.to_string(),
                algorithm: algorithm.to_string(),
            });
        }

        Ok(Self { algorithm, digest })
    }
}
