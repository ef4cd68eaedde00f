//! Nonce iteration over a block header template, as performed by a toy proof-of-work loop.

use crate::config::params::{DEFAULT_PARAMS, Params};
use log::{Level, debug, log_enabled, trace};
use satledger_codec::CompactSizeWriterExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::iter::FusedIterator;

pub const DEFAULT_HEADER_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeaderCandidate {
    pub version: u32,
    pub prev_block_hash: String,
    pub merkle_root: String,
    pub timestamp: u64,
    pub bits: u32,
    pub nonce: u64,
}

impl BlockHeaderCandidate {
    pub fn new(prev_block_hash: impl Into<String>, merkle_root: impl Into<String>, timestamp: u64, bits: u32) -> Self {
        Self {
            version: DEFAULT_HEADER_VERSION,
            prev_block_hash: prev_block_hash.into(),
            merkle_root: merkle_root.into(),
            timestamp,
            bits,
            nonce: 0,
        }
    }

    pub fn with_nonce(&self, nonce: u64) -> Self {
        Self { nonce, ..self.clone() }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.write_var_str(&self.prev_block_hash).write_var_str(&self.merkle_root);
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&self.bits.to_le_bytes());
        buf.extend_from_slice(&self.nonce.to_le_bytes());
        buf
    }

    /// SHA-256 of [`Self::serialize`]
    pub fn hash(&self) -> [u8; 32] {
        Sha256::digest(self.serialize()).into()
    }

    pub fn hash_hex(&self) -> String {
        faster_hex::hex_string(&self.hash())
    }
}

/// Yields copies of a header template with consecutive nonces. Created by [`generate_header_candidates`].
#[derive(Clone, Debug)]
pub struct HeaderCandidates {
    template: BlockHeaderCandidate,
    next_nonce: Option<u64>,
    attempts: u64,
    max_attempts: u64,
    progress_interval: u64,
}

/// Walks nonces `start_nonce, start_nonce + 1, ...` for at most `max_attempts` candidates.
/// The walk ends early rather than wrapping when the nonce space is exhausted.
pub fn generate_header_candidates(template: BlockHeaderCandidate, start_nonce: u64, max_attempts: u64) -> HeaderCandidates {
    debug!("Generating up to {max_attempts} header candidates from nonce {start_nonce}");
    HeaderCandidates {
        template,
        next_nonce: Some(start_nonce),
        attempts: 0,
        max_attempts,
        progress_interval: DEFAULT_PARAMS.progress_interval,
    }
}

/// Walks [`Params::max_header_attempts`] nonces from `start_nonce`, logging progress every
/// [`Params::progress_interval`] attempts
pub fn generate_header_candidates_with(template: BlockHeaderCandidate, start_nonce: u64, params: &Params) -> HeaderCandidates {
    generate_header_candidates(template, start_nonce, params.max_header_attempts).with_progress_interval(params.progress_interval)
}

impl HeaderCandidates {
    /// Logs progress every `interval` attempts. Zero disables progress logging.
    pub fn with_progress_interval(self, interval: u64) -> Self {
        Self { progress_interval: interval, ..self }
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }
}

impl Iterator for HeaderCandidates {
    type Item = BlockHeaderCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        let nonce = self.next_nonce?;

        let candidate = self.template.with_nonce(nonce);
        if log_enabled!(Level::Trace) {
            trace!("Attempt {}: nonce {nonce}, hash {}", self.attempts + 1, &candidate.hash_hex()[..16]);
        }

        self.attempts += 1;
        self.next_nonce = nonce.checked_add(1);
        if self.progress_interval > 0 && self.attempts % self.progress_interval == 0 {
            debug!("{} header attempts made", self.attempts);
        }
        if self.attempts == self.max_attempts || self.next_nonce.is_none() {
            debug!("Finished generating header candidates after {} attempts", self.attempts);
        }
        Some(candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = match self.next_nonce {
            Some(nonce) => (self.max_attempts - self.attempts).min((u64::MAX - nonce).saturating_add(1)),
            None => 0,
        };
        let left = usize::try_from(left).unwrap_or(usize::MAX);
        (left, Some(left))
    }
}

impl FusedIterator for HeaderCandidates {}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> BlockHeaderCandidate {
        BlockHeaderCandidate::new("00".repeat(32), "ab".repeat(32), 1_700_000_000, 0x1d00ffff)
    }

    #[test]
    fn test_consecutive_nonces() {
        let candidates: Vec<_> = generate_header_candidates(template(), 10, 5).collect();
        assert_eq!(candidates.iter().map(|c| c.nonce).collect::<Vec<_>>(), vec![10, 11, 12, 13, 14]);
        assert!(candidates.iter().all(|c| c.version == DEFAULT_HEADER_VERSION && c.bits == 0x1d00ffff));
    }

    #[test]
    fn test_attempt_limits() {
        assert_eq!(generate_header_candidates(template(), 0, 0).count(), 0);
        assert_eq!(generate_header_candidates(template(), 0, DEFAULT_PARAMS.max_header_attempts).count(), 1000);

        let mut near_end = generate_header_candidates(template(), u64::MAX - 1, 10);
        assert_eq!(near_end.size_hint(), (2, Some(2)));
        assert_eq!(near_end.next().map(|c| c.nonce), Some(u64::MAX - 1));
        assert_eq!(near_end.next().map(|c| c.nonce), Some(u64::MAX));
        assert_eq!(near_end.next(), None);
        assert_eq!(near_end.next(), None);
        assert_eq!(near_end.attempts(), 2);
    }

    #[test]
    fn test_hash_depends_on_nonce() {
        let header = template();
        assert_eq!(header.hash(), header.clone().hash());
        assert_ne!(header.hash(), header.with_nonce(1).hash());
        assert_eq!(header.hash_hex().len(), 64);

        let serialized = header.serialize();
        assert_eq!(serialized.len(), 4 + 65 + 65 + 8 + 4 + 8);
        assert_eq!(&serialized[..5], &[1, 0, 0, 0, 64]);
    }

    #[test]
    fn test_walk_from_params() {
        let walk = generate_header_candidates_with(template(), 7, &DEFAULT_PARAMS);
        assert_eq!(walk.size_hint(), (1000, Some(1000)));

        let params = Params { max_header_attempts: 3, progress_interval: 1, ..Params::default() };
        let walk = generate_header_candidates_with(template(), 7, &params);
        assert_eq!(walk.progress_interval, 1);
        assert_eq!(walk.map(|c| c.nonce).collect::<Vec<_>>(), vec![7, 8, 9]);
    }

    #[test]
    fn test_progress_interval() {
        let candidates = generate_header_candidates(template(), 0, 250).with_progress_interval(0);
        assert_eq!(candidates.size_hint(), (250, Some(250)));
        assert_eq!(candidates.last().map(|c| c.nonce), Some(249));
    }
}
