// tumblebit-client-rs
// Copyright (C) 2022  Straylight <straylight_orbit@protonmail.com>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Key-commitment scheme used by the tumbler to promise puzzle solutions.
//! The tumbler encrypts each solution under a fresh symmetric key and
//! publishes the hash of that key next to the ciphertext; revealing the key
//! later opens the commitment.

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20;
use rand::{CryptoRng, Rng};
use zeroize::Zeroize;

use crate::util::hashes;

/// Width of a solution key in bytes.
pub const KEY_WIDTH: usize = 32;

/// Width of a key hash in bytes.
pub const KEY_HASH_WIDTH: usize = 20;

// Every key encrypts exactly one message, so a fixed nonce and zero initial
// counter cannot repeat under a key.
const NONCE: [u8; 12] = [0; 12];

/// Symmetric key under which the tumbler encrypts a single puzzle solution.
#[derive(Clone, PartialEq, Eq)]
pub struct SolutionKey([u8; KEY_WIDTH]);

impl SolutionKey {
    pub fn new(bytes: [u8; KEY_WIDTH]) -> Self {
        Self(bytes)
    }

    pub fn random<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; KEY_WIDTH];
        rng.fill(&mut bytes);
        Self(bytes)
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        self.apply_keystream(plaintext)
    }

    pub fn decrypt(&self, ciphertext: &[u8]) -> Vec<u8> {
        self.apply_keystream(ciphertext)
    }

    /// Binding hash of the raw key bytes. Publishing it commits the tumbler
    /// to this key before the key itself is revealed.
    pub fn hash(&self) -> KeyHash {
        KeyHash(hashes::ripemd160(&self.0))
    }

    fn apply_keystream(&self, data: &[u8]) -> Vec<u8> {
        let mut buffer = data.to_vec();
        let mut cipher = ChaCha20::new(&self.0.into(), &NONCE.into());
        cipher.apply_keystream(&mut buffer);
        buffer
    }
}

impl Drop for SolutionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for SolutionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SolutionKey(<secret>)")
    }
}

/// RIPEMD-160 of a solution key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHash(pub [u8; KEY_HASH_WIDTH]);

impl AsRef<[u8]> for KeyHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A promised puzzle solution: the encrypted solution together with the hash
/// of the key it is encrypted under.
#[derive(Debug, Clone)]
pub struct Commitment {
    pub key_hash: KeyHash,
    pub encrypted_solution: Vec<u8>,
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn encrypt_decrypt_are_inverses() {
        let mut rng = StdRng::seed_from_u64(1);
        let key = SolutionKey::random(&mut rng);
        let plaintext = b"a puzzle solution";

        let ciphertext = key.encrypt(plaintext);
        assert_ne!(&ciphertext, plaintext);
        assert_eq!(key.decrypt(&ciphertext), plaintext);
    }

    #[test]
    fn distinct_keys_produce_distinct_ciphertexts() {
        let mut rng = StdRng::seed_from_u64(2);
        let a = SolutionKey::random(&mut rng);
        let b = SolutionKey::random(&mut rng);

        assert_ne!(a.encrypt(b"same bytes"), b.encrypt(b"same bytes"));
        assert_ne!(a.hash(), b.hash());
    }

    // Pins the keystream convention: all-zero key, all-zero 96-bit nonce,
    // zero initial counter.
    #[test]
    fn keystream_convention() {
        let key = SolutionKey::new([0u8; KEY_WIDTH]);
        let keystream = key.encrypt(&[0u8; 32]);

        assert_eq!(
            hex::encode(keystream),
            "76b8e0ada0f13d90405d6ae55386bd28bdd219b8a08ded1aa836efcc8b770dc7"
        );
    }

    #[test]
    fn key_hash_is_ripemd160_of_raw_key() {
        let key = SolutionKey::new([7u8; KEY_WIDTH]);
        assert_eq!(key.hash().0, crate::util::hashes::ripemd160(&[7u8; 32]));
        assert_eq!(key.hash().as_ref().len(), KEY_HASH_WIDTH);
    }
}
