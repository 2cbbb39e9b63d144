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

//! Textbook-RSA puzzle arithmetic. A puzzle is an RSA ciphertext under the
//! tumbler's public key; solving it means recovering the preimage. Puzzles can
//! be blinded with a multiplicative factor so the tumbler cannot recognize
//! which ciphertext it is being asked to solve.

use num_bigint_dig::{BigUint, ModInverse, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, Rng};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroize;

/// The tumbler's RSA public key. All puzzle values live in the multiplicative
/// group defined by its modulus.
#[derive(Debug, Clone)]
pub struct PublicKey(RsaPublicKey);

impl PublicKey {
    /// Builds a public key from raw modulus and exponent values.
    pub fn new(n: BigUint, e: BigUint) -> Result<Self, rsa::Error> {
        Ok(Self(RsaPublicKey::new(n, e)?))
    }

    /// Width in bytes of a canonically encoded group element.
    pub fn element_width(&self) -> usize {
        self.0.size()
    }

    /// Encodes a group element as fixed-width unsigned big-endian bytes.
    pub fn encode_element(&self, value: &BigUint) -> Vec<u8> {
        canonical(value, self.0.size())
    }

    /// Parses a canonically encoded group element. Inputs of the wrong width
    /// or numerically outside the group are rejected.
    pub fn decode_element(&self, bytes: &[u8]) -> Result<BigUint, ElementError> {
        if bytes.len() != self.0.size() {
            return Err(ElementError::Width {
                expected: self.0.size(),
                actual: bytes.len(),
            });
        }

        let value = BigUint::from_bytes_be(bytes);
        if value >= *self.0.n() {
            return Err(ElementError::TooLarge);
        }

        Ok(value)
    }

    /// Creates a fresh puzzle with a solution known to the caller. Used to
    /// fabricate the fake puzzles that audit the tumbler.
    pub fn generate_puzzle<R: Rng + CryptoRng>(&self, rng: &mut R) -> (Puzzle, Solution) {
        let n = self.0.n();
        let mut s = sample_unit(rng, n);
        let puzzle = Puzzle(s.modpow(self.0.e(), n));
        let solution = Solution(canonical(&s, self.0.size()));
        s.zeroize();
        (puzzle, solution)
    }

    /// Multiplicatively randomizes a puzzle. The returned blind factor is
    /// required to recover the solution of the original puzzle and must stay
    /// secret until the protocol reveals it.
    pub fn blind<R: Rng + CryptoRng>(&self, puzzle: &Puzzle, rng: &mut R) -> (Puzzle, BlindFactor) {
        let n = self.0.n();
        let r = sample_unit(rng, n);
        let blinded = (&puzzle.0 * r.modpow(self.0.e(), n)) % n;
        (Puzzle(blinded), BlindFactor(r))
    }

    /// Strips a blind factor off the solution of a blinded puzzle, yielding
    /// the solution of the puzzle that was blinded.
    pub fn unblind(&self, blinded_solution: &[u8], factor: &BlindFactor) -> Solution {
        let n = self.0.n();
        let inverse = (&factor.0)
            .mod_inverse(n)
            .expect("blind factors are sampled coprime to the modulus")
            .to_biguint()
            .expect("inverse of a unit is positive");

        let mut s = (BigUint::from_bytes_be(blinded_solution) * inverse) % n;
        let solution = Solution(canonical(&s, self.0.size()));
        s.zeroize();
        solution
    }

    /// Checks that a candidate solves a puzzle: candidate^e mod n == puzzle.
    pub fn verify(&self, puzzle: &Puzzle, candidate: &[u8]) -> bool {
        let s = BigUint::from_bytes_be(candidate);
        s.modpow(self.0.e(), self.0.n()) == puzzle.0
    }
}

/// An RSA key pair capable of solving puzzles. The tumbler holds one of
/// these; the client only ever sees its public half. It is exposed so that
/// tests and tooling can emulate an honest tumbler.
pub struct SecretKey(RsaPrivateKey);

impl SecretKey {
    /// Generates a fresh key pair.
    pub fn generate<R: Rng + CryptoRng>(rng: &mut R, bits: usize) -> Result<Self, rsa::Error> {
        Ok(Self(RsaPrivateKey::new(rng, bits)?))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.to_public_key())
    }

    /// Solves a puzzle by raw RSA decryption.
    pub fn solve(&self, puzzle: &Puzzle) -> Solution {
        let mut s = puzzle.0.modpow(self.0.d(), self.0.n());
        let solution = Solution(canonical(&s, self.0.size()));
        s.zeroize();
        solution
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<secret>)")
    }
}

/// An RSA ciphertext under the tumbler's key.
#[derive(Clone, PartialEq, Eq)]
pub struct Puzzle(BigUint);

impl Puzzle {
    /// Parses a canonically encoded puzzle.
    pub fn from_bytes(key: &PublicKey, bytes: &[u8]) -> Result<Self, ElementError> {
        key.decode_element(bytes).map(Puzzle)
    }

    /// Canonical wire encoding of this puzzle.
    pub fn to_bytes(&self, key: &PublicKey) -> Vec<u8> {
        key.encode_element(&self.0)
    }
}

impl std::fmt::Debug for Puzzle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Puzzle")
            .field(&hex::encode(self.0.to_bytes_be()))
            .finish()
    }
}

/// Secret multiplicative randomness applied to a real puzzle. Revealing it
/// proves to the tumbler that the blinded puzzle was derived from the target
/// without disclosing the solution.
#[derive(Clone)]
pub struct BlindFactor(BigUint);

impl BlindFactor {
    /// Canonical wire encoding of this blind factor.
    pub fn to_bytes(&self, key: &PublicKey) -> Vec<u8> {
        key.encode_element(&self.0)
    }
}

impl Drop for BlindFactor {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for BlindFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BlindFactor(<secret>)")
    }
}

/// The preimage of a puzzle, canonically encoded.
#[derive(Clone, PartialEq, Eq)]
pub struct Solution(Vec<u8>);

impl Solution {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Solution {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for Solution {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Solution(<secret>)")
    }
}

/// A group element failed canonical decoding.
#[derive(Debug, PartialEq, Eq)]
pub enum ElementError {
    Width { expected: usize, actual: usize },
    TooLarge,
}

/// Samples a uniform element of the multiplicative group mod n.
fn sample_unit<R: Rng + CryptoRng>(rng: &mut R, n: &BigUint) -> BigUint {
    loop {
        let candidate = rng.gen_biguint_below(n);
        if !candidate.is_zero() && candidate.gcd(n).is_one() {
            break candidate;
        }
    }
}

/// Unsigned big-endian encoding, left-padded to the group element width.
fn canonical(value: &BigUint, width: usize) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    let mut out = vec![0u8; width];
    out[width - bytes.len()..].copy_from_slice(&bytes);
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn keys(rng: &mut StdRng) -> (SecretKey, PublicKey) {
        let sk = SecretKey::generate(rng, 512).unwrap();
        let pk = sk.public_key();
        (sk, pk)
    }

    #[test]
    fn blind_unblind_round_trip() {
        let mut rng = StdRng::seed_from_u64(1);
        let (sk, pk) = keys(&mut rng);

        let (target, solution) = pk.generate_puzzle(&mut rng);
        let (blinded, factor) = pk.blind(&target, &mut rng);
        assert_ne!(blinded, target);

        let blinded_solution = sk.solve(&blinded);
        let recovered = pk.unblind(blinded_solution.as_bytes(), &factor);

        assert_eq!(recovered, solution);
        assert!(pk.verify(&target, recovered.as_bytes()));
    }

    #[test]
    fn solve_inverts_generate() {
        let mut rng = StdRng::seed_from_u64(2);
        let (sk, pk) = keys(&mut rng);

        let (puzzle, solution) = pk.generate_puzzle(&mut rng);
        assert_eq!(sk.solve(&puzzle), solution);
        assert!(pk.verify(&puzzle, solution.as_bytes()));
    }

    #[test]
    fn solves_a_fixed_small_target() {
        let mut rng = StdRng::seed_from_u64(7);
        let (sk, pk) = keys(&mut rng);

        let s = BigUint::from(2u8);
        let puzzle = Puzzle(s.modpow(pk.0.e(), pk.0.n()));

        let solution = sk.solve(&puzzle);
        assert_eq!(BigUint::from_bytes_be(solution.as_bytes()), s);
        assert_eq!(solution.as_bytes(), pk.encode_element(&s));
    }

    #[test]
    fn verify_rejects_wrong_solution() {
        let mut rng = StdRng::seed_from_u64(3);
        let (_, pk) = keys(&mut rng);

        let (puzzle, _) = pk.generate_puzzle(&mut rng);
        let (_, other_solution) = pk.generate_puzzle(&mut rng);

        assert!(!pk.verify(&puzzle, other_solution.as_bytes()));
    }

    #[test]
    fn canonical_width_is_enforced() {
        let mut rng = StdRng::seed_from_u64(4);
        let (_, pk) = keys(&mut rng);
        let width = pk.element_width();

        assert_eq!(
            pk.decode_element(&vec![0u8; width - 1]),
            Err(ElementError::Width {
                expected: width,
                actual: width - 1,
            })
        );
        assert_eq!(
            pk.decode_element(&vec![0u8; width + 1]),
            Err(ElementError::Width {
                expected: width,
                actual: width + 1,
            })
        );
    }

    #[test]
    fn out_of_group_elements_are_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let (_, pk) = keys(&mut rng);

        let largest = pk.encode_element(&(pk.0.n() - BigUint::one()));
        assert!(pk.decode_element(&largest).is_ok());

        let modulus = canonical(pk.0.n(), pk.element_width());
        assert_eq!(pk.decode_element(&modulus), Err(ElementError::TooLarge));
    }

    #[test]
    fn round_trips_canonical_encoding() {
        let mut rng = StdRng::seed_from_u64(6);
        let (_, pk) = keys(&mut rng);

        let (puzzle, _) = pk.generate_puzzle(&mut rng);
        let bytes = puzzle.to_bytes(&pk);
        assert_eq!(bytes.len(), pk.element_width());
        assert_eq!(Puzzle::from_bytes(&pk, &bytes).unwrap(), puzzle);
    }
}
