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

use serde::Deserialize;

use super::Error;
use crate::commitment::{Commitment, KeyHash, SolutionKey, KEY_HASH_WIDTH, KEY_WIDTH};
use crate::puzzle::{PublicKey, Puzzle};

/// Raw commitment batch as returned by the tumbler.
#[derive(Debug, Deserialize)]
pub struct CommitmentsResponse {
    pub commitments: Vec<CommitmentPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentPayload {
    key_hash: String,
    encrypted_solution: String,
}

/// Raw solution key batch as returned by the tumbler. The same shape is
/// used for the fake-position and real-position phases.
#[derive(Debug, Deserialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
}

/// Validates a commitment batch. Key hashes must be exactly 20 bytes;
/// malformed entries never reach the state machine.
pub fn commitments(response: CommitmentsResponse) -> Result<Vec<Commitment>, Error> {
    response
        .commitments
        .into_iter()
        .map(|payload| {
            let key_hash: [u8; KEY_HASH_WIDTH] = hex::decode(payload.key_hash)?
                .try_into()
                .map_err(|bytes: Vec<u8>| Error::HashWidth {
                    expected: KEY_HASH_WIDTH,
                    actual: bytes.len(),
                })?;

            Ok(Commitment {
                key_hash: KeyHash(key_hash),
                encrypted_solution: hex::decode(payload.encrypted_solution)?,
            })
        })
        .collect()
}

/// Parses a canonically encoded puzzle, e.g. a target handed over from an
/// earlier protocol phase. Width and group membership are enforced.
pub fn puzzle(key: &PublicKey, payload: &str) -> Result<Puzzle, Error> {
    Ok(Puzzle::from_bytes(key, &hex::decode(payload)?)?)
}

/// Validates a solution key batch. Keys must be exactly 32 bytes.
pub fn solution_keys(response: KeysResponse) -> Result<Vec<SolutionKey>, Error> {
    response
        .keys
        .into_iter()
        .map(|payload| {
            let bytes: [u8; KEY_WIDTH] = hex::decode(payload)?.try_into().map_err(
                |bytes: Vec<u8>| Error::KeyWidth {
                    expected: KEY_WIDTH,
                    actual: bytes.len(),
                },
            )?;

            Ok(SolutionKey::new(bytes))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::puzzle::SecretKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn round_trips_a_puzzle() {
        let mut rng = StdRng::seed_from_u64(1);
        let sk = SecretKey::generate(&mut rng, 512).unwrap();
        let pk = sk.public_key();

        let (target, _) = pk.generate_puzzle(&mut rng);
        let payload = hex::encode(target.to_bytes(&pk));

        assert_eq!(puzzle(&pk, &payload).unwrap(), target);
        assert!(matches!(
            puzzle(&pk, &payload[2..]),
            Err(Error::Element(_))
        ));
    }

    #[test]
    fn decodes_commitment_batch() {
        let response: CommitmentsResponse = serde_json::from_str(
            r#"{"commitments": [{"keyHash": "0000000000000000000000000000000000000001",
                                 "encryptedSolution": "aabbcc"}]}"#,
        )
        .unwrap();

        let commitments = commitments(response).unwrap();
        assert_eq!(commitments.len(), 1);
        assert_eq!(commitments[0].key_hash.0[19], 0x01);
        assert_eq!(commitments[0].encrypted_solution, vec![0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn rejects_short_key_hash() {
        let response: CommitmentsResponse = serde_json::from_str(
            r#"{"commitments": [{"keyHash": "0011", "encryptedSolution": ""}]}"#,
        )
        .unwrap();

        assert!(matches!(
            commitments(response),
            Err(Error::HashWidth {
                expected: KEY_HASH_WIDTH,
                actual: 2
            })
        ));
    }

    #[test]
    fn rejects_malformed_keys() {
        let response: KeysResponse =
            serde_json::from_str(r#"{"keys": ["zz"]}"#).unwrap();
        assert!(matches!(solution_keys(response), Err(Error::Hex(_))));

        let response: KeysResponse =
            serde_json::from_str(r#"{"keys": ["aabb"]}"#).unwrap();
        assert!(matches!(
            solution_keys(response),
            Err(Error::KeyWidth {
                expected: KEY_WIDTH,
                actual: 2
            })
        ));
    }

    #[test]
    fn decodes_key_batch() {
        let payload = format!(r#"{{"keys": ["{}"]}}"#, "ab".repeat(KEY_WIDTH));
        let response: KeysResponse = serde_json::from_str(&payload).unwrap();

        let keys = solution_keys(response).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0], SolutionKey::new([0xab; KEY_WIDTH]));
    }
}
