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

use num_bigint_dig::BigUint;
use serde::Deserialize;

use crate::endpoints::Endpoints;
use crate::puzzle::PublicKey;
use crate::solver::Parameters;
use crate::http;

/// Solver session parameters as advertised by the tumbler: the cut-and-choose
/// counts and the RSA key its puzzles are encrypted under. Fixed for the
/// lifetime of a session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertisement {
    pub real_puzzle_count: usize,
    pub fake_puzzle_count: usize,
    /// Unsigned big-endian RSA modulus, hex encoded.
    pub modulus: String,
    /// Unsigned big-endian RSA public exponent, hex encoded.
    pub exponent: String,
}

impl Advertisement {
    /// Fetches the advertised parameters from the tumbler.
    pub fn request(endpoints: &Endpoints) -> http::Request<Advertisement> {
        http::Request {
            url: endpoints.parameters.clone(),
            method: http::Method::GET,
            body: None,
            de_type: std::marker::PhantomData,
        }
    }

    /// Validates the advertisement into session values.
    pub fn into_session(self) -> Result<(Parameters, PublicKey), Error> {
        let n = BigUint::from_bytes_be(&hex::decode(self.modulus)?);
        let e = BigUint::from_bytes_be(&hex::decode(self.exponent)?);
        let key = PublicKey::new(n, e)?;

        Ok((
            Parameters {
                real_count: self.real_puzzle_count,
                fake_count: self.fake_puzzle_count,
            },
            key,
        ))
    }
}

#[derive(Debug)]
pub enum Error {
    Hex(hex::FromHexError),
    Key(rsa::Error),
}

impl From<hex::FromHexError> for Error {
    fn from(error: hex::FromHexError) -> Self {
        Error::Hex(error)
    }
}

impl From<rsa::Error> for Error {
    fn from(error: rsa::Error) -> Self {
        Error::Key(error)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rsa::traits::PublicKeyParts;
    use rsa::RsaPrivateKey;

    #[test]
    fn converts_into_session_values() {
        let mut rng = StdRng::seed_from_u64(1);
        let sk = RsaPrivateKey::new(&mut rng, 512).unwrap();
        let pk = sk.to_public_key();

        let advertisement: Advertisement = serde_json::from_str(&format!(
            r#"{{"realPuzzleCount": 15,
                 "fakePuzzleCount": 285,
                 "modulus": "{}",
                 "exponent": "{}"}}"#,
            hex::encode(pk.n().to_bytes_be()),
            hex::encode(pk.e().to_bytes_be()),
        ))
        .unwrap();

        let (parameters, key) = advertisement.into_session().unwrap();
        assert_eq!(parameters, Parameters::default());
        assert_eq!(key.element_width(), pk.size());
    }

    #[test]
    fn rejects_bad_modulus() {
        let advertisement = Advertisement {
            real_puzzle_count: 1,
            fake_puzzle_count: 1,
            modulus: "not hex".into(),
            exponent: "010001".into(),
        };

        assert!(matches!(
            advertisement.into_session(),
            Err(Error::Hex(_))
        ));
    }
}
