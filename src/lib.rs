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

pub mod codec;
pub mod commitment;
pub mod endpoints;
pub mod http;
pub mod params;
pub mod puzzle;
pub mod solver;
pub mod util;

const UA_HTTP: &str = "tumblebit-client/0.1";

pub use client::{Config, Step, API};
pub use solver::{Parameters, Solver};

pub mod client {
    //! Contains a blocking HTTP client that drives a complete solver session
    //! against a remote tumbler. Network I/O happens between state machine
    //! transitions; the cryptographic work runs on the caller's thread.
    use std::time::Duration;

    use rand::{CryptoRng, Rng};

    use crate::puzzle::{PublicKey, Puzzle, Solution};
    use crate::*;

    /// Client configuration.
    #[derive(Debug, Clone)]
    pub struct Config {
        /// Base URL of the tumbler, e.g. `http://localhost:5000`.
        pub server: String,
        /// Determines timeout for HTTP requests.
        pub request_timeout: Duration,
    }

    impl Config {
        pub fn new(server: impl Into<String>) -> Self {
            Self {
                server: server.into(),
                request_timeout: Duration::from_secs(120),
            }
        }
    }

    /// REST API of the tumbler: parameter discovery and the four message
    /// exchanges of a solver session.
    pub struct API {
        agent: ureq::Agent,
        endpoints: endpoints::Endpoints,
    }

    impl API {
        pub fn new(config: Config) -> API {
            let agent = ureq::builder()
                .user_agent(UA_HTTP)
                .timeout_connect(config.request_timeout)
                .build();
            let endpoints = endpoints::tumbler(&config.server);

            Self { agent, endpoints }
        }

        /// Fetches the tumbler's advertised solver parameters and puzzle key.
        pub fn parameters(&self) -> Result<(solver::Parameters, PublicKey), Error> {
            let request = params::Advertisement::request(&self.endpoints);
            let advertisement = http_request(&self.agent, request)?;
            Ok(advertisement.into_session()?)
        }

        /// Runs a complete solver session for one target puzzle in a blocking
        /// manner. The `notify` parameter function may be used to handle
        /// progress events in a custom manner (e.g. logging, channel
        /// notifications...)
        ///
        /// Returns the solution of the target puzzle if the tumbler behaves
        /// honestly. A `Solver` error variant is cryptographic proof of
        /// misbehavior; the session must be abandoned and nothing that
        /// depends on the solution may proceed.
        pub fn solve_blocking<R, F>(
            &self,
            key: PublicKey,
            parameters: solver::Parameters,
            target: Puzzle,
            rng: &mut R,
            notify: F,
        ) -> Result<Solution, Error>
        where
            R: Rng + CryptoRng,
            F: Fn(Step),
        {
            let mut solver = Solver::new(key.clone(), target, parameters);

            notify(Step::GeneratingPuzzles);
            let puzzles = solver.generate_puzzles(rng)?;
            let request = post(
                self.endpoints.puzzles.clone(),
                codec::encode::puzzles(&key, &puzzles),
            );
            let response: codec::decode::CommitmentsResponse =
                http_request(&self.agent, request)?;
            let commitments = codec::decode::commitments(response)?;

            notify(Step::RevealingFakeSolutions);
            let reveals = solver.accept_commitments(commitments)?;
            let request = post(
                self.endpoints.fake_solutions.clone(),
                codec::encode::fake_solutions(&reveals),
            );
            let response: codec::decode::KeysResponse = http_request(&self.agent, request)?;
            let fake_keys = codec::decode::solution_keys(response)?;

            notify(Step::RevealingBlindFactors);
            let factors = solver.accept_fake_keys(fake_keys)?;
            let request = post(
                self.endpoints.blind_factors.clone(),
                codec::encode::blind_factors(&key, &factors),
            );
            let response: codec::decode::KeysResponse = http_request(&self.agent, request)?;
            let real_keys = codec::decode::solution_keys(response)?;

            notify(Step::RecoveringSolution);
            let solution = solver.accept_real_keys(real_keys)?;
            log::info!("puzzle solved");

            Ok(solution)
        }
    }

    /// Individual session steps for informational purposes.
    #[derive(Debug)]
    pub enum Step {
        GeneratingPuzzles,
        RevealingFakeSolutions,
        RevealingBlindFactors,
        RecoveringSolution,
    }

    #[derive(Debug)]
    pub enum Error {
        /// The state machine rejected a message batch. The verification
        /// variants are proof of tumbler misbehavior.
        Solver(solver::Error),
        /// A response failed wire-level validation.
        Codec(codec::Error),
        /// The parameters advertisement was malformed.
        Parameters(params::Error),
        Http(HttpError),
    }

    impl From<solver::Error> for Error {
        fn from(error: solver::Error) -> Self {
            Error::Solver(error)
        }
    }

    impl From<codec::Error> for Error {
        fn from(error: codec::Error) -> Self {
            Error::Codec(error)
        }
    }

    impl From<params::Error> for Error {
        fn from(error: params::Error) -> Self {
            Error::Parameters(error)
        }
    }

    impl From<HttpError> for Error {
        fn from(error: HttpError) -> Self {
            Error::Http(error)
        }
    }

    #[derive(Debug)]
    pub enum HttpError {
        UnexpectedBody {
            error: serde_json::Error,
            status: u16,
            body: String,
        },
        Transport(Box<ureq::Transport>),
        Io(std::io::Error),
    }

    fn post<T: serde::de::DeserializeOwned>(url: String, body: http::Body) -> http::Request<T> {
        http::Request {
            url,
            method: http::Method::POST,
            body: Some(body),
            de_type: std::marker::PhantomData,
        }
    }

    /// Executes an HTTP request.
    fn http_request<T: serde::de::DeserializeOwned>(
        client: &ureq::Agent,
        req_data: http::Request<T>,
    ) -> Result<T, HttpError> {
        let request = match req_data.method {
            http::Method::GET => client.get(&req_data.url),
            http::Method::POST => client.post(&req_data.url),
        };

        log::debug!("HTTP >>: {:#?}", request);

        let start = std::time::Instant::now();
        let response = match req_data.body {
            Some(body) => request
                .set("Content-Type", body.content_type)
                .send_bytes(&body.body),
            None => request.call(),
        };
        let req_secs = std::time::Instant::now()
            .saturating_duration_since(start)
            .as_secs();

        log::debug!("HTTP ({} s) <<: {:#?}", req_secs, response);

        match response {
            Ok(response) | Err(ureq::Error::Status(_, response)) => {
                use std::io::Read;
                let mut buf = vec![];
                let status = response.status();
                response
                    .into_reader()
                    .read_to_end(&mut buf)
                    .map_err(HttpError::Io)?;
                if buf.is_empty() && status == 200 {
                    // serde doesn't allow empty strings to be deserialized to anything so we have
                    // to get around that problem by creating an empty JSON valid body
                    buf.extend_from_slice("{}".as_bytes());
                }
                // capture the whole response as a String if we fail to decode, should never happen
                serde_json::from_slice(&buf).map_err(|error| HttpError::UnexpectedBody {
                    error,
                    status,
                    body: String::from_utf8_lossy(&buf).to_string(),
                })
            }
            Err(ureq::Error::Transport(error)) => Err(HttpError::Transport(Box::new(error))),
        }
    }
}
