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

use serde::Serialize;

use crate::http;
use crate::puzzle::{BlindFactor, PublicKey, Puzzle};
use crate::solver::PuzzleSolution;

/// Encodes the shuffled puzzle batch sent after puzzle generation. Group
/// elements travel as fixed-width big-endian hex.
pub fn puzzles(key: &PublicKey, puzzles: &[Puzzle]) -> http::Body {
    #[derive(Serialize)]
    struct Payload {
        puzzles: Vec<String>,
    }

    let payload = Payload {
        puzzles: puzzles
            .iter()
            .map(|puzzle| hex::encode(puzzle.to_bytes(key)))
            .collect(),
    };

    http::Body::json(&payload)
}

/// Encodes the fake-position solution reveals sent after the commitment
/// batch is accepted.
pub fn fake_solutions(reveals: &[PuzzleSolution]) -> http::Body {
    #[derive(Serialize)]
    struct Entry {
        index: usize,
        solution: String,
    }

    #[derive(Serialize)]
    struct Payload {
        solutions: Vec<Entry>,
    }

    let payload = Payload {
        solutions: reveals
            .iter()
            .map(|reveal| Entry {
                index: reveal.index,
                solution: hex::encode(reveal.solution.as_bytes()),
            })
            .collect(),
    };

    http::Body::json(&payload)
}

/// Encodes the real-position blind factor reveals sent after the fake keys
/// check out.
pub fn blind_factors(key: &PublicKey, factors: &[BlindFactor]) -> http::Body {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Payload {
        blind_factors: Vec<String>,
    }

    let payload = Payload {
        blind_factors: factors
            .iter()
            .map(|factor| hex::encode(factor.to_bytes(key)))
            .collect(),
    };

    http::Body::json(&payload)
}
