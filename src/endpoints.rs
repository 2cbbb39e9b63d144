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

/// Fully formatted tumbler endpoints.
#[derive(Debug)]
pub struct Endpoints {
    pub parameters: String,
    pub puzzles: String,
    pub fake_solutions: String,
    pub blind_factors: String,
}

/// Returns fully-formatted endpoints under a tumbler base URL such as
/// `http://localhost:5000`.
pub fn tumbler(base: &str) -> Endpoints {
    let base = base.trim_end_matches('/');

    Endpoints {
        parameters: format!("{base}/rest/solver/parameters"),
        puzzles: format!("{base}/rest/solver/puzzles"),
        fake_solutions: format!("{base}/rest/solver/fakeSolutions"),
        blind_factors: format!("{base}/rest/solver/blindFactors"),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn formats_endpoints() {
        let endpoints = tumbler("http://localhost:5000/");
        assert_eq!(
            endpoints.parameters,
            "http://localhost:5000/rest/solver/parameters"
        );
        assert_eq!(
            endpoints.blind_factors,
            "http://localhost:5000/rest/solver/blindFactors"
        );
    }
}
