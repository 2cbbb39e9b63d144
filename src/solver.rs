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
use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng};

use crate::commitment::{Commitment, SolutionKey};
use crate::puzzle::{BlindFactor, PublicKey, Puzzle, Solution};

/// Cut-and-choose counts for a solver session. Must match the counts the
/// tumbler advertises; a mismatch surfaces as a length error on the first
/// message batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameters {
    /// Number of blinded copies of the target puzzle.
    pub real_count: usize,
    /// Number of fabricated puzzles with client-known solutions.
    pub fake_count: usize,
}

impl Parameters {
    pub fn total(&self) -> usize {
        self.real_count + self.fake_count
    }
}

/// The standard production counts.
impl Default for Parameters {
    fn default() -> Self {
        Self {
            real_count: 15,
            fake_count: 285,
        }
    }
}

/// A solution revealed for a fake puzzle, addressed by its position in the
/// shuffled puzzle sequence.
#[derive(Debug, Clone)]
pub struct PuzzleSolution {
    pub index: usize,
    pub solution: Solution,
}

/// State machine solving one target puzzle through the cut-and-choose
/// protocol. Consumes message batches from the tumbler and produces the
/// batches to be sent back, ending in the unblinded solution of the target.
///
/// Verification failures are proof of tumbler misbehavior: they poison the
/// machine and the session must be abandoned. Argument and ordering errors
/// leave the machine untouched.
#[derive(Debug)]
pub struct Solver {
    key: PublicKey,
    target: Puzzle,
    params: Parameters,
    set: Vec<PuzzleEntry>,
    commitments: Vec<Commitment>,
    state: State,
}

impl Solver {
    /// Creates a solver for one target puzzle under the tumbler's key.
    pub fn new(key: PublicKey, target: Puzzle, params: Parameters) -> Self {
        Self {
            key,
            target,
            params,
            set: Vec::new(),
            commitments: Vec::new(),
            state: State::Initialized,
        }
    }

    /// Builds the shuffled puzzle sequence: `real_count` blindings of the
    /// target interleaved at random with `fake_count` fresh puzzles whose
    /// solutions the client knows. The returned puzzles are sent to the
    /// tumbler, which cannot tell the two kinds apart. Positions in the
    /// returned sequence identify puzzles for the rest of the session.
    pub fn generate_puzzles<R: Rng + CryptoRng>(
        &mut self,
        rng: &mut R,
    ) -> Result<Vec<Puzzle>, Error> {
        if !matches!(self.state, State::Initialized) {
            return Err(Error::InvalidState);
        }

        let mut set = Vec::with_capacity(self.params.total());
        for _ in 0..self.params.real_count {
            let (puzzle, blind) = self.key.blind(&self.target, rng);
            set.push(PuzzleEntry::Real { puzzle, blind });
        }
        for _ in 0..self.params.fake_count {
            let (puzzle, solution) = self.key.generate_puzzle(rng);
            set.push(PuzzleEntry::Fake { puzzle, solution });
        }
        set.shuffle(rng);

        let puzzles = set.iter().map(|entry| entry.puzzle().clone()).collect();

        self.set = set;
        self.state = State::WaitingCommitments;

        Ok(puzzles)
    }

    /// Stores the tumbler's solution commitments, one per puzzle position,
    /// and reveals which positions are fake along with their solutions. The
    /// reveal challenges the tumbler to open those commitments.
    pub fn accept_commitments(
        &mut self,
        commitments: Vec<Commitment>,
    ) -> Result<Vec<PuzzleSolution>, Error> {
        if !matches!(self.state, State::WaitingCommitments) {
            return Err(Error::InvalidState);
        }
        if commitments.len() != self.params.total() {
            return Err(Error::InvalidLength {
                expected: self.params.total(),
                actual: commitments.len(),
            });
        }

        let reveals = self
            .set
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                PuzzleEntry::Fake { solution, .. } => Some(PuzzleSolution {
                    index,
                    solution: solution.clone(),
                }),
                PuzzleEntry::Real { .. } => None,
            })
            .collect();

        self.commitments = commitments;
        self.state = State::WaitingFakeKeys;

        Ok(reveals)
    }

    /// Verifies the keys the tumbler revealed for the fake positions, in
    /// ascending position order, against the stored commitments. Every key
    /// must hash to the committed value and decrypt the committed ciphertext
    /// to the solution the client chose for that fake puzzle. Any mismatch
    /// is proof of a dishonest commitment and kills the session.
    ///
    /// On success the blind factors of the real positions are returned in
    /// ascending position order, to be revealed to the tumbler. This
    /// discloses which positions blind the target but not its solution.
    pub fn accept_fake_keys(
        &mut self,
        keys: Vec<SolutionKey>,
    ) -> Result<Vec<BlindFactor>, Error> {
        if !matches!(self.state, State::WaitingFakeKeys) {
            return Err(Error::InvalidState);
        }
        if keys.len() != self.params.fake_count {
            return Err(Error::InvalidLength {
                expected: self.params.fake_count,
                actual: keys.len(),
            });
        }

        if let Err(error) = self.check_fake_openings(&keys) {
            return Err(self.fail(error));
        }

        let factors = self
            .set
            .iter()
            .filter_map(|entry| match entry {
                PuzzleEntry::Real { blind, .. } => Some(blind.clone()),
                PuzzleEntry::Fake { .. } => None,
            })
            .collect();

        self.state = State::WaitingRealKeys;

        Ok(factors)
    }

    /// Searches the keys the tumbler revealed for the real positions, in
    /// ascending position order, for one that opens its commitment to a
    /// verifying solution. The first such position wins; keys whose hash
    /// does not match the commitment are skipped, which tolerates a tumbler
    /// that chooses to reveal only one valid key. The recovered solution is
    /// unblinded with that position's blind factor before being returned.
    pub fn accept_real_keys(&mut self, keys: Vec<SolutionKey>) -> Result<Solution, Error> {
        if !matches!(self.state, State::WaitingRealKeys) {
            return Err(Error::InvalidState);
        }
        if keys.len() != self.params.real_count {
            return Err(Error::InvalidLength {
                expected: self.params.real_count,
                actual: keys.len(),
            });
        }

        match self.find_solution(&keys) {
            Some(solution) => {
                self.discard_session();
                self.state = State::Completed;
                Ok(solution)
            }
            None => Err(self.fail(Error::SolutionNotFound)),
        }
    }

    fn check_fake_openings(&self, keys: &[SolutionKey]) -> Result<(), Error> {
        let fakes = self
            .set
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                PuzzleEntry::Fake { solution, .. } => Some((index, solution)),
                PuzzleEntry::Real { .. } => None,
            });

        for ((index, solution), key) in fakes.zip(keys) {
            let commitment = &self.commitments[index];

            if key.hash() != commitment.key_hash {
                return Err(Error::CommitmentHashInvalid { index });
            }

            let opened = key.decrypt(&commitment.encrypted_solution);
            if BigUint::from_bytes_be(&opened) != BigUint::from_bytes_be(solution.as_bytes()) {
                return Err(Error::CommitmentSolutionInvalid { index });
            }
        }

        Ok(())
    }

    fn find_solution(&self, keys: &[SolutionKey]) -> Option<Solution> {
        let reals = self
            .set
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                PuzzleEntry::Real { puzzle, blind } => Some((index, puzzle, blind)),
                PuzzleEntry::Fake { .. } => None,
            });

        for ((index, puzzle, blind), key) in reals.zip(keys) {
            if key.hash() != self.commitments[index].key_hash {
                continue;
            }

            let candidate = key.decrypt(&self.commitments[index].encrypted_solution);
            if self.key.verify(puzzle, &candidate) {
                return Some(self.key.unblind(&candidate, blind));
            }
        }

        None
    }

    fn fail(&mut self, error: Error) -> Error {
        self.discard_session();
        self.state = State::Failed;
        error
    }

    fn discard_session(&mut self) {
        // Dropping the entries zeroizes the blind factors and fake solutions.
        self.set.clear();
        self.commitments.clear();
    }
}

/// A position in the shuffled puzzle sequence.
#[derive(Debug)]
enum PuzzleEntry {
    /// A blinding of the target puzzle.
    Real { puzzle: Puzzle, blind: BlindFactor },
    /// A fabricated puzzle whose solution the client already knows.
    Fake { puzzle: Puzzle, solution: Solution },
}

impl PuzzleEntry {
    fn puzzle(&self) -> &Puzzle {
        match self {
            PuzzleEntry::Real { puzzle, .. } => puzzle,
            PuzzleEntry::Fake { puzzle, .. } => puzzle,
        }
    }
}

/// Internal solver state.
#[derive(Debug)]
enum State {
    Initialized,
    WaitingCommitments,
    WaitingFakeKeys,
    WaitingRealKeys,
    Completed,
    Failed,
}

#[derive(Debug)]
pub enum Error {
    /// A transition was invoked out of order, or the machine is terminal.
    InvalidState,
    /// A message batch had the wrong number of elements.
    InvalidLength { expected: usize, actual: usize },
    /// A revealed fake-position key does not hash to the committed value.
    CommitmentHashInvalid { index: usize },
    /// A fake-position commitment decrypted to the wrong solution.
    CommitmentSolutionInvalid { index: usize },
    /// No real-position key opened its commitment to a verifying solution.
    SolutionNotFound,
}
