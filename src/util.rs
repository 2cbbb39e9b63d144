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

pub mod hashes {
    use ripemd::{Digest, Ripemd160};

    /// Digests some data through a single RIPEMD-160.
    pub fn ripemd160(b: &[u8]) -> [u8; 20] {
        let digest = Ripemd160::digest(b);
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest);
        out
    }
}
