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

pub mod decode;
pub mod encode;

#[derive(Debug)]
pub enum Error {
    Json(serde_json::Error),
    Hex(hex::FromHexError),
    Element(crate::puzzle::ElementError),
    KeyWidth { expected: usize, actual: usize },
    HashWidth { expected: usize, actual: usize },
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json(error)
    }
}

impl From<hex::FromHexError> for Error {
    fn from(error: hex::FromHexError) -> Self {
        Error::Hex(error)
    }
}

impl From<crate::puzzle::ElementError> for Error {
    fn from(error: crate::puzzle::ElementError) -> Self {
        Error::Element(error)
    }
}
