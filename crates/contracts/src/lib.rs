// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

pub mod bindings;
mod confirm;
mod contract;
pub mod deploy;
pub mod deployments;
mod error;
mod fundraiser;
mod provider;
mod token;

pub use confirm::*;
pub use contract::*;
pub use error::*;
pub use fundraiser::*;
pub use provider::*;
pub use token::*;
