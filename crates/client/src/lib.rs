// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod chain;
mod client;
pub mod controls;
mod error;
pub mod format;
mod operation;
mod read_state;
mod store;
pub mod validation;

pub use chain::*;
pub use client::*;
pub use error::*;
pub use operation::*;
pub use read_state::*;
pub use store::*;
