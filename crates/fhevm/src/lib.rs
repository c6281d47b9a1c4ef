// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod coprocessor;
pub mod crypto;
mod decrypt;
mod encrypt;
mod error;
mod grant;
pub mod handle;
mod keypair;
mod relayer;
mod session;

pub use coprocessor::*;
pub use decrypt::*;
pub use encrypt::*;
pub use error::*;
pub use grant::*;
pub use keypair::*;
pub use relayer::*;
pub use session::*;
