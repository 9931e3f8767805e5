#![doc(html_root_url = "https://docs.rs/vite-devkit/0.1.0-beta.1")]
#![warn(rust_2018_idioms, missing_docs)]
#![deny(dead_code, unused_imports, unused_mut)]

//! Rust library to aid coding with Vite smart contracts: native identifiers
//! and the contract ABI codec.
//!
//! Vite contracts speak a dialect of the Ethereum contract ABI: arguments are
//! laid out in 32-byte words, but selectors and event ids are derived with
//! blake2b instead of keccak, and the type system gains three native
//! identifiers (`address`, `tokenId` and `gid`).
//!
//! ## Usage
//!
//! Load a contract ABI from its JSON description, then encode call data and
//! decode whatever the chain hands back.
//!
//! ```rust
//! use vite_devkit::abi::{Abi, Value};
//! use vite_devkit::{Address, U256};
//!
//! let abi: Abi = r#"[
//!     {"type": "function", "name": "transfer", "inputs": [
//!         {"name": "to", "type": "address"},
//!         {"name": "amount", "type": "uint256"}
//!     ]},
//!     {"type": "event", "name": "Transfer", "inputs": [
//!         {"name": "from", "type": "address", "indexed": true},
//!         {"name": "amount", "type": "uint256"}
//!     ]}
//! ]"#.parse().expect("Must be valid");
//!
//! let to: Address = "vite_ab24ef68b84e642c0ddca06beec81c9acb1977bbd7da27a87a"
//!     .parse()
//!     .expect("Must be valid");
//! let data = abi
//!     .encode_function("transfer", &[to.into(), Value::from(10u64)])
//!     .expect("Must be encodable");
//! assert_eq!(data.len(), 4 + 2 * 32);
//!
//! let decoded = abi.decode_function(&data).expect("Must be decodable");
//! assert_eq!(decoded, vec![Value::Address(to), Value::Uint(U256::new(10))]);
//! ```
//!
//! ## Examples
//!
//! You can check out sample usage of this crate in the `demos/` folder of the
//! project repo.
//!
//! ### MSRV
//!
//! `vite-devkit` promises to maintain a reasonable MSRV policy. MSRV will not be
//! bumped unless necessary, and such MSRV bumps will only happen in minor or major
//! releases as soon as the first non-beta release goes live.
//!
//! Currently it requires rust `1.81.0` or higher to build.
//!
//! ## License
//!
//! This project is licensed under the GNU General Public License v3.

mod address;
pub use address::{Address, AddressType, Gid, IdentifierError, TokenId};
pub mod abi;
mod utils;
pub use ethereum_types::H256;
pub use ethnum::{I256, U256};
pub use utils::blake2_256;
