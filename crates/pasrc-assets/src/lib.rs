//! Asset table and stabilizer (§4.2): deterministic naming of resource
//! files moving between the archive and the source tree.

mod manifest;
mod stabilizer;

pub use manifest::{parse as parse_manifest, serialize as serialize_manifest, ResourceEntry, KIND_LOCAL_FILE};
pub use stabilizer::{stabilize_on_pack, stabilize_on_unpack, Error};
