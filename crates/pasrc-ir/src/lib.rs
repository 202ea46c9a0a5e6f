//! IRSplitCombine (§4.3): the transform between PKG control JSON and the
//! in-memory IR tree plus editor-state sidecar.

mod combine;
mod error;
mod raw;
mod raw_json;
mod split;

pub use combine::{combine, CombineContext};
pub use error::Error;
pub use raw::{ComponentDefinitionInfo, PkgControl, PkgRule};
pub use raw_json::{control_from_json, control_to_json};
pub use split::{split, SplitContext};
