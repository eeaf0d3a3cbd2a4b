//! ALeRCE broker (ZTF objects with stamp and light-curve classification)

mod adapter;
mod normalize;
mod taxonomy;

pub use adapter::AlerceAdapter;
pub use taxonomy::{ClassEntry, ClassTaxonomy, ClassifierKind, ClassifierPrecedence};

pub const ALERCE_NAME: &str = "ALeRCE";
pub const ALERCE_URL: &str = "https://alerce.online";
pub const ALERCE_API_URL: &str = "https://api.alerce.online/ztf/v1/objects";
