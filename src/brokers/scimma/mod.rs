//! SCIMMA broker (Skip alert archive, GW counterpart notices)

mod adapter;
mod normalize;

pub use adapter::ScimmaAdapter;

pub const SCIMMA_NAME: &str = "SCIMMA";
pub const SCIMMA_URL: &str = "https://skip.dev.hop.scimma.org/api/alerts/";
pub const GRACE_DB_URL: &str = "https://gracedb.ligo.org";
/// Skip topic id of LVC counterpart notices.
pub const DEFAULT_SCIMMA_TOPIC: u32 = 3;
