//! Built-in broker adapters
//!
//! Each broker module follows the same layout:
//! - `adapter.rs`: the [`BrokerAdapter`](crate::alerts::BrokerAdapter) impl,
//!   filter inputs and request building
//! - `normalize.rs`: payload → display row flattening
//!
//! | Broker | Results key | Cone search     | Classification          |
//! |--------|-------------|-----------------|-------------------------|
//! | MARS   | `results`   | `cone=ra,dec,r` | -                       |
//! | ALeRCE | `items`     | `ra`/`dec`/`radius` | stamp or light curve |
//! | SCIMMA | `results`   | `cone_search`   | -                       |

pub mod alerce;
pub mod mars;
pub mod registry;
pub mod scimma;

pub use alerce::AlerceAdapter;
pub use mars::MarsAdapter;
pub use registry::{AdapterFactory, BrokerKind, BrokerRegistry, RegistryEntry};
pub use scimma::ScimmaAdapter;
