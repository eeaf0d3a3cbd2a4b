//! MARS broker (ZTF alert stream hosted by LCO)

mod adapter;
mod normalize;

pub use adapter::MarsAdapter;

pub const MARS_NAME: &str = "MARS";
pub const MARS_URL: &str = "https://mars.lco.global";
