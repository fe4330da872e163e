//! Infrastructure adapters

mod reqwest_auth_api;
mod system_clock;

pub use reqwest_auth_api::ReqwestAuthApi;
pub use system_clock::SystemClock;
