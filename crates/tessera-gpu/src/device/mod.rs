//! GPU device, queue and surface management.
//!
//! This module is responsible for:
//! - adapter/device negotiation and surface configuration (`Device::create`)
//! - resource factories
//! - submission and buffer uploads (`Queue`)
//! - acquiring and presenting swap chain images (`Surface`)

mod config;
mod context;
mod error;
mod queue;
mod surface;

pub use config::{DeviceConfig, PresentModePreference};
pub use context::Device;
pub use error::DeviceError;
pub use queue::Queue;
pub use surface::{AcquireError, Surface, SurfaceCapabilities, SurfaceConfig};
