//! Graphics-API translation tables.
//!
//! The rendering backend — the layer that actually binds buffers and
//! issues draw calls — lives outside this crate. What it needs from here
//! is mechanical: translation of engine format enums, usage flags, and
//! indirect-command records into API types. Those translations are pure
//! functions of their inputs, isolated per API behind a feature gate.

#[cfg(feature = "wgpu-backend")]
pub mod wgpu;
