use std::sync::{Arc, Mutex};

use crate::device::{DeviceConfig, DeviceError};

use super::WgpuBackend;

/// Instance, optional surface, adapter and device, in that order.
pub(super) async fn negotiate(
    target: Option<wgpu::SurfaceTarget<'static>>,
    config: &DeviceConfig,
) -> Result<WgpuBackend, DeviceError> {
    // Use all backends to allow wgpu to select the optimal platform backend.
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let surface = match target {
        Some(target) => Some(
            instance
                .create_surface(target)
                .map_err(|e| DeviceError::SurfaceCreation(e.to_string()))?,
        ),
        None => None,
    };

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: config.power_preference,
            compatible_surface: surface.as_ref(),
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| DeviceError::AdapterUnavailable(e.to_string()))?;

    inspect_adapter(&adapter);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("tessera device"),
            required_features: config.required_features,
            required_limits: config.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await
        .map_err(|e| DeviceError::DeviceRequest(e.to_string()))?;
    log::info!("device and queue created");

    device.on_uncaptured_error(Arc::new(|e: wgpu::Error| {
        log::error!("wgpu: {e}");
    }));

    Ok(WgpuBackend {
        instance,
        adapter,
        device,
        queue,
        surface,
        frame: Mutex::new(None),
        uniforms: Mutex::new(None),
    })
}

fn inspect_adapter(adapter: &wgpu::Adapter) {
    let info = adapter.get_info();
    log::info!(
        "adapter: {} (vendor {:#06x}, {:?}, {:?})",
        info.name,
        info.vendor,
        info.device_type,
        info.backend
    );
    if !info.driver.is_empty() {
        log::info!("driver: {} {}", info.driver, info.driver_info);
    }

    let limits = adapter.limits();
    log::debug!(
        "limits: texture 2d {}, bind groups {}, color attachments {}, uniform offset alignment {}",
        limits.max_texture_dimension_2d,
        limits.max_bind_groups,
        limits.max_color_attachments,
        limits.min_uniform_buffer_offset_alignment
    );
    log::debug!("features: {:?}", adapter.features());
}
