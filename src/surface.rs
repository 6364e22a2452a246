//! Vulkan surface creation for a [`Window`].
//!
//! The window only hands out its raw display and window handles; everything
//! Vulkan-specific happens here.

use std::ffi::c_char;

use ash::extensions::khr;
use ash::vk;

use crate::error::{Result, WindowError};
use crate::window::Window;

/// Instance extensions needed to present to `window`.
pub fn required_extensions(window: &Window) -> Result<&'static [*const c_char]> {
    let handles = window
        .native_handles()
        .ok_or(WindowError::Unsupported("surface creation on a headless window"))?;
    ash_window::enumerate_required_extensions(handles.display)
        .map_err(|err| WindowError::Surface(format!("failed to query surface extensions: {err:?}")))
}

/// A presentation surface for one window.
///
/// Drop the surface before closing the window it was created for.
pub struct Surface {
    loader: khr::Surface,
    surface: vk::SurfaceKHR,
}

impl Surface {
    /// Creates a surface for `window`. The instance must have been created
    /// with the extensions from [`required_extensions`].
    pub fn new(entry: &ash::Entry, instance: &ash::Instance, window: &Window) -> Result<Self> {
        let handles = window
            .native_handles()
            .ok_or(WindowError::Unsupported("surface creation on a headless window"))?;
        let loader = khr::Surface::new(entry, instance);

        // SAFETY: the handles belong to a live window.
        let surface = unsafe {
            ash_window::create_surface(entry, instance, handles.display, handles.window, None)
                .map_err(|err| WindowError::Surface(format!("failed to create surface: {err:?}")))?
        };

        Ok(Self { loader, surface })
    }

    pub fn handle(&self) -> vk::SurfaceKHR {
        self.surface
    }

    pub fn loader(&self) -> &khr::Surface {
        &self.loader
    }

    /// Whether a queue family of `physical_device` can present here.
    pub fn supports_present(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
    ) -> Result<bool> {
        // SAFETY: surface and device come from the same instance.
        unsafe {
            self.loader
                .get_physical_device_surface_support(physical_device, queue_family_index, self.surface)
                .map_err(|err| WindowError::Surface(format!("failed to check surface support: {err:?}")))
        }
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        // SAFETY: the surface was created by this loader's instance.
        unsafe {
            self.loader.destroy_surface(self.surface, None);
        }
    }
}
