use std::sync::Arc;

use thiserror::Error;

use crate::backend::{Backend, WgpuBackend};
use crate::resource::TextureView;

/// Attachment slot of a render target.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum AttachmentPoint {
    Color0,
    Color1,
    Color2,
    Color3,
    Color4,
    Color5,
    Color6,
    Color7,
    DepthStencil,
}

impl AttachmentPoint {
    pub const COUNT: usize = 9;
    pub const MAX_COLOR: usize = 8;

    /// Color attachment at `index`, if in range.
    pub fn color(index: usize) -> Option<Self> {
        use AttachmentPoint::*;
        [Color0, Color1, Color2, Color3, Color4, Color5, Color6, Color7]
            .get(index)
            .copied()
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn is_color(self) -> bool {
        self != AttachmentPoint::DepthStencil
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderTargetError {
    #[error("render target has no attachments")]
    Empty,

    #[error("view at {0:?} was not created with RENDER_ATTACHMENT usage")]
    NotRenderable(AttachmentPoint),

    #[error("format {format:?} cannot be attached at {point:?}")]
    FormatMismatch {
        point: AttachmentPoint,
        format: wgpu::TextureFormat,
    },

    #[error("view at {point:?} is {found:?} but the target is {expected:?}")]
    SizeMismatch {
        point: AttachmentPoint,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("view at {point:?} has {found} samples but the target has {expected}")]
    SampleCountMismatch {
        point: AttachmentPoint,
        expected: u32,
        found: u32,
    },
}

/// Set of texture views one render pass draws into.
///
/// Every attached view shares the same pixel size and sample count. The
/// depth/stencil slot only takes depth formats, color slots only color ones.
#[derive(Debug)]
pub struct RenderTarget<B: Backend = WgpuBackend> {
    attachments: [Option<Arc<TextureView<B>>>; AttachmentPoint::COUNT],
}

impl<B: Backend> RenderTarget<B> {
    pub fn new() -> Self {
        Self {
            attachments: std::array::from_fn(|_| None),
        }
    }

    /// Installs `view` at `point`, replacing whatever was there.
    ///
    /// The view is checked against every other attachment; the one being
    /// replaced does not take part in the comparison.
    pub fn attach_texture(
        &mut self,
        point: AttachmentPoint,
        view: Arc<TextureView<B>>,
    ) -> Result<(), RenderTargetError> {
        if !view.usage().contains(wgpu::TextureUsages::RENDER_ATTACHMENT) {
            return Err(RenderTargetError::NotRenderable(point));
        }
        if view.is_depth() == point.is_color() {
            return Err(RenderTargetError::FormatMismatch {
                point,
                format: view.format(),
            });
        }

        let others = self
            .attachments
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != point.index())
            .filter_map(|(_, a)| a.as_ref());

        for other in others {
            if other.size() != view.size() {
                return Err(RenderTargetError::SizeMismatch {
                    point,
                    expected: other.size(),
                    found: view.size(),
                });
            }
            if other.sample_count() != view.sample_count() {
                return Err(RenderTargetError::SampleCountMismatch {
                    point,
                    expected: other.sample_count(),
                    found: view.sample_count(),
                });
            }
        }

        self.attachments[point.index()] = Some(view);
        Ok(())
    }

    /// Removes and returns the view at `point`.
    pub fn detach(&mut self, point: AttachmentPoint) -> Option<Arc<TextureView<B>>> {
        self.attachments[point.index()].take()
    }

    pub fn attachment(&self, point: AttachmentPoint) -> Option<&Arc<TextureView<B>>> {
        self.attachments[point.index()].as_ref()
    }

    /// Color slots in attachment order, trailing empty slots trimmed.
    pub fn color_attachments(&self) -> &[Option<Arc<TextureView<B>>>] {
        let colors = &self.attachments[..AttachmentPoint::MAX_COLOR];
        let used = colors.iter().rposition(Option::is_some).map_or(0, |i| i + 1);
        &colors[..used]
    }

    pub fn depth_stencil(&self) -> Option<&Arc<TextureView<B>>> {
        self.attachment(AttachmentPoint::DepthStencil)
    }

    /// Formats of the color slots, in the layout a pipeline must declare.
    pub fn color_formats(&self) -> Vec<Option<wgpu::TextureFormat>> {
        self.color_attachments()
            .iter()
            .map(|a| a.as_ref().map(|v| v.format()))
            .collect()
    }

    pub fn depth_format(&self) -> Option<wgpu::TextureFormat> {
        self.depth_stencil().map(|v| v.format())
    }

    fn first(&self) -> Option<&Arc<TextureView<B>>> {
        self.attachments.iter().flatten().next()
    }

    /// Shared pixel size of the attachments.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.first().map(|v| v.size())
    }

    pub fn sample_count(&self) -> Option<u32> {
        self.first().map(|v| v.sample_count())
    }

    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }
}

impl<B: Backend> Default for RenderTarget<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Clone for RenderTarget<B> {
    fn clone(&self) -> Self {
        Self {
            attachments: self.attachments.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{color_view, depth_view, mock_device, texture_view};

    #[test]
    fn attach_is_last_write_wins() {
        let device = mock_device();
        let first = color_view(&device, 64, 64);
        let second = color_view(&device, 64, 64);

        let mut target = RenderTarget::new();
        target.attach_texture(AttachmentPoint::Color0, first).unwrap();
        target
            .attach_texture(AttachmentPoint::Color0, second.clone())
            .unwrap();

        let attached = target.attachment(AttachmentPoint::Color0).unwrap();
        assert!(Arc::ptr_eq(attached, &second));
        assert_eq!(target.color_attachments().len(), 1);
    }

    #[test]
    fn replacing_the_only_attachment_may_change_size() {
        let device = mock_device();
        let mut target = RenderTarget::new();
        target
            .attach_texture(AttachmentPoint::Color0, color_view(&device, 64, 64))
            .unwrap();
        target
            .attach_texture(AttachmentPoint::Color0, color_view(&device, 32, 16))
            .unwrap();
        assert_eq!(target.size(), Some((32, 16)));
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let device = mock_device();
        let mut target = RenderTarget::new();
        target
            .attach_texture(AttachmentPoint::Color0, color_view(&device, 64, 64))
            .unwrap();

        let err = target
            .attach_texture(AttachmentPoint::DepthStencil, depth_view(&device, 32, 32))
            .unwrap_err();
        assert_eq!(
            err,
            RenderTargetError::SizeMismatch {
                point: AttachmentPoint::DepthStencil,
                expected: (64, 64),
                found: (32, 32),
            }
        );
        assert!(target.depth_stencil().is_none());
    }

    #[test]
    fn depth_and_color_slots_are_not_interchangeable() {
        let device = mock_device();
        let mut target = RenderTarget::new();

        let err = target
            .attach_texture(AttachmentPoint::Color0, depth_view(&device, 8, 8))
            .unwrap_err();
        assert!(matches!(err, RenderTargetError::FormatMismatch { .. }));

        let err = target
            .attach_texture(AttachmentPoint::DepthStencil, color_view(&device, 8, 8))
            .unwrap_err();
        assert!(matches!(err, RenderTargetError::FormatMismatch { .. }));
        assert!(target.is_empty());
    }

    #[test]
    fn sampled_only_views_are_not_renderable() {
        let device = mock_device();
        let view = texture_view(&device, 8, 8, wgpu::TextureUsages::TEXTURE_BINDING);

        let mut target = RenderTarget::new();
        let err = target
            .attach_texture(AttachmentPoint::Color1, view)
            .unwrap_err();
        assert_eq!(err, RenderTargetError::NotRenderable(AttachmentPoint::Color1));
    }

    #[test]
    fn color_layout_keeps_holes() {
        let device = mock_device();
        let mut target = RenderTarget::new();
        target
            .attach_texture(AttachmentPoint::Color2, color_view(&device, 4, 4))
            .unwrap();

        let formats = target.color_formats();
        assert_eq!(formats.len(), 3);
        assert_eq!(formats[0], None);
        assert_eq!(formats[2], Some(crate::testing::COLOR_FORMAT));

        target.detach(AttachmentPoint::Color2);
        assert!(target.color_attachments().is_empty());
        assert_eq!(target.size(), None);
    }
}
