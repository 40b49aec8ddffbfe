//! V4L2 webcam source.
//!
//! Opens a local device node (e.g. /dev/video0), asks for packed RGB and
//! falls back to YUYV, which nearly every UVC webcam supports. Each captured
//! buffer is converted to a BGR `Frame` before it leaves this module.

use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;

use super::normalize::{normalize_to_bgr, PixelFormat};
use super::{CameraConfig, CameraStats, FrameSource};
use crate::frame::Frame;

/// Webcam opened through libv4l. The device is released on drop.
pub struct V4l2Camera {
    config: CameraConfig,
    state: DeviceState,
    format: PixelFormat,
    active_width: u32,
    active_height: u32,
    frame_count: u64,
}

#[self_referencing]
struct DeviceState {
    device: v4l::Device,
    #[borrows(mut device)]
    #[covariant]
    stream: v4l::prelude::MmapStream<'this, v4l::Device>,
}

impl V4l2Camera {
    pub fn open(config: CameraConfig) -> Result<Self> {
        use v4l::buffer::Type;
        use v4l::video::Capture;

        let mut device = v4l::Device::with_path(&config.device)
            .with_context(|| format!("open v4l2 device {}", config.device))?;
        let mut requested = device.format().context("read v4l2 format")?;
        requested.width = config.width;
        requested.height = config.height;
        requested.fourcc = v4l::FourCC::new(b"RGB3");

        let mut negotiated = match device.set_format(&requested) {
            Ok(format) => format,
            Err(err) => {
                log::warn!(
                    "V4l2Camera: failed to set format on {}: {}",
                    config.device,
                    err
                );
                device
                    .format()
                    .context("read v4l2 format after set failure")?
            }
        };
        if negotiated.fourcc != v4l::FourCC::new(b"RGB3") {
            requested.fourcc = v4l::FourCC::new(b"YUYV");
            negotiated = device
                .set_format(&requested)
                .with_context(|| format!("set YUYV format on {}", config.device))?;
        }
        let format = match &negotiated.fourcc.repr {
            b"RGB3" => PixelFormat::Rgb24,
            b"YUYV" => PixelFormat::Yuyv,
            other => {
                return Err(anyhow!(
                    "v4l2 device {} offers unsupported pixel format {}",
                    config.device,
                    String::from_utf8_lossy(other)
                ))
            }
        };

        if config.target_fps > 0 {
            let params = v4l::video::capture::Parameters::with_fps(config.target_fps);
            if let Err(err) = device.set_params(&params) {
                log::warn!(
                    "V4l2Camera: failed to set fps on {}: {}",
                    config.device,
                    err
                );
            }
        }

        let state = DeviceStateBuilder {
            device,
            stream_builder: |device| {
                v4l::prelude::MmapStream::with_buffers(device, Type::VideoCapture, 4)
                    .map_err(|err| anyhow::Error::new(err).context("create v4l2 buffer stream"))
            },
        }
        .try_build()?;

        log::info!(
            "V4l2Camera: connected to {} ({}x{}, {:?})",
            config.device,
            negotiated.width,
            negotiated.height,
            format
        );

        Ok(Self {
            active_width: negotiated.width,
            active_height: negotiated.height,
            config,
            state,
            format,
            frame_count: 0,
        })
    }
}

impl FrameSource for V4l2Camera {
    fn next_frame(&mut self) -> Result<Frame> {
        use v4l::io::traits::CaptureStream;

        let (buf, _meta) = self
            .state
            .with_mut(|fields| fields.stream.next())
            .map_err(|err| anyhow::Error::new(err).context("capture v4l2 frame"))?;
        let frame = normalize_to_bgr(buf, self.active_width, self.active_height, self.format)?;
        self.frame_count += 1;
        Ok(frame)
    }

    fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            device: self.config.device.clone(),
        }
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        log::info!(
            "V4l2Camera: releasing {} after {} frames",
            self.config.device,
            self.frame_count
        );
    }
}
