use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, Frame,
};
use tracing::info;

use crate::error::{Result, SpreadError};

/// File name of the animation inside the output directory.
pub const ANIMATION_FILE: &str = "zombies.gif";

/// Turns an ordered list of frames into one animated artifact.
pub trait Animator {
    fn animate(&mut self, frames: &[PathBuf], dir: &Path) -> Result<PathBuf>;
}

/// Infinite-loop GIF, one frame per second by default.
#[derive(Clone, Debug)]
pub struct GifAnimator {
    frame_delay_ms: u32,
    speed: i32,
}

impl GifAnimator {
    pub fn new(frame_delay_ms: u32) -> Self {
        Self {
            frame_delay_ms,
            speed: 10,
        }
    }

    /// Palette quantization speed, 1 (best) to 30 (fastest).
    pub fn speed(mut self, speed: i32) -> Self {
        self.speed = speed.clamp(1, 30);
        self
    }
}

impl Default for GifAnimator {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Animator for GifAnimator {
    fn animate(&mut self, frames: &[PathBuf], dir: &Path) -> Result<PathBuf> {
        if frames.is_empty() {
            return Err(SpreadError::invalid("frames", "nothing to animate"));
        }
        let out = dir.join(ANIMATION_FILE);
        info!(path = %out.display(), frames = frames.len(), "saving animation");

        let file = File::create(&out)?;
        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), self.speed);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(SpreadError::render)?;

        let delay = Delay::from_numer_denom_ms(self.frame_delay_ms, 1);
        for path in frames {
            let buffer = image::open(path).map_err(SpreadError::render)?.into_rgba8();
            encoder
                .encode_frame(Frame::from_parts(buffer, 0, 0, delay))
                .map_err(SpreadError::render)?;
        }
        Ok(out)
    }
}
