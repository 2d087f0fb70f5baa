//! Textures: decoded RGB images with wrap modes and nearest filtering.

use std::path::Path;

use thiserror::Error;

const CHANNELS: usize = 3;

/// Behavior when a texture coordinate leaves `[0, 1]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

/// Texel filtering. Nearest-neighbor only; minification and magnification
/// share the same (and only) mode.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FilterMode {
    Nearest,
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("texture data is {got} bytes, expected {expected} ({width}x{height} RGB)")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        got: usize,
    },
}

/// A decoded 3-channel RGB image, rows stored top to bottom.
pub struct Texture {
    data: Vec<u8>,
    width: usize,
    height: usize,
    wrap_x: WrapMode,
    wrap_y: WrapMode,
    filter_mag: FilterMode,
    filter_min: FilterMode,
}

impl Texture {
    /// Loads and decodes an image file. Most common formats are accepted;
    /// anything with an alpha channel is flattened to RGB.
    pub fn open(
        path: impl AsRef<Path>,
        wrap_x: WrapMode,
        wrap_y: WrapMode,
        filter_mag: FilterMode,
        filter_min: FilterMode,
    ) -> Result<Texture, TextureError> {
        let path = path.as_ref();
        let decoded = image::open(path)?.into_rgb8();
        let (width, height) = decoded.dimensions();
        log::debug!(
            target: "khepri",
            "loaded texture {} ({width}x{height})",
            path.display()
        );
        let mut texture = Texture::from_rgb8(width as usize, height as usize, decoded.into_raw())
            .expect("decoder produced a full image");
        texture.wrap_x = wrap_x;
        texture.wrap_y = wrap_y;
        texture.filter_mag = filter_mag;
        texture.filter_min = filter_min;
        Ok(texture)
    }

    /// Wraps already-decoded RGB bytes (3 bytes per pixel, row-major, top to
    /// bottom). Wrap modes default to [`WrapMode::Repeat`].
    pub fn from_rgb8(width: usize, height: usize, data: Vec<u8>) -> Result<Texture, TextureError> {
        let expected = width * height * CHANNELS;
        if data.len() != expected {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                expected,
                got: data.len(),
            });
        }
        Ok(Texture {
            data,
            width,
            height,
            wrap_x: WrapMode::Repeat,
            wrap_y: WrapMode::Repeat,
            filter_mag: FilterMode::Nearest,
            filter_min: FilterMode::Nearest,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn wrap_x(&self) -> WrapMode {
        self.wrap_x
    }

    pub fn set_wrap_x(&mut self, mode: WrapMode) {
        self.wrap_x = mode;
    }

    pub fn wrap_y(&self) -> WrapMode {
        self.wrap_y
    }

    pub fn set_wrap_y(&mut self, mode: WrapMode) {
        self.wrap_y = mode;
    }

    pub fn filter_mag(&self) -> FilterMode {
        self.filter_mag
    }

    pub fn set_filter_mag(&mut self, mode: FilterMode) {
        self.filter_mag = mode;
    }

    pub fn filter_min(&self) -> FilterMode {
        self.filter_min
    }

    pub fn set_filter_min(&mut self, mode: FilterMode) {
        self.filter_min = mode;
    }

    /// Samples the texture at `(u, v)` and returns RGBA channels in `[0, 1]`
    /// (alpha is always 1; the storage has no alpha channel).
    ///
    /// The V axis points up, images are stored top-down, so V is flipped.
    pub fn sample(&self, u: f64, v: f64) -> [f64; 4] {
        let u = self.wrap(u, self.wrap_x);
        let v = self.wrap(v, self.wrap_y);

        // Nearest filtering is the only mode; round to the closest texel.
        let FilterMode::Nearest = self.filter_mag;
        let x = (self.width - 1) as f64 * u;
        let y = (self.height - 1) as f64 * (1.0 - v);
        let xi = (x + 0.5) as usize;
        let yi = (y + 0.5) as usize;

        let at = (yi * self.width + xi) * CHANNELS;
        let texel = &self.data[at..at + CHANNELS];
        const INV_255: f64 = 1.0 / 255.0;
        [
            texel[0] as f64 * INV_255,
            texel[1] as f64 * INV_255,
            texel[2] as f64 * INV_255,
            1.0,
        ]
    }

    #[inline]
    fn wrap(&self, t: f64, mode: WrapMode) -> f64 {
        if (0.0..=1.0).contains(&t) {
            return t;
        }
        match mode {
            WrapMode::Repeat => t - t.floor(),
            WrapMode::ClampToEdge => t.clamp(0.0, 1.0),
        }
    }
}
