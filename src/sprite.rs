use image::{imageops::FilterType, GenericImageView};
use serde::{Deserialize, Serialize};

/// Sprite size budget in terminal cells. Each cell carries two pixel rows.
pub const SPRITE_MAX_COLS: u32 = 40;
pub const SPRITE_MAX_ROWS: u32 = 18;

const ALPHA_CUTOFF: u8 = 128;

static PLACEHOLDER: &str = include_str!("../assets/placeholder.txt");

/// Image downsampled for half-block rendering.
///
/// `pixels` is row-major with `width * height` entries; `None` is transparent.
/// `height` is in pixel rows, so the sprite spans `height.div_ceil(2)` cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteArt {
    pub width: u16,
    pub height: u16,
    pub pixels: Vec<Option<[u8; 3]>>,
}

impl SpriteArt {
    pub fn pixel(&self, x: u16, y: u16) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
            .flatten()
    }

    pub fn cell_rows(&self) -> u16 {
        self.height.div_ceil(2)
    }
}

/// Lifecycle of one image on the detail screen
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ImageSlot {
    Loading,
    Ready(SpriteArt),
    Fallback,
}

/// The bundled placeholder shown when an image is missing or broken.
pub fn placeholder() -> &'static str {
    PLACEHOLDER
}

pub fn decode_sprite(bytes: &[u8], max_cols: u32, max_rows: u32) -> Result<SpriteArt, String> {
    let image = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let (x, y, width, height) = opaque_bounds(&image).ok_or("image is fully transparent")?;
    let cropped = image.crop_imm(x, y, width, height);
    let (max_width, max_height) = (max_cols.max(1), (max_rows * 2).max(1));
    let rgba = if width > max_width || height > max_height {
        cropped
            .resize(max_width, max_height, FilterType::Nearest)
            .to_rgba8()
    } else {
        cropped.to_rgba8()
    };
    let (width, height) = rgba.dimensions();
    let pixels = rgba
        .pixels()
        .map(|pixel| {
            let [r, g, b, a] = pixel.0;
            (a >= ALPHA_CUTOFF).then_some([r, g, b])
        })
        .collect();
    Ok(SpriteArt {
        width: width as u16,
        height: height as u16,
        pixels,
    })
}

fn opaque_bounds(image: &image::DynamicImage) -> Option<(u32, u32, u32, u32)> {
    let (width, height) = image.dimensions();
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;
    for (x, y, pixel) in image.pixels() {
        if pixel.0[3] >= ALPHA_CUTOFF {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    found.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}
