//! Ground texture: decoded from an image file or generated

use std::path::Path;

use image::{Rgba, RgbaImage};

/// Side length of the generated fallback texture
pub const PROCEDURAL_SIZE: u32 = 256;

/// Checker cell size of the generated texture, in pixels
const CHECKER_CELL: u32 = 32;

/// Decode the configured ground image, falling back to [`procedural_ground`]
///
/// A missing or undecodable file is not fatal; it is logged and replaced.
pub fn load_ground_image(path: Option<&Path>) -> RgbaImage {
    let Some(path) = path else {
        return procedural_ground(PROCEDURAL_SIZE);
    };
    match image::open(path) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            log::info!("Loaded ground texture {} ({}x{})", path.display(), rgba.width(), rgba.height());
            rgba
        }
        Err(e) => {
            log::warn!("Ground texture {} unavailable ({e}), using procedural texture", path.display());
            procedural_ground(PROCEDURAL_SIZE)
        }
    }
}

/// Green checkerboard with per-pixel value noise
pub fn procedural_ground(size: u32) -> RgbaImage {
    let size = size.max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        let checker = ((x / CHECKER_CELL) + (y / CHECKER_CELL)) % 2 == 0;
        let noise = pixel_noise(x, y);
        let (r, g, b) = if checker { (46.0, 92.0, 30.0) } else { (58.0, 110.0, 36.0) };
        let shade = 0.85 + 0.3 * noise;
        Rgba([
            (r * shade).min(255.0) as u8,
            (g * shade).min(255.0) as u8,
            (b * shade).min(255.0) as u8,
            255,
        ])
    })
}

fn pixel_noise(x: u32, y: u32) -> f32 {
    let mut h = x.wrapping_mul(374761393).wrapping_add(y.wrapping_mul(668265263));
    h = (h ^ (h >> 13)).wrapping_mul(1103515245);
    h ^= h >> 16;
    (h & 0xFFFF) as f32 / 0xFFFF as f32
}

/// Sampled ground texture on the GPU
pub struct GroundTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl GroundTexture {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, image: &RgbaImage) -> Self {
        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ground_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width()),
                rows_per_image: Some(image.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ground_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self { texture, view, sampler }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_no_path_uses_procedural() {
        let img = load_ground_image(None);
        assert_eq!(img.dimensions(), (PROCEDURAL_SIZE, PROCEDURAL_SIZE));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let img = load_ground_image(Some(Path::new("/no/such/ground.png")));
        assert_eq!(img, procedural_ground(PROCEDURAL_SIZE));
    }

    #[test]
    fn test_garbage_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ground.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert_eq!(load_ground_image(Some(&path)).dimensions(), (PROCEDURAL_SIZE, PROCEDURAL_SIZE));
    }

    #[test]
    fn test_loads_real_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ground.png");
        let source = RgbaImage::from_pixel(8, 4, Rgba([10, 200, 30, 255]));
        source.save(&path).unwrap();
        let loaded = load_ground_image(Some(&path));
        assert_eq!(loaded, source);
    }

    #[test]
    fn test_procedural_is_green_and_opaque() {
        let img = procedural_ground(64);
        for pixel in img.pixels() {
            let [r, g, b, a] = pixel.0;
            assert_eq!(a, 255);
            assert!(g > r && g > b);
        }
        // Neighbouring checker cells differ on average
        let mean_green = |x0: u32| {
            let mut sum = 0u32;
            for y in 0..CHECKER_CELL {
                for x in x0..x0 + CHECKER_CELL {
                    sum += img.get_pixel(x, y)[1] as u32;
                }
            }
            sum as f32 / (CHECKER_CELL * CHECKER_CELL) as f32
        };
        assert!(mean_green(CHECKER_CELL) - mean_green(0) > 10.0);
    }
}
