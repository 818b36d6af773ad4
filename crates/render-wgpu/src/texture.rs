use finder_render::GpuError;
use std::path::Path;
use wgpu::util::DeviceExt;

/// Decoded RGBA8 image, rows flipped so the first row is the image bottom.
pub(crate) struct Rgba8Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub(crate) fn load_rgba8(path: &Path) -> Result<Rgba8Image, GpuError> {
    let image = image::open(path).map_err(|e| GpuError::Texture {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let rgba = image.flipv().to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(GpuError::Texture {
            path: path.to_path_buf(),
            reason: "image has no pixels".into(),
        });
    }
    Ok(Rgba8Image {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

pub(crate) fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    image: &Rgba8Image,
) -> wgpu::TextureView {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.pixels,
    );
    texture.create_view(&Default::default())
}

/// 1x1 white texture bound when a draw has no texture of its own.
pub(crate) fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::TextureView {
    upload(
        device,
        queue,
        "white_texture",
        &Rgba8Image {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        },
    )
}

pub(crate) fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: crate::DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_texture_error() {
        let err = load_rgba8(Path::new("does/not/exist.png")).err();
        assert!(matches!(err, Some(GpuError::Texture { .. })));
    }

    #[test]
    fn ppm_is_flipped_vertically() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("two_rows.ppm");
        // Top row red, bottom row blue.
        std::fs::write(&path, "P3\n1 2\n255\n255 0 0\n0 0 255\n").unwrap();

        let image = load_rgba8(&path).unwrap();
        assert_eq!((image.width, image.height), (1, 2));
        assert_eq!(&image.pixels[..4], &[0, 0, 255, 255]);
        assert_eq!(&image.pixels[4..], &[255, 0, 0, 255]);
    }
}
