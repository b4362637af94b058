//! Native TIFF reading/writing (without GDAL dependency)
//!
//! Uses the `tiff` crate. Multi-band input is expected in chunky
//! (pixel-interleaved) layout, which is what most multispectral exports and
//! the `tiff` decoder deliver; the band count is taken from the number of
//! samples per pixel.

use crate::error::{Error, Result};
use crate::raster::{Raster, RasterElement, SpectralCube};
use ndarray::Array3;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::colortype::{Gray32Float, RGB8};
use tiff::encoder::TiffEncoder;

/// Read a (multi-band) TIFF file into a [`SpectralCube`]
pub fn read_cube<P: AsRef<Path>>(path: P) -> Result<SpectralCube> {
    let file = File::open(path.as_ref())?;
    decode_cube(BufReader::new(file))
}

/// Read a TIFF from an in-memory buffer into a [`SpectralCube`]
///
/// Same as `read_cube` but operates on a byte slice instead of a file path.
pub fn read_cube_from_buffer(data: &[u8]) -> Result<SpectralCube> {
    decode_cube(Cursor::new(data))
}

/// Internal: decode a TIFF from any `Read + Seek` source
fn decode_cube<R>(reader: R) -> Result<SpectralCube>
where
    R: std::io::Read + std::io::Seek,
{
    // Hyperspectral cubes easily exceed the decoder's default buffer limit
    let mut decoder = Decoder::new(reader)?.with_limits(Limits::unlimited());

    let (width, height) = decoder.dimensions()?;
    let rows = height as usize;
    let cols = width as usize;

    let samples: Vec<f32> = match decoder.read_image()? {
        DecodingResult::U8(buf) => samples_to_f32(buf),
        DecodingResult::U16(buf) => samples_to_f32(buf),
        DecodingResult::U32(buf) => samples_to_f32(buf),
        DecodingResult::U64(buf) => samples_to_f32(buf),
        DecodingResult::I8(buf) => samples_to_f32(buf),
        DecodingResult::I16(buf) => samples_to_f32(buf),
        DecodingResult::I32(buf) => samples_to_f32(buf),
        DecodingResult::I64(buf) => samples_to_f32(buf),
        DecodingResult::F32(buf) => buf,
        DecodingResult::F64(buf) => samples_to_f32(buf),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF sample format".to_string(),
            ))
        }
    };

    let pixels = rows * cols;
    if pixels == 0 || samples.len() % pixels != 0 {
        return Err(Error::InvalidDimensions {
            rows,
            cols,
            bands: if pixels == 0 { 0 } else { samples.len() / pixels },
        });
    }
    let bands = samples.len() / pixels;

    SpectralCube::from_shape_vec(&[rows, cols, bands], samples)
}

fn samples_to_f32<T: RasterElement>(buf: Vec<T>) -> Vec<f32> {
    buf.into_iter().map(RasterElement::to_f32_lossy).collect()
}

/// Write a single-band raster to a TIFF file as 32-bit float
pub fn write_raster<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    encode_raster(raster, BufWriter::new(file))
}

/// Write a single-band raster to an in-memory TIFF buffer
pub fn write_raster_to_buffer<T: RasterElement>(raster: &Raster<T>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_raster(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

/// Internal: encode a raster as float32 TIFF into any `Write + Seek` sink
fn encode_raster<T, W>(raster: &Raster<T>, writer: W) -> Result<()>
where
    T: RasterElement,
    W: std::io::Write + std::io::Seek,
{
    let mut encoder = TiffEncoder::new(writer)?;
    let (rows, cols) = raster.shape();

    let data: Vec<f32> = raster.data().iter().map(|&v| v.to_f32_lossy()).collect();

    encoder.write_image::<Gray32Float>(cols as u32, rows as u32, &data)?;
    Ok(())
}

/// Write an RGB image with shape (rows, cols, 3) to a TIFF file
pub fn write_rgb<P: AsRef<Path>>(image: &Array3<u8>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    encode_rgb(image, BufWriter::new(file))
}

/// Write an RGB image to an in-memory TIFF buffer
pub fn write_rgb_to_buffer(image: &Array3<u8>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_rgb(image, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_rgb<W>(image: &Array3<u8>, writer: W) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    let (rows, cols, channels) = image.dim();
    if channels != 3 {
        return Err(Error::InvalidDimensions {
            rows,
            cols,
            bands: channels,
        });
    }

    let mut encoder = TiffEncoder::new(writer)?;
    // Iterating in logical order yields row-major, channel-interleaved samples
    let data: Vec<u8> = image.iter().copied().collect();
    encoder.write_image::<RGB8>(cols as u32, rows as u32, &data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiff::encoder::colortype::{Gray16, GrayI16, RGB16};

    #[test]
    fn test_read_multiband_buffer() {
        // 2x3 image with 3 interleaved u16 samples per pixel
        let samples: Vec<u16> = (0..18).map(|v| v * 10).collect();
        let mut buf = Vec::new();
        {
            let mut encoder = TiffEncoder::new(Cursor::new(&mut buf)).unwrap();
            encoder.write_image::<RGB16>(3, 2, &samples).unwrap();
        }

        let cube = read_cube_from_buffer(&buf).unwrap();
        assert_eq!(cube.shape(), (2, 3, 3));
        assert_eq!(cube.view()[(0, 0, 0)], 0.0);
        assert_eq!(cube.view()[(0, 0, 2)], 20.0);
        assert_eq!(cube.view()[(1, 2, 2)], 170.0);
    }

    #[test]
    fn test_read_single_band_buffer() {
        let samples: Vec<u16> = vec![1, 2, 3, 4];
        let mut buf = Vec::new();
        {
            let mut encoder = TiffEncoder::new(Cursor::new(&mut buf)).unwrap();
            encoder.write_image::<Gray16>(2, 2, &samples).unwrap();
        }

        let cube = read_cube_from_buffer(&buf).unwrap();
        assert_eq!(cube.shape(), (2, 2, 1));
        assert_eq!(cube.band(0).unwrap()[(1, 0)], 3.0);
    }

    #[test]
    fn test_read_signed_samples() {
        let samples: Vec<i16> = vec![-300, 0, 7, 32767];
        let mut buf = Vec::new();
        {
            let mut encoder = TiffEncoder::new(Cursor::new(&mut buf)).unwrap();
            encoder.write_image::<GrayI16>(2, 2, &samples).unwrap();
        }

        let cube = read_cube_from_buffer(&buf).unwrap();
        assert_eq!(cube.band(0).unwrap()[(0, 0)], -300.0);
        assert_eq!(cube.band(0).unwrap()[(1, 1)], 32767.0);
    }

    #[test]
    fn test_class_map_written_as_float() {
        let classes = Raster::from_vec(vec![0u8, 1, 3, 255], 2, 2).unwrap();
        let buf = write_raster_to_buffer(&classes).unwrap();

        let cube = read_cube_from_buffer(&buf).unwrap();
        assert_eq!(cube.band(0).unwrap()[(1, 0)], 3.0);
        assert_eq!(cube.band(0).unwrap()[(1, 1)], 255.0);
    }

    #[test]
    fn test_raster_roundtrip() {
        let raster = Raster::from_vec(vec![0.25f32, -0.5, 1.0, 0.0], 2, 2).unwrap();
        let buf = write_raster_to_buffer(&raster).unwrap();

        let cube = read_cube_from_buffer(&buf).unwrap();
        assert_eq!(cube.shape(), (2, 2, 1));
        assert_eq!(cube.band(0).unwrap()[(0, 1)], -0.5);
    }

    #[test]
    fn test_write_rgb_rejects_wrong_channels() {
        let image = Array3::<u8>::zeros((2, 2, 4));
        assert!(write_rgb_to_buffer(&image).is_err());
    }

    #[test]
    fn test_rgb_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("health.tif");

        let mut image = Array3::<u8>::zeros((2, 2, 3));
        image[(1, 1, 0)] = 144;
        image[(1, 1, 1)] = 238;
        write_rgb(&image, &path).unwrap();

        let cube = read_cube(&path).unwrap();
        assert_eq!(cube.shape(), (2, 2, 3));
        assert_eq!(cube.view()[(1, 1, 1)], 238.0);
    }

    #[test]
    fn test_garbage_buffer_is_error() {
        assert!(read_cube_from_buffer(b"not a tiff").is_err());
    }
}
