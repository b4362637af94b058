//! Health map rendering from a computed NDVI map

use agrorisk_algorithms::imagery::ndvi;
use agrorisk_colormap::{health_map, HealthClass};
use agrorisk_core::SpectralCube;
use ndarray::{Array3, Axis};

#[test]
fn constant_ndvi_third_is_all_light_green() {
    let mut data = Array3::<f32>::from_elem((64, 64, 6), 50.0);
    data.index_axis_mut(Axis(2), 2).fill(100.0);
    data.index_axis_mut(Axis(2), 3).fill(200.0);
    let cube = SpectralCube::from_array(data).unwrap();

    let ndvi = ndvi(&cube, 2, 3).unwrap();
    let image = health_map(&ndvi);
    assert_eq!(image.dim(), (64, 64, 3));

    let light_green = HealthClass::Moderate.color().to_array();
    for pixel in image.lanes(Axis(2)) {
        assert_eq!(pixel.to_vec(), light_green.to_vec());
    }
}

#[test]
fn gradient_covers_all_bands() {
    // NIR fixed, red sweeping: NDVI runs from 1 down to negative values
    let mut data = Array3::<f32>::zeros((1, 40, 4));
    for c in 0..40 {
        data[(0, c, 2)] = c as f32 * 10.0;
        data[(0, c, 3)] = 100.0;
    }
    let cube = SpectralCube::from_array(data).unwrap();
    let image = health_map(&ndvi(&cube, 2, 3).unwrap());

    let mut seen = Vec::new();
    for pixel in image.lanes(Axis(2)) {
        let px = [pixel[0], pixel[1], pixel[2]];
        let class = HealthClass::ALL
            .iter()
            .find(|c| c.color().to_array() == px)
            .copied()
            .unwrap();
        if !seen.contains(&class) {
            seen.push(class);
        }
    }
    assert_eq!(seen.len(), 4);
}
