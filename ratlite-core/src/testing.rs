//! Fixtures shared by the unit tests of this crate
//!
//! The built-in modules live in `ratlite-datasets`, which this crate cannot
//! depend on. Stand-ins with the same names are registered at runtime instead.

use crate::dataset::{Coordinates, Dataset};
use crate::errors::CutoutError;
use crate::metadata::CutoutMetadata;
use crate::module::{DatasetModule, MODULE_REGISTRY};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use ndarray::{Array1, Array3};

pub(crate) static ERA5: DatasetModule = DatasetModule::new(
    "era5",
    "latlong",
    &[
        ("height", &["height"]),
        ("wind", &["wnd100m", "roughness"]),
        ("temperature", &["temperature"]),
    ],
    0.25,
    0.25,
    60,
);

pub(crate) static SARAH: DatasetModule = DatasetModule::new(
    "sarah",
    "latlong",
    &[("influx", &["influx_direct", "influx_diffuse"])],
    0.05,
    0.05,
    30,
);

/// Register the stand-in modules. Safe to call from every test.
pub(crate) fn register_test_modules() {
    for module in [&ERA5, &SARAH] {
        match MODULE_REGISTRY.register(module) {
            Ok(()) | Err(CutoutError::DuplicateModule(_)) => {}
            Err(e) => panic!("Could not register {}: {}", module.name, e),
        }
    }
}

pub(crate) fn hour(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2013, 1, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// A prepared 3x4 grid over two days of hourly data, with y descending
pub(crate) fn prepared_dataset() -> Dataset {
    let x = Array1::from(vec![0.0, 0.25, 0.5, 0.75]);
    let y = Array1::from(vec![51.0, 50.75, 50.5]);
    let time: Vec<NaiveDateTime> = (0..48).map(|h| hour(1, 0) + Duration::hours(h)).collect();
    let n_time = time.len();

    let metadata = CutoutMetadata {
        module: Some("era5".to_string()),
        prepared_features: vec!["height".to_string()],
        ..CutoutMetadata::default()
    };
    let mut dataset = Dataset::new(Coordinates::new(x, y, time), metadata);
    let height = Array3::from_shape_fn((n_time, 3, 4), |(t, j, i)| (t * 100 + j * 10 + i) as f64);
    dataset
        .insert_variable("height", height)
        .expect("Fixture matches its grid");
    dataset
}
