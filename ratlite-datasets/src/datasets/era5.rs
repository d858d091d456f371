//! ECMWF ERA5 reanalysis on single levels
//!
//! Hourly data on a regular 0.25° grid. This is the module used when a cutout
//! names none.

use ratlite_core::define_dataset_module;

define_dataset_module!(
    ERA5,
    name = "era5",
    projection = "latlong",
    features = &[
        ("height", &["height"]),
        ("wind", &["wnd100m", "wnd_azimuth", "roughness"]),
        (
            "influx",
            &[
                "influx_toa",
                "influx_direct",
                "influx_diffuse",
                "albedo",
                "solar_altitude",
                "solar_azimuth",
            ],
        ),
        (
            "temperature",
            &["temperature", "soil temperature", "dewpoint temperature"],
        ),
        ("runoff", &["runoff"]),
    ],
    dx = 0.25,
    dy = 0.25,
    dt_minutes = 60,
);
