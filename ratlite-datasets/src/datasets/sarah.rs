//! CM SAF SARAH surface radiation
//!
//! Satellite based irradiance every 30 minutes on a 0.05° grid.

use ratlite_core::define_dataset_module;

define_dataset_module!(
    SARAH,
    name = "sarah",
    projection = "latlong",
    features = &[
        (
            "influx",
            &[
                "influx_direct",
                "influx_diffuse",
                "solar_altitude",
                "solar_azimuth",
            ],
        ),
        ("temperature", &["temperature"]),
    ],
    dx = 0.05,
    dy = 0.05,
    dt_minutes = 30,
);
