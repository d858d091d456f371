//! EURO-CORDEX regional climate projections
//!
//! Three-hourly data on a rotated pole grid of 0.44°.

use ratlite_core::define_dataset_module;

define_dataset_module!(
    CORDEX,
    name = "cordex",
    projection = "rotated_latlong",
    features = &[
        ("height", &["height"]),
        ("wind", &["wnd10m"]),
        ("influx", &["influx", "outflux"]),
        ("temperature", &["temperature"]),
        ("runoff", &["runoff"]),
    ],
    dx = 0.44,
    dy = 0.44,
    dt_minutes = 180,
);
