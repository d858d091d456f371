//! NCEP Climate Forecast System Reanalysis

use ratlite_core::define_dataset_module;

define_dataset_module!(
    NCEP,
    name = "ncep",
    projection = "latlong",
    features = &[
        ("height", &["height"]),
        ("wind", &["wnd10m", "roughness"]),
        ("influx", &["influx"]),
        ("temperature", &["temperature", "soil temperature"]),
        ("runoff", &["runoff"]),
    ],
    dx = 0.5,
    dy = 0.5,
    dt_minutes = 60,
);
