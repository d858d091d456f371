mod cordex;
mod era5;
mod ncep;
mod sarah;

pub use cordex::CORDEX;
pub use era5::ERA5;
pub use ncep::NCEP;
pub use sarah::SARAH;
