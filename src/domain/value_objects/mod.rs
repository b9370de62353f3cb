pub mod bearing;
pub mod wave_height;
pub mod wind_speed;
