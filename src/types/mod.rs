pub mod fuel;
pub mod station;
