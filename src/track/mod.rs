mod ground_track;
mod partition;
mod segment;

pub use ground_track::GroundTrack;
