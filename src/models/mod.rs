mod record;

pub use record::{Coordinates, GeoLocation, OpenEvent, TrackingRecord};
