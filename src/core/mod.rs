pub mod dataset;
pub mod state;
pub mod surface;

pub use dataset::{DeliveryMode, SimulationDataset, SourceId};
pub use state::{AircraftRecord, AircraftState, ItineraryTarget, StateSnapshot};
pub use surface::{GeoPos, NamedPoint, SurfaceDescription, SurfacePath};
