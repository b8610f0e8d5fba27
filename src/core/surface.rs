use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A WGS84 position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPos {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPos {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A named point feature on the surface (gate or spot)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPoint {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl NamedPoint {
    pub fn position(&self) -> GeoPos {
        GeoPos::new(self.lat, self.lng)
    }
}

/// A named polyline feature (runway, taxiway or pushback way)
///
/// On the wire each node is a `[lng, lat]` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfacePath {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(
        serialize_with = "serialize_nodes",
        deserialize_with = "deserialize_nodes"
    )]
    pub nodes: Vec<GeoPos>,
}

fn serialize_nodes<S: Serializer>(nodes: &[GeoPos], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(nodes.iter().map(|n| [n.lng, n.lat]))
}

fn deserialize_nodes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<GeoPos>, D::Error> {
    let raw = Vec::<[f64; 2]>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|[lng, lat]| GeoPos::new(lat, lng)).collect())
}

/// Static geometry for one airport/plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDescription {
    #[serde(default)]
    pub airport_name: String,
    pub airport_center: GeoPos,
    #[serde(default)]
    pub gates: Vec<NamedPoint>,
    #[serde(default)]
    pub spots: Vec<NamedPoint>,
    #[serde(default)]
    pub runways: Vec<SurfacePath>,
    #[serde(default)]
    pub taxiways: Vec<SurfacePath>,
    #[serde(default)]
    pub pushback_ways: Vec<SurfacePath>,
}

impl SurfaceDescription {
    /// Number of point features (gates and spots)
    pub fn point_count(&self) -> usize {
        self.gates.len() + self.spots.len()
    }

    /// Number of polyline features (runways, taxiways and pushback ways)
    pub fn path_count(&self) -> usize {
        self.runways.len() + self.taxiways.len() + self.pushback_ways.len()
    }

    pub fn find_gate(&self, name: &str) -> Option<&NamedPoint> {
        self.gates.iter().find(|g| g.name == name)
    }
}
