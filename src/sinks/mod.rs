pub mod geojson;

pub use self::geojson::GeoJsonSink;
