use anyhow::{Context, Result, bail};
use geojson::{FeatureCollection, GeoJson};
use std::path::Path;

/// Read a whole GeoJSON FeatureCollection into memory.
pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Source: failed to read {:?}", path))?;
    let collection = parse_feature_collection(&text)
        .with_context(|| format!("Source: {:?} is not a usable GeoJSON document", path))?;

    tracing::debug!(
        "Source: {} features read from {:?}",
        collection.features.len(),
        path
    );
    Ok(collection)
}

pub fn parse_feature_collection(text: &str) -> Result<FeatureCollection> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(_) => bail!("expected a FeatureCollection, found a single Feature"),
        GeoJson::Geometry(_) => bail!("expected a FeatureCollection, found a bare Geometry"),
    }
}
