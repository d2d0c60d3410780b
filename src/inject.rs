//! Property injection between feature collections.
//!
//! Matching is two-phase: a geohash dictionary over the source narrows each
//! target to a short candidate list, then exact predicates pick the first
//! candidate that matches.

use crate::compute::geohash::{FeatureIndex, GeoHashDictionary, geohash_encode, write_geohash};
use crate::error::{GeoBlocksError, Result};
use crate::feature::{ensure_coord_arr, to_geo};
use crate::property::{Stat, ensure_prop_object, get_prop_value, props_mut, set_prop_value};
use crate::spatial::{
    DistanceMetric, contains, distance_between, equals, overlaps, point_in_polygon,
    point_on_geometry, within,
};
use crate::types::Config;
use geo::{Geometry, Point};
use geojson::{Feature, FeatureCollection};
use serde_json::Value;

/// Outcome of an injection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectionReport {
    /// Targets that received values from a matching source
    pub injected: usize,
    /// Targets that received the fill value
    pub unmatched: usize,
}

fn matches_source(target: &Geometry, source: &Geometry) -> bool {
    if contains(target, source) || within(target, source) {
        return true;
    }
    match target {
        Geometry::Polygon(polygon) => {
            point_on_geometry(source).is_some_and(|p| point_in_polygon(polygon, &p))
        }
        _ => equals(target, source),
    }
}

fn first_match(
    target: &Geometry,
    candidates: &[FeatureIndex],
    sources: &[Geometry],
) -> Option<FeatureIndex> {
    candidates
        .iter()
        .copied()
        .find(|idx| sources.get(idx.get()).is_some_and(|s| matches_source(target, s)))
}

fn check_rename(src_props: &[&str], rename: &[&str]) -> Result<()> {
    if !rename.is_empty() && rename.len() != src_props.len() {
        return Err(GeoBlocksError::DimensionMismatch {
            left: src_props.len(),
            right: rename.len(),
        });
    }
    Ok(())
}

fn values_of(source: &Feature, src_props: &[&str]) -> Vec<Value> {
    let props = source.properties.as_ref();
    src_props
        .iter()
        .map(|name| {
            props
                .and_then(|p| p.get(*name))
                .cloned()
                .unwrap_or(Value::Null)
        })
        .collect()
}

fn write_values(target: &mut Feature, names: &[&str], values: Vec<Value>) {
    let props = props_mut(target);
    for (name, value) in names.iter().zip(values) {
        props.insert(name.to_string(), value);
    }
}

/// Copy properties from matching source features onto target features.
///
/// Every target is geohash-tagged (`geoHash`, `geoHashPrecision`) and then
/// receives, for each name in `src_props`, the value of the first matching
/// source feature under the matching name in `rename` (or the same name when
/// `rename` is empty). A matched source lacking a property yields `null`; a
/// target without any match gets `config.fill_value` for every name.
///
/// A target matches a source when it contains or lies within it, when a
/// polygon target holds a point of the source, or when a non-polygon target
/// equals it.
///
/// Every target is resolved before any is written, so on error the target
/// collection is left unchanged.
pub fn feat_feat_injection(
    source: &FeatureCollection,
    target: &mut FeatureCollection,
    src_props: &[&str],
    rename: &[&str],
    config: &Config,
) -> Result<InjectionReport> {
    check_rename(src_props, rename)?;
    let dictionary = GeoHashDictionary::build(source, config.geohash_precision)?;
    inject_with_dictionary(&dictionary, source, target, src_props, rename, config)
}

/// [`feat_feat_injection`] with a dictionary built earlier over `source`.
///
/// Fails with [`GeoBlocksError::StaleDictionary`] when `source` changed
/// length since the dictionary was built.
pub fn inject_with_dictionary(
    dictionary: &GeoHashDictionary,
    source: &FeatureCollection,
    target: &mut FeatureCollection,
    src_props: &[&str],
    rename: &[&str],
    config: &Config,
) -> Result<InjectionReport> {
    check_rename(src_props, rename)?;
    dictionary.ensure_fresh(source)?;
    let out_names = if rename.is_empty() { src_props } else { rename };
    let sources = source
        .features
        .iter()
        .map(to_geo)
        .collect::<Result<Vec<_>>>()?;

    // Resolve every target before writing so a failure leaves them untouched
    let mut report = InjectionReport::default();
    let mut plan = Vec::with_capacity(target.features.len());
    for feature in &target.features {
        let hash = geohash_encode(feature, config.geohash_precision)?;
        let candidates = dictionary.candidates(&hash.hash);
        let geometry = to_geo(feature)?;

        let values = match first_match(&geometry, &candidates, &sources) {
            Some(idx) => {
                report.injected += 1;
                values_of(&source.features[idx.get()], src_props)
            }
            None => {
                report.unmatched += 1;
                log::debug!(
                    "No source match for target in cell '{}' among {} candidates",
                    hash,
                    candidates.len()
                );
                vec![config.fill_value.clone(); out_names.len()]
            }
        };
        plan.push((hash, values));
    }

    for (feature, (hash, values)) in target.features.iter_mut().zip(plan) {
        write_geohash(feature, &hash);
        write_values(feature, out_names, values);
    }

    if report.unmatched > 0 {
        log::warn!(
            "{} of {} targets had no matching source and were filled",
            report.unmatched,
            target.features.len()
        );
    }
    Ok(report)
}

/// Copy properties from one feature onto another, renaming as given.
pub fn property_injection(
    source: &Feature,
    target: &mut Feature,
    src_props: &[&str],
    rename: &[&str],
) -> Result<()> {
    check_rename(src_props, rename)?;
    let out_names = if rename.is_empty() { src_props } else { rename };
    write_values(target, out_names, values_of(source, src_props));
    Ok(())
}

/// Label of a feature used as a path segment, read from a property.
fn label_of(feature: &Feature, label_prop: &str) -> Result<String> {
    match get_prop_value(feature, label_prop)? {
        Some(Value::String(label)) => Ok(label.clone()),
        Some(value) if !value.is_null() => Ok(value.to_string()),
        _ => Err(GeoBlocksError::PropertyPath(format!(
            "Feature has no label property '{}'",
            label_prop
        ))),
    }
}

fn write_distance_stats(
    feature: &mut Feature,
    parent: &str,
    stats: &[Stat],
    values: &[Option<f64>],
) -> Result<()> {
    ensure_prop_object(feature, parent)?;
    for (stat, value) in stats.iter().zip(values) {
        let path = format!("{}.{}", parent, stat.key());
        set_prop_value(feature, &path, value.map_or(Value::Null, Value::from))?;
    }
    Ok(())
}

/// Record vertex-to-vertex distances between a feature and every feature of
/// a collection, on both sides.
///
/// For each pair the distances between all vertices of `feature` and all
/// vertices of the other feature are aggregated with every entry of `stats`.
/// `feature` receives them under `<inj_name>.<other label>.<stat>` and the
/// other feature under `<inj_name>.<feature label>.<stat>`, where labels are
/// read from `label_prop` on `feature` and `coll_label_prop` on the
/// collection. Returns the number of pairs written.
///
/// Nothing is written when a label or geometry fails to resolve.
pub fn distance_injection(
    feature: &mut Feature,
    label_prop: &str,
    collection: &mut FeatureCollection,
    coll_label_prop: &str,
    inj_name: &str,
    stats: &[Stat],
    metric: DistanceMetric,
) -> Result<usize> {
    if stats.is_empty() {
        return Err(GeoBlocksError::InvalidInput(
            "Distance injection needs at least one statistic".to_string(),
        ));
    }
    let own_label = label_of(feature, label_prop)?;
    let own_coords: Vec<Point> = ensure_coord_arr(feature)?.into_iter().map(Point::from).collect();

    let mut plan = Vec::with_capacity(collection.features.len());
    for other in &collection.features {
        let other_label = label_of(other, coll_label_prop)?;
        let other_coords = ensure_coord_arr(other)?;
        let distances: Vec<f64> = own_coords
            .iter()
            .flat_map(|a| {
                other_coords
                    .iter()
                    .map(move |b| distance_between(a, &Point::from(*b), metric))
            })
            .collect();
        let values: Vec<Option<f64>> = stats.iter().map(|stat| stat.of(&distances)).collect();
        plan.push((other_label, values));
    }

    for (other, (other_label, values)) in collection.features.iter_mut().zip(&plan) {
        write_distance_stats(
            feature,
            &format!("{}.{}", inj_name, other_label),
            stats,
            values,
        )?;
        write_distance_stats(other, &format!("{}.{}", inj_name, own_label), stats, values)?;
    }
    log::debug!(
        "Injected {} distance statistics for {} pairs under '{}'",
        stats.len(),
        plan.len(),
        inj_name
    );
    Ok(plan.len())
}

/// Which side of a feature [`features_by_overlap`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    Outside,
}

/// Features of a collection that lie inside, or outside, a feature.
///
/// A collection feature is inside when it overlaps `feature`, is contained
/// by it or lies within it.
pub fn features_by_overlap(
    feature: &Feature,
    collection: &FeatureCollection,
    side: Containment,
) -> Result<Vec<Feature>> {
    let area = to_geo(feature)?;
    let mut kept = Vec::new();
    for other in &collection.features {
        let geometry = to_geo(other)?;
        let inside = overlaps(&area, &geometry)
            || contains(&area, &geometry)
            || within(&geometry, &area);
        if inside == (side == Containment::Inside) {
            kept.push(other.clone());
        }
    }
    Ok(kept)
}
