//! NDVI pipeline expressed as Earth Engine graphs
//!
//! Nothing here touches pixels. Each function returns the node that asks the
//! platform to do the work: load Landsat 8, filter by area, date and cloud
//! cover, derive NDVI per scene, average over a period, reduce over a region.

use super::expression::{ExpressionBuilder, ValueNode};
use crate::contract::{BoundingBox, DateWindow};
use serde_json::{json, Value};

/// Band holding the normalized difference
pub const NDVI_BAND: &str = "NDVI";

/// Landsat 8 OLI near-infrared and red bands
const NIR_BAND: &str = "B5";
const RED_BAND: &str = "B4";

const MAPPING_VAR: &str = "_MAPPING_VAR_0_0";

/// Which scenes to pull
#[derive(Debug, Clone, Copy)]
pub struct SceneQuery<'a> {
    pub collection: &'a str,
    pub max_cloud_cover: f64,
}

/// Rectangle over `[west, south, east, north]`
pub fn rectangle(bounds: &BoundingBox) -> ValueNode {
    ValueNode::invoke(
        "GeometryConstructors.Rectangle",
        [("coordinates", ValueNode::constant(json!(bounds.as_rectangle())))],
    )
}

fn date(day: chrono::NaiveDate) -> ValueNode {
    ValueNode::invoke(
        "Date",
        [("value", ValueNode::constant(day.format("%Y-%m-%d").to_string()))],
    )
}

fn filter(collection: ValueNode, predicate: ValueNode) -> ValueNode {
    ValueNode::invoke(
        "Collection.filter",
        [("collection", collection), ("filter", predicate)],
    )
}

/// Keep images whose footprint intersects `area`
pub fn filter_bounds(collection: ValueNode, area: &ValueNode) -> ValueNode {
    filter(
        collection,
        ValueNode::invoke(
            "Filter.intersects",
            [
                ("leftField", ValueNode::constant(".all")),
                ("rightValue", area.clone()),
            ],
        ),
    )
}

/// Keep images acquired in `[window.start, window.end)`
pub fn filter_date(collection: ValueNode, window: &DateWindow) -> ValueNode {
    filter(
        collection,
        ValueNode::invoke(
            "Filter.dateRangeContains",
            [
                (
                    "leftValue",
                    ValueNode::invoke(
                        "DateRange",
                        [("start", date(window.start)), ("end", date(window.end))],
                    ),
                ),
                ("rightField", ValueNode::constant("system:time_start")),
            ],
        ),
    )
}

/// Keep images with `CLOUD_COVER < max_cloud_cover`
pub fn filter_cloud_cover(collection: ValueNode, max_cloud_cover: f64) -> ValueNode {
    filter(
        collection,
        ValueNode::invoke(
            "Filter.lessThan",
            [
                ("leftField", ValueNode::constant("CLOUD_COVER")),
                ("rightValue", ValueNode::constant(max_cloud_cover)),
            ],
        ),
    )
}

/// Filtered scene collection with an extra `NDVI` band on every image.
///
/// The returned node is bound, so it can be shared by several periods.
pub fn ndvi_collection(
    builder: &mut ExpressionBuilder,
    query: SceneQuery<'_>,
    area: &ValueNode,
    window: &DateWindow,
) -> ValueNode {
    let scenes = ValueNode::invoke(
        "ImageCollection.load",
        [("id", ValueNode::constant(query.collection))],
    );
    let scenes = filter_cloud_cover(
        filter_date(filter_bounds(scenes, area), window),
        query.max_cloud_cover,
    );

    let add_ndvi = builder.function(MAPPING_VAR, |image| {
        let ndvi = ValueNode::invoke(
            "Image.normalizedDifference",
            [
                ("input", image.clone()),
                ("bandNames", ValueNode::constant(json!([NIR_BAND, RED_BAND]))),
            ],
        );
        let ndvi = ValueNode::invoke(
            "Image.rename",
            [
                ("input", ndvi),
                ("names", ValueNode::constant(json!([NDVI_BAND]))),
            ],
        );
        ValueNode::invoke("Image.addBands", [("dstImg", image), ("srcImg", ndvi)])
    });

    builder.bind(ValueNode::invoke(
        "Collection.map",
        [("collection", scenes), ("baseAlgorithm", add_ndvi)],
    ))
}

/// Per-pixel mean NDVI over the scenes acquired inside `window`
pub fn period_mean(
    builder: &mut ExpressionBuilder,
    ndvi_collection: &ValueNode,
    window: &DateWindow,
) -> ValueNode {
    let select_ndvi = builder.function(MAPPING_VAR, |image| {
        ValueNode::invoke(
            "Image.select",
            [
                ("input", image),
                ("bandSelectors", ValueNode::constant(json!([NDVI_BAND]))),
            ],
        )
    });
    let selected = ValueNode::invoke(
        "Collection.map",
        [
            ("collection", filter_date(ndvi_collection.clone(), window)),
            ("baseAlgorithm", select_ndvi),
        ],
    );
    builder.bind(ValueNode::invoke("reduce.mean", [("collection", selected)]))
}

fn reduce_region(
    image: ValueNode,
    reducer: ValueNode,
    area: &ValueNode,
    scale_m: u32,
    max_pixels: u64,
) -> ValueNode {
    ValueNode::invoke(
        "Image.reduceRegion",
        [
            ("image", image),
            ("reducer", reducer),
            ("geometry", area.clone()),
            ("scale", ValueNode::constant(scale_m)),
            ("maxPixels", ValueNode::constant(max_pixels)),
        ],
    )
}

/// Mean NDVI over `area`; evaluates to a number, or `null` when no scene covered it.
///
/// A mean over an empty collection has no bands, so the reduction comes back
/// as `{}` and the `NDVI` key is looked up only when present.
pub fn region_mean(
    builder: &mut ExpressionBuilder,
    image: ValueNode,
    area: &ValueNode,
    scale_m: u32,
    max_pixels: u64,
) -> ValueNode {
    let reduced = builder.bind(reduce_region(
        image,
        ValueNode::call("Reducer.mean"),
        area,
        scale_m,
        max_pixels,
    ));
    let lookup = |function_name: &str| {
        ValueNode::invoke(
            function_name,
            [
                ("dictionary", reduced.clone()),
                ("key", ValueNode::constant(NDVI_BAND)),
            ],
        )
    };
    ValueNode::invoke(
        "Algorithms.If",
        [
            ("condition", lookup("Dictionary.contains")),
            ("trueCase", lookup("Dictionary.get")),
            ("falseCase", ValueNode::constant(Value::Null)),
        ],
    )
}

/// Keys produced by [`region_statistics`]
pub const MEAN_KEY: &str = "NDVI_mean";
pub const STD_DEV_KEY: &str = "NDVI_stdDev";

/// Mean and standard deviation over `area` as `{NDVI_mean, NDVI_stdDev}`
pub fn region_statistics(
    image: ValueNode,
    area: &ValueNode,
    scale_m: u32,
    max_pixels: u64,
) -> ValueNode {
    let reducer = ValueNode::invoke(
        "Reducer.combine",
        [
            ("reducer1", ValueNode::call("Reducer.mean")),
            ("reducer2", ValueNode::call("Reducer.stdDev")),
            ("sharedInputs", ValueNode::constant(true)),
        ],
    );
    reduce_region(image, reducer, area, scale_m, max_pixels)
}

/// `later - earlier`, pixel by pixel
pub fn difference(later: ValueNode, earlier: ValueNode) -> ValueNode {
    ValueNode::invoke("Image.subtract", [("image1", later), ("image2", earlier)])
}

/// Geodesic area of `geometry` in square metres
pub fn area_m2(geometry: &ValueNode) -> ValueNode {
    ValueNode::invoke(
        "Geometry.area",
        [
            ("geometry", geometry.clone()),
            ("maxError", ValueNode::constant(1)),
        ],
    )
}
