//! Layer utilities: grouping contours by height and deriving the
//! layer-ordered dependency graph.

use super::Toolpath;
use crate::scheduling::DependencyGraph;

/// The lowest z value of each contour, used as its layer key.
fn contour_layer_heights(toolpath: &Toolpath) -> Vec<f64> {
    toolpath
        .contours
        .iter()
        .map(|c| {
            c.path
                .iter()
                .map(|p| p.z)
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

fn unique_sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

/// Splits a toolpath into per-layer toolpaths ordered from the lowest layer
/// to the highest, grouping contours that share a base z height.
pub fn split_by_layers(toolpath: &Toolpath) -> Vec<Toolpath> {
    let heights = contour_layer_heights(toolpath);
    unique_sorted(heights.clone())
        .into_iter()
        .map(|z| {
            Toolpath::new(
                toolpath
                    .contours
                    .iter()
                    .zip(&heights)
                    .filter(|(_, h)| **h == z)
                    .map(|(c, _)| c.clone())
                    .collect(),
            )
        })
        .collect()
}

/// Builds the layer-ordered dependency graph over contour indices.
///
/// Every contour depends on all contours of the layer directly below it, so
/// a layer may only start once the previous layer has completed. Contours of
/// the lowest layer are the roots.
pub fn dependency_graph_by_layers(toolpath: &Toolpath) -> DependencyGraph<usize> {
    let heights = contour_layer_heights(toolpath);
    let layers = unique_sorted(heights.clone());

    let mut dg = DependencyGraph::new();
    let Some(first) = layers.first() else {
        return dg;
    };

    let indices_at = |z: f64| -> Vec<usize> {
        heights
            .iter()
            .enumerate()
            .filter(|(_, h)| **h == z)
            .map(|(i, _)| i)
            .collect()
    };

    for node in indices_at(*first) {
        dg.add_node(node);
    }
    for pair in layers.windows(2) {
        let below = indices_at(pair[0]);
        for upper in indices_at(pair[1]) {
            dg.add_node_with_deps(upper, &below)
                .expect("layer ordering cannot introduce cycles");
        }
    }
    dg
}
