//! Layer-by-layer planning of a stacked toolpath with the depth-based
//! wrappers.
//!
//! Run with: `cargo run --example batched_planning`

use coprint::collision::CollisionShape;
use coprint::planner::DepthBasedSequentialPlanner;
use coprint::toolpath::dependency_graph_by_layers;
use coprint::{AgentModel, Contour, PlanningOptions, Toolpath};
use nalgebra::Vector3;

fn square(cx: f64, cy: f64, z: f64, half: f64, tool: i64) -> Contour {
    Contour::new(
        vec![
            Vector3::new(cx - half, cy - half, z),
            Vector3::new(cx + half, cy - half, z),
            Vector3::new(cx + half, cy + half, z),
            Vector3::new(cx - half, cy + half, z),
            Vector3::new(cx - half, cy - half, z),
        ],
        tool,
    )
}

fn main() {
    let anchor = Vector3::new(-8.0, 0.0, 0.0);
    let agents = vec![(
        "printer".to_string(),
        AgentModel::new(
            [0],
            CollisionShape::anchored_box_arm(Vector3::new(4.0, 0.3, 1.0), anchor, Vector3::zeros()),
            anchor,
            Vector3::new(-5.0, 0.0, 0.0),
            2.0,
            4.0,
        ),
    )];

    // three stacked layers of two squares each
    let mut contours = Vec::new();
    for layer in 0..3 {
        let z = layer as f64 * 0.5;
        contours.push(square(-1.5, 0.0, z, 1.0, 0));
        contours.push(square(1.5, 0.0, z, 1.0, 0));
    }
    let toolpath = Toolpath::new(contours);
    let dg = dependency_graph_by_layers(&toolpath);

    let options = PlanningOptions {
        retract_height: 1.0,
        collision_offset: 0.5,
        collision_gap_threshold: 0.1,
    };

    let planner = DepthBasedSequentialPlanner::new(agents);
    let schedule = planner
        .plan(&toolpath, &dg, &options)
        .expect("single-tool toolpath is coverable");

    println!(
        "{} layers planned: {} events, makespan {:.2}s",
        3,
        schedule.n_events(),
        schedule.duration()
    );
}
