//! Two facing robot arms sharing a build area.
//!
//! Run with: `cargo run --example simple_scheduling`

use coprint::collision::CollisionShape;
use coprint::scheduling::{DependencyGraph, Event};
use coprint::{AgentModel, Contour, MultiAgentToolpathPlanner, PlanningOptions, Toolpath};
use nalgebra::Vector3;

fn main() {
    let dims = Vector3::new(3.0, 0.2, 1.0);
    let anchor1 = Vector3::new(-5.0, 0.0, 0.0);
    let anchor2 = Vector3::new(5.0, 0.0, 0.0);

    let agents = vec![
        (
            "agent1".to_string(),
            AgentModel::new(
                [0],
                CollisionShape::anchored_box_arm(dims, anchor1, Vector3::zeros()),
                anchor1,
                Vector3::new(-3.0, 0.0, 0.0),
                1.0,
                2.0,
            ),
        ),
        (
            "agent2".to_string(),
            AgentModel::new(
                [1],
                CollisionShape::anchored_box_arm(dims, anchor2, Vector3::zeros()),
                anchor2,
                Vector3::new(3.0, 0.0, 0.0),
                1.0,
                2.0,
            ),
        ),
    ];

    // two crossing contours in the shared workspace
    let toolpath = Toolpath::new(vec![
        Contour::new(
            vec![Vector3::new(0.0, 2.0, 0.0), Vector3::new(0.0, -2.0, 0.0)],
            0,
        ),
        Contour::new(
            vec![Vector3::new(2.0, 0.0, 0.0), Vector3::new(-2.0, 0.0, 0.0)],
            1,
        ),
    ]);
    let mut dg = DependencyGraph::new();
    dg.add_node(0usize);
    dg.add_node(1);

    let options = PlanningOptions {
        retract_height: 2.0,
        collision_offset: 1.0,
        collision_gap_threshold: 0.05,
    };

    let planner = MultiAgentToolpathPlanner::new(agents);
    let schedule = planner
        .plan(&toolpath, &mut dg, &options)
        .expect("both tools are covered");

    println!(
        "planned {} events over {} agents, makespan {:.2}s",
        schedule.n_events(),
        schedule.n_agents(),
        schedule.duration()
    );
    for agent in schedule.agents() {
        println!("{agent}:");
        for event in schedule.get(agent).unwrap().events() {
            let kind = match event {
                Event::Contour(_) => "contour",
                Event::Move(_) => "move",
            };
            println!(
                "  [{:7.2} -> {:7.2}] {kind:8} to {:?}",
                event.start(),
                event.end(),
                event.terminal_position()
            );
        }
    }
}
