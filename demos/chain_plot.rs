use std::error::Error;

use gnuplot::*;
use tracing_subscriber::EnvFilter;
use trapezoid_motion::{ProfileChain, ProfileExecutor, SegmentLimits, Waypoint};

fn main() -> Result<(), Box<dyn Error>> {
    // RUST_LOG=trapezoid_motion=debug shows per-segment solutions
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // -----------------------
    // 1. Set up waypoints
    // -----------------------
    // Positions only, apart from a pinned velocity at t = 2s. The chain
    // synthesizes the remaining interior velocities.
    let waypoints = [
        Waypoint::new(0.0, 0.0),
        Waypoint::new(1.0, 10.0),
        Waypoint::new(2.0, 5.0).with_velocity(-2.0),
        Waypoint::new(3.0, 20.0),
        Waypoint::new(4.5, 20.0),
    ];

    // One limits entry per segment. The third segment gets smoother,
    // fully rounded ramps; the others scale down to 30% of the limits when
    // the waypoint timing leaves slack.
    let base = SegmentLimits::new(120.0, 80.0, 30.0)
        .with_rounding(0.5, 0.5)
        .with_limit_ratio(0.3);
    let limits = vec![base, base, base.with_rounding(1.0, 1.0), base];

    // -------------------------
    // 2. Plan the chain
    // -------------------------
    let mut chain = ProfileChain::from_waypoints(&waypoints, limits)?;
    let total_time = chain.generate()?;

    for (index, segment) in chain.segments().iter().enumerate() {
        println!(
            "segment {index}: v_max = {:8.3}, accel = {:7.2}, decel = {:7.2}",
            segment.v_max()?,
            segment.accel()?,
            segment.decel()?
        );
    }

    // --------------------------------
    // 3. Sample at a fixed rate
    // --------------------------------
    let sampling_rate = 1000;
    let mut time_axis = Vec::new();
    let mut positions = Vec::new();
    let mut velocities = Vec::new();
    let mut accelerations = Vec::new();

    for sample in ProfileExecutor::new(&chain, sampling_rate)? {
        let sample = sample?;
        time_axis.push(sample.time);
        positions.push(sample.position);
        velocities.push(sample.velocity);
        // scaled down to share the axis with position and velocity
        accelerations.push(sample.acceleration / 10.0);
    }

    let waypoint_times: Vec<f64> = waypoints.iter().map(|w| w.time).collect();
    let waypoint_positions: Vec<f64> = waypoints.iter().map(|w| w.position).collect();

    // --------------
    // 4. Plot data
    // --------------
    let mut fg = Figure::new();
    {
        let axes = fg.axes2d();
        axes.set_title("Position, Velocity, Acceleration/10 vs. Time", &[]);
        axes.set_x_label("Time (s)", &[]);
        axes.set_y_label("Position derivatives", &[]);
        axes.lines(&time_axis, &positions, &[Color("blue"), Caption("Position")]);
        axes.lines(&time_axis, &velocities, &[Color("red"), Caption("Velocity")]);
        axes.lines(&time_axis, &accelerations, &[Color("green"), Caption("Acceleration / 10")]);
        axes.points(
            &waypoint_times,
            &waypoint_positions,
            &[Color("black"), PointSymbol('O'), Caption("Waypoints")],
        );
    }

    fg.show().map_err(|e| format!("Failed to display plot: {e}"))?;

    println!("Plot generated. Total motion time: {:.3} seconds.", total_time);
    Ok(())
}
