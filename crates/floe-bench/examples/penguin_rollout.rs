//! End-to-end lockstep rollout example.
//!
//! Demonstrates: build config → LockstepEnv → reset → step with scripted
//! actions → read rewards and observations → reset → repeat.

use floe_bench::{reference_profile, scripted_action};
use floe_engine::LockstepEnv;
use floe_penguin::VECTOR_OBSERVATIONS;

fn main() {
    println!("=== Floe Penguin Rollout Example ===\n");

    let mut env = LockstepEnv::new(reference_profile(42)).unwrap();
    println!("observation size: {}", env.observation_size());

    for episode in 0..3 {
        env.reset().unwrap();
        println!("\nEpisode {}", episode + 1);
        let mut step = 0usize;
        let mut total = 0.0f32;
        loop {
            let result = env.step(scripted_action(step)).unwrap();
            total += result.reward;
            step += 1;

            if step % 100 == 0 || result.terminated || result.truncated {
                let obs = result.observation;
                let hits = obs[VECTOR_OBSERVATIONS..]
                    .chunks_exact(5)
                    .filter(|ray| ray[3] == 0.0)
                    .count();
                println!(
                    "  step {:>4}: reward={:>8.4}, full={}, baby_dist={:>6.2}, ray_hits={}, fish_left={}, time={:>5}μs",
                    step,
                    total,
                    obs[0] == 1.0,
                    obs[1],
                    hits,
                    result.metrics.fish_remaining,
                    result.metrics.total_us,
                );
            }
            if result.terminated || result.truncated {
                println!(
                    "  finished: terminated={}, truncated={}",
                    result.terminated, result.truncated
                );
                break;
            }
        }
    }

    println!("\n=== Done ===");
}
