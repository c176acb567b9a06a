//! Basic demonstration of the invaders simulation.
//!
//! Plays a scripted headless game: the player sweeps the screen and fires
//! whenever the cooldown allows.
//!
//! Run with: RUST_LOG=debug cargo run --example basic_demo

use invaders_sim::{snapshot_to_json_pretty, GameStatus, Key, SimWorld, Snapshot};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    println!("=== Invaders - Simulation Demo ===\n");

    let mut sim = SimWorld::new();
    sim.start();

    println!("Initial state:");
    print_snapshot(&sim.snapshot());

    // 60 seconds of play at 60 frames per second
    for frame in 0..3600u32 {
        // Sweep left and right every four seconds
        let heading_right = (frame / 240) % 2 == 0;
        sim.release_key(if heading_right { Key::Left } else { Key::Right });
        sim.press_key(if heading_right { Key::Right } else { Key::Left });

        // Tap fire: press on even frames, release on odd ones
        if frame % 2 == 0 {
            sim.press_key(Key::Fire);
        } else {
            sim.release_key(Key::Fire);
        }

        sim.step(1.0 / 60.0);

        if (frame + 1) % 600 == 0 {
            println!(
                "--- Frame {} (t={:.1}s) ---",
                sim.current_frame(),
                sim.current_time_ms() / 1000.0
            );
            print_snapshot(&sim.snapshot());
        }

        match sim.status() {
            GameStatus::LevelComplete => {
                println!("\n*** Level {} complete ***\n", sim.level());
                sim.next_level();
            }
            GameStatus::GameOver => {
                println!("\n*** Game over, final score {} ***\n", sim.score());
                break;
            }
            _ => {}
        }
    }

    println!("\n=== Final State (JSON) ===\n");
    match snapshot_to_json_pretty(&sim.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("snapshot serialization failed: {err}"),
    }
}

fn print_snapshot(snapshot: &Snapshot) {
    println!(
        "  status={:?} score={} lives={} level={}",
        snapshot.status, snapshot.score, snapshot.lives, snapshot.level
    );
    if let Some(player) = &snapshot.player {
        println!(
            "  player: x={:.1} shield={} rapid={} multi={}",
            player.x, player.shield, player.rapid_fire, player.multi_shot
        );
    }
    println!(
        "  enemies={} divers={} projectiles={} pickups={} flyer={} particles={}",
        snapshot.enemies.len(),
        snapshot.divers.len(),
        snapshot.projectiles.len(),
        snapshot.pickups.len(),
        snapshot.bonus_flyer.is_some(),
        snapshot.particles.len()
    );
}
