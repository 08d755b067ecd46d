use std::time::Instant;

use crate::background::envelope::EnvelopePath;
use crate::simulation::orbiter::Orbiter;
use crate::simulation::settings::OrbiterSettings;
use crate::simulation::states::{Attractor, AttractorId, AttractorKind, NVec2, System};

pub fn bench_envelope() {
    // Different cluster sizes to test
    let ns = [2, 3, 5, 9, 17, 33];
    let rebuilds = 1000;

    for n in ns {
        // Deterministic member positions, no rand needed
        let mut members = Vec::with_capacity(n);
        for i in 0..n {
            let i_f = i as f64;
            members.push(NVec2::new(
                (i_f * 0.37).sin() * 12.0,
                (i_f * 0.13).cos() * 12.0,
            ));
        }

        // Warm up
        let path = EnvelopePath::build(&members, 2.0, 1.0);
        let samples = path.points().len();

        let t0 = Instant::now();
        for _ in 0..rebuilds {
            let _ = EnvelopePath::build(&members, 2.0, 1.0);
        }
        let per_build = t0.elapsed().as_secs_f64() / rebuilds as f64;

        println!(
            "members = {n:3}, samples = {samples:3}, build = {:9.7} s",
            per_build
        );
    }
}

pub fn bench_orbiter_step() {
    // Different attractor counts to test
    let ns = [1, 2, 4, 8, 16];
    let steps = 100_000;
    let dt = 0.02;

    for n in ns {
        let mut system = System::new();
        for i in 0..n {
            let i_f = i as f64;
            system.spawn(Attractor {
                kind: AttractorKind::Planet,
                position: NVec2::new((i_f * 0.37).sin() * 30.0, (i_f * 0.13).cos() * 30.0),
                velocity: NVec2::zeros(),
                gravity: 25.0,
                orbit_radius: 5.0,
                tangential: 3.0,
                radial_damping: 0.75,
                body_radius: 0.5,
                active: true,
                parent: None,
            });
        }

        // Orbiter near the first body, all bodies influencing
        let first = system.attractors[0].position;
        let mut orbiter = Orbiter::new(first + NVec2::new(5.0, 0.0), OrbiterSettings::default());
        for i in 0..n {
            orbiter.add_gravity_source(&system, AttractorId(i));
        }

        // Warm up
        orbiter.fixed_step(&system, dt);

        let t0 = Instant::now();
        for _ in 0..steps {
            orbiter.fixed_step(&system, dt);
        }
        let per_step = t0.elapsed().as_secs_f64() / steps as f64;

        println!("sources = {n:3}, step = {:9.7} s", per_step);
    }
}
