use collision_core::{
    CollisionFilter, CollisionObject, CollisionPair, CollisionWorld, ContactEventKind, ConvexShape,
    Quat, RigidBodyAdapter, StepError, SweepAndPrune, Vec3,
};

const DT: f32 = 1.0 / 60.0;

#[derive(Clone)]
struct TestBody {
    key: u32,
    shape: ConvexShape,
    position: Vec3,
    velocity: Vec3,
    inverse_mass: f32,
    restitution: f32,
    friction: f32,
    filter: CollisionFilter,
}

impl TestBody {
    fn sphere(key: u32, position: Vec3, radius: f32) -> Self {
        Self {
            key,
            shape: ConvexShape::Sphere { radius },
            position,
            velocity: Vec3::ZERO,
            inverse_mass: 1.0,
            restitution: 0.0,
            friction: 0.0,
            filter: CollisionFilter::default(),
        }
    }

    fn static_box(key: u32, position: Vec3, half_extents: Vec3) -> Self {
        Self {
            key,
            shape: ConvexShape::Box { half_extents },
            position,
            velocity: Vec3::ZERO,
            inverse_mass: 0.0,
            restitution: 0.0,
            friction: 0.0,
            filter: CollisionFilter::default(),
        }
    }

    fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }
}

impl CollisionObject for TestBody {
    type Key = u32;

    fn key(&self) -> u32 {
        self.key
    }

    fn shape(&self) -> &ConvexShape {
        &self.shape
    }

    fn rotation(&self) -> Quat {
        Quat::IDENTITY
    }

    fn filter(&self) -> CollisionFilter {
        self.filter
    }
}

impl RigidBodyAdapter for TestBody {
    fn position(&self) -> Vec3 {
        self.position
    }
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
    fn velocity(&self) -> Vec3 {
        self.velocity
    }
    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }
    fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }
    fn restitution(&self) -> f32 {
        self.restitution
    }
    fn friction(&self) -> f32 {
        self.friction
    }
}

fn zero_gravity_world() -> CollisionWorld<u32> {
    let mut world = CollisionWorld::new();
    world.set_gravity(Vec3::ZERO);
    world
}

#[test]
fn negative_or_nan_timestep_is_rejected() {
    let mut world = zero_gravity_world();
    let mut bodies = [TestBody::sphere(0, Vec3::ZERO, 1.0)];

    assert!(matches!(
        world.step(&mut bodies, -0.01),
        Err(StepError::InvalidTimestep(_))
    ));
    assert!(matches!(
        world.step(&mut bodies, f32::NAN),
        Err(StepError::InvalidTimestep(_))
    ));
}

#[test]
fn duplicate_keys_are_rejected() {
    let mut world = zero_gravity_world();
    let mut bodies = [
        TestBody::sphere(7, Vec3::ZERO, 1.0),
        TestBody::sphere(7, Vec3::new(3.0, 0.0, 0.0), 1.0),
    ];
    assert!(matches!(
        world.step(&mut bodies, DT),
        Err(StepError::DuplicateBodyKey)
    ));
}

#[test]
fn empty_world_steps_to_no_events() {
    let mut world = zero_gravity_world();
    let mut bodies: Vec<TestBody> = Vec::new();
    let events = world.step(&mut bodies, DT).unwrap();
    assert!(events.is_empty());
}

#[test]
fn zero_timestep_detects_without_moving_anything() {
    let mut world = zero_gravity_world();
    let mut bodies = [
        TestBody::sphere(0, Vec3::ZERO, 1.0).with_velocity(Vec3::new(5.0, 0.0, 0.0)),
        TestBody::sphere(1, Vec3::new(1.5, 0.0, 0.0), 1.0),
    ];

    let events = world.step(&mut bodies, 0.0).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ContactEventKind::Enter);
    assert!(events[0].manifold.is_some());

    // Nothing integrated, nothing solved.
    assert_eq!(bodies[0].position, Vec3::ZERO);
    assert_eq!(bodies[0].velocity, Vec3::new(5.0, 0.0, 0.0));
    assert_eq!(bodies[1].velocity, Vec3::ZERO);
}

#[test]
fn closing_spheres_collide_and_separate() {
    let mut world = zero_gravity_world();
    let mut bodies = [
        TestBody::sphere(0, Vec3::new(-0.7, 0.0, 0.0), 1.0).with_velocity(Vec3::new(1.0, 0.0, 0.0)),
        TestBody::sphere(1, Vec3::new(0.7, 0.0, 0.0), 1.0).with_velocity(Vec3::new(-1.0, 0.0, 0.0)),
    ];

    let events = world.step(&mut bodies, DT).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ContactEventKind::Enter);

    // Inelastic: approach speed is gone after the solve.
    let separating = (bodies[1].velocity - bodies[0].velocity).x;
    assert!(separating >= -1e-3, "still approaching: {separating}");
}

#[test]
fn enter_stay_exit_lifecycle() {
    let mut world = zero_gravity_world();
    world.set_retention_frames(0);

    let mut bodies = [
        TestBody::sphere(0, Vec3::ZERO, 1.0),
        TestBody::sphere(1, Vec3::new(1.5, 0.0, 0.0), 1.0),
    ];

    let events = world.step(&mut bodies, DT).unwrap();
    assert_eq!(events[0].kind, ContactEventKind::Enter);

    let events = world.step(&mut bodies, DT).unwrap();
    assert_eq!(events[0].kind, ContactEventKind::Stay);

    // Teleport apart; next step reports the exit, carrying the manifold
    // the pair last had so listeners know where contact broke.
    bodies[1].position = Vec3::new(10.0, 0.0, 0.0);
    let events = world.step(&mut bodies, DT).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ContactEventKind::Exit);
    let last = events[0].manifold.as_ref().expect("exit reports last manifold");
    assert!(last.normal.x.abs() > 0.9, "last normal {:?}", last.normal);
    assert!(!last.points.is_empty());
}

#[test]
fn sensors_report_events_but_do_not_resolve() {
    let mut world = zero_gravity_world();
    let sensor_filter = CollisionFilter::sensor(1, u32::MAX);

    let mut bodies = [
        TestBody::sphere(0, Vec3::ZERO, 1.0)
            .with_velocity(Vec3::new(1.0, 0.0, 0.0)),
        TestBody::sphere(1, Vec3::new(1.2, 0.0, 0.0), 1.0).with_filter(sensor_filter),
    ];

    let events = world.step(&mut bodies, DT).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ContactEventKind::Enter);

    // No impulse applied through the sensor.
    assert_eq!(bodies[0].velocity, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(bodies[1].velocity, Vec3::ZERO);
}

#[test]
fn masked_out_pairs_are_invisible() {
    let mut world = zero_gravity_world();
    let mut bodies = [
        TestBody::sphere(0, Vec3::ZERO, 1.0).with_filter(CollisionFilter::new(0b01, 0b01)),
        TestBody::sphere(1, Vec3::new(1.0, 0.0, 0.0), 1.0)
            .with_filter(CollisionFilter::new(0b10, 0b10)),
    ];

    let events = world.step(&mut bodies, DT).unwrap();
    assert!(events.is_empty());
    assert!(world.manifolds().next().is_none());
}

#[test]
fn gravity_accelerates_dynamic_bodies_only() {
    let mut world = CollisionWorld::new();
    let mut bodies = [
        TestBody::sphere(0, Vec3::new(0.0, 100.0, 0.0), 1.0),
        TestBody::static_box(1, Vec3::ZERO, Vec3::ONE),
    ];

    world.step(&mut bodies, DT).unwrap();
    assert!(bodies[0].velocity.y < 0.0);
    assert!(bodies[0].position.y < 100.0);
    assert_eq!(bodies[1].velocity, Vec3::ZERO);
}

#[test]
fn ball_rests_on_floor_without_sinking_or_jitter() {
    let mut world = CollisionWorld::new();
    let mut bodies = [
        TestBody::static_box(0, Vec3::ZERO, Vec3::new(5.0, 0.5, 5.0)),
        TestBody::sphere(1, Vec3::new(0.0, 1.0, 0.0), 0.5),
    ];

    for _ in 0..180 {
        world.step(&mut bodies, DT).unwrap();
    }

    let ball = &bodies[1];
    assert!(
        ball.position.y > 0.9 && ball.position.y < 1.1,
        "ball drifted to y = {}",
        ball.position.y
    );
    assert!(
        ball.velocity.y.abs() < 0.5,
        "resting ball still jittering: vy = {}",
        ball.velocity.y
    );
}

#[test]
fn sphere_stack_settles_under_interleaved_solving() {
    // Two dynamic spheres stacked on a static floor. Support has to flow
    // from the floor up through the middle body within each step, so the
    // stack only holds if solver iterations visit both contacts in turn.
    let mut world = CollisionWorld::new();
    let mut bodies = [
        TestBody::static_box(0, Vec3::ZERO, Vec3::new(5.0, 0.5, 5.0)),
        TestBody::sphere(1, Vec3::new(0.0, 1.0, 0.0), 0.5),
        TestBody::sphere(2, Vec3::new(0.0, 2.0, 0.0), 0.5),
    ];

    for _ in 0..240 {
        world.step(&mut bodies, DT).unwrap();
    }

    assert!(
        bodies[1].position.y > 0.85 && bodies[1].position.y < 1.1,
        "middle body drifted to y = {}",
        bodies[1].position.y
    );
    assert!(
        bodies[2].position.y > 1.7 && bodies[2].position.y < 2.1,
        "top body drifted to y = {}",
        bodies[2].position.y
    );
    assert!(bodies[1].velocity.y.abs() < 0.5, "middle vy = {}", bodies[1].velocity.y);
    assert!(bodies[2].velocity.y.abs() < 0.5, "top vy = {}", bodies[2].velocity.y);
}

#[test]
fn resting_contact_impulse_stabilizes_across_frames() {
    let mut world = CollisionWorld::new();
    let mut bodies = [
        TestBody::static_box(0, Vec3::ZERO, Vec3::new(5.0, 0.5, 5.0)),
        TestBody::sphere(1, Vec3::new(0.0, 1.0, 0.0), 0.5),
    ];
    let pair = CollisionPair::new(0u32, 1u32);

    for _ in 0..120 {
        world.step(&mut bodies, DT).unwrap();
    }

    let total_impulse = |world: &CollisionWorld<u32>| {
        world
            .contact_impulses(&pair)
            .map(|impulses| impulses.iter().map(|w| w.normal_impulse).sum::<f32>())
            .unwrap_or(0.0)
    };

    // At rest the accumulated impulse carries exactly one frame of weight,
    // m * g * dt = 9.81 / 60.
    let settled = total_impulse(&world);
    assert!(
        settled > 0.1 && settled < 0.3,
        "settled impulse {settled} far from one frame of weight"
    );

    // Further frames barely move it.
    for _ in 0..30 {
        world.step(&mut bodies, DT).unwrap();
        let now = total_impulse(&world);
        assert!(
            (now - settled).abs() < 0.05,
            "impulse drifted from {settled} to {now}"
        );
    }
}

#[test]
fn warm_starting_beats_cold_start_at_low_iteration_counts() {
    let make_bodies = || {
        [
            TestBody::static_box(0, Vec3::ZERO, Vec3::new(5.0, 0.5, 5.0)),
            TestBody::sphere(1, Vec3::new(0.0, 1.0, 0.0), 0.5),
            TestBody::sphere(2, Vec3::new(0.0, 2.0, 0.0), 0.5),
        ]
    };
    let residual =
        |bodies: &[TestBody]| bodies[1].velocity.y.abs().max(bodies[2].velocity.y.abs());

    // Warm: one persistent world accumulates impulses across frames, so a
    // single velocity iteration per step is enough to hold the stack.
    let mut warm_world = CollisionWorld::new();
    warm_world.solver_mut().iterations = 1;
    let mut warm_bodies = make_bodies();
    for _ in 0..90 {
        warm_world.step(&mut warm_bodies, DT).unwrap();
    }

    // Cold: a fresh world every frame throws the accumulated impulses
    // away, so the lone iteration re-derives support from scratch and
    // leaves a residual approach speed in the stack.
    let mut cold_bodies = make_bodies();
    for _ in 0..90 {
        let mut cold_world = CollisionWorld::new();
        cold_world.solver_mut().iterations = 1;
        cold_world.step(&mut cold_bodies, DT).unwrap();
    }

    let warm = residual(&warm_bodies);
    let cold = residual(&cold_bodies);
    assert!(
        warm < cold,
        "warm residual {warm} not better than cold {cold}"
    );
    assert!(warm < 0.05, "warm stack still moving: {warm}");
}

#[test]
fn fast_sphere_does_not_tunnel_through_thin_wall() {
    let mut world = zero_gravity_world();
    let mut bodies = [
        TestBody::sphere(0, Vec3::ZERO, 0.1).with_velocity(Vec3::new(100.0, 0.0, 0.0)),
        TestBody::static_box(1, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.05, 5.0, 5.0)),
    ];

    // 100 m/s over one 60 Hz step crosses the wall if integrated blindly.
    world.step(&mut bodies, DT).unwrap();
    assert!(
        bodies[0].position.x < 0.96,
        "sphere tunneled to x = {}",
        bodies[0].position.x
    );

    // The clamped body lands in contact range and resolves next frame.
    let events = world.step(&mut bodies, DT).unwrap();
    let _ = events;
    assert!(bodies[0].position.x < 1.0);
}

#[test]
fn sweep_and_prune_backend_reports_the_same_contacts() {
    let mut hash_world = zero_gravity_world();
    let mut sap_world = CollisionWorld::with_broadphase(SweepAndPrune::new());
    sap_world.set_gravity(Vec3::ZERO);

    let make_bodies = || {
        vec![
            TestBody::sphere(0, Vec3::ZERO, 1.0),
            TestBody::sphere(1, Vec3::new(1.5, 0.0, 0.0), 1.0),
            TestBody::sphere(2, Vec3::new(10.0, 0.0, 0.0), 1.0),
            TestBody::sphere(3, Vec3::new(10.8, 0.0, 0.0), 1.0),
        ]
    };

    let mut a = make_bodies();
    let mut b = make_bodies();
    let hash_events = hash_world.step(&mut a, DT).unwrap();
    let sap_events = sap_world.step(&mut b, DT).unwrap();

    let hash_pairs: Vec<_> = hash_events.iter().map(|e| e.pair).collect();
    let sap_pairs: Vec<_> = sap_events.iter().map(|e| e.pair).collect();
    assert_eq!(hash_pairs, sap_pairs);
}

#[test]
fn manifold_accessor_reflects_cached_state() {
    let mut world = zero_gravity_world();
    let mut bodies = [
        TestBody::sphere(0, Vec3::ZERO, 1.0),
        TestBody::sphere(1, Vec3::new(1.5, 0.0, 0.0), 1.0),
    ];

    world.step(&mut bodies, DT).unwrap();
    let cached: Vec<_> = world.manifolds().collect();
    assert_eq!(cached.len(), 1);
    let (_, manifold) = cached[0];
    assert!(manifold.depth > 0.0);
}
