use super::*;
use crate::physics::{
    AabbBody, AabbWorld, AirEffector, AirEffectorType, EffectorSet, GroundEffector, GroundType,
    JumpPad, WallEffector, WaterVolume, layers,
};

const DT: f32 = 1.0 / 60.0;
/// Centre of a 1x2 character resting on a floor whose top is y = 0.
const STANDING: Vec2 = Vec2::new(0.0, 1.001);
const AIRBORNE: Vec2 = Vec2::new(0.0, 5.0);

/// Controller and probe over a static world. The character only moves when
/// a test moves it.
struct Rig {
    world: AabbWorld,
    probe: ContactProbe,
    controller: MovementController,
    position: Vec2,
}

impl Rig {
    fn new(profile: Profile, position: Vec2) -> Self {
        Self {
            world: AabbWorld::new(),
            probe: ContactProbe::default(),
            controller: MovementController::new(Arc::new(profile), CharacterCollider::default()),
            position,
        }
    }

    fn with_floor(mut self) -> Self {
        self.world.add_body(AabbBody::new(
            Vec2::new(0.0, -0.5),
            Vec2::new(40.0, 1.0),
            layers::GROUND,
        ));
        self
    }

    fn with_body(mut self, body: AabbBody) -> Self {
        self.world.add_body(body);
        self
    }

    fn with_right_wall(self, effector: Option<WallEffector>) -> Self {
        let wall = AabbBody::new(Vec2::new(1.1, 5.0), Vec2::new(1.0, 30.0), layers::WALL)
            .with_effectors(EffectorSet {
                wall: effector,
                ..default()
            });
        self.with_body(wall)
    }

    fn tick(&mut self, input: InputFrame) -> Vec2 {
        let collider = self.controller.collider();
        self.probe
            .probe(&mut self.world, self.position, &collider, None, DT);
        self.controller.update(
            DT,
            &input,
            &mut self.probe,
            &mut self.world,
            self.position,
            None,
        )
    }

    fn ticks(&mut self, input: InputFrame, count: usize) {
        for _ in 0..count {
            self.tick(input);
        }
    }

    fn state(&self) -> &MovementState {
        &self.controller.state
    }

    fn velocity(&self) -> Vec2 {
        self.controller.move_direction()
    }
}

fn idle() -> InputFrame {
    InputFrame::default()
}

fn press() -> InputFrame {
    InputFrame::default().with_jump(JumpSignal::Pressed)
}

fn axis(x: f32, y: f32) -> InputFrame {
    InputFrame::moving(Vec2::new(x, y))
}

fn approx(actual: f32, expected: f32) -> bool {
    (actual - expected).abs() < 1e-4
}

fn volume(center: Vec2, size: Vec2, layer: u32, effectors: EffectorSet) -> AabbBody {
    AabbBody::new(center, size, layer).with_effectors(effectors)
}

fn air_effector(kind: AirEffectorType, speed: f32, center: Vec2, size: Vec2) -> AabbBody {
    volume(
        center,
        size,
        layers::AIR_ZONE,
        EffectorSet {
            air: Some(AirEffector::new(kind, speed)),
            ..default()
        },
    )
}

fn water(center: Vec2, size: Vec2) -> AabbBody {
    volume(
        center,
        size,
        layers::WATER,
        EffectorSet {
            water: Some(WaterVolume),
            ..default()
        },
    )
}

// --- Input ---

#[test]
fn test_deadzone_filters_each_axis() {
    assert_eq!(apply_deadzone(Vec2::new(0.1, -0.5), 0.15), Vec2::new(0.0, -0.5));
    assert_eq!(apply_deadzone(Vec2::new(-0.149, 0.149), 0.15), Vec2::ZERO);
    assert_eq!(apply_deadzone(Vec2::new(0.15, 1.0), 0.15), Vec2::new(0.15, 1.0));
}

#[test]
fn test_small_input_does_not_move() {
    let mut rig = Rig::new(Profile::default(), STANDING).with_floor();
    rig.tick(axis(0.1, 0.0));
    assert_eq!(rig.velocity(), Vec2::ZERO);
}

// --- Timers ---

#[test]
fn test_timer_restart_and_idle_start() {
    let mut timers = Timers::default();
    timers.restart(TimerKey::Dash, 1.0);
    assert!(!timers.start_if_idle(TimerKey::Dash, 5.0));
    assert_eq!(timers.remaining(TimerKey::Dash), Some(1.0));

    timers.restart(TimerKey::Dash, 2.0);
    assert_eq!(timers.remaining(TimerKey::Dash), Some(2.0));

    assert!(timers.cancel(TimerKey::Dash));
    assert!(!timers.is_running(TimerKey::Dash));
    assert!(timers.start_if_idle(TimerKey::Dash, 0.5));
}

#[test]
fn test_timer_tick_reports_expiry_in_key_order() {
    let mut timers = Timers::default();
    timers.restart(TimerKey::WallRun, 0.1);
    timers.restart(TimerKey::Dash, 0.1);
    timers.restart(TimerKey::OneWayPass, 1.0);

    assert!(timers.tick(0.05).is_empty());
    assert_eq!(timers.tick(0.05), vec![TimerKey::Dash, TimerKey::WallRun]);
    assert!(timers.is_running(TimerKey::OneWayPass));
    assert!(!timers.is_running(TimerKey::Dash));
}

// --- Horizontal movement ---

#[test]
fn test_walk_sets_speed_and_facing() {
    let mut rig = Rig::new(Profile::default(), STANDING).with_floor();

    let delta = rig.tick(axis(1.0, 0.0));
    assert_eq!(rig.velocity(), Vec2::new(10.0, 0.0));
    assert!(approx(delta.x, 10.0 * DT));
    assert_eq!(rig.controller.facing(), Facing::Right);
    assert_eq!(rig.controller.mode(), MovementMode::OnGround);
    assert!(rig.controller.is_grounded());

    rig.tick(axis(-1.0, 0.0));
    assert_eq!(rig.velocity().x, -10.0);
    assert_eq!(rig.controller.facing(), Facing::Left);
}

#[test]
fn test_acceleration_eases_toward_target() {
    let profile = Profile {
        acceleration_amount: 0.5,
        deceleration_amount: 0.25,
        ..default()
    };
    let mut rig = Rig::new(profile, STANDING).with_floor();

    rig.tick(axis(1.0, 0.0));
    assert!(approx(rig.velocity().x, 5.0));
    rig.tick(axis(1.0, 0.0));
    assert!(approx(rig.velocity().x, 7.5));
    rig.tick(idle());
    assert!(approx(rig.velocity().x, 5.625));
}

// --- Ground jump, buffer and coyote time ---

#[test]
fn test_ground_jump() {
    let mut rig = Rig::new(Profile::default(), STANDING).with_floor();

    rig.tick(press());
    assert_eq!(rig.velocity().y, 15.0);
    assert!(rig.state().is_jumping);
    assert!(rig.probe.ground_check_disabled());
    assert_eq!(rig.state().jump_buffer_counter, 0.0);
    assert!(!rig.state().start_jump, "latch cleared at end of tick");
}

#[test]
fn test_velocity_persists_but_is_consumed_once() {
    let mut rig = Rig::new(Profile::default(), STANDING).with_floor();
    let first = rig.tick(axis(1.0, 0.0));
    let second = rig.tick(axis(1.0, 0.0));
    assert_eq!(first, second);
    assert_eq!(rig.velocity().x, 10.0);
}

#[test]
fn test_jump_buffer_fires_on_landing() {
    let mut rig = Rig::new(Profile::default(), AIRBORNE).with_floor();

    rig.tick(press());
    assert!(!rig.state().is_jumping);
    rig.ticks(idle(), 5);

    rig.position = STANDING;
    rig.tick(idle());
    assert!(rig.state().is_jumping);
    assert_eq!(rig.velocity().y, 15.0);
}

#[test]
fn test_jump_buffer_expires() {
    let mut rig = Rig::new(Profile::default(), AIRBORNE).with_floor();

    rig.tick(press());
    rig.ticks(idle(), 13);

    rig.position = STANDING;
    rig.tick(idle());
    assert!(!rig.state().is_jumping);
    assert_eq!(rig.velocity().y, 0.0);
}

#[test]
fn test_coyote_jump_after_leaving_ground() {
    let mut rig = Rig::new(Profile::default(), STANDING).with_floor();
    rig.tick(idle());

    rig.position = AIRBORNE;
    rig.ticks(idle(), 5);
    rig.tick(press());

    assert!(rig.state().is_jumping);
    assert!(approx(rig.velocity().y, 15.0 - 20.0 * DT));
    assert_eq!(rig.state().coyote_time_counter, 0.0);
}

#[test]
fn test_coyote_time_expires() {
    let mut rig = Rig::new(Profile::default(), STANDING).with_floor();
    rig.tick(idle());

    rig.position = AIRBORNE;
    rig.ticks(idle(), 13);
    rig.tick(press());

    assert!(!rig.state().is_jumping);
    assert!(rig.velocity().y < 0.0);
}

#[test]
fn test_no_coyote_jump_after_ground_jump() {
    let mut rig = Rig::new(Profile::default(), STANDING).with_floor();
    rig.tick(press());

    rig.position = AIRBORNE;
    rig.tick(idle());
    rig.tick(press());
    assert!(approx(rig.velocity().y, 15.0 - 2.0 * 20.0 * DT));
}

fn unbuffered() -> Profile {
    Profile {
        jump_buffer_time: 0.0,
        ..Profile::default()
    }
}

#[test]
fn test_unbuffered_profile_still_jumps_from_ground() {
    let mut rig = Rig::new(unbuffered(), STANDING).with_floor();
    rig.tick(idle());

    rig.tick(press());
    assert!(rig.state().is_jumping);
    assert_eq!(rig.velocity().y, 15.0);
}

#[test]
fn test_unbuffered_profile_still_coyote_jumps() {
    let mut rig = Rig::new(unbuffered(), STANDING).with_floor();
    rig.tick(idle());

    rig.position = AIRBORNE;
    rig.ticks(idle(), 3);
    rig.tick(press());
    assert!(rig.state().is_jumping);
    assert!(approx(rig.velocity().y, 15.0 - 20.0 * DT));
}

#[test]
fn test_unbuffered_press_is_not_remembered() {
    let mut rig = Rig::new(unbuffered(), AIRBORNE).with_floor();
    rig.tick(press());
    rig.ticks(idle(), 2);

    rig.position = STANDING;
    rig.tick(idle());
    assert!(!rig.state().is_jumping);
}

// --- Air jumps ---

fn air_jumper() -> Profile {
    Profile {
        can_double_jump: true,
        can_triple_jump: true,
        ..default()
    }
}

#[test]
fn test_double_then_triple_jump() {
    let mut rig = Rig::new(air_jumper(), AIRBORNE);
    rig.controller.state.is_jumping = true;

    rig.tick(press());
    assert!(rig.state().is_double_jumping);
    assert!(!rig.state().is_triple_jumping);
    assert!(approx(rig.velocity().y, 10.0 - 20.0 * DT));
    assert_eq!(rig.controller.drain_events(), vec![MovementEvent::DoubleJump]);

    rig.tick(press());
    assert!(rig.state().is_triple_jumping);
    assert!(approx(rig.velocity().y, 10.0 - 20.0 * DT));
    assert_eq!(rig.controller.drain_events(), vec![MovementEvent::DoubleJump]);

    rig.tick(press());
    assert!(approx(rig.velocity().y, 10.0 - 2.0 * 20.0 * DT), "third press does nothing");
    assert!(rig.controller.drain_events().is_empty());
}

#[test]
fn test_double_jump_without_triple() {
    let profile = Profile {
        can_double_jump: true,
        ..default()
    };
    let mut rig = Rig::new(profile, AIRBORNE);

    rig.tick(press());
    rig.tick(press());
    assert!(rig.state().is_double_jumping);
    assert!(!rig.state().is_triple_jumping);
    assert_eq!(rig.controller.drain_events().len(), 1);
}

#[test]
fn test_air_jump_clears_buffer() {
    let mut rig = Rig::new(air_jumper(), AIRBORNE);
    rig.tick(press());
    assert_eq!(rig.state().jump_buffer_counter, 0.0);
}

#[test]
fn test_no_extra_jumps_against_wall() {
    let mut rig = Rig::new(air_jumper(), AIRBORNE).with_right_wall(None);
    rig.tick(idle());
    rig.tick(press());
    assert!(!rig.state().is_double_jumping);
    assert!(rig.controller.drain_events().is_empty());
}

#[test]
fn test_release_halves_vertical_velocity() {
    let mut rig = Rig::new(Profile::default(), AIRBORNE);
    rig.controller.state.move_direction.y = 10.0;
    rig.tick(InputFrame::default().with_jump(JumpSignal::Released));
    assert!(approx(rig.velocity().y, 5.0 - 20.0 * DT));
    assert!(!rig.state().release_jump);
}

// --- Wall jump ---

fn wall_jumper() -> Profile {
    Profile {
        can_wall_jump: true,
        can_jump_after_wall_jump: true,
        ..default()
    }
}

#[test]
fn test_wall_jump_launches_away() {
    let mut rig = Rig::new(wall_jumper(), AIRBORNE).with_right_wall(None);
    rig.tick(idle());
    rig.controller.state.is_double_jumping = true;

    rig.tick(press());
    assert_eq!(rig.velocity().x, -15.0);
    assert!(approx(rig.velocity().y, 15.0 - 20.0 * DT));
    assert!(rig.state().is_wall_jumping);
    assert!(!rig.state().in_air_control);
    assert_eq!(rig.controller.facing(), Facing::Left);
    assert!(!rig.state().is_double_jumping, "air jumps restored");
}

#[test]
fn test_wall_jump_lockout_ignores_input() {
    let mut rig = Rig::new(wall_jumper(), AIRBORNE).with_right_wall(None);
    rig.tick(idle());
    rig.tick(press());

    rig.ticks(axis(1.0, 0.0), 10);
    assert_eq!(rig.velocity().x, -15.0);

    rig.ticks(axis(1.0, 0.0), 16);
    assert!(rig.state().in_air_control);
    assert_eq!(rig.velocity().x, 10.0);
}

#[test]
fn test_wall_jump_vetoed_by_effector() {
    let effector = WallEffector {
        jumpable: false,
        ..default()
    };
    let mut rig = Rig::new(wall_jumper(), AIRBORNE).with_right_wall(Some(effector));
    rig.tick(idle());

    rig.tick(press());
    assert_eq!(rig.velocity().x, 0.0);
    assert!(!rig.state().is_wall_jumping);
    assert!(rig.state().in_air_control);
    assert!(!rig.state().start_jump);
}

#[test]
fn test_wall_jump_needs_velocity_toward_wall() {
    let mut rig = Rig::new(wall_jumper(), AIRBORNE).with_right_wall(None);
    rig.tick(idle());

    rig.tick(press().with_movement(Vec2::new(-1.0, 0.0)));
    assert_eq!(rig.velocity().x, -10.0);
    assert!(!rig.state().is_wall_jumping);
    assert!(!rig.controller.timers().is_running(TimerKey::WallJumpLockout));
}

// --- Wall run & slide ---

#[test]
fn test_wall_run_window() {
    let profile = Profile {
        can_wall_run: true,
        ..default()
    };
    let mut rig = Rig::new(profile, AIRBORNE).with_right_wall(None);

    rig.tick(axis(0.0, 1.0));
    assert!(rig.state().is_wall_running);
    assert!(approx(rig.velocity().y, 8.0 - 20.0 * DT));
    assert_eq!(rig.controller.facing(), Facing::Right);

    rig.ticks(axis(0.0, 1.0), 31);
    assert!(!rig.state().is_wall_running);
    assert!(!rig.state().able_to_wall_run);
    assert!(rig.velocity().y < 8.0 - 2.0 * 20.0 * DT);
}

#[test]
fn test_multiple_wall_run_rearms_off_wall() {
    let profile = Profile {
        can_wall_run: true,
        can_multiple_wall_run: true,
        ..default()
    };
    let mut rig = Rig::new(profile, AIRBORNE).with_right_wall(None);
    rig.ticks(axis(0.0, 1.0), 32);
    assert!(!rig.state().able_to_wall_run);

    rig.position = Vec2::new(-5.0, 5.0);
    rig.tick(idle());
    assert!(rig.state().able_to_wall_run);

    rig.position = AIRBORNE;
    rig.tick(axis(0.0, 1.0));
    assert!(rig.state().is_wall_running);
    assert!(approx(rig.velocity().y, 8.0 - 20.0 * DT));
}

#[test]
fn test_wall_run_vetoed_by_effector() {
    let profile = Profile {
        can_wall_run: true,
        ..default()
    };
    let effector = WallEffector {
        runnable: false,
        ..default()
    };
    let mut rig = Rig::new(profile, AIRBORNE).with_right_wall(Some(effector));

    rig.tick(axis(0.0, 1.0));
    assert!(!rig.state().is_wall_running);
    assert!(approx(rig.velocity().y, -20.0 * DT));
}

#[test]
fn test_wall_slide_uses_default_rate() {
    let profile = Profile {
        can_wall_slide: true,
        ..default()
    };
    let mut rig = Rig::new(profile, AIRBORNE).with_right_wall(None);
    rig.controller.state.move_direction.y = -5.0;

    rig.tick(idle());
    assert!(approx(rig.velocity().y, -20.0 * 0.1 * DT), "zeroed on contact");
    assert!(rig.state().is_wall_sliding);

    rig.tick(idle());
    assert!(approx(rig.velocity().y, -2.0 * 20.0 * 0.1 * DT));
}

#[test]
fn test_wall_slide_uses_effector_rate() {
    let profile = Profile {
        can_wall_slide: true,
        ..default()
    };
    let effector = WallEffector {
        slide_amount: 0.3,
        ..default()
    };
    let mut rig = Rig::new(profile, AIRBORNE).with_right_wall(Some(effector));

    rig.tick(idle());
    assert!(approx(rig.velocity().y, -20.0 * 0.3 * DT));
}

#[test]
fn test_wall_contact_resets_glide_budget() {
    let profile = Profile {
        can_wall_run: true,
        can_glide: true,
        ..default()
    };
    let mut rig = Rig::new(profile, AIRBORNE).with_right_wall(None);
    rig.tick(idle());
    assert_eq!(rig.state().current_glide_time, 0.0);
}

// --- Gravity cascade ---

#[test]
fn test_head_bump_zeroes_rise() {
    let ceiling = AabbBody::new(Vec2::new(0.0, 6.6), Vec2::new(4.0, 1.0), layers::DEFAULT);
    let mut rig = Rig::new(Profile::default(), AIRBORNE).with_body(ceiling);
    rig.controller.state.move_direction.y = 10.0;

    rig.tick(idle());
    assert!(approx(rig.velocity().y, -20.0 * DT));
}

#[test]
fn test_rising_through_one_way_ceiling() {
    let platform = AabbBody::new(Vec2::new(0.0, 6.2), Vec2::new(4.0, 0.2), layers::GROUND)
        .one_way()
        .with_effectors(EffectorSet {
            ground: Some(GroundEffector::new(GroundType::OneWayPlatform)),
            ..default()
        });
    let mut rig = Rig::new(Profile::default(), AIRBORNE);
    let handle = rig.world.add_body(platform);
    rig.controller.state.move_direction.y = 10.0;

    rig.tick(idle());
    assert!(approx(rig.velocity().y, 10.0 - 20.0 * DT));
    assert!(!rig.world.body(handle).unwrap().enabled);
}

#[test]
fn test_glide_descends_slowly() {
    let profile = Profile {
        can_glide: true,
        ..default()
    };
    let mut rig = Rig::new(profile, AIRBORNE);

    rig.tick(axis(0.0, 1.0));
    assert!(rig.controller.is_gliding());
    assert!(approx(rig.velocity().y, -2.0 * DT));

    rig.tick(axis(0.0, 1.0));
    assert!(approx(rig.velocity().y, -4.0 * DT));
    assert!(rig.state().current_glide_time < 2.0);

    rig.tick(idle());
    assert!(!rig.controller.is_gliding());
    assert!(approx(rig.velocity().y, -4.0 * DT - 20.0 * DT));
}

#[test]
fn test_glide_budget_runs_out() {
    let profile = Profile {
        can_glide: true,
        glide_time: 3.0 * DT,
        ..default()
    };
    let mut rig = Rig::new(profile, AIRBORNE);

    rig.ticks(axis(0.0, 1.0), 5);
    assert!(!rig.controller.is_gliding());
    assert!(rig.velocity().y < -20.0 * DT);
}

#[test]
fn test_ground_slam_emits_single_stomp() {
    let profile = Profile {
        can_ground_slam: true,
        ..default()
    };
    let mut rig = Rig::new(profile, AIRBORNE);
    rig.controller.state.move_direction.y = -1.0;

    rig.tick(axis(0.0, -1.0).with_attack());
    assert!(rig.state().is_ground_slamming);
    assert_eq!(rig.velocity().y, -60.0);

    rig.tick(axis(0.0, -1.0));
    assert_eq!(rig.velocity().y, -60.0);
    assert_eq!(rig.controller.drain_events(), vec![MovementEvent::Stomp]);
}

#[test]
fn test_ground_slam_needs_ability() {
    let mut rig = Rig::new(Profile::default(), AIRBORNE);
    rig.controller.state.move_direction.y = -1.0;

    rig.tick(axis(0.0, -1.0).with_attack());
    assert!(!rig.state().is_ground_slamming);
    assert!(approx(rig.velocity().y, -1.0 - 20.0 * DT));
}

// --- Ducking, creeping, power jump ---

#[test]
fn test_duck_halves_collider() {
    let mut rig = Rig::new(Profile::default(), STANDING).with_floor();

    rig.tick(axis(0.0, -1.0));
    assert!(rig.controller.is_ducking());
    assert_eq!(rig.controller.collider().size, Vec2::new(1.0, 1.0));
    assert_eq!(rig.controller.collider().offset, Vec2::new(0.0, -0.5));

    rig.tick(idle());
    assert!(!rig.controller.is_ducking());
    assert_eq!(rig.controller.collider(), CharacterCollider::default());
}

#[test]
fn test_low_ceiling_keeps_duck() {
    let mut rig = Rig::new(Profile::default(), STANDING).with_floor();
    rig.tick(axis(0.0, -1.0));

    rig.world.add_body(AabbBody::new(
        Vec2::new(0.0, 2.0),
        Vec2::new(4.0, 1.0),
        layers::DEFAULT,
    ));
    rig.tick(idle());
    assert!(rig.controller.is_ducking());
}

#[test]
fn test_creeping_uses_creep_speed() {
    let mut rig = Rig::new(Profile::default(), STANDING).with_floor();

    rig.tick(axis(1.0, -1.0));
    assert!(rig.state().is_creeping);
    rig.tick(axis(1.0, -1.0));
    assert_eq!(rig.velocity().x, 5.0);
}

#[test]
fn test_power_jump_after_long_duck() {
    let profile = Profile {
        can_power_jump: true,
        ..default()
    };
    let mut rig = Rig::new(profile, STANDING).with_floor();
    rig.ticks(axis(0.0, -1.0), 100);

    rig.tick(axis(0.0, -1.0).with_jump(JumpSignal::Pressed));
    assert_eq!(rig.velocity().y, 40.0);
    assert!(rig.state().is_power_jumping);

    rig.position = AIRBORNE;
    rig.ticks(idle(), 45);
    assert!(rig.state().is_power_jumping);
    rig.ticks(idle(), 5);
    assert!(!rig.state().is_power_jumping);

    assert_eq!(rig.controller.drain_events(), vec![MovementEvent::PowerJump]);
}

#[test]
fn test_short_duck_gives_regular_jump() {
    let profile = Profile {
        can_power_jump: true,
        ..default()
    };
    let mut rig = Rig::new(profile, STANDING).with_floor();
    rig.ticks(axis(0.0, -1.0), 10);

    rig.tick(axis(0.0, -1.0).with_jump(JumpSignal::Pressed));
    assert_eq!(rig.velocity().y, 15.0);
    assert!(!rig.state().is_power_jumping);
    assert!(rig.controller.drain_events().is_empty());
}

// --- One-way platforms ---

fn one_way_floor() -> AabbBody {
    AabbBody::new(Vec2::new(0.0, -0.1), Vec2::new(10.0, 0.2), layers::GROUND)
        .one_way()
        .with_effectors(EffectorSet {
            ground: Some(GroundEffector::new(GroundType::OneWayPlatform)),
            ..default()
        })
}

#[test]
fn test_drop_through_one_way_platform() {
    let profile = Profile {
        can_ground_slam: true,
        ..default()
    };
    let mut rig = Rig::new(profile, STANDING);
    let platform = rig.world.add_body(one_way_floor());

    rig.tick(axis(0.0, -1.0));
    rig.tick(axis(0.0, -1.0).with_jump(JumpSignal::Pressed));

    assert!(!rig.world.body(platform).unwrap().enabled);
    assert_eq!(rig.velocity().y, 0.0);
    assert!(!rig.state().ground_slam_enabled);
    assert_eq!(
        rig.state().one_way_pass,
        Some(OneWayPass {
            body: platform,
            saved_ground_slam: true,
        })
    );

    rig.ticks(idle(), 32);
    assert!(rig.world.body(platform).unwrap().enabled);
    assert!(rig.state().ground_slam_enabled, "gate restored with the platform");
    assert!(rig.state().one_way_pass.is_none());
}

#[test]
fn test_standing_jump_on_one_way_is_regular() {
    let mut rig = Rig::new(Profile::default(), STANDING);
    let platform = rig.world.add_body(one_way_floor());

    rig.tick(press());
    assert_eq!(rig.velocity().y, 15.0);
    assert!(rig.world.body(platform).unwrap().enabled);
}

// --- Dash ---

#[test]
fn test_dash_and_cooldown() {
    let profile = Profile {
        can_ground_dash: true,
        ..default()
    };
    let mut rig = Rig::new(profile, STANDING).with_floor();

    rig.tick(idle().with_dash());
    assert!(rig.state().is_dashing);
    assert_eq!(rig.velocity(), Vec2::new(20.0, 0.0));
    assert_eq!(rig.controller.drain_events(), vec![MovementEvent::DashStarted]);

    rig.tick(idle().with_dash());
    assert!(rig.controller.drain_events().is_empty(), "no retrigger mid-dash");

    rig.ticks(idle(), 14);
    assert!(!rig.state().is_dashing);
    assert!(rig.controller.timers().is_running(TimerKey::DashCooldown));

    rig.tick(idle().with_dash());
    assert!(rig.controller.drain_events().is_empty(), "cooling down");

    rig.ticks(idle(), 62);
    rig.tick(idle().with_dash());
    assert_eq!(rig.controller.drain_events(), vec![MovementEvent::DashStarted]);
}

#[test]
fn test_dash_follows_facing() {
    let profile = Profile {
        can_ground_dash: true,
        ..default()
    };
    let mut rig = Rig::new(profile, STANDING).with_floor();
    rig.tick(axis(-1.0, 0.0));
    rig.tick(idle().with_dash());
    assert_eq!(rig.velocity().x, -20.0);
}

#[test]
fn test_air_dash_needs_air_ability() {
    let profile = Profile {
        can_ground_dash: true,
        ..default()
    };
    let mut rig = Rig::new(profile, AIRBORNE);
    rig.tick(idle().with_dash());
    assert!(!rig.state().is_dashing);

    let profile = Profile {
        can_air_dash: true,
        ..default()
    };
    let mut rig = Rig::new(profile, AIRBORNE);
    rig.tick(idle().with_dash());
    assert!(rig.state().is_dashing);
    assert_eq!(rig.velocity().y, 0.0, "dash suspends gravity");
}

// --- Jump pads ---

fn pad_rig(incoming: f32) -> Rig {
    let pad = AabbBody::new(Vec2::new(0.0, -0.5), Vec2::new(10.0, 1.0), layers::GROUND)
        .with_effectors(EffectorSet {
            jump_pad: Some(JumpPad {
                amount: 15.0,
                upper_limit: 30.0,
            }),
            ..default()
        });
    let mut rig = Rig::new(Profile::default(), STANDING).with_body(pad);
    rig.controller.state.move_direction.y = -incoming;
    rig
}

#[test]
fn test_jump_pad_amplifies_fast_landing() {
    let mut rig = pad_rig(20.0);
    rig.tick(idle());
    assert!(approx(rig.velocity().y, 18.4));
}

#[test]
fn test_jump_pad_base_bounce() {
    let mut rig = pad_rig(5.0);
    rig.tick(idle());
    assert_eq!(rig.velocity().y, 15.0);
}

#[test]
fn test_jump_pad_hold_accumulates() {
    let mut rig = pad_rig(20.0);
    let held = InputFrame::default().with_jump(JumpSignal::Held);

    rig.tick(held);
    assert!(approx(rig.velocity().y, 18.4 + 1.84));
    rig.tick(held);
    assert!(approx(rig.velocity().y, 18.4 + 3.68));

    rig.ticks(held, 20);
    assert_eq!(rig.velocity().y, 30.0);
}

#[test]
fn test_jump_pad_never_exceeds_limit() {
    let held = InputFrame::default().with_jump(JumpSignal::Held);
    for incoming in (0..=200).step_by(5) {
        let mut rig = pad_rig(incoming as f32);
        for _ in 0..30 {
            rig.tick(held);
            assert!(rig.velocity().y <= 30.0, "incoming={incoming}");
        }
    }
}

// --- Air effectors ---

#[test]
fn test_ladder_follows_input() {
    let ladder = air_effector(AirEffectorType::Ladder, 4.0, AIRBORNE, Vec2::new(2.0, 10.0));
    let mut rig = Rig::new(Profile::default(), AIRBORNE).with_body(ladder);

    rig.tick(axis(0.0, 1.0));
    assert_eq!(rig.controller.mode(), MovementMode::InAirEffector);
    assert_eq!(rig.velocity().y, 4.0);
    rig.tick(axis(0.0, -1.0));
    assert_eq!(rig.velocity().y, -4.0);
    rig.tick(idle());
    assert_eq!(rig.velocity().y, 0.0);
}

#[test]
fn test_ladder_takes_over_on_ground() {
    let ladder = air_effector(
        AirEffectorType::Ladder,
        4.0,
        Vec2::new(0.0, 3.0),
        Vec2::new(2.0, 6.0),
    );
    let mut rig = Rig::new(Profile::default(), STANDING)
        .with_floor()
        .with_body(ladder);

    rig.tick(axis(0.0, 1.0));
    assert_eq!(rig.controller.mode(), MovementMode::OnGround);
    assert_eq!(rig.velocity().y, 4.0);
}

#[test]
fn test_jumping_off_ladder_deactivates_it() {
    let ladder = air_effector(AirEffectorType::Ladder, 4.0, AIRBORNE, Vec2::new(2.0, 10.0));
    let mut rig = Rig::new(Profile::default(), AIRBORNE);
    let handle = rig.world.add_body(ladder);

    rig.tick(press());
    assert!(!rig.world.body(handle).unwrap().enabled);
    assert!(rig.state().is_jumping);

    rig.ticks(idle(), 32);
    assert!(rig.world.body(handle).unwrap().enabled);
}

#[test]
fn test_leaving_effector_deactivates_it() {
    let ladder = air_effector(AirEffectorType::Ladder, 4.0, AIRBORNE, Vec2::new(2.0, 10.0));
    let mut rig = Rig::new(Profile::default(), AIRBORNE);
    let handle = rig.world.add_body(ladder);
    rig.tick(idle());

    rig.position = Vec2::new(10.0, 5.0);
    rig.tick(idle());
    assert!(!rig.world.body(handle).unwrap().enabled);

    rig.ticks(idle(), 32);
    assert!(rig.world.body(handle).unwrap().enabled);
}

#[test]
fn test_updraft_lifts_while_gliding() {
    let profile = Profile {
        can_glide: true,
        ..default()
    };
    let updraft = air_effector(AirEffectorType::Updraft, 6.0, AIRBORNE, Vec2::new(2.0, 10.0));
    let mut rig = Rig::new(profile, AIRBORNE).with_body(updraft);

    rig.tick(axis(0.0, 1.0));
    assert!(rig.controller.is_gliding());
    rig.tick(axis(0.0, 1.0));
    assert_eq!(rig.velocity().y, 6.0);

    rig.tick(idle());
    assert!(!rig.controller.is_gliding());
    assert!(approx(rig.velocity().y, 6.0 - 20.0 * DT));
}

#[test]
fn test_tractor_beam_damps_vertical_velocity() {
    let beam = air_effector(AirEffectorType::TractorBeam, 3.0, AIRBORNE, Vec2::new(2.0, 10.0));
    let mut rig = Rig::new(Profile::default(), AIRBORNE).with_body(beam);
    rig.controller.state.move_direction.y = 10.0;

    rig.tick(idle());
    assert!(approx(rig.velocity().y, 10.0 * (1.0 - 4.0 * DT)));
}

// --- Water ---

fn swimmer() -> Profile {
    Profile {
        can_swim: true,
        ..default()
    }
}

fn pool() -> AabbBody {
    water(Vec2::ZERO, Vec2::new(40.0, 20.0))
}

#[test]
fn test_swimming_submerged() {
    let mut rig = Rig::new(swimmer(), AIRBORNE).with_body(pool());

    rig.tick(axis(0.0, -1.0));
    assert_eq!(rig.controller.mode(), MovementMode::InWater);
    assert!(approx(rig.velocity().y, -150.0 * DT));
    assert!(rig.state().is_swimming);
    assert!(rig.controller.is_submerged());

    rig.tick(idle());
    assert!(approx(rig.velocity().y, -150.0 * DT + 2.0), "buoyancy damping");

    rig.tick(axis(0.0, 1.0));
    assert!(approx(rig.velocity().y, 150.0 * DT));
}

#[test]
fn test_surface_holds_position() {
    let mut rig = Rig::new(swimmer(), Vec2::new(0.0, 10.5)).with_body(pool());

    rig.tick(axis(0.0, 1.0));
    assert_eq!(rig.controller.mode(), MovementMode::InWater);
    assert_eq!(rig.velocity().y, 0.0);
    assert!(!rig.state().is_swimming);
}

#[test]
fn test_jump_out_of_water() {
    let mut rig = Rig::new(swimmer(), AIRBORNE).with_body(pool());
    rig.tick(press());
    assert_eq!(rig.velocity().y, 15.0);
}

#[test]
fn test_swimming_needs_ability() {
    let mut rig = Rig::new(Profile::default(), AIRBORNE).with_body(pool());
    rig.tick(axis(0.0, -1.0));
    assert_eq!(rig.velocity().y, 0.0);
    assert!(!rig.state().is_swimming);
}

#[test]
fn test_dispatch_order_policy() {
    let mut ground_first = Rig::new(swimmer(), STANDING).with_floor().with_body(pool());
    ground_first.tick(idle());
    assert_eq!(ground_first.controller.mode(), MovementMode::OnGround);

    let profile = Profile {
        dispatch_order: DispatchOrder::WaterFirst,
        ..swimmer()
    };
    let mut water_first = Rig::new(profile, STANDING).with_floor().with_body(pool());
    water_first.tick(idle());
    assert_eq!(water_first.controller.mode(), MovementMode::InWater);
}

// --- Notifications ---

#[test]
fn test_drain_empties_events() {
    let mut rig = Rig::new(air_jumper(), AIRBORNE);
    rig.tick(press());
    assert_eq!(rig.controller.events(), &[MovementEvent::DoubleJump]);
    assert_eq!(rig.controller.drain_events().len(), 1);
    assert!(rig.controller.events().is_empty());
}
