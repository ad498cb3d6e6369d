// src/scheduler.rs

//! # Real-Time Scheduler Module
//!
//! Orchestration of the estimation-and-control pipeline under the
//! interrupt discipline of the vehicle: a fixed-frequency control tick runs
//! the full pipeline to completion in strict order, a lower-rate flag
//! triggers telemetry from a non-blocking background loop, and the
//! quadrature decoders run off asynchronous per-wheel edge interrupts.
//!
//! The [`BalanceBot`] context owns every piece of mutable state, so the
//! platform glue decides how the interrupt handlers share it. The encoder
//! counts are atomics and are safe to read from the tick while an edge
//! interrupt interleaves; any other multi-field snapshot (telemetry) goes
//! through [`InterruptControl::free`], which must be held as briefly as
//! possible because it also blocks the edge interrupts and risks missed
//! counts.

use crate::encoder::{
    Channel, EncoderPins, KinematicsConfig, QuadratureDecoder, WheelKinematics,
};
use crate::imu::{ImuBus, OrientationConfig, OrientationEstimator};
use crate::stabilizer::{
    BalanceConfig, BalanceController, BalanceState, MotorCommand, MotorConfig,
    MotorVelocityController,
};

/// Number of values in a telemetry frame.
pub const TELEMETRY_LEN: usize = 9;

/// One of the two wheels, named from the vehicle's forward direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    /// Right wheel and motor.
    Right,
    /// Left wheel and motor. Mirror-mounted: its measured velocity is
    /// negated into the common frame before control.
    Left,
}

impl Wheel {
    fn index(self) -> usize {
        match self {
            Wheel::Right => 0,
            Wheel::Left => 1,
        }
    }
}

const RIGHT: usize = 0;
const LEFT: usize = 1;

/// Interface to the motor driver duty registers.
///
/// Implementations map the command's forward/backward channels onto the
/// PWM compare registers of the given motor, including any channel swap a
/// mirror-mounted motor needs.
pub trait MotorOutputs {
    /// Writes one motor's duty pair for this tick.
    fn write(&mut self, wheel: Wheel, command: MotorCommand);
}

/// Interface to the telemetry transport.
///
/// The collaborator serializes the frame as space-separated fixed-width
/// decimal fields terminated by a line break; the core only populates the
/// values.
pub trait TelemetryLink {
    /// Emits one telemetry frame.
    fn send(&mut self, frame: &[f32; TELEMETRY_LEN]);
}

/// Scoped disabling of interrupts around non-atomic multi-field reads.
pub trait InterruptControl {
    /// Runs `f` with interrupts masked and returns its result.
    fn free<R>(&mut self, f: impl FnOnce() -> R) -> R;
}

/// Configuration for the full vehicle context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceBotConfig {
    /// Wheel kinematics settings, shared by both wheels.
    pub kinematics: KinematicsConfig,
    /// Orientation estimator settings.
    pub orientation: OrientationConfig,
    /// Balance law settings.
    pub balance: BalanceConfig,
    /// Right motor velocity loop settings.
    pub right_motor: MotorConfig,
    /// Left motor velocity loop settings.
    pub left_motor: MotorConfig,
    /// Control ticks per telemetry frame.
    pub telemetry_divider: u32,
}

impl BalanceBotConfig {
    /// Creates the reference configuration: 100 Hz control, 20 Hz
    /// telemetry, and the per-motor deadzones of the reference build.
    pub fn new() -> Self {
        Self {
            kinematics: KinematicsConfig::new(),
            orientation: OrientationConfig::new(),
            balance: BalanceConfig::new(),
            right_motor: MotorConfig::new(),
            left_motor: MotorConfig {
                deadzone: 17.50,
                ..MotorConfig::new()
            },
            telemetry_divider: 5,
        }
    }
}

impl Default for BalanceBotConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The estimation-and-control context of the vehicle.
///
/// All state is created once at startup and lives for the process
/// lifetime; there is no reset path. The decoders are mutated only from
/// the edge-interrupt path ([`BalanceBot::on_encoder_edge`]) and everything
/// else only from the periodic tick ([`BalanceBot::tick`]).
pub struct BalanceBot {
    decoders: [QuadratureDecoder; 2],
    wheels: [WheelKinematics; 2],
    orientation: OrientationEstimator,
    balance: BalanceController,
    motors: [MotorVelocityController; 2],
    telemetry_divider: u32,
    tick_count: u32,
    telemetry_due: bool,
}

impl BalanceBot {
    /// Creates a context using the provided configuration.
    pub fn with_config(config: BalanceBotConfig) -> Self {
        Self {
            decoders: [QuadratureDecoder::new(), QuadratureDecoder::new()],
            wheels: [
                WheelKinematics::with_config(config.kinematics),
                WheelKinematics::with_config(config.kinematics),
            ],
            orientation: OrientationEstimator::with_config(config.orientation),
            balance: BalanceController::with_config(config.balance),
            motors: [
                MotorVelocityController::with_config(config.right_motor),
                MotorVelocityController::with_config(config.left_motor),
            ],
            telemetry_divider: config.telemetry_divider,
            tick_count: 0,
            telemetry_due: false,
        }
    }

    /// Creates a context with the reference configuration.
    pub fn new() -> Self {
        Self::with_config(BalanceBotConfig::new())
    }

    /// Seeds one wheel's decoder from the current pin levels and arms the
    /// initial edge directions. Call before enabling edge interrupts.
    pub fn arm_encoder<P: EncoderPins>(&mut self, wheel: Wheel, pins: &mut P) {
        let levels = pins.levels();
        let [a, b] = self.decoders[wheel.index()].seed(levels);
        pins.set_edge_trigger(Channel::A, a);
        pins.set_edge_trigger(Channel::B, b);
    }

    /// Handles one quadrature edge interrupt for the given wheel: decodes
    /// the transition and re-arms both channel triggers.
    pub fn on_encoder_edge<P: EncoderPins>(&mut self, wheel: Wheel, pins: &mut P) {
        let levels = pins.levels();
        let [a, b] = self.decoders[wheel.index()].on_edge(levels);
        pins.set_edge_trigger(Channel::A, a);
        pins.set_edge_trigger(Channel::B, b);
    }

    /// Runs the one-time stationary orientation calibration.
    pub fn calibrate<B: ImuBus>(&mut self, bus: &mut B) {
        self.orientation.calibrate(bus);
    }

    /// Runs one control tick: read sensors, update the orientation and
    /// wheel estimates, run the balance law, run both motor loops, and
    /// write the duty commands. Raises the telemetry flag every
    /// `telemetry_divider` ticks.
    ///
    /// Must not be re-entered; the control timer period is the re-entrancy
    /// guard.
    pub fn tick<B: ImuBus, M: MotorOutputs>(&mut self, bus: &mut B, motors: &mut M) {
        self.orientation.update(bus);

        for i in [RIGHT, LEFT] {
            let count = self.decoders[i].position();
            self.wheels[i].update(count);
        }

        // The right wheel is the kinematic reference for the balance law;
        // with no yaw control the wheels share one setpoint anyway.
        let state = BalanceState {
            wheel_angle: self.wheels[RIGHT].angle(),
            wheel_rate: self.wheels[RIGHT].filtered_velocity(),
            pitch: self.orientation.pitch(),
            pitch_rate: self.orientation.pitch_rate(),
        };
        let velocity = self.balance.update(state);
        self.motors[RIGHT].set_velocity(velocity);
        self.motors[LEFT].set_velocity(velocity);

        let right = self.motors[RIGHT].update(self.wheels[RIGHT].filtered_velocity());
        let left = self.motors[LEFT].update(-self.wheels[LEFT].filtered_velocity());
        motors.write(Wheel::Right, right);
        motors.write(Wheel::Left, left);

        self.tick_count += 1;
        if self.tick_count >= self.telemetry_divider {
            self.tick_count = 0;
            self.telemetry_due = true;
        }
    }

    /// Whether a telemetry frame is due.
    pub fn telemetry_due(&self) -> bool {
        self.telemetry_due
    }

    /// Emits a telemetry frame if one is due, consuming the flag.
    ///
    /// The frame fields are snapshotted under `irq` so a concurrent tick
    /// cannot tear the multi-field read; the critical section covers only
    /// the copy, not the transmission. Returns whether a frame was sent.
    pub fn service_telemetry<I, L>(&mut self, irq: &mut I, link: &mut L) -> bool
    where
        I: InterruptControl,
        L: TelemetryLink,
    {
        if !self.telemetry_due {
            return false;
        }
        self.telemetry_due = false;

        let frame = irq.free(|| self.telemetry_frame());
        link.send(&frame);
        true
    }

    /// Assembles the telemetry frame: both filtered wheel velocities (left
    /// negated into the common frame), the desired wheel velocity, the
    /// three raw gyro rates, and the gyro-only, accelerometer-only, and
    /// fused pitch angles.
    fn telemetry_frame(&self) -> [f32; TELEMETRY_LEN] {
        let rate = self.orientation.rate();
        [
            self.wheels[RIGHT].filtered_velocity(),
            -self.wheels[LEFT].filtered_velocity(),
            self.balance.desired_velocity(),
            rate[0],
            rate[1],
            rate[2],
            self.orientation.gyro_pitch(),
            self.orientation.accel_pitch(),
            self.orientation.pitch(),
        ]
    }

    /// The orientation estimator.
    pub fn orientation(&self) -> &OrientationEstimator {
        &self.orientation
    }

    /// One wheel's kinematics estimator.
    pub fn kinematics(&self, wheel: Wheel) -> &WheelKinematics {
        &self.wheels[wheel.index()]
    }

    /// One wheel's quadrature decoder.
    pub fn decoder(&self, wheel: Wheel) -> &QuadratureDecoder {
        &self.decoders[wheel.index()]
    }

    /// The desired wheel velocity shared by both motors, in deg/s.
    pub fn desired_velocity(&self) -> f32 {
        self.balance.desired_velocity()
    }
}

impl Default for BalanceBot {
    fn default() -> Self {
        Self::new()
    }
}
