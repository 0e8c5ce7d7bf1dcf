/// Game tuning parameters for Pong
///
/// Speeds and accelerations are expressed per reference frame (60 Hz), so a
/// `dt` of 1.0 advances the simulation by one 16.67 ms frame.
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Arena
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    // Paddle
    pub const PADDLE_WIDTH: f32 = 8.0; // 1% of arena width
    pub const PADDLE_HEIGHT_RATIO: f32 = 0.15; // of arena height, before size multiplier
    pub const PADDLE_MAX_SPEED: f32 = 8.0;
    pub const PADDLE_ACCELERATION: f32 = 1.0;
    pub const PADDLE_DECELERATION: f32 = 1.0;

    // Ball
    pub const BALL_SIZE: f32 = 12.0;
    pub const BALL_SPEED_INITIAL: f32 = 5.0;
    pub const BALL_SPEED_MAX: f32 = 15.0;
    pub const BALL_SPEED_INCREASE: f32 = 1.05; // Multiply speed on paddle hit
    pub const SERVE_VERTICAL_RATIO: f32 = 0.4;
    pub const WALL_JITTER: f32 = 0.2;
    pub const BOUNCE_JITTER_X: f32 = 0.05; // fraction of speed
    pub const BOUNCE_JITTER_Y: f32 = 0.1; // fraction of speed
    pub const MIN_VERTICAL_SPEED: f32 = 0.5;
    pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_4;
    pub const COLLISION_TOLERANCE: f32 = 2.0;

    // Score
    pub const WIN_SCORE: u32 = 5;

    // Timing
    pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;
    pub const FIXED_DT: f32 = 1.0; // one reference frame per micro-step
    pub const MAX_DT: f32 = 6.0; // ~100 ms, clamp to prevent large jumps

    // AI
    pub const AI_CENTER_TOLERANCE: f32 = 10.0;
    pub const AI_MAX_PREDICTED_BOUNCES: u32 = 3;
    pub const AI_PREDICTION_ERROR_SCALE: f32 = 0.3;
    pub const AI_MIN_MARGIN_FACTOR: f32 = 0.3;
    pub const AI_PROACTIVE_MIN_SHIFT_RATIO: f32 = 0.25; // of arena height
    pub const EPSILON: f32 = 0.1;
}
