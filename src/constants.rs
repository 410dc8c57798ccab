// Physical Constants
pub const GRAVITY: f64 = 9.81; // m/s²
pub const KERBIN_RADIUS: f64 = 600_000.0; // meters
pub const EARTH_RADIUS: f64 = 6_371_000.0; // meters

// Atmosphere Constants
pub const AIR_DENSITY_SEA_LEVEL: f64 = 1.225; // kg/m³
pub const KERBIN_SCALE_HEIGHT: f64 = 5_000.0; // m
pub const EARTH_SCALE_HEIGHT: f64 = 7_500.0; // m
pub const KERBIN_ATMOSPHERE_HEIGHT: f64 = 70_000.0; // m
pub const EARTH_ATMOSPHERE_HEIGHT: f64 = 100_000.0; // m (Kármán line)

// Aerodynamic Constants
pub const ROCKET_DRAG_COEFFICIENT: f64 = 0.57;
pub const ROCKET_CROSS_SECTIONAL_AREA: f64 = 13.56; // m²

// Simulation Parameters
pub const TIME_STEP: f64 = 0.1; // s
pub const MAX_SIMULATION_TIME: f64 = 300.0; // s
pub const MASS_FLOOR: f64 = 0.1; // kg, below this acceleration is not computed
pub const DRAG_SPEED_EPSILON: f64 = 0.01; // m/s, below this drag has no direction
pub const PROPELLANT_TOLERANCE: f64 = 1e-9; // fraction of a stage load treated as empty
pub const TELEMETRY_PREALLOCATION: usize = 100_000; // samples reserved up front, at most
pub const MAX_SCRIPTED_STEPS: u64 = 10_000_000; // per scripted segment

// Guidance
pub const DEFAULT_PITCH: f64 = 90.0; // degrees from horizontal (vertical)

// Orbit Insertion
pub const ORBIT_ALTITUDE_THRESHOLD: f64 = 70_000.0; // m
pub const ORBIT_SPEED_THRESHOLD: f64 = 1_000.0; // m/s
pub const ORBITAL_SPEED_MARGIN: f64 = 0.95;
