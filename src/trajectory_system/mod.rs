pub mod aerodynamics;
pub mod integrator;
pub mod scripted;
pub mod termination;
