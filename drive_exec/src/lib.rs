//! # Drive library.
//!
//! Localisation and motion control core of the robot. Each control cycle the executable calls
//! the odometry source's `update` followed by the drive controller, which follows a trajectory
//! (or a manual command) and writes wheel powers.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Pose and twist maths on SE(2)
pub mod pose;

/// Encoder signal conditioner - turns raw wrapping encoder readings into clean deltas/velocities
pub mod enc_cond;

/// Odometry sources - estimate the robot's pose and velocity every cycle
pub mod odom;

/// Locomotion control module - converts chassis velocities and manual commands into wheel demands
pub mod loco_ctrl;

/// Trajectory control module - keeps the robot on the given trajectory
pub mod traj_ctrl;

/// Pose persistence port
pub mod persist;

/// Simulation plant - provides simulated ports for development and testing
pub mod sim;
