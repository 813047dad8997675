//! Tag names and layers used by the scenario's entities.

/// The learning agent.
pub const PENGUIN: &str = "penguin";
/// The baby waiting to be fed.
pub const BABY: &str = "baby";
/// A catchable fish.
pub const FISH: &str = "fish";
/// One of the four boundary walls.
pub const WALL: &str = "wall";

/// Layer the boundary walls live on. Movement sweeps test only this layer.
pub const WALL_LAYER: u8 = 8;
