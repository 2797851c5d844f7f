//! Picking a patch of water to look at

use crate::host::{BlockPos, Vec3, WorldQuery, WATER};

/// Horizontal scan extent around the agent
pub const SCAN_HORIZONTAL: i32 = 16;
/// Vertical scan extent around the agent
pub const SCAN_VERTICAL: i32 = 6;
/// Water closer than this to the eyes is ignored
pub const MIN_VIEW_DISTANCE: f64 = 1.75;
/// Aim this far above the chosen block
pub const VIEW_TARGET_LIFT: f64 = 0.8;
/// Eye height above the feet position
const EYE_HEIGHT: f64 = 1.0;

/// Nearest surface water block that is not right under the agent's nose.
///
/// Returns the point to look at, or `None` if nothing in range qualifies.
pub fn water_view_target<W: WorldQuery + ?Sized>(world: &W, feet: Vec3) -> Option<Vec3> {
    let mut blocks = world.block_locations(feet, SCAN_HORIZONTAL, SCAN_VERTICAL, WATER);
    blocks.sort_by(|a, b| a.distance(feet).total_cmp(&b.distance(feet)));

    let eyes = feet.offset(0.0, EYE_HEIGHT, 0.0);
    blocks
        .iter()
        .find(|block| is_surface(world, **block) && block.distance(eyes) > MIN_VIEW_DISTANCE)
        .map(|block| block.to_vec3().offset(0.0, VIEW_TARGET_LIFT, 0.0))
}

fn is_surface<W: WorldQuery + ?Sized>(world: &W, block: BlockPos) -> bool {
    world.block_id(block.above()) != WATER
}
