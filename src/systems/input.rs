//! Input system.
//!
//! [`apply_input`] copies this tick's buttons from the
//! [`InputSource`](crate::resources::input::InputSource) resource into every
//! wizard's [`Controls`]. Players are served in player-number order so the
//! random bot draws the same numbers on every run with the same seed.
//!
//! Script frames are counted from 0: the first tick reads frame 0.
use bevy_ecs::prelude::*;

use crate::components::controls::Controls;
use crate::components::lifecycle::{Dead, Player};
use crate::resources::input::InputSource;
use crate::resources::worldtime::WorldTime;

pub fn apply_input(
    time: Res<WorldTime>,
    mut source: ResMut<InputSource>,
    mut query: Query<(&Player, &mut Controls), Without<Dead>>,
) {
    let frame = time.frame_count.saturating_sub(1);
    let mut wizards: Vec<(&Player, Mut<Controls>)> = query.iter_mut().collect();
    wizards.sort_unstable_by_key(|(player, _)| player.index);
    for (player, mut controls) in wizards {
        *controls = source.controls_for(player.index, frame);
    }
}
