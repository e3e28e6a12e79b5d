//! # Per-Tile Animation State Machine
//!
//! ```text
//!            ┌────────── flip ──────────┐
//!            ▼                          │
//!  Idle ─▶ Jumping ─▶ Flipping ─▶ Falling ─▶ Idle
//!   │         (p=0.5)    (p=1)      (p=1)
//!   └─▶ Powerup ──(p=1)──▶ Idle
//! ```
//!
//! Authoritative changes only enqueue; the queue is drained one entry at
//! a time, and only from `Idle`. A flip clears the queue first, so it
//! always wins over pending stamps.

use std::collections::VecDeque;
use std::f32::consts::PI;

use flippyflop_shared::{lerp, Team, Tile, Vec3};

use super::config::AnimationConfig;
use super::easing::Easing;
use crate::palette::{Color, TeamPalette};

/// Color swaps to the new owner this early into a flip to owned...
const SWAP_TO_OWNED_AT: f32 = 0.1;
/// ...and this late into a flip back to unowned.
const SWAP_TO_UNOWNED_AT: f32 = 0.9;

/// Jumping hands off to Flipping at this progress.
const JUMP_HANDOFF: f32 = 0.5;
/// Jump progress spent crouching before the rise.
const JUMP_CROUCH_END: f32 = 0.2;

/// Share of the fall spent dropping to the overshoot.
const FALL_DROP_SPAN: f32 = 0.7;

/// Powerup stamp phase boundaries.
const PRESS_END: f32 = 0.3;
const BOUNCE_END: f32 = 0.7;

/// Discrete animation phase of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum AnimationState {
    /// Resting, hovering or bobbing.
    #[default]
    Idle,
    /// Crouch and rise before a flip.
    Jumping,
    /// Rotating half a turn at the top of the jump.
    Flipping,
    /// Dropping back with a small overshoot.
    Falling,
    /// Press-and-bounce stamp when a powerup lands or expires.
    Powerup,
}

impl AnimationState {
    /// Whether this state runs a timed animation.
    #[inline]
    #[must_use]
    pub const fn is_animating(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// What an authoritative change triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing visual; the tile's other fields changed.
    None,
    /// Ownership flipped; a jump was queued and the queue cleared.
    Flip,
    /// Powerup flag changed; a stamp was queued.
    Powerup,
    /// Powerup flag changed inside the cooldown, or a stamp was already queued.
    Suppressed,
}

impl Transition {
    /// Whether this transition queued an animation.
    #[inline]
    #[must_use]
    pub const fn fired(self) -> bool {
        matches!(self, Self::Flip | Self::Powerup)
    }
}

/// Animation state of one tile slot.
#[derive(Debug, Clone)]
pub struct TileState {
    position: Vec3,
    rotation: f32,
    state: AnimationState,
    queue: VecDeque<AnimationState>,
    progress: f32,
    last_flip_time: f64,
    hover_progress: f32,
    plus_one_count: u32,

    /// Displayed team; `None` renders the unowned color.
    team: Option<Team>,
    /// Team displayed before the current flip started.
    last_team: Option<Team>,
    color: Color,

    // Latest authoritative view of the tile.
    owned: bool,
    owner_team: Team,
    powerup: bool,

    // Latched when a flip starts.
    flip_to_owned: bool,
    flip_team: Option<Team>,
    flip_from_rotation: f32,
    color_swapped: bool,
    phase_start_y: f32,

    bob_phase: f32,
}

impl TileState {
    /// Creates the resting state of `tile` placed at ground point `(x, z)`.
    #[must_use]
    pub fn new(tile: &Tile, x: f32, z: f32, palette: &TeamPalette) -> Self {
        let owned = tile.is_owned();
        let team = owned.then_some(tile.team);
        Self {
            position: Vec3::new(x, 0.0, z),
            rotation: if owned { PI } else { 0.0 },
            state: AnimationState::Idle,
            queue: VecDeque::with_capacity(2),
            progress: 0.0,
            last_flip_time: f64::NEG_INFINITY,
            hover_progress: 0.0,
            plus_one_count: 0,
            team,
            last_team: team,
            color: palette.color(team),
            owned,
            owner_team: tile.team,
            powerup: tile.powerup.is_active(),
            flip_to_owned: owned,
            flip_team: team,
            flip_from_rotation: 0.0,
            color_swapped: true,
            phase_start_y: 0.0,
            bob_phase: bob_phase(tile),
        }
    }

    /// Render-space position.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Flip rotation about the X axis, radians. `0` face-up, `PI` flipped.
    #[inline]
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Current phase.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> AnimationState {
        self.state
    }

    /// Progress through the current timed phase, `0..=1`.
    #[inline]
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Queued phases, front first.
    #[must_use]
    pub fn queued(&self) -> Vec<AnimationState> {
        self.queue.iter().copied().collect()
    }

    /// Queue length.
    #[inline]
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Displayed color.
    #[inline]
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Displayed team.
    #[inline]
    #[must_use]
    pub const fn team(&self) -> Option<Team> {
        self.team
    }

    /// Team displayed before the latest flip.
    #[inline]
    #[must_use]
    pub const fn last_team(&self) -> Option<Team> {
        self.last_team
    }

    /// Clock time of the latest flip.
    #[inline]
    #[must_use]
    pub const fn last_flip_time(&self) -> f64 {
        self.last_flip_time
    }

    /// Hover blend, `0..=1`.
    #[inline]
    #[must_use]
    pub const fn hover_progress(&self) -> f32 {
        self.hover_progress
    }

    /// "+1"s the local player has scored on this tile.
    #[inline]
    #[must_use]
    pub const fn plus_one_count(&self) -> u32 {
        self.plus_one_count
    }

    /// Counts one "+1" for the local player.
    #[inline]
    pub fn award_plus_one(&mut self) {
        self.plus_one_count = self.plus_one_count.saturating_add(1);
    }

    /// Reacts to an authoritative change from `prev` to `next`.
    ///
    /// Only queues work; the visuals change on the next [`TileState::advance`].
    pub fn on_tile_changed(&mut self, prev: &Tile, next: &Tile, now: f64, cooldown: f64) -> Transition {
        self.owned = next.is_owned();
        self.owner_team = next.team;
        self.powerup = next.powerup.is_active();

        if prev.is_owned() != next.is_owned() {
            self.queue.clear();
            self.queue.push_back(AnimationState::Jumping);
            self.last_flip_time = now;
            return Transition::Flip;
        }

        if prev.powerup != next.powerup {
            if now - self.last_flip_time <= cooldown || self.queue.contains(&AnimationState::Powerup) {
                return Transition::Suppressed;
            }
            self.queue.push_back(AnimationState::Powerup);
            return Transition::Powerup;
        }

        Transition::None
    }

    /// Advances one frame.
    ///
    /// * `dt` - Frame delta in seconds
    /// * `elapsed` - Clock time, drives the idle bob
    /// * `hovered` - Whether the pointer is over this tile
    pub fn advance(
        &mut self,
        dt: f32,
        elapsed: f64,
        hovered: bool,
        config: &AnimationConfig,
        palette: &TeamPalette,
    ) {
        if self.state == AnimationState::Idle {
            if let Some(next) = self.queue.pop_front() {
                self.begin(next);
            }
        }

        match self.state {
            AnimationState::Idle => self.advance_idle(dt, elapsed, hovered, config, palette),
            AnimationState::Jumping => {
                self.step(dt, config.animation_duration);
                self.position.y = jump_height(self.progress, config);
                if self.progress >= JUMP_HANDOFF {
                    self.phase_start_y = self.position.y;
                    self.flip_from_rotation = self.rotation;
                    self.enter(AnimationState::Flipping);
                }
            }
            AnimationState::Flipping => {
                self.step(dt, config.animation_duration);
                let p = self.progress;
                let target = if self.flip_to_owned { PI } else { 0.0 };
                self.rotation = lerp(self.flip_from_rotation, target, Easing::CubicOut.apply(p));
                self.position.y = lerp(self.phase_start_y, config.jump_height, Easing::SineOut.apply(p));

                let swap_at = if self.flip_to_owned { SWAP_TO_OWNED_AT } else { SWAP_TO_UNOWNED_AT };
                if !self.color_swapped && p >= swap_at {
                    self.swap_color(palette);
                }
                if p >= 1.0 {
                    self.rotation = target;
                    if !self.color_swapped {
                        self.swap_color(palette);
                    }
                    self.phase_start_y = self.position.y;
                    self.enter(AnimationState::Falling);
                }
            }
            AnimationState::Falling => {
                self.step(dt, config.animation_duration);
                let p = self.progress;
                self.position.y = if p < FALL_DROP_SPAN {
                    lerp(self.phase_start_y, -config.fall_overshoot, Easing::QuadIn.apply(p / FALL_DROP_SPAN))
                } else {
                    let t = (p - FALL_DROP_SPAN) / (1.0 - FALL_DROP_SPAN);
                    lerp(-config.fall_overshoot, 0.0, Easing::QuadOut.apply(t))
                };
                if p >= 1.0 {
                    self.position.y = 0.0;
                    self.enter(AnimationState::Idle);
                }
            }
            AnimationState::Powerup => {
                self.step(dt, config.powerup_animation_duration);
                self.position.y = stamp_height(self.progress, self.phase_start_y, config);
                if self.progress >= 1.0 {
                    self.position.y = 0.0;
                    self.enter(AnimationState::Idle);
                }
            }
        }
    }

    fn begin(&mut self, next: AnimationState) {
        if next == AnimationState::Jumping {
            self.flip_to_owned = self.owned;
            self.flip_team = self.owned.then_some(self.owner_team);
            self.last_team = self.team;
            self.color_swapped = false;
        }
        self.phase_start_y = self.position.y;
        self.enter(next);
    }

    #[inline]
    fn enter(&mut self, state: AnimationState) {
        self.state = state;
        self.progress = 0.0;
    }

    #[inline]
    fn step(&mut self, dt: f32, duration: f32) {
        self.progress = (self.progress + dt / duration).min(1.0);
    }

    fn swap_color(&mut self, palette: &TeamPalette) {
        self.team = self.flip_team;
        self.color = palette.color(self.team);
        self.color_swapped = true;
    }

    fn advance_idle(&mut self, dt: f32, elapsed: f64, hovered: bool, config: &AnimationConfig, palette: &TeamPalette) {
        // Owner changes that keep the tile owned never flip; repaint here.
        let display = self.owned.then_some(self.owner_team);
        if self.team != display {
            self.last_team = self.team;
            self.team = display;
            self.color = palette.color(display);
        }

        let rate = dt / config.hover_animation_duration;
        self.hover_progress = if hovered {
            (self.hover_progress + rate).min(1.0)
        } else {
            (self.hover_progress - rate).max(0.0)
        };

        let (hover, bob, float) = if self.powerup {
            (config.powerup_hover_height, config.powerup_bob_amplitude, config.powerup_float_offset)
        } else {
            (config.hover_height, config.bob_amplitude, 0.0)
        };
        let wave = ((elapsed as f32) * config.bob_speed + self.bob_phase).sin();
        let target = lerp(0.0, hover, Easing::CubicOut.apply(self.hover_progress)) + wave * bob + float;

        let blend = 1.0 - config.idle_damping.powf(dt);
        self.position.y += (target - self.position.y) * blend;
    }
}

/// Height during the jump: a linear crouch, then a sine rise toward the
/// peak. Flipping takes over at `p = 0.5`, partway up.
fn jump_height(progress: f32, config: &AnimationConfig) -> f32 {
    if progress < JUMP_CROUCH_END {
        lerp(0.0, -config.jump_crouch, progress / JUMP_CROUCH_END)
    } else {
        let t = (progress - JUMP_CROUCH_END) / (1.0 - JUMP_CROUCH_END);
        lerp(-config.jump_crouch, config.jump_height, Easing::SineOut.apply(t))
    }
}

/// Height during the powerup stamp: press, bounce, settle.
fn stamp_height(progress: f32, start: f32, config: &AnimationConfig) -> f32 {
    if progress < PRESS_END {
        lerp(start, -config.powerup_press_depth, Easing::CubicOut.apply(progress / PRESS_END))
    } else if progress < BOUNCE_END {
        let t = (progress - PRESS_END) / (BOUNCE_END - PRESS_END);
        lerp(-config.powerup_press_depth, config.powerup_bounce_height, Easing::QuadOut.apply(t))
    } else {
        let t = (progress - BOUNCE_END) / (1.0 - BOUNCE_END);
        lerp(config.powerup_bounce_height, 0.0, Easing::QuadOut.apply(t))
    }
}

/// Stable per-tile bob offset so neighbours don't move in lockstep.
fn bob_phase(tile: &Tile) -> f32 {
    let hash = tile.x.wrapping_mul(73_856_093) ^ tile.y.wrapping_mul(19_349_663);
    (hash % 628) as f32 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use flippyflop_shared::Powerup;

    const DT: f32 = 1.0 / 60.0;

    fn owned(tile: Tile, team: u8) -> Tile {
        tile.flipped_to(Address::repeat_byte(0xAB), Team(team))
    }

    fn with_powerup(mut tile: Tile) -> Tile {
        tile.powerup = Powerup::Multiplier;
        tile.powerup_value = 2;
        tile
    }

    fn run(state: &mut TileState, seconds: f32, config: &AnimationConfig, palette: &TeamPalette) -> Vec<AnimationState> {
        let ticks = (seconds / DT).ceil() as usize;
        let mut seen = Vec::with_capacity(ticks);
        for i in 0..ticks {
            state.advance(DT, f64::from(i as u32) * f64::from(DT), false, config, palette);
            if seen.last() != Some(&state.state()) {
                seen.push(state.state());
            }
        }
        seen
    }

    #[test]
    fn test_flip_runs_full_sequence() {
        let config = AnimationConfig::default();
        let palette = TeamPalette::default();
        let prev = Tile::unowned(5, 5);
        let next = owned(prev, 2);
        let mut state = TileState::new(&prev, 0.0, 0.0, &palette);

        assert_eq!(state.on_tile_changed(&prev, &next, 1.0, config.powerup_cooldown), Transition::Flip);
        assert_eq!(state.state(), AnimationState::Idle);
        assert_eq!(state.queued(), vec![AnimationState::Jumping]);

        let seen = run(&mut state, config.animation_duration * 2.5 + 0.05, &config, &palette);
        assert_eq!(
            seen,
            vec![
                AnimationState::Jumping,
                AnimationState::Flipping,
                AnimationState::Falling,
                AnimationState::Idle,
            ]
        );
        assert_eq!(state.team(), Some(Team(2)));
        assert_eq!(state.color(), palette.color(Some(Team(2))));
        assert_eq!(state.last_team(), None);
        assert!((state.rotation() - PI).abs() < 1e-5);
        assert!(state.position().y.abs() < 1e-3);
    }

    #[test]
    fn test_jump_crouches_then_rises() {
        let config = AnimationConfig::default();
        let rise = |p: f32| (p - 0.2) / 0.8;

        assert_eq!(jump_height(0.0, &config), 0.0);
        assert!((jump_height(0.1, &config) + config.jump_crouch * 0.5).abs() < 1e-6);
        assert!((jump_height(0.2, &config) + config.jump_crouch).abs() < 1e-6);

        let expected = lerp(-config.jump_crouch, config.jump_height, Easing::SineOut.apply(rise(0.5)));
        assert!((jump_height(0.5, &config) - expected).abs() < 1e-6);
        assert!(jump_height(0.5, &config) > 0.0);
        assert!(jump_height(0.5, &config) < config.jump_height);
    }

    #[test]
    fn test_jump_still_low_after_crouch() {
        let config = AnimationConfig::default();
        let palette = TeamPalette::default();
        let prev = Tile::unowned(8, 8);
        let mut state = TileState::new(&prev, 0.0, 0.0, &palette);
        state.on_tile_changed(&prev, &owned(prev, 0), 0.0, config.powerup_cooldown);

        state.advance(0.2 * config.animation_duration, 0.0, false, &config, &palette);
        assert_eq!(state.state(), AnimationState::Jumping);
        assert!((state.position().y + config.jump_crouch).abs() < 1e-3);
    }

    #[test]
    fn test_color_swaps_early_when_gaining_owner() {
        let config = AnimationConfig::default();
        let palette = TeamPalette::default();
        let prev = Tile::unowned(1, 1);
        let mut state = TileState::new(&prev, 0.0, 0.0, &palette);
        state.on_tile_changed(&prev, &owned(prev, 1), 0.0, config.powerup_cooldown);

        while state.state() != AnimationState::Flipping {
            state.advance(DT, 0.0, false, &config, &palette);
        }
        assert_eq!(state.team(), None);
        while state.progress() < 0.2 {
            state.advance(DT, 0.0, false, &config, &palette);
        }
        assert_eq!(state.team(), Some(Team(1)));
    }

    #[test]
    fn test_color_swaps_late_when_losing_owner() {
        let config = AnimationConfig::default();
        let palette = TeamPalette::default();
        let prev = owned(Tile::unowned(1, 1), 3);
        let next = Tile::unowned(1, 1);
        let mut state = TileState::new(&prev, 0.0, 0.0, &palette);
        state.on_tile_changed(&prev, &next, 0.0, config.powerup_cooldown);

        while state.state() != AnimationState::Flipping {
            state.advance(DT, 0.0, false, &config, &palette);
        }
        while state.progress() < 0.8 {
            state.advance(DT, 0.0, false, &config, &palette);
            assert_eq!(state.team(), Some(Team(3)));
        }
        while state.state() == AnimationState::Flipping {
            state.advance(DT, 0.0, false, &config, &palette);
        }
        assert_eq!(state.team(), None);
        assert_eq!(state.color(), palette.unowned());
        assert!(state.rotation().abs() < 1e-5);
    }

    #[test]
    fn test_flip_clears_queued_powerup() {
        let config = AnimationConfig::default();
        let palette = TeamPalette::default();
        let base = owned(Tile::unowned(2, 2), 0);
        let mut state = TileState::new(&base, 0.0, 0.0, &palette);

        assert_eq!(
            state.on_tile_changed(&base, &with_powerup(base), 5.0, config.powerup_cooldown),
            Transition::Powerup
        );
        assert_eq!(state.queued(), vec![AnimationState::Powerup]);

        let lost = with_powerup(Tile::unowned(2, 2));
        assert_eq!(
            state.on_tile_changed(&with_powerup(base), &lost, 5.1, config.powerup_cooldown),
            Transition::Flip
        );
        assert_eq!(state.queued(), vec![AnimationState::Jumping]);
    }

    #[test]
    fn test_powerup_within_cooldown_is_suppressed() {
        let config = AnimationConfig::default();
        let palette = TeamPalette::default();
        let prev = Tile::unowned(3, 3);
        let next = owned(prev, 0);
        let mut state = TileState::new(&prev, 0.0, 0.0, &palette);
        state.on_tile_changed(&prev, &next, 10.0, config.powerup_cooldown);

        let stamped = with_powerup(next);
        assert_eq!(state.on_tile_changed(&next, &stamped, 10.5, config.powerup_cooldown), Transition::Suppressed);
        assert_eq!(state.queue_len(), 1);

        // Past the cooldown the stamp queues behind the flip.
        assert_eq!(state.on_tile_changed(&stamped, &next, 11.5, config.powerup_cooldown), Transition::Powerup);
        assert_eq!(state.queued(), vec![AnimationState::Jumping, AnimationState::Powerup]);
    }

    #[test]
    fn test_duplicate_powerup_not_queued_twice() {
        let config = AnimationConfig::default();
        let palette = TeamPalette::default();
        let base = owned(Tile::unowned(4, 4), 0);
        let stamped = with_powerup(base);
        let mut state = TileState::new(&base, 0.0, 0.0, &palette);

        assert_eq!(state.on_tile_changed(&base, &stamped, 5.0, 1.0), Transition::Powerup);
        assert_eq!(state.on_tile_changed(&stamped, &base, 5.0, 1.0), Transition::Suppressed);
        assert_eq!(state.queue_len(), 1);
    }

    #[test]
    fn test_powerup_stamp_returns_to_idle() {
        let config = AnimationConfig::default();
        let palette = TeamPalette::default();
        let base = owned(Tile::unowned(4, 4), 0);
        let mut state = TileState::new(&base, 0.0, 0.0, &palette);
        state.on_tile_changed(&base, &with_powerup(base), 5.0, config.powerup_cooldown);

        let seen = run(&mut state, config.powerup_animation_duration + 0.05, &config, &palette);
        assert_eq!(seen, vec![AnimationState::Powerup, AnimationState::Idle]);
    }

    #[test]
    fn test_fall_lands_at_rest_without_idle_step() {
        let config = AnimationConfig { powerup_float_offset: 0.5, ..AnimationConfig::default() };
        let palette = TeamPalette::default();
        let prev = with_powerup(Tile::unowned(6, 6));
        let next = owned(prev, 1);
        let mut state = TileState::new(&prev, 0.0, 0.0, &palette);
        state.on_tile_changed(&prev, &next, 0.0, config.powerup_cooldown);

        let mut previous = state.state();
        for _ in 0..200 {
            state.advance(DT, 0.0, false, &config, &palette);
            if previous == AnimationState::Falling && state.state() == AnimationState::Idle {
                assert_eq!(state.position().y, 0.0);
                return;
            }
            previous = state.state();
        }
        panic!("fall never completed");
    }

    #[test]
    fn test_idle_hover_rises_and_decays() {
        let config = AnimationConfig::default();
        let palette = TeamPalette::default();
        let tile = Tile::unowned(0, 0);
        let mut state = TileState::new(&tile, 0.0, 0.0, &palette);

        for _ in 0..60 {
            state.advance(DT, 0.0, true, &config, &palette);
        }
        assert_eq!(state.hover_progress(), 1.0);
        assert!(state.position().y > config.hover_height * 0.9);

        for _ in 0..120 {
            state.advance(DT, 0.0, false, &config, &palette);
        }
        assert_eq!(state.hover_progress(), 0.0);
        assert!(state.position().y.abs() < 1e-3);
    }

    #[test]
    fn test_owner_change_without_flip_repaints() {
        let config = AnimationConfig::default();
        let palette = TeamPalette::default();
        let prev = owned(Tile::unowned(7, 7), 0);
        let next = Tile::unowned(7, 7).flipped_to(Address::repeat_byte(0x11), Team(4));
        let mut state = TileState::new(&prev, 0.0, 0.0, &palette);

        assert_eq!(state.on_tile_changed(&prev, &next, 0.0, 1.0), Transition::None);
        state.advance(DT, 0.0, false, &config, &palette);
        assert_eq!(state.team(), Some(Team(4)));
        assert_eq!(state.state(), AnimationState::Idle);
    }
}
