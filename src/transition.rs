use std::time::Duration;

use crate::geom::Point;

/// Lifecycle states for a transitioning screen or widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    /// Fully off screen, not updating visuals.
    Hidden,
    /// Entering: position moving from 1 toward 0.
    TransitionOn,
    /// Fully on screen.
    Active,
    /// Exiting: position moving from 0 toward 1.
    TransitionOff,
}

/// Countdown sized to a transition duration. `lerp` reports what fraction of
/// the total the current tick consumed, which is the per-tick position delta.
#[derive(Debug, Clone, Copy)]
struct CountdownTimer {
    remaining: f32,
    total: f32,
}

impl CountdownTimer {
    fn start(duration: Duration) -> Self {
        let total = duration.as_secs_f32();
        Self {
            remaining: total,
            total,
        }
    }

    /// Advance by `dt` and return the fraction of the total consumed.
    /// A zero-duration timer completes in one tick (fraction 1).
    fn lerp(&mut self, dt: Duration) -> f32 {
        if self.total <= 0.0 {
            self.remaining = 0.0;
            return 1.0;
        }
        let step = dt.as_secs_f32().min(self.remaining);
        self.remaining -= step;
        step / self.total
    }
}

/// Slide/pop directions for position-interpolated transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Wipe {
    /// Fade only, no positional offset.
    #[default]
    None,
    PopLeft,
    PopRight,
    PopTop,
    PopBottom,
    SlideLeft,
    SlideRight,
}

/// Entry offset magnitude in pixels.
const WIPE_ON_DISTANCE: f32 = 256.0;
/// Exit offset magnitude in pixels. Exits travel farther than entries.
const WIPE_OFF_DISTANCE: f32 = 512.0;

/// Timed entrance/exit state machine.
///
/// `position` runs from 1 (fully hidden) to 0 (fully active). Everything
/// else reads from this — alpha fades, wipe offsets — but the owner drives
/// the clock by calling [`Transition::update`] once per tick.
#[derive(Debug, Clone)]
pub struct Transition {
    state: TransitionState,
    on_time: Duration,
    off_time: Duration,
    position: f32,
    timer: CountdownTimer,
    heading_on: bool,
}

impl Transition {
    /// New transition starting fully hidden.
    pub fn new(on_time: Duration, off_time: Duration) -> Self {
        Self {
            state: TransitionState::Hidden,
            on_time,
            off_time,
            position: 1.0,
            timer: CountdownTimer::start(Duration::ZERO),
            heading_on: false,
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// Normalized progress: 0 = fully active, 1 = fully hidden.
    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn alpha(&self) -> f32 {
        1.0 - self.position
    }

    /// Multiply a color's alpha channel by the transition alpha.
    pub fn fade(&self, color: [f32; 4]) -> [f32; 4] {
        [color[0], color[1], color[2], color[3] * self.alpha()]
    }

    /// Advance one tick toward `should_be_on`. Returns `true` while the
    /// transition is still in progress (not yet saturated at either bound).
    pub fn update(&mut self, dt: Duration, should_be_on: bool) -> bool {
        if should_be_on != self.heading_on {
            // Direction flip: restart the countdown sized to the new leg.
            self.heading_on = should_be_on;
            let duration = if should_be_on {
                self.on_time
            } else {
                self.off_time
            };
            self.timer = CountdownTimer::start(duration);
            let next = if should_be_on {
                TransitionState::TransitionOn
            } else {
                TransitionState::TransitionOff
            };
            if self.state != next {
                log::trace!("transition {:?} -> {:?}", self.state, next);
                self.state = next;
            }
        }

        let delta = self.timer.lerp(dt);
        // An exhausted countdown ends the leg even if float residue remains.
        let timer_done = self.timer.remaining <= 0.0;
        if self.heading_on {
            self.position = (self.position - delta).clamp(0.0, 1.0);
            if timer_done {
                self.position = 0.0;
            }
            if self.position <= 0.0 {
                if self.state != TransitionState::Active {
                    log::trace!("transition {:?} -> Active", self.state);
                }
                self.state = TransitionState::Active;
                return false;
            }
            self.state = TransitionState::TransitionOn;
        } else {
            self.position = (self.position + delta).clamp(0.0, 1.0);
            if timer_done {
                self.position = 1.0;
            }
            if self.position >= 1.0 {
                if self.state != TransitionState::Hidden {
                    log::trace!("transition {:?} -> Hidden", self.state);
                }
                self.state = TransitionState::Hidden;
                return false;
            }
            self.state = TransitionState::TransitionOff;
        }
        true
    }

    /// Positional offset for a wipe at the current progress. Quadratic
    /// easing slows the motion near the resting position; entries travel
    /// from [`WIPE_ON_DISTANCE`], exits to [`WIPE_OFF_DISTANCE`].
    pub fn wipe_offset(&self, wipe: Wipe) -> Point {
        let eased = self.position * self.position;
        let magnitude = if self.heading_on {
            WIPE_ON_DISTANCE
        } else {
            WIPE_OFF_DISTANCE
        };
        let d = (eased * magnitude) as i32;
        match wipe {
            Wipe::None => Point::ZERO,
            Wipe::PopLeft | Wipe::SlideLeft => Point::new(-d, 0),
            Wipe::PopRight | Wipe::SlideRight => Point::new(d, 0),
            Wipe::PopTop => Point::new(0, -d),
            Wipe::PopBottom => Point::new(0, d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    fn transition(on_ms: u64, off_ms: u64) -> Transition {
        Transition::new(Duration::from_millis(on_ms), Duration::from_millis(off_ms))
    }

    #[test]
    fn starts_hidden() {
        let t = transition(500, 500);
        assert_eq!(t.state(), TransitionState::Hidden);
        assert!((t.position() - 1.0).abs() < 1e-6);
        assert!(t.alpha().abs() < 1e-6);
    }

    #[test]
    fn transitions_on_over_time() {
        let mut t = transition(500, 500);

        // 5 ticks of 100ms to cover a 500ms on-time.
        for _ in 0..4 {
            assert!(t.update(TICK, true));
            assert_eq!(t.state(), TransitionState::TransitionOn);
        }
        assert!(!t.update(TICK, true));
        assert_eq!(t.state(), TransitionState::Active);
        assert!(t.position().abs() < 1e-5);
        assert!((t.alpha() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn position_monotonic_while_heading_on() {
        let mut t = transition(500, 500);
        let mut prev = t.position();
        for _ in 0..10 {
            t.update(TICK, true);
            assert!(t.position() <= prev);
            assert!((0.0..=1.0).contains(&t.position()));
            prev = t.position();
        }
    }

    #[test]
    fn position_monotonic_while_heading_off() {
        let mut t = transition(100, 500);
        while t.update(TICK, true) {}

        let mut prev = t.position();
        for _ in 0..10 {
            t.update(TICK, false);
            assert!(t.position() >= prev);
            assert!((0.0..=1.0).contains(&t.position()));
            prev = t.position();
        }
        assert_eq!(t.state(), TransitionState::Hidden);
    }

    #[test]
    fn zero_duration_completes_same_tick() {
        let mut t = transition(0, 0);
        assert!(!t.update(TICK, true));
        assert_eq!(t.state(), TransitionState::Active);
        assert!(t.position().abs() < 1e-6);

        assert!(!t.update(TICK, false));
        assert_eq!(t.state(), TransitionState::Hidden);
        assert!((t.position() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn direction_flip_restarts_countdown() {
        let mut t = transition(400, 400);
        // Partway on.
        t.update(TICK, true);
        t.update(TICK, true);
        let midway = t.position();
        assert!(midway > 0.0 && midway < 1.0);

        // Flip to off: the countdown restarts at the full off-time, so one
        // tick moves position by dt/off_time.
        t.update(TICK, false);
        assert_eq!(t.state(), TransitionState::TransitionOff);
        assert!((t.position() - (midway + 0.25)).abs() < 1e-5);
    }

    #[test]
    fn fade_scales_only_alpha() {
        let mut t = transition(200, 200);
        t.update(TICK, true); // position 0.5, alpha 0.5
        let faded = t.fade([0.2, 0.4, 0.6, 0.8]);
        assert_eq!(faded[0], 0.2);
        assert_eq!(faded[1], 0.4);
        assert_eq!(faded[2], 0.6);
        assert!((faded[3] - 0.4).abs() < 1e-5);
    }

    #[test]
    fn wipe_offset_entry_and_exit_magnitudes() {
        let mut t = transition(500, 500);
        // Fully hidden but heading on: offset is the full entry distance.
        t.update(Duration::ZERO, true);
        let on = t.wipe_offset(Wipe::PopLeft);
        assert_eq!(on, Point::new(-256, 0));

        // Fully active then asked off with no time elapsed: position 0.
        let mut t = transition(0, 500);
        t.update(TICK, true);
        t.update(Duration::ZERO, false);
        assert_eq!(t.wipe_offset(Wipe::PopLeft), Point::ZERO);

        // Push most of the way off: offset approaches the exit distance.
        for _ in 0..4 {
            t.update(TICK, false);
        }
        let off = t.wipe_offset(Wipe::PopRight);
        assert!(off.x > 256, "exit should overshoot entry distance: {off:?}");
    }

    #[test]
    fn wipe_none_is_zero() {
        let t = transition(500, 500);
        assert_eq!(t.wipe_offset(Wipe::None), Point::ZERO);
    }

    #[test]
    fn wipe_offset_eases_quadratically() {
        let mut t = transition(1000, 1000);
        t.update(Duration::ZERO, true); // position 1.0
        t.update(Duration::from_millis(500), true); // position 0.5
        let half = t.wipe_offset(Wipe::PopBottom);
        // 0.5^2 * 256 = 64
        assert_eq!(half, Point::new(0, 64));
    }
}
