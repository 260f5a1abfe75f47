//! Distance integration - odometer and trip meter.
//!
//! Speed samples (km/h) are integrated over the elapsed time between
//! ticks into a fractional meter remainder. Only whole meters are flushed
//! into the integer totals, so the persisted counters never carry
//! floating-point drift; the bounded remainder holds all fractional error.
//!
//! Invariants:
//!   - `remainder` stays in `[0, 1)` meter.
//!   - `total_m` never decreases; `trip_m <= total_m`.
//!   - The first tick after (re)start only primes the clock.

use crate::config::{ClusterConfig, MAX_SPEED_KMH};

/// Milliseconds per hour, for km/h × ms → m conversion.
const MS_PER_HOUR: f32 = 3_600.0;

/// Anything that owns a resettable trip meter.
pub trait TripReset {
    fn reset_trip(&mut self);
}

/// Result of a single `advance` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdvanceOutcome {
    /// Trip distance after this tick (m).
    pub trip_m: u32,
    /// Odometer total after this tick (m).
    pub total_m: u64,
    /// Whole meters flushed into the totals during this tick.
    pub delta_m: u64,
    /// Sanitized speed for this tick was zero.
    pub stationary: bool,
}

/// Integrates speed over time into odometer and trip totals.
#[derive(Clone, Debug)]
pub struct DistanceAccumulator {
    total_m: u64,
    trip_m: u32,
    remainder_m: f32,
    last_ms: Option<u64>,
    meters_per_km: u64,
}

impl DistanceAccumulator {
    /// Create an accumulator at zero distance.
    pub const fn new(config: &ClusterConfig) -> Self {
        Self {
            total_m: 0,
            trip_m: 0,
            remainder_m: 0.0,
            last_ms: None,
            meters_per_km: config.meters_per_km,
        }
    }

    /// Seed totals loaded from storage. Trip is clamped to the total.
    ///
    /// The clock is unprimed again, so the next `advance` only records
    /// its timestamp.
    pub fn restore(&mut self, total_m: u64, trip_m: u32) {
        self.total_m = total_m;
        self.trip_m = if u64::from(trip_m) > total_m {
            crate::log_warn!("Odometer: stored trip {} exceeds total {}", trip_m, total_m);
            total_m as u32
        } else {
            trip_m
        };
        self.remainder_m = 0.0;
        self.last_ms = None;
    }

    /// Integrate `speed_kmh` over the time since the previous call.
    ///
    /// Negative, non-finite and implausibly high speeds count as
    /// standstill. A timestamp older than the previous one counts as zero
    /// elapsed time.
    pub fn advance(&mut self, speed_kmh: f32, now_ms: u64) -> AdvanceOutcome {
        let speed = sanitize_speed(speed_kmh);
        if speed != speed_kmh {
            crate::log_debug!("Odometer: invalid speed sample clamped to 0");
        }

        let elapsed_ms = match self.last_ms {
            None => {
                self.last_ms = Some(now_ms);
                return self.outcome(0, speed);
            }
            Some(last) if now_ms < last => {
                crate::log_warn!("Odometer: clock went backwards {} -> {}", last, now_ms);
                0
            }
            Some(last) => now_ms - last,
        };
        self.last_ms = Some(now_ms);

        if speed > 0.0 && elapsed_ms > 0 {
            self.remainder_m += speed * elapsed_ms as f32 / MS_PER_HOUR;
        }

        // remainder - trunc(remainder) is exact in binary floating point,
        // so the flush neither loses nor duplicates distance.
        let whole = self.remainder_m as u64;
        if whole > 0 {
            self.remainder_m -= whole as f32;
            if !(0.0..1.0).contains(&self.remainder_m) {
                // Cast saturated; distance past u64::MAX cannot be counted.
                self.remainder_m = 0.0;
            }
            self.total_m = self.total_m.saturating_add(whole);
            self.trip_m = self
                .trip_m
                .saturating_add(u32::try_from(whole).unwrap_or(u32::MAX));
        }

        self.outcome(whole, speed)
    }

    fn outcome(&self, delta_m: u64, speed: f32) -> AdvanceOutcome {
        AdvanceOutcome {
            trip_m: self.trip_m,
            total_m: self.total_m,
            delta_m,
            stationary: speed == 0.0,
        }
    }

    /// Odometer total (m).
    pub fn total_m(&self) -> u64 {
        self.total_m
    }

    /// Trip distance (m).
    pub fn trip_m(&self) -> u32 {
        self.trip_m
    }

    /// Fractional meter not yet flushed into the totals.
    pub fn remainder_m(&self) -> f32 {
        self.remainder_m
    }

    /// Odometer display value: whole kilometers, truncated.
    pub fn odometer_km(&self) -> u64 {
        self.total_m / self.meters_per_km
    }

    /// Trip display value in tenths of a kilometer, truncated.
    pub fn trip_tenths(&self) -> u32 {
        (u64::from(self.trip_m) / (self.meters_per_km / 10)) as u32
    }

    /// Trip display value in kilometers with one decimal.
    pub fn trip_km(&self) -> f32 {
        self.trip_tenths() as f32 / 10.0
    }
}

impl TripReset for DistanceAccumulator {
    /// Zero the trip meter. Odometer total and remainder are untouched.
    fn reset_trip(&mut self) {
        self.trip_m = 0;
    }
}

/// Clamp a raw speed sample to a usable value. NaN, infinities, negative
/// speeds and anything above `MAX_SPEED_KMH` become 0 (standstill).
pub fn sanitize_speed(speed_kmh: f32) -> f32 {
    if speed_kmh > 0.0 && speed_kmh <= MAX_SPEED_KMH {
        speed_kmh
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accumulator() -> DistanceAccumulator {
        DistanceAccumulator::new(&ClusterConfig::default())
    }

    /// xorshift64 - deterministic sample sequences without an RNG crate.
    struct XorShift(u64);

    impl XorShift {
        fn next(&mut self) -> u64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            x
        }

        fn below(&mut self, bound: u64) -> u64 {
            self.next() % bound
        }
    }

    #[test]
    fn first_tick_only_primes_clock() {
        let mut acc = accumulator();
        let out = acc.advance(100.0, 5_000);
        assert_eq!(out.total_m, 0);
        assert_eq!(out.delta_m, 0);
        assert_eq!(acc.remainder_m(), 0.0);
    }

    #[test]
    fn integrates_speed_over_elapsed_time() {
        let mut acc = accumulator();
        acc.advance(36.0, 0);
        // 36 km/h = 10 m/s, for 1 s
        let out = acc.advance(36.0, 1_000);
        assert_eq!(out.total_m, 10);
        assert_eq!(out.trip_m, 10);
        assert_eq!(out.delta_m, 10);
        assert!(!out.stationary);
    }

    #[test]
    fn fractional_meters_carry_across_ticks() {
        let mut acc = accumulator();
        acc.advance(18.0, 0);
        // 18 km/h = 5 m/s -> 0.5 m per 100 ms
        let out = acc.advance(18.0, 100);
        assert_eq!(out.total_m, 0);
        assert!((acc.remainder_m() - 0.5).abs() < 1e-6);

        let out = acc.advance(18.0, 200);
        assert_eq!(out.total_m, 1);
        assert_eq!(out.delta_m, 1);
        assert!(acc.remainder_m() < 1e-6);
    }

    #[test]
    fn negative_and_nan_speed_count_as_standstill() {
        let mut acc = accumulator();
        acc.advance(0.0, 0);
        for (i, speed) in [-20.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY]
            .into_iter()
            .enumerate()
        {
            let out = acc.advance(speed, (i as u64 + 1) * 1_000);
            assert_eq!(out.total_m, 0);
            assert!(out.stationary);
        }
        assert_eq!(acc.remainder_m(), 0.0);
    }

    #[test]
    fn absurd_speed_is_clamped() {
        let mut acc = accumulator();
        acc.advance(0.0, 0);
        let out = acc.advance(1e30, 10);
        assert_eq!(out.total_m, 0);
        assert!(out.stationary);

        let out = acc.advance(0.0, 20);
        assert_eq!(out.delta_m, 0);
        assert_eq!(acc.remainder_m(), 0.0);

        // The ceiling itself is still a valid sample: 400 km/h for 9 ms = 1 m.
        let out = acc.advance(MAX_SPEED_KMH, 29);
        assert_eq!(out.total_m, 1);
    }

    #[test]
    fn huge_elapsed_time_keeps_remainder_bounded() {
        let mut acc = accumulator();
        acc.advance(MAX_SPEED_KMH, 0);
        let out = acc.advance(MAX_SPEED_KMH, u64::MAX);
        assert!(out.total_m > 0);
        assert!(acc.remainder_m() >= 0.0 && acc.remainder_m() < 1.0);

        let out = acc.advance(0.0, u64::MAX);
        assert_eq!(out.delta_m, 0);
    }

    #[test]
    fn saturated_total_keeps_remainder_bounded() {
        let mut acc = accumulator();
        acc.restore(u64::MAX - 5, 0);
        acc.advance(MAX_SPEED_KMH, 0);
        acc.advance(MAX_SPEED_KMH, 3_600_000);
        assert_eq!(acc.total_m(), u64::MAX);
        assert!(acc.remainder_m() >= 0.0 && acc.remainder_m() < 1.0);
    }

    #[test]
    fn sanitize_speed_bounds() {
        assert_eq!(sanitize_speed(88.5), 88.5);
        assert_eq!(sanitize_speed(MAX_SPEED_KMH), MAX_SPEED_KMH);
        assert_eq!(sanitize_speed(MAX_SPEED_KMH + 1.0), 0.0);
        assert_eq!(sanitize_speed(-1.0), 0.0);
        assert_eq!(sanitize_speed(f32::NAN), 0.0);
        assert_eq!(sanitize_speed(f32::INFINITY), 0.0);
    }

    #[test]
    fn clock_regression_adds_no_distance() {
        let mut acc = accumulator();
        acc.advance(36.0, 10_000);
        let out = acc.advance(36.0, 5_000);
        assert_eq!(out.total_m, 0);

        // Integration resumes from the regressed timestamp.
        let out = acc.advance(36.0, 6_000);
        assert_eq!(out.total_m, 10);
    }

    #[test]
    fn reset_trip_keeps_total_and_remainder() {
        let mut acc = accumulator();
        acc.advance(36.0, 0);
        acc.advance(36.0, 1_050);
        let remainder = acc.remainder_m();

        acc.reset_trip();
        assert_eq!(acc.trip_m(), 0);
        assert_eq!(acc.trip_tenths(), 0);
        assert_eq!(acc.total_m(), 10);
        assert_eq!(acc.remainder_m(), remainder);

        acc.reset_trip();
        assert_eq!(acc.trip_m(), 0);
        assert_eq!(acc.total_m(), 10);
    }

    #[test]
    fn display_values_truncate() {
        let mut acc = accumulator();
        acc.restore(12_999, 1_299);
        assert_eq!(acc.odometer_km(), 12);
        assert_eq!(acc.trip_tenths(), 12);
        assert!((acc.trip_km() - 1.2).abs() < 1e-6);

        acc.restore(13_000, 1_300);
        assert_eq!(acc.odometer_km(), 13);
        assert_eq!(acc.trip_tenths(), 13);
    }

    #[test]
    fn restore_clamps_trip_and_unprimes_clock() {
        let mut acc = accumulator();
        acc.advance(50.0, 0);
        acc.restore(500, 900);
        assert_eq!(acc.total_m(), 500);
        assert_eq!(acc.trip_m(), 500);

        let out = acc.advance(36.0, 60_000);
        assert_eq!(out.total_m, 500);
    }

    #[test]
    fn totals_monotonic_and_trip_tracks_since_reset() {
        let mut rng = XorShift(0x9E37_79B9_7F4A_7C15);
        let mut acc = accumulator();
        let mut now = 0u64;
        acc.advance(0.0, now);

        let mut last_total = 0;
        let mut total_at_reset = 0;
        for step in 0..20_000 {
            now += rng.below(200);
            let speed = rng.below(2_500) as f32 / 10.0;
            let out = acc.advance(speed, now);
            assert!(out.total_m >= last_total);
            assert!(u64::from(out.trip_m) <= out.total_m);
            assert_eq!(u64::from(out.trip_m), out.total_m - total_at_reset);
            last_total = out.total_m;

            if step % 5_000 == 4_999 {
                acc.reset_trip();
                total_at_reset = acc.total_m();
            }
        }
    }

    #[test]
    fn fractional_conservation_against_reference_integral() {
        let mut rng = XorShift(0x0123_4567_89AB_CDEF);
        let mut acc = accumulator();
        let mut now = 0u64;
        acc.advance(0.0, now);

        let ticks = 50_000;
        let mut reference_m = 0.0f64;
        for _ in 0..ticks {
            let dt = 1 + rng.below(100);
            now += dt;
            let speed = rng.below(3_000) as f32 / 10.0;
            reference_m += f64::from(speed) * dt as f64 / 3_600.0;
            acc.advance(speed, now);
        }

        let integrated = acc.total_m() as f64 + f64::from(acc.remainder_m());
        // Per-tick f32 rounding on deltas below ~8.4 m.
        let tolerance = ticks as f64 * 1e-6;
        assert!(
            (integrated - reference_m).abs() <= tolerance,
            "integrated {integrated} vs reference {reference_m}"
        );
        assert!(acc.remainder_m() >= 0.0 && acc.remainder_m() < 1.0);
    }
}
