use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Tick budget used while timeout policing is disabled.
pub const DEFAULT_TICK_LIMIT: u32 = 50_000;

/// Timeout ticker fed from a periodic tick source.
///
/// The tick source and the engine's polling loop run in different
/// execution contexts, so every field is atomic with one writer and one
/// reader. The value is meant to live outside the driver (a `static`
/// works) and be borrowed by it:
///
/// ```
/// use rn2483::Ticker;
///
/// static TICKER: Ticker = Ticker::new();
///
/// // timer interrupt / periodic callback:
/// TICKER.tick();
/// ```
pub struct Ticker {
    enabled: AtomicBool,
    armed: AtomicBool,
    ticks: AtomicU32,
    limit: AtomicU32,
    fired: AtomicBool,
}

impl Ticker {
    pub const fn new() -> Self {
        Ticker {
            enabled: AtomicBool::new(false),
            armed: AtomicBool::new(false),
            ticks: AtomicU32::new(0),
            limit: AtomicU32::new(DEFAULT_TICK_LIMIT),
            fired: AtomicBool::new(false),
        }
    }

    /// Count one tick. Only counts while a command is outstanding and
    /// policing is enabled; raises the fired flag once the counter
    /// exceeds the configured budget.
    pub fn tick(&self) {
        if self.enabled.load(Ordering::Relaxed) && self.armed.load(Ordering::Relaxed) {
            let ticks = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
            if ticks > self.limit.load(Ordering::Relaxed) {
                self.fired.store(true, Ordering::Relaxed);
            }
        }
    }

    /// A limit of zero disables timeout policing and restores the
    /// default budget; a nonzero limit enables policing with that
    /// budget.
    pub(crate) fn configure(&self, limit: u32) {
        if limit == 0 {
            self.limit.store(DEFAULT_TICK_LIMIT, Ordering::Relaxed);
            self.enabled.store(false, Ordering::Relaxed);
        } else {
            self.limit.store(limit, Ordering::Relaxed);
            self.enabled.store(true, Ordering::Relaxed);
        }
    }

    /// Arm for a new wait: zero the counter, clear a stale fired flag.
    pub(crate) fn arm(&self) {
        self.ticks.store(0, Ordering::Relaxed);
        self.fired.store(false, Ordering::Relaxed);
        self.armed.store(true, Ordering::Relaxed);
    }

    pub(crate) fn disarm(&self) {
        self.armed.store(false, Ordering::Relaxed);
    }

    /// The fired flag stays raised until consumed here.
    pub(crate) fn take_fired(&self) -> bool {
        self.fired.swap(false, Ordering::Relaxed)
    }

    /// Back to power-on defaults: policing disabled, nothing armed.
    pub(crate) fn reset(&self) {
        self.configure(0);
        self.disarm();
        self.ticks.store(0, Ordering::Relaxed);
        self.fired.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_past_the_configured_limit() {
        let ticker = Ticker::new();
        ticker.configure(3);
        ticker.arm();
        for _ in 0..3 {
            ticker.tick();
        }
        assert!(!ticker.take_fired());
        ticker.tick();
        assert!(ticker.take_fired());
    }

    #[test]
    fn disabled_policing_never_fires() {
        let ticker = Ticker::new();
        ticker.configure(0);
        ticker.arm();
        for _ in 0..DEFAULT_TICK_LIMIT + 10 {
            ticker.tick();
        }
        assert!(!ticker.take_fired());
    }

    #[test]
    fn unarmed_ticks_are_not_counted() {
        let ticker = Ticker::new();
        ticker.configure(2);
        for _ in 0..10 {
            ticker.tick();
        }
        ticker.arm();
        ticker.tick();
        ticker.tick();
        assert!(!ticker.take_fired());
    }

    #[test]
    fn rearming_resets_the_counter_and_the_flag() {
        let ticker = Ticker::new();
        ticker.configure(2);
        ticker.arm();
        for _ in 0..5 {
            ticker.tick();
        }
        ticker.arm();
        ticker.tick();
        assert!(!ticker.take_fired());
    }

    #[test]
    fn fired_stays_raised_until_taken() {
        let ticker = Ticker::new();
        ticker.configure(1);
        ticker.arm();
        ticker.tick();
        ticker.tick();
        ticker.disarm();
        assert!(ticker.take_fired());
        assert!(!ticker.take_fired());
    }
}
