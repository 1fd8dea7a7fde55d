use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::timer::CountDown;

use embedded_time::duration::{Duration, Milliseconds};
use nb::block;

/// Blocking millisecond delay built on a countdown timer peripheral.
///
/// The driver consumes a `DelayMs<u32>` for its reset handshake; boards
/// that only expose a `CountDown` timer can wrap it in this adapter.
pub struct DelayTimer<CD>
    where
        CD: CountDown,
        CD::Time: Duration + From<Milliseconds>,
{
    count_down: CD,
}

impl<CD> DelayTimer<CD>
    where
        CD: CountDown,
        CD::Time: Duration + From<Milliseconds>,
{
    pub fn new(count_down: CD) -> Self {
        Self {
            count_down,
        }
    }

    pub fn free(self) -> CD {
        self.count_down
    }
}

impl<CD> DelayMs<u32> for DelayTimer<CD>
    where
        CD: CountDown,
        CD::Time: Duration + From<Milliseconds>,
{
    fn delay_ms(&mut self, ms: u32) {
        let duration = Milliseconds(ms);
        self.count_down.start(duration);
        block!(self.count_down.wait()).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockCountDown {
        started: Vec<u32>,
    }

    impl CountDown for MockCountDown {
        type Time = Milliseconds;

        fn start<T>(&mut self, count: T)
        where
            T: Into<Milliseconds>,
        {
            self.started.push(count.into().0);
        }

        fn wait(&mut self) -> nb::Result<(), void::Void> {
            Ok(())
        }
    }

    #[test]
    fn delays_start_the_timer_with_the_requested_duration() {
        let mut delay = DelayTimer::new(MockCountDown { started: Vec::new() });
        delay.delay_ms(100);
        delay.delay_ms(1000);
        assert_eq!(delay.free().started, [100, 1000]);
    }
}
