use embedded_hal::digital::v2::OutputPin;

pub(crate) struct ChipSelect<Pin>
    where Pin: OutputPin,
{
    pin: Pin,
}

impl<Pin> ChipSelect<Pin>
    where Pin: OutputPin,
{
    pub(crate) fn new(pin: Pin) -> Self {
        Self {
            pin,
        }
    }

    /// Drive the line to its idle (unselected) level.
    pub(crate) fn deselect(&mut self) {
        self.pin.set_high().ok();
    }

    pub(crate) fn select(&mut self) -> Selected<'_, Pin> {
        Selected::new(self)
    }

    pub(crate) fn free(self) -> Pin {
        self.pin
    }

    fn set_low(&mut self) {
        self.pin.set_low().ok();
    }

    fn set_high(&mut self) {
        self.pin.set_high().ok();
    }
}

/// Holds the line selected; restores it when dropped.
pub(crate) struct Selected<'pin, Pin>
    where Pin: OutputPin,
{
    cs: &'pin mut ChipSelect<Pin>,
}

impl<'pin, Pin> Selected<'pin, Pin>
    where Pin: OutputPin,
{
    fn new(cs: &'pin mut ChipSelect<Pin>) -> Self {
        cs.set_low();
        Self {
            cs
        }
    }
}

impl<Pin> Drop for Selected<'_, Pin>
    where Pin: OutputPin,
{
    fn drop(&mut self) {
        self.cs.set_high();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockPin;

    #[test]
    fn select_is_scoped() {
        let mut cs = ChipSelect::new(MockPin::new());
        cs.deselect();
        {
            let _selected = cs.select();
        }
        let pin = cs.free();
        assert_eq!(pin.states, [true, false, true]);
    }
}
