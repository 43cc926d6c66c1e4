use embedded_hal::delay::DelayNs;

use crate::bus::RegisterFile;
use crate::clock::AudioClock;
use crate::controller::Controller;
use crate::error::Result;
use crate::format::{DaiFormat, Direction, StreamFormat};
use crate::stream::TriggerCommand;

/// Digital audio interface operations, as registered with an audio framework.
///
/// Each call maps onto one [`Controller`] operation and reports failures
/// through the crate-wide [`Error`](crate::error::Error).
pub trait DaiOps {
    /// Set the serial justification for both directions.
    fn set_fmt(&mut self, fmt: DaiFormat) -> Result<()>;

    /// Apply rate and format parameters to one direction.
    fn hw_params(&mut self, direction: Direction, rate: u32, format: StreamFormat) -> Result<()>;

    /// Start, stop, pause or resume one direction.
    fn trigger(&mut self, direction: Direction, command: TriggerCommand) -> Result<()>;

    /// Forget per-stream state when the stream is closed.
    fn shutdown(&mut self, direction: Direction);
}

impl<R, C, D> DaiOps for Controller<R, C, D>
where
    R: RegisterFile,
    C: AudioClock,
    D: DelayNs,
{
    fn set_fmt(&mut self, fmt: DaiFormat) -> Result<()> {
        Ok(self.set_dai_format(fmt)?)
    }

    fn hw_params(&mut self, direction: Direction, rate: u32, format: StreamFormat) -> Result<()> {
        self.configure(direction, rate, format)?;
        Ok(())
    }

    fn trigger(&mut self, direction: Direction, command: TriggerCommand) -> Result<()> {
        Controller::trigger(self, direction, command)?;
        Ok(())
    }

    fn shutdown(&mut self, direction: Direction) {
        self.release(direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ControllerConfig, Resources};
    use crate::error::{ConfigError, Error, FormatError};
    use crate::format::SampleWidth;
    use crate::mock::{FakeClock, MockDelay, MockRegs};
    use crate::stream::StreamState;

    fn ops() -> Controller<MockRegs, FakeClock, MockDelay> {
        let resources = Resources {
            regs: MockRegs::with_dco_locked(),
            irq: Some(46),
            clock: Some(FakeClock::new(1)),
            ext_clock: None,
            delay: MockDelay::default(),
        };
        Controller::initialize(resources, ControllerConfig::default()).unwrap()
    }

    fn drive<T: DaiOps>(dai: &mut T) -> Result<()> {
        dai.set_fmt(DaiFormat::LeftJustified)?;
        dai.hw_params(
            Direction::Capture,
            96_000,
            StreamFormat::pcm(SampleWidth::S24, 2),
        )?;
        dai.trigger(Direction::Capture, TriggerCommand::Start)?;
        dai.trigger(Direction::Capture, TriggerCommand::PausePush)?;
        dai.trigger(Direction::Capture, TriggerCommand::Stop)
    }

    #[test]
    fn operation_table_drives_controller() {
        let mut ctl = ops();
        drive(&mut ctl).unwrap();
        assert_eq!(ctl.state(Direction::Capture), StreamState::Idle);
    }

    #[test]
    fn errors_are_wrapped() {
        let mut ctl = ops();
        assert_eq!(
            ctl.set_fmt(DaiFormat::DspA),
            Err(Error::Format(FormatError::InvalidFormat))
        );
        assert_eq!(
            ctl.hw_params(Direction::Playback, 8_000, StreamFormat::iec958()),
            Err(Error::Config(ConfigError::Clock(
                crate::error::ClockError::UnsupportedRate(8_000)
            )))
        );
        assert!(matches!(
            DaiOps::trigger(&mut ctl, Direction::Playback, TriggerCommand::PauseRelease),
            Err(Error::Trigger(_))
        ));
    }

    #[test]
    fn shutdown_returns_to_idle() {
        let mut ctl = ops();
        ctl.hw_params(Direction::Playback, 44_100, StreamFormat::iec958())
            .unwrap();
        assert_eq!(ctl.state(Direction::Playback), StreamState::Armed);
        ctl.shutdown(Direction::Playback);
        assert_eq!(ctl.state(Direction::Playback), StreamState::Idle);
    }
}
