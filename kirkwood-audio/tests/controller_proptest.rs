//! Property-based tests for the controller's register contract.
//! Runs against a host-side register file; no hardware needed.

use std::collections::HashMap;

use embedded_hal::delay::DelayNs;
use kirkwood_audio::bus::RegisterFile;
use kirkwood_audio::clock::AudioClock;
use kirkwood_audio::format::{Direction, SampleWidth, StreamFormat};
use kirkwood_audio::iec958::{self, ChannelStatus};
use kirkwood_audio::registers::{self as reg, Register};
use kirkwood_audio::stream::{BurstSize, StreamState, StreamStateMachine, TriggerCommand};
use kirkwood_audio::{Controller, ControllerConfig, Resources};
use proptest::prelude::*;

/// Register file backed by a map; the DCO is always locked.
#[derive(Default)]
struct HostRegs {
    values: HashMap<u16, u32>,
    writes: Vec<(u16, u32)>,
}

impl HostRegs {
    fn get(&self, reg: Register) -> u32 {
        self.values.get(&reg.offset()).copied().unwrap_or(0)
    }
}

impl RegisterFile for HostRegs {
    fn read(&mut self, reg: Register) -> u32 {
        let value = self.get(reg);
        if reg == reg::DCO_SPCR_STATUS {
            value | reg::DCO_SPCR_STATUS_DCO_LOCK
        } else {
            value
        }
    }

    fn write(&mut self, reg: Register, value: u32) {
        self.values.insert(reg.offset(), value);
        self.writes.push((reg.offset(), value));
    }
}

struct HostClock {
    id: u8,
    rates: Vec<u32>,
}

impl HostClock {
    fn new(id: u8) -> Self {
        Self { id, rates: Vec::new() }
    }
}

impl AudioClock for HostClock {
    type Error = ();

    fn prepare_enable(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn disable_unprepare(&mut self) {}

    fn set_rate(&mut self, hz: u32) -> Result<(), ()> {
        self.rates.push(hz);
        Ok(())
    }

    fn is_same_clock(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fn controller(ext_clock: Option<HostClock>) -> Controller<HostRegs, HostClock, NoDelay> {
    let config = ControllerConfig {
        has_external_clock: ext_clock.is_some(),
        ..ControllerConfig::default()
    };
    let resources = Resources {
        regs: HostRegs::default(),
        irq: Some(1),
        clock: Some(HostClock::new(0)),
        ext_clock,
        delay: NoDelay,
    };
    Controller::initialize(resources, config).unwrap()
}

fn command() -> impl Strategy<Value = TriggerCommand> {
    prop_oneof![
        Just(TriggerCommand::Start),
        Just(TriggerCommand::Stop),
        Just(TriggerCommand::PausePush),
        Just(TriggerCommand::Suspend),
        Just(TriggerCommand::PauseRelease),
        Just(TriggerCommand::Resume),
    ]
}

proptest! {
    /// Any channel status written is read back unchanged.
    #[test]
    fn channel_status_survives_registers(bytes in proptest::array::uniform24(any::<u8>())) {
        let mut regs = HostRegs::default();
        let status = ChannelStatus::from(bytes);
        iec958::encode(&mut regs, &status);
        prop_assert_eq!(iec958::decode(&mut regs), status);
    }

    /// Only the non-PCM and validity bits of the SPDIF control change.
    #[test]
    fn channel_status_keeps_other_control_bits(
        ctl in any::<u32>(),
        bytes in proptest::array::uniform24(any::<u8>()),
    ) {
        let mut regs = HostRegs::default();
        regs.write(reg::SPDIF_PLAYCTL, ctl);
        iec958::encode(&mut regs, &ChannelStatus::from(bytes));

        let flags = reg::SPDIF_NON_PCM | reg::SPDIF_REG_VALIDITY;
        let after = regs.get(reg::SPDIF_PLAYCTL);
        prop_assert_eq!(after & !flags, ctl & !flags);
        let expected = if bytes[0] & iec958::AES0_NONAUDIO != 0 { flags } else { 0 };
        prop_assert_eq!(after & flags, expected);
    }

    /// With an external clock every rate in range is requested at 256×.
    #[test]
    fn external_clock_gets_256fs(rate in 8_000u32..=192_000u32) {
        let mut ctl = controller(Some(HostClock::new(1)));
        ctl.configure(Direction::Playback, rate, StreamFormat::pcm(SampleWidth::S16, 2))
            .unwrap();

        let res = ctl.teardown();
        prop_assert_eq!(res.ext_clock.unwrap().rates, vec![rate * 256]);
        prop_assert_eq!(res.regs.get(reg::CLOCKS_CTRL), reg::MCLK_SOURCE_EXTCLK);
    }

    /// Without one, only the DCO rates configure.
    #[test]
    fn dco_rejects_other_rates(rate in any::<u32>()) {
        let mut ctl = controller(None);
        let result = ctl.configure(Direction::Capture, rate, StreamFormat::pcm(SampleWidth::S24, 2));
        prop_assert_eq!(result.is_ok(), [44_100, 48_000, 96_000].contains(&rate));
    }

    /// `modify` never touches bits outside its mask.
    #[test]
    fn modify_respects_mask(initial in any::<u32>(), bits in any::<u32>(), mask in any::<u32>()) {
        let mut regs = HostRegs::default();
        regs.write(reg::PLAYCTL, initial);
        let new = regs.modify(reg::PLAYCTL, bits, mask);
        prop_assert_eq!(new & !mask, initial & !mask);
        prop_assert_eq!(new & mask, bits & mask);
    }

    /// Rejected trigger commands never touch a register.
    #[test]
    fn rejected_commands_write_nothing(commands in proptest::collection::vec(command(), 1..24)) {
        let mut regs = HostRegs::default();
        let mut machine = StreamStateMachine::new(Direction::Playback, BurstSize::B128);

        for cmd in commands {
            let before = machine.state();
            let writes = regs.writes.len();
            match machine.trigger(&mut regs, cmd) {
                Ok(state) => {
                    prop_assert_eq!(state, machine.state());
                    prop_assert!(regs.writes.len() > writes);
                }
                Err(_) => {
                    prop_assert_eq!(machine.state(), before);
                    prop_assert_eq!(regs.writes.len(), writes);
                }
            }
            prop_assert_ne!(machine.state(), StreamState::Armed);
        }
    }
}
