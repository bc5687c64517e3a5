//! STM32F4 GPIO port
//!
//! Maps the harness's two logical ports onto GPIOA (probes) and GPIOB
//! (button inputs) through `stm32-metapac`. Writes go through BSRR so no
//! read-modify-write race exists between tasks pulsing different probes.

use stm32_metapac as pac;
use pac::gpio::vals::{Idr, Moder, Ot};

use crate::config::{BUTTON_1_INPUT, BUTTON_2_INPUT, PROBE_TICK};
use crate::instrument::TRACE_MAP;
use crate::port::GpioPort;
use crate::types::{Level, Line, Port};

/// GPIO port backed by GPIOA / GPIOB registers
pub struct Stm32Gpio {
    _private: (),
}

impl Stm32Gpio {
    /// Clock both GPIO blocks, make every probe a push-pull output and
    /// every button line an input
    pub fn init() -> Self {
        pac::RCC.ahb1enr().modify(|w| {
            w.set_gpioaen(true);
            w.set_gpioben(true);
        });

        for line in TRACE_MAP.iter().copied().chain(core::iter::once(PROBE_TICK)) {
            let regs = block(line.port);
            regs.moder().modify(|w| w.set_moder(line.pin as usize, Moder::OUTPUT));
            regs.otyper().modify(|w| w.set_ot(line.pin as usize, Ot::PUSHPULL));
        }

        for line in [BUTTON_1_INPUT, BUTTON_2_INPUT] {
            block(line.port).moder().modify(|w| w.set_moder(line.pin as usize, Moder::INPUT));
        }

        Stm32Gpio { _private: () }
    }
}

fn block(port: Port) -> pac::gpio::Gpio {
    match port {
        Port::Port0 => pac::GPIOA,
        Port::Port1 => pac::GPIOB,
    }
}

impl GpioPort for Stm32Gpio {
    fn read(&self, line: Line) -> Level {
        let idr = block(line.port).idr().read().idr(line.pin as usize);
        Level::from_bool(idr == Idr::HIGH)
    }

    fn write(&self, line: Line, level: Level) {
        let pin = line.pin as usize;
        match level {
            Level::High => block(line.port).bsrr().write(|w| w.set_bs(pin, true)),
            Level::Low => block(line.port).bsrr().write(|w| w.set_br(pin, true)),
        }
    }
}
