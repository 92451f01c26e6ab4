//! Period-elapsed callback on TIM2 every second
//!
//! Assumes the default 8 MHz HSI clock: PSC = 7999 gives a 1 kHz counter and
//! ARR = 999 a 1 Hz update event.

#![no_main]
#![no_std]

use panic_halt as _;

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::asm::wfi;
use cortex_m_rt::entry;
use critical_section::Mutex;
use stm32f1xx_timer::{
    nvic::InterruptController,
    pac::{self, interrupt},
    prelude::*,
    timer::{Direction, Instance, Timer, Timer2},
};

static G_TIM: Mutex<RefCell<Option<Timer2>>> = Mutex::new(RefCell::new(None));

static SECONDS: AtomicU32 = AtomicU32::new(0);

fn tick(_: &mut Timer2) {
    SECONDS.fetch_add(1, Ordering::Relaxed);
}

#[interrupt]
fn TIM2() {
    critical_section::with(|cs| {
        if let Some(tim) = G_TIM.borrow_ref_mut(cs).as_mut() {
            tim.handle_interrupt();
        }
    });
}

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();
    let mut rcc = dp.RCC.constrain();

    let mut timer = Timer::new(dp.TIM2);
    timer.base = timer
        .base
        .prescaler(7999)
        .period(999)
        .direction(Direction::Up);
    timer.init(&mut rcc);
    timer.on_period_elapsed(tick).unwrap();
    timer.start_with_interrupt();

    critical_section::with(|cs| G_TIM.borrow(cs).replace(Some(timer)));

    let mut nvic = InterruptController::new(cp.NVIC);
    nvic.unpend(pac::TIM2::UPDATE_IRQ);
    nvic.set_priority(pac::TIM2::UPDATE_IRQ, 1);
    nvic.enable(pac::TIM2::UPDATE_IRQ);

    loop {
        wfi();
    }
}
