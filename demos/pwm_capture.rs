//! PWM on TIM4 channel 1 measured by input capture on TIM3 channel 1
//!
//! Wire PB6 (TIM4_CH1) to PA6 (TIM3_CH1). PB6 must be configured as an
//! alternate function push-pull output beforehand, PA6 stays a floating input.
//!
//! Capture events are queued from the interrupt and drained in the main loop.

#![no_main]
#![no_std]

use panic_halt as _;

use core::cell::RefCell;

use cortex_m_rt::entry;
use critical_section::Mutex;
use heapless::spsc::{Producer, Queue};
use stm32f1xx_timer::{
    nvic::InterruptController,
    pac::{self, interrupt},
    prelude::*,
    timer::{
        CaptureConfig, CaptureFilter, CapturePolarity, Channel, EventQueue, Instance, Ocm,
        PwmConfig, Timer, Timer3, TimerEvent,
    },
};

type Tx = Producer<'static, TimerEvent, 8>;

static G_CAPTURE: Mutex<RefCell<Option<(Timer3, Tx)>>> = Mutex::new(RefCell::new(None));

#[interrupt]
fn TIM3() {
    critical_section::with(|cs| {
        if let Some((tim, tx)) = G_CAPTURE.borrow_ref_mut(cs).as_mut() {
            // a full queue only drops samples
            tim.handle_interrupt_deferred(tx).ok();
        }
    });
}

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();
    let mut rcc = dp.RCC.constrain();

    let queue: &'static mut EventQueue<8> = cortex_m::singleton!(: EventQueue<8> = Queue::new()).unwrap();
    let (tx, mut rx) = queue.split();

    // 1 kHz, 25 % duty off the 8 MHz HSI
    let mut pwm = Timer::new(dp.TIM4);
    pwm.base = pwm.base.prescaler(7).period(999);
    pwm.pwm = PwmConfig::default().mode(Ocm::PwmMode1).pulse(250);
    pwm.init(&mut rcc);
    pwm.init_pwm(Channel::C1);
    pwm.start_pwm(Channel::C1);
    pwm.start();

    // 1 MHz capture clock
    let mut ic = Timer::new(dp.TIM3);
    ic.base = ic.base.prescaler(7);
    ic.capture = CaptureConfig::default()
        .polarity(CapturePolarity::Rising)
        .filter(CaptureFilter::FckIntN8);
    ic.init(&mut rcc);
    ic.init_capture(Channel::C1);
    ic.start_capture_interrupt(Channel::C1);

    critical_section::with(|cs| G_CAPTURE.borrow(cs).replace(Some((ic, tx))));

    let mut nvic = InterruptController::new(cp.NVIC);
    nvic.set_priority(pac::TIM3::CAPTURE_IRQ, 2);
    nvic.enable(pac::TIM3::CAPTURE_IRQ);

    let mut last: Option<u16> = None;
    let mut period_us: u16 = 0;
    loop {
        while let Some(event) = rx.dequeue() {
            if let TimerEvent::Capture { value, .. } = event {
                if let Some(prev) = last {
                    period_us = value.wrapping_sub(prev);
                }
                last = Some(value);
            }
        }
        // about 1000 once both timers run
        core::hint::black_box(period_us);
        cortex_m::asm::wfi();
    }
}
