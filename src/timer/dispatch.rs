//! # Interrupt dispatch
//!
//! The application's interrupt handler forwards to one of two dispatchers:
//!
//! - [`Timer::handle_interrupt`] calls the callbacks registered with
//!   [`Timer::on_period_elapsed`] and [`Timer::on_capture`];
//! - [`Timer::handle_interrupt_deferred`] turns every pending flag into a
//!   [`TimerEvent`] pushed to a lock-free queue drained at base level.
//!
//! ```rust,ignore
//! static TIMER: Mutex<RefCell<Option<Timer2>>> = Mutex::new(RefCell::new(None));
//!
//! #[interrupt]
//! fn TIM2() {
//!     critical_section::with(|cs| {
//!         if let Some(timer) = TIMER.borrow_ref_mut(cs).as_mut() {
//!             timer.handle_interrupt();
//!         }
//!     });
//! }
//! ```

use heapless::spsc::{Producer, Queue};

use super::{Channel, Error, Event, General, Instance, Timer, TimerId, WithChannel};

/// Callback invoked from [`Timer::handle_interrupt`]
pub type Callback<TIM> = fn(&mut Timer<TIM>);

/// Queue carrying deferred timer events from interrupt to base level
pub type EventQueue<const N: usize> = Queue<TimerEvent, N>;

/// Event recorded by [`Timer::handle_interrupt_deferred`]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// The counter reached its period and reloaded
    PeriodElapsed { timer: TimerId },
    /// `channel` latched `value`
    Capture {
        timer: TimerId,
        channel: Channel,
        value: u16,
    },
}

struct Slot<TIM> {
    handler: Callback<TIM>,
    registered: bool,
}

impl<TIM> Slot<TIM> {
    fn new() -> Self {
        Self {
            handler: noop::<TIM>,
            registered: false,
        }
    }

    fn register(&mut self, handler: Callback<TIM>) -> Result<(), Error> {
        if self.registered {
            return Err(Error::CallbackAlreadySet);
        }
        self.handler = handler;
        self.registered = true;
        Ok(())
    }
}

fn noop<TIM>(_: &mut Timer<TIM>) {}

pub(crate) struct Callbacks<TIM> {
    period_elapsed: Slot<TIM>,
    capture: Slot<TIM>,
}

impl<TIM> Default for Callbacks<TIM> {
    fn default() -> Self {
        Self {
            period_elapsed: Slot::new(),
            capture: Slot::new(),
        }
    }
}

impl<TIM: Instance> Timer<TIM> {
    /// Registers the update event callback
    ///
    /// The callback runs in interrupt context after the update flag has been
    /// cleared. Each slot accepts exactly one registration.
    pub fn on_period_elapsed(&mut self, f: Callback<TIM>) -> Result<(), Error> {
        self.callbacks.period_elapsed.register(f)
    }

    /// Registers the capture/compare callback
    ///
    /// The callback is responsible for reading the capture registers and
    /// clearing the channel flags it handled, see
    /// [`get_interrupt`](Self::get_interrupt) and
    /// [`clear_interrupt`](Self::clear_interrupt).
    pub fn on_capture(&mut self, f: Callback<TIM>) -> Result<(), Error> {
        self.callbacks.capture.register(f)
    }

    /// Services the timer's interrupt line with the registered callbacks
    ///
    /// Reads the status register once. A pending update flag is cleared and
    /// the period-elapsed callback runs; if any capture/compare flag is
    /// pending the capture callback runs once. Returns the flags observed.
    pub fn handle_interrupt(&mut self) -> Event {
        let flags = self.tim.get_interrupt_flag();
        if flags.contains(Event::Update) {
            self.tim.clear_interrupt_flag(Event::Update);
            let f = self.callbacks.period_elapsed.handler;
            f(self);
        }
        if flags.intersects(Event::capture()) {
            let f = self.callbacks.capture.handler;
            f(self);
        }
        flags
    }

    /// Services the timer's interrupt line by queueing events
    ///
    /// Reads the status register once, then for the update flag and for each
    /// capture/compare flag in channel order: latches the capture value,
    /// clears exactly that flag and enqueues the matching [`TimerEvent`].
    /// Flags are cleared even when the queue is full, in which case
    /// `Err(Error::QueueFull)` is returned after every flag was handled.
    pub fn handle_interrupt_deferred<const N: usize>(
        &mut self,
        events: &mut Producer<'_, TimerEvent, N>,
    ) -> Result<Event, Error> {
        let flags = self.tim.get_interrupt_flag();
        let mut overflow = false;
        if flags.contains(Event::Update) {
            self.tim.clear_interrupt_flag(Event::Update);
            overflow |= events
                .enqueue(TimerEvent::PeriodElapsed { timer: TIM::ID })
                .is_err();
        }
        for channel in Channel::ALL {
            let event = channel.event();
            if flags.contains(event) {
                let value = self.tim.read_cc_value(channel.index());
                self.tim.clear_interrupt_flag(event);
                overflow |= events
                    .enqueue(TimerEvent::Capture {
                        timer: TIM::ID,
                        channel,
                        value,
                    })
                    .is_err();
            }
        }
        if overflow {
            Err(Error::QueueFull)
        } else {
            Ok(flags)
        }
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::mock;

    #[test]
    fn update_and_capture_in_one_entry() {
        static PERIODS: AtomicUsize = AtomicUsize::new(0);
        static CAPTURES: AtomicUsize = AtomicUsize::new(0);
        fn on_period(_: &mut Timer<mock::Tim2>) {
            PERIODS.fetch_add(1, Ordering::Relaxed);
        }
        fn on_capture(_: &mut Timer<mock::Tim2>) {
            CAPTURES.fetch_add(1, Ordering::Relaxed);
        }

        let tim = mock::Tim2::new();
        let regs = tim.regs();
        let mut timer = Timer::new(tim);
        timer.on_period_elapsed(on_period).unwrap();
        timer.on_capture(on_capture).unwrap();

        regs.sr().write(|w| unsafe { w.bits(0b0101) });
        let flags = timer.handle_interrupt();

        assert_eq!(flags, Event::Update | Event::C2);
        assert_eq!(PERIODS.load(Ordering::Relaxed), 1);
        assert_eq!(CAPTURES.load(Ordering::Relaxed), 1);
        // only UIF was written to zero, CC2IF is left to the callback
        let sr = regs.sr().read().bits();
        assert_eq!(sr & 0b0001, 0);
        assert_eq!(sr & 0b0100, 0b0100);
    }

    #[test]
    fn capture_callback_reads_and_clears() {
        static LATCHED: AtomicUsize = AtomicUsize::new(0);
        fn on_capture(timer: &mut Timer<mock::Tim3>) {
            if timer.get_interrupt().contains(Event::C1) {
                LATCHED.store(timer.read_capture(Channel::C1).into(), Ordering::Relaxed);
                timer.clear_interrupt(Event::C1);
            }
        }

        let tim = mock::Tim3::new();
        let regs = tim.regs();
        let mut timer = Timer::new(tim);
        timer.on_capture(on_capture).unwrap();
        regs.ccr(0).write(|w| unsafe { w.bits(777) });
        regs.sr().write(|w| unsafe { w.bits(Event::C1.bits()) });

        assert_eq!(timer.handle_interrupt(), Event::C1);
        assert_eq!(LATCHED.load(Ordering::Relaxed), 777);
        assert_eq!(regs.sr().read().bits() & Event::C1.bits(), 0);
    }

    #[test]
    fn unregistered_slots_do_nothing() {
        let tim = mock::Tim2::new();
        let regs = tim.regs();
        let mut timer = Timer::new(tim);
        regs.sr().write(|w| unsafe { w.bits(0b1_0001) });
        assert_eq!(timer.handle_interrupt(), Event::Update | Event::C4);
        assert_eq!(regs.sr().read().bits(), 0xfffe);
    }

    #[test]
    fn quiet_line_calls_nothing() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        fn count(_: &mut Timer<mock::Tim4>) {
            CALLS.fetch_add(1, Ordering::Relaxed);
        }
        let tim = mock::Tim4::new();
        let regs = tim.regs();
        let mut timer = Timer::new(tim);
        timer.on_period_elapsed(count).unwrap();
        timer.on_capture(count).unwrap();
        assert!(timer.handle_interrupt().is_empty());
        assert_eq!(CALLS.load(Ordering::Relaxed), 0);
        assert_eq!(regs.sr().read().bits(), 0);
    }

    #[test]
    fn callbacks_register_once() {
        fn first(_: &mut Timer<mock::Tim2>) {}
        fn second(_: &mut Timer<mock::Tim2>) {}
        let mut timer = Timer::new(mock::Tim2::new());
        assert_eq!(timer.on_period_elapsed(first), Ok(()));
        assert_eq!(timer.on_period_elapsed(second), Err(Error::CallbackAlreadySet));
        assert_eq!(timer.on_capture(first), Ok(()));
        assert_eq!(timer.on_capture(second), Err(Error::CallbackAlreadySet));
    }

    #[test]
    fn deferred_events_in_channel_order() {
        let mut queue: EventQueue<8> = Queue::new();
        let (mut tx, mut rx) = queue.split();

        let tim = mock::Tim3::new();
        let regs = tim.regs();
        let mut timer = Timer::new(tim);
        regs.ccr(1).write(|w| unsafe { w.bits(20) });
        regs.ccr(3).write(|w| unsafe { w.bits(40) });
        regs.sr().write(|w| unsafe { w.bits(0b1_0101) });

        let flags = timer.handle_interrupt_deferred(&mut tx).unwrap();
        assert_eq!(flags, Event::Update | Event::C2 | Event::C4);

        assert_eq!(
            rx.dequeue(),
            Some(TimerEvent::PeriodElapsed {
                timer: TimerId::Tim3
            })
        );
        assert_eq!(
            rx.dequeue(),
            Some(TimerEvent::Capture {
                timer: TimerId::Tim3,
                channel: Channel::C2,
                value: 20,
            })
        );
        assert_eq!(
            rx.dequeue(),
            Some(TimerEvent::Capture {
                timer: TimerId::Tim3,
                channel: Channel::C4,
                value: 40,
            })
        );
        assert_eq!(rx.dequeue(), None);
        // last write cleared CC4IF alone
        assert_eq!(regs.sr().read().bits(), 0xffff & !Event::C4.bits());
    }

    #[test]
    fn deferred_overflow_still_clears() {
        // capacity N - 1
        let mut queue: EventQueue<2> = Queue::new();
        let (mut tx, mut rx) = queue.split();

        let tim = mock::Tim2::new();
        let regs = tim.regs();
        let mut timer = Timer::new(tim);
        regs.sr().write(|w| unsafe { w.bits(0b0011) });

        assert_eq!(
            timer.handle_interrupt_deferred(&mut tx),
            Err(Error::QueueFull)
        );
        assert_eq!(regs.sr().read().bits(), 0xffff & !Event::C1.bits());
        assert_eq!(
            rx.dequeue(),
            Some(TimerEvent::PeriodElapsed {
                timer: TimerId::Tim2
            })
        );
        assert_eq!(rx.dequeue(), None);
    }
}
