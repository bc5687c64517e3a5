//! Task set tests
//!
//! Drives runners and the full six-task set on the simulation port and
//! checks release timing, overrun handling, load estimation and the
//! producer / consumer path through the queue.

#[cfg(test)]
mod runner_tests {
    use deadline_harness::config::MAX_QUEUE_WAIT_TIME;
    use deadline_harness::instrument::{Instrumentation, PerfMonitor};
    use deadline_harness::port::sim::{SimBudget, SimGpio, SimKernel, SimTimer};
    use deadline_harness::port::Kernel;
    use deadline_harness::queue::MessageQueue;
    use deadline_harness::task::{Button, ButtonMonitor, LoadSimulation, PeriodicRunner};
    use deadline_harness::types::TaskId;

    #[test]
    fn test_releases_on_fixed_grid() {
        let kernel = SimKernel::starting_at(7);
        let gpio = SimGpio::new();
        let perf = PerfMonitor::new();
        let timer = SimTimer::new(&kernel, 1);
        let instr = Instrumentation::new(&gpio, &perf, &timer);
        let queue = MessageQueue::new();

        let monitor = ButtonMonitor::new(Button::One, &gpio, &queue, &kernel);
        let mut runner = PeriodicRunner::new(monitor, 50, &kernel, &instr);

        for k in 0..4 {
            let release = runner.step();
            assert_eq!(release.released_at, 7 + 50 * k);
            assert_eq!(release.finished_at, release.released_at);
            assert_eq!(release.wake, release.released_at + 50);
            assert_eq!(release.skipped, 0);
            kernel.delay_until(release.wake);
        }

        assert_eq!(runner.descriptor().releases(), 4);
        assert_eq!(runner.descriptor().missed(), 0);
        assert_eq!(runner.descriptor().deadline(), 50);
    }

    #[test]
    fn test_late_finish_does_not_drift() {
        let kernel = SimKernel::new();
        let gpio = SimGpio::new();
        let perf = PerfMonitor::new();
        let timer = SimTimer::new(&kernel, 1);
        let instr = Instrumentation::new(&gpio, &perf, &timer);
        let budget = SimBudget::new(&kernel, 1);

        let load = LoadSimulation::new(TaskId::LoadSimulation1, 7, &budget);
        let mut runner = PeriodicRunner::new(load, 10, &kernel, &instr);
        runner.run_for(5);

        // Releases at 0, 10, .. 40, each finishing 7 ticks in
        assert_eq!(kernel.tick_count(), 50);
        assert_eq!(runner.descriptor().last_release(), 50);
        assert_eq!(runner.descriptor().releases(), 5);
        assert_eq!(perf.task_total(TaskId::LoadSimulation1), 35);
        assert_eq!(perf.overruns(TaskId::LoadSimulation1), 0);
    }

    #[test]
    fn test_overrun_skips_without_burst() {
        let kernel = SimKernel::new();
        let gpio = SimGpio::new();
        let perf = PerfMonitor::new();
        let timer = SimTimer::new(&kernel, 1);
        let instr = Instrumentation::new(&gpio, &perf, &timer);
        let budget = SimBudget::new(&kernel, 1);

        let load = LoadSimulation::new(TaskId::LoadSimulation1, 25, &budget);
        let mut runner = PeriodicRunner::new(load, 10, &kernel, &instr);

        let first = runner.step();
        assert_eq!(first.finished_at, 25);
        assert_eq!(first.busy, 25);
        assert_eq!(first.wake, 30);
        assert_eq!(first.skipped, 2);

        kernel.delay_until(first.wake);
        let second = runner.step();
        assert_eq!(second.released_at, 30);
        assert_eq!(second.finished_at, 55);
        assert_eq!(second.wake, 60);
        assert_eq!(second.skipped, 2);

        assert_eq!(runner.descriptor().missed(), 4);
        assert_eq!(perf.overruns(TaskId::LoadSimulation1), 4);
    }

    #[test]
    fn test_future_start_stays_pending() {
        use deadline_harness::task::TaskDescriptor;

        let mut desc = TaskDescriptor::new(TaskId::UartReceiver, 10, 0, 100);
        let slot = desc.advance(95);
        assert_eq!(slot.wake, 100);
        assert_eq!(slot.skipped, 0);
        assert_eq!(desc.last_release(), 100);
        assert_eq!(desc.missed(), 0);

        let slot = desc.advance(103);
        assert_eq!(slot.wake, 110);
        assert_eq!(desc.missed(), 0);
    }

    #[test]
    fn test_finish_on_boundary_loses_that_release() {
        let kernel = SimKernel::new();
        let gpio = SimGpio::new();
        let perf = PerfMonitor::new();
        let timer = SimTimer::new(&kernel, 1);
        let instr = Instrumentation::new(&gpio, &perf, &timer);
        let budget = SimBudget::new(&kernel, 1);

        let load = LoadSimulation::new(TaskId::LoadSimulation2, 10, &budget);
        let mut runner = PeriodicRunner::new(load, 10, &kernel, &instr);

        let release = runner.step();
        assert_eq!(release.wake, 20);
        assert_eq!(release.skipped, 1);
    }

    #[test]
    fn test_release_is_traced() {
        let kernel = SimKernel::new();
        let gpio = SimGpio::new();
        let perf = PerfMonitor::new();
        let timer = SimTimer::new(&kernel, 1);
        let instr = Instrumentation::new(&gpio, &perf, &timer);
        let budget = SimBudget::new(&kernel, 1);

        let load = LoadSimulation::new(TaskId::LoadSimulation2, 3, &budget);
        let mut runner = PeriodicRunner::from_table(load, &kernel, &instr).unwrap();
        assert_eq!(runner.descriptor().period(), 100);
        assert_eq!(runner.descriptor().budget(), 3);
        runner.step();

        use deadline_harness::config::PROBE_IDLE;
        use deadline_harness::instrument::trace_line;
        use deadline_harness::port::sim::PinEvent;
        use deadline_harness::types::Level;

        let line = trace_line(TaskId::LoadSimulation2);
        gpio.with_events(|events| {
            assert_eq!(
                events,
                &[
                    PinEvent { line: PROBE_IDLE, level: Level::Low },
                    PinEvent { line, level: Level::High },
                    PinEvent { line, level: Level::Low },
                ]
            );
        });
    }

    #[test]
    fn test_blocked_producer_stays_in_its_release() {
        let kernel = SimKernel::new();
        let gpio = SimGpio::new();
        let perf = PerfMonitor::new();
        let timer = SimTimer::new(&kernel, 1);
        let instr = Instrumentation::new(&gpio, &perf, &timer);
        let queue = MessageQueue::new();

        use deadline_harness::message::{Message, MessageId};
        use deadline_harness::task::PeriodicTransmitter;
        while queue.try_send(Message::text(MessageId::Periodic, "filler")).is_ok() {}

        let mut runner = PeriodicRunner::from_table(PeriodicTransmitter::new(&queue, &kernel), &kernel, &instr).unwrap();
        let release = runner.step();

        assert_eq!(release.finished_at, MAX_QUEUE_WAIT_TIME);
        assert_eq!(release.busy, MAX_QUEUE_WAIT_TIME);
        assert_eq!(runner.task().dropped(), 1);
        assert_eq!(runner.task().counter(), 1);
    }
}

#[cfg(test)]
mod message_path_tests {
    use deadline_harness::config::{BUTTON_1_INPUT, BUTTON_2_INPUT, MAX_QUEUE_WAIT_TIME};
    use deadline_harness::port::sim::{SimGpio, SimKernel, SimSink};
    use deadline_harness::port::Kernel;
    use deadline_harness::queue::MessageQueue;
    use deadline_harness::task::{Button, ButtonMonitor, PeriodicTask, PeriodicTransmitter, UartReceiver};
    use deadline_harness::types::{Level, TaskId};

    fn sink_text(sink: &SimSink) -> String {
        sink.with_bytes(|bytes| String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_button_edges_reach_sink() {
        let kernel = SimKernel::new();
        let gpio = SimGpio::new();
        let sink = SimSink::new();
        let queue = MessageQueue::new();

        let mut b1 = ButtonMonitor::new(Button::One, &gpio, &queue, &kernel);
        let mut b2 = ButtonMonitor::new(Button::Two, &gpio, &queue, &kernel);
        let mut rx = UartReceiver::new(&queue, &kernel, &sink);
        assert_eq!(b2.id(), TaskId::ButtonMonitor2);

        for (level1, level2) in [
            (Level::Low, Level::Low),
            (Level::High, Level::Low),
            (Level::High, Level::High),
            (Level::Low, Level::High),
        ] {
            gpio.set_input(BUTTON_1_INPUT, level1);
            gpio.set_input(BUTTON_2_INPUT, level2);
            b1.release();
            b2.release();
        }
        assert_eq!(queue.len(), 3);

        for _ in 0..4 {
            rx.release();
        }

        assert_eq!(sink_text(&sink), "Button 1 Rising\nButton 2 Rising\nButton 1 Falling\n");
        assert_eq!(rx.forwarded(), 3);
        assert_eq!(b1.sent(), 2);
        assert_eq!(b2.sent(), 1);
        // Only the last, empty receive waited
        assert_eq!(kernel.tick_count(), MAX_QUEUE_WAIT_TIME);
    }

    #[test]
    fn test_first_sample_high_sends_nothing() {
        let kernel = SimKernel::new();
        let gpio = SimGpio::new();
        let queue = MessageQueue::new();

        gpio.set_input(BUTTON_1_INPUT, Level::High);
        let mut b1 = ButtonMonitor::new(Button::One, &gpio, &queue, &kernel);
        b1.release();
        b1.release();

        assert!(queue.is_empty());
        assert_eq!(b1.sent(), 0);
    }

    #[test]
    fn test_transmitter_numbers_messages() {
        let kernel = SimKernel::new();
        let sink = SimSink::new();
        let queue = MessageQueue::new();

        let mut tx = PeriodicTransmitter::new(&queue, &kernel);
        let mut rx = UartReceiver::new(&queue, &kernel, &sink);
        for _ in 0..3 {
            tx.release();
            rx.release();
        }

        assert_eq!(sink_text(&sink), "Periodic Msg 0\nPeriodic Msg 1\nPeriodic Msg 2\n");
        assert_eq!(sink.lines(), 3);
        assert_eq!(tx.counter(), 3);
        assert_eq!(kernel.tick_count(), 0);
    }

    #[test]
    fn test_edge_dropped_on_full_queue() {
        let kernel = SimKernel::new();
        let gpio = SimGpio::new();
        let queue = MessageQueue::new();

        let mut tx = PeriodicTransmitter::new(&queue, &kernel);
        while !queue.is_full() {
            tx.release();
        }

        let mut b1 = ButtonMonitor::new(Button::One, &gpio, &queue, &kernel);
        b1.release();
        gpio.set_input(BUTTON_1_INPUT, Level::High);
        b1.release();

        assert_eq!(b1.dropped(), 1);
        assert_eq!(b1.sent(), 0);
        assert_eq!(kernel.tick_count(), MAX_QUEUE_WAIT_TIME);
        assert_eq!(queue.len(), queue.capacity());
    }

    #[test]
    fn test_empty_receive_writes_nothing() {
        let kernel = SimKernel::new();
        let sink = SimSink::new();
        let queue = MessageQueue::new();

        let mut rx = UartReceiver::new(&queue, &kernel, &sink);
        rx.release();

        assert_eq!(sink.lines(), 0);
        assert_eq!(rx.forwarded(), 0);
        assert_eq!(kernel.tick_count(), MAX_QUEUE_WAIT_TIME);
    }
}

#[cfg(test)]
mod schedule_tests {
    use deadline_harness::config::*;
    use deadline_harness::instrument::{trace_line, Instrumentation, PerfMonitor};
    use deadline_harness::port::sim::{SimBudget, SimGpio, SimKernel, SimScheduler, SimSink, SimTimer};
    use deadline_harness::queue::MessageQueue;
    use deadline_harness::task::{
        Button, ButtonMonitor, LoadSimulation, PeriodicRunner, PeriodicTransmitter, Schedulable, UartReceiver,
    };
    use deadline_harness::types::{Level, TaskId};

    #[test]
    fn test_load_converges_to_budget_share() {
        for (units, expected) in [(ET_LOAD_1, 50), (3, 30)] {
            let kernel = SimKernel::new();
            let gpio = SimGpio::new();
            let perf = PerfMonitor::new();
            let timer = SimTimer::new(&kernel, 100);
            let instr = Instrumentation::new(&gpio, &perf, &timer);
            let budget = SimBudget::new(&kernel, 1);

            let load = LoadSimulation::new(TaskId::LoadSimulation1, units, &budget);
            let mut runner = PeriodicRunner::from_table(load, &kernel, &instr).unwrap();

            let sched = SimScheduler::new(&kernel, &instr);
            let mut tasks: [&mut dyn Schedulable; 1] = [&mut runner];
            let report = sched.run_until(&mut tasks, 200);

            assert_eq!(report.releases, 20);
            assert_eq!(report.skipped, 0);
            assert_eq!(report.idle_entries, 20);
            assert!(perf.samples() >= 19);
            assert!(
                (perf.cpu_load() as i32 - expected).abs() <= 1,
                "load {} for {} units",
                perf.cpu_load(),
                units
            );
        }
    }

    #[test]
    fn test_long_release_blocks_short_period_task() {
        let kernel = SimKernel::new();
        let gpio = SimGpio::new();
        let perf = PerfMonitor::new();
        let timer = SimTimer::new(&kernel, 1);
        let instr = Instrumentation::new(&gpio, &perf, &timer);
        let budget = SimBudget::new(&kernel, 1);

        let mut l1 = PeriodicRunner::from_table(
            LoadSimulation::new(TaskId::LoadSimulation1, ET_LOAD_1, &budget),
            &kernel,
            &instr,
        )
        .unwrap();
        let mut l2 = PeriodicRunner::from_table(
            LoadSimulation::new(TaskId::LoadSimulation2, ET_LOAD_2, &budget),
            &kernel,
            &instr,
        )
        .unwrap();

        let report = {
            let sched = SimScheduler::new(&kernel, &instr);
            let mut tasks: [&mut dyn Schedulable; 2] = [&mut l1, &mut l2];
            sched.run_until(&mut tasks, 100)
        };

        // Load 2 runs 5..17 and holds the processor past Load 1's release
        // at 10; Load 1 then finishes at 22 and loses the release at 20.
        assert_eq!(report.releases, 10);
        assert_eq!(report.skipped, 1);
        assert_eq!(l1.descriptor().releases(), 9);
        assert_eq!(l1.descriptor().missed(), 1);
        assert_eq!(l2.descriptor().missed(), 0);
        assert_eq!(perf.overruns(TaskId::LoadSimulation1), 1);
        assert_eq!(perf.task_total(TaskId::LoadSimulation1), 45);
        assert_eq!(perf.task_total(TaskId::LoadSimulation2), 12);
    }

    #[test]
    fn test_full_task_set() {
        let kernel = SimKernel::new();
        let gpio = SimGpio::new();
        let sink = SimSink::new();
        let perf = PerfMonitor::new();
        let timer = SimTimer::new(&kernel, 1);
        let instr = Instrumentation::new(&gpio, &perf, &timer);
        let budget = SimBudget::new(&kernel, 1);
        let queue = MessageQueue::new();

        let mut b1 =
            PeriodicRunner::from_table(ButtonMonitor::new(Button::One, &gpio, &queue, &kernel), &kernel, &instr)
                .unwrap();
        let mut b2 =
            PeriodicRunner::from_table(ButtonMonitor::new(Button::Two, &gpio, &queue, &kernel), &kernel, &instr)
                .unwrap();
        let mut tx =
            PeriodicRunner::from_table(PeriodicTransmitter::new(&queue, &kernel), &kernel, &instr).unwrap();
        let mut rx =
            PeriodicRunner::from_table(UartReceiver::new(&queue, &kernel, &sink), &kernel, &instr).unwrap();
        let mut l1 = PeriodicRunner::from_table(
            LoadSimulation::new(TaskId::LoadSimulation1, ET_LOAD_1, &budget),
            &kernel,
            &instr,
        )
        .unwrap();
        let mut l2 = PeriodicRunner::from_table(
            LoadSimulation::new(TaskId::LoadSimulation2, ET_LOAD_2, &budget),
            &kernel,
            &instr,
        )
        .unwrap();

        {
            let sched = SimScheduler::new(&kernel, &instr);
            let mut tasks: [&mut dyn Schedulable; NUMBER_OF_TASKS] =
                [&mut b1, &mut b2, &mut tx, &mut rx, &mut l1, &mut l2];

            let report = sched.run_until(&mut tasks, 100);
            assert!(report.idle_entries > 0);

            gpio.set_input(BUTTON_1_INPUT, Level::High);
            sched.run_until(&mut tasks, 300);

            gpio.set_input(BUTTON_1_INPUT, Level::Low);
            gpio.set_input(BUTTON_2_INPUT, Level::High);
            sched.run_until(&mut tasks, 600);
        }

        let text = sink.with_bytes(|bytes| String::from_utf8(bytes.to_vec()).unwrap());
        let lines: Vec<&str> = text.lines().collect();
        let position = |needle: &str| lines.iter().position(|l| *l == needle);

        let rising = position("Button 1 Rising").expect("button 1 rising forwarded");
        let falling = position("Button 1 Falling").expect("button 1 falling forwarded");
        assert!(rising < falling);
        assert!(position("Button 2 Rising").is_some());
        assert!(position("Button 2 Falling").is_none());
        assert!(position("Periodic Msg 0").unwrap() < position("Periodic Msg 1").unwrap());
        assert!(text.ends_with('\n'));

        assert_eq!(rx.task().forwarded() as usize, lines.len());
        assert_eq!(b1.task().sent(), 2);
        assert_eq!(b2.task().sent(), 1);

        // Every release raised its own trace line exactly once
        assert_eq!(gpio.lost_events(), 0);
        for (id, releases) in [
            (TaskId::ButtonMonitor1, b1.descriptor().releases()),
            (TaskId::PeriodicTransmitter, tx.descriptor().releases()),
            (TaskId::UartReceiver, rx.descriptor().releases()),
            (TaskId::LoadSimulation1, l1.descriptor().releases()),
            (TaskId::LoadSimulation2, l2.descriptor().releases()),
        ] {
            assert_eq!(gpio.rising_writes(trace_line(id)), releases as usize);
        }
        assert!(gpio.rising_writes(PROBE_IDLE) > 0);
        assert_eq!(gpio.level(trace_line(TaskId::LoadSimulation1)), Level::Low);

        assert!(perf.samples() > 0);
        assert!(perf.cpu_load() <= 100);
        assert!(perf.task_total(TaskId::LoadSimulation1) > 0);
    }
}
