//! Six-task set on the host simulation
//!
//! Runs the full task set for two simulated seconds, toggling both
//! buttons along the way, then prints the forwarded messages and the
//! timing figures.

use deadline_harness::config::*;
use deadline_harness::instrument::{Instrumentation, PerfMonitor};
use deadline_harness::port::sim::{SimBudget, SimGpio, SimKernel, SimScheduler, SimSink, SimTimer};
use deadline_harness::queue::MessageQueue;
use deadline_harness::task::{
    Button, ButtonMonitor, LoadSimulation, PeriodicRunner, PeriodicTransmitter, Schedulable, UartReceiver,
};
use deadline_harness::types::{Level, TaskId};

fn main() {
    let kernel = SimKernel::new();
    let gpio = SimGpio::new();
    let sink = SimSink::new();
    let perf = PerfMonitor::new();
    let timer = SimTimer::new(&kernel, 84_000);
    let instr = Instrumentation::new(&gpio, &perf, &timer);
    let budget = SimBudget::new(&kernel, 1);
    let queue = MessageQueue::new();

    let b1 = ButtonMonitor::new(Button::One, &gpio, &queue, &kernel);
    let b2 = ButtonMonitor::new(Button::Two, &gpio, &queue, &kernel);
    let tx = PeriodicTransmitter::new(&queue, &kernel);
    let rx = UartReceiver::new(&queue, &kernel, &sink);
    let l1 = LoadSimulation::new(TaskId::LoadSimulation1, ET_LOAD_1, &budget);
    let l2 = LoadSimulation::new(TaskId::LoadSimulation2, ET_LOAD_2, &budget);

    let (Some(mut b1), Some(mut b2), Some(mut tx), Some(mut rx), Some(mut l1), Some(mut l2)) = (
        PeriodicRunner::from_table(b1, &kernel, &instr),
        PeriodicRunner::from_table(b2, &kernel, &instr),
        PeriodicRunner::from_table(tx, &kernel, &instr),
        PeriodicRunner::from_table(rx, &kernel, &instr),
        PeriodicRunner::from_table(l1, &kernel, &instr),
        PeriodicRunner::from_table(l2, &kernel, &instr),
    ) else {
        eprintln!("task table is missing an entry");
        return;
    };

    let sched = SimScheduler::new(&kernel, &instr);
    let mut tasks: [&mut dyn Schedulable; NUMBER_OF_TASKS] = [&mut b1, &mut b2, &mut tx, &mut rx, &mut l1, &mut l2];

    let steps = [
        (250, BUTTON_1_INPUT, Level::High),
        (600, BUTTON_2_INPUT, Level::High),
        (900, BUTTON_1_INPUT, Level::Low),
        (1400, BUTTON_2_INPUT, Level::Low),
    ];
    let mut releases = 0;
    let mut skipped = 0;
    for (at, line, level) in steps {
        let report = sched.run_until(&mut tasks, at);
        releases += report.releases;
        skipped += report.skipped;
        gpio.set_input(line, level);
    }
    let report = sched.run_until(&mut tasks, 2 * CFG_TICK_RATE_HZ);
    releases += report.releases;
    skipped += report.skipped;

    println!("--- uart ---");
    sink.with_bytes(|bytes| print!("{}", String::from_utf8_lossy(bytes)));

    println!("--- timing ---");
    println!("releases {releases}, skipped {skipped}, cpu load {}%", perf.cpu_load());
    for params in TASK_TABLE {
        println!(
            "{:<22} busy {:>10} counts, overruns {}",
            params.name,
            perf.task_total(params.id),
            perf.overruns(params.id)
        );
    }
}
